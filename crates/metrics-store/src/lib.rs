//! # Metrics Store
//!
//! The catalog store abstraction: a capability trait over two collections
//! (Stats, holding [`App`] documents, and Exceptions, holding
//! [`ExceptionEntry`] documents), production Postgres-backed and in-memory
//! implementations.

mod error;
mod memory;
mod postgres;

pub use error::StoreError;
pub use memory::InMemoryCatalogStore;
pub use postgres::PgCatalogStore;

use async_trait::async_trait;
use metrics_core::{App, AppId, ExceptionEntry, StaticData, CAPACITY};

/// The two document collections the catalog store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Stats,
    Exceptions,
}

/// The query shapes the job dispatcher resolves from a job kind (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppFilter {
    /// No filter — every document in the collection.
    All,
    /// Only apps with `tracked == true` (the Daily job's filter).
    TrackedOnly,
}

/// A single-pass, ordering-unspecified cursor over raw stored documents.
///
/// Decoding into a concrete type happens one level up (in the dispatcher or
/// job-surface layer) so that a decode failure can be logged and skipped
/// without the store knowing about the generic per-job document shape.
#[async_trait]
pub trait Cursor: Send {
    async fn next(&mut self) -> Option<Result<serde_json::Value, StoreError>>;
}

/// A boxed [`Cursor`] trait object.
pub type BoxCursor = Box<dyn Cursor>;

/// A cursor backed by an already-materialized batch of documents.
///
/// Both store implementations in this crate resolve their matching set
/// eagerly (see `PgCatalogStore::count_and_cursor`): the [`CAPACITY`] cap
/// bounds that to 200,000 JSONB documents, and holding a true server-side
/// portal open for the lifetime of a job would require pinning one
/// connection out of the shared pool for the whole job's wall-clock
/// duration, which conflicts with sharing the pool across concurrent tasks.
pub struct VecCursor {
    items: std::vec::IntoIter<serde_json::Value>,
}

impl VecCursor {
    #[must_use]
    pub fn new(items: Vec<serde_json::Value>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

#[async_trait]
impl Cursor for VecCursor {
    async fn next(&mut self) -> Option<Result<serde_json::Value, StoreError>> {
        self.items.next().map(Ok)
    }
}

/// The catalog store capability interface (§4.2).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Count matching documents and open a cursor over them.
    ///
    /// Fails [`StoreError::OverCapacity`] if `count > CAPACITY` — the job
    /// aborts before any task is spawned.
    async fn count_and_cursor(
        &self,
        collection: Collection,
        filter: AppFilter,
    ) -> Result<(usize, BoxCursor), StoreError>;

    /// Stream every App's static data only (used by Refresh's id-diff).
    async fn get_static_data(&self) -> Result<Vec<StaticData>, StoreError>;

    /// Fetch one App in full, by id.
    ///
    /// Not part of the original §4.2 table; added so Recovery can hydrate
    /// an App's full history from an `ExceptionEntry`'s `ref_id` before
    /// re-running the daily operation against it — see `DESIGN.md`.
    async fn get_app(&self, id: &AppId) -> Result<App, StoreError>;

    /// Insert a new App.
    async fn insert_app(&self, app: &App) -> Result<(), StoreError>;

    /// Find-by-id and full-replace. Fails [`StoreError::NotFound`] if absent.
    async fn replace_app(&self, app: &App) -> Result<(), StoreError>;

    /// Atomic field update. Fails [`StoreError::NotFound`] if absent.
    async fn set_tracked(&self, id: &AppId, tracked: bool) -> Result<(), StoreError>;

    /// Insert into the Exceptions collection.
    async fn push_exception(&self, entry: &ExceptionEntry) -> Result<(), StoreError>;

    /// Delete every document in the named collection.
    async fn flush(&self, collection: Collection) -> Result<(), StoreError>;
}

/// Shared `OverCapacity` guard used by both store implementations.
fn check_capacity(count: usize) -> Result<(), StoreError> {
    if count > CAPACITY {
        Err(StoreError::OverCapacity(count))
    } else {
        Ok(())
    }
}
