//! Sources of decoded Apps the core batching loop pulls from.
//!
//! Daily/Monthly/Track stream from a store cursor; Refresh/Recovery already
//! hold a materialized `Vec<App>` built by their own job-surface logic.
//! Both feed the same batching loop through this trait.

use async_trait::async_trait;
use metrics_core::App;
use metrics_store::BoxCursor;
use tracing::warn;

/// Pulls the next batch of up to `max` decoded Apps. An empty result means
/// the source is exhausted.
#[async_trait]
pub trait BatchSource: Send {
    async fn next_batch(&mut self, max: usize) -> Vec<App>;
}

/// Decodes Apps off a store [`BoxCursor`] as they're pulled.
///
/// Decode failures (a malformed document, or a store-level error from the
/// cursor itself) are logged and skipped — they never count toward the
/// job's success/error tally, per the decode-failure contract.
pub struct CursorBatchSource {
    cursor: BoxCursor,
}

impl CursorBatchSource {
    #[must_use]
    pub fn new(cursor: BoxCursor) -> Self {
        Self { cursor }
    }
}

#[async_trait]
impl BatchSource for CursorBatchSource {
    async fn next_batch(&mut self, max: usize) -> Vec<App> {
        let mut batch = Vec::with_capacity(max);
        while batch.len() < max {
            match self.cursor.next().await {
                None => break,
                Some(Ok(value)) => match serde_json::from_value::<App>(value) {
                    Ok(app) => batch.push(app),
                    Err(err) => warn!(error = %err, "skipping undecodable document"),
                },
                Some(Err(err)) => warn!(error = %err, "skipping document after cursor error"),
            }
        }
        batch
    }
}

/// Serves Apps off an already-materialized list.
pub struct VecBatchSource {
    items: std::vec::IntoIter<App>,
}

impl VecBatchSource {
    #[must_use]
    pub fn new(items: Vec<App>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

#[async_trait]
impl BatchSource for VecBatchSource {
    async fn next_batch(&mut self, max: usize) -> Vec<App> {
        self.items.by_ref().take(max).collect()
    }
}
