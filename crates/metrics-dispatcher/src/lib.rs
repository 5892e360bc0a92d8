//! # Metrics Dispatcher
//!
//! The job dispatcher: a fixed batching/admission-control/deadline protocol
//! shared by all five jobs, parameterised by the job's operation and the
//! source it pulls Apps from.
//!
//! Races a deadline timer against a completion channel with `tokio::select!`,
//! generalized here to a two-tier bound: batch-size admission control plus
//! a single job-wide deadline, rather than per-task retry.

mod batch_source;
mod error;
mod job_kind;

pub use batch_source::{BatchSource, CursorBatchSource, VecBatchSource};
pub use error::DispatchError;
pub use job_kind::JobKind;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use metrics_core::{App, CAPACITY};
use metrics_operations::{JobContext, OperationError};
use metrics_store::{BoxCursor, CatalogStore};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

/// No more than this many tasks are admitted into flight at once.
pub const BATCH_SIZE: usize = 50;

/// The job-wide deadline from dispatcher entry to forced return.
pub const FUNCTION_DURATION: Duration = Duration::from_secs(8 * 60);

/// A per-app operation bound into the dispatcher as a boxed `Fn` value
/// returning a future, rather than dispatched over a tagged variant — kept
/// each operation's own test suite independent of the dispatcher.
pub type Operation = Arc<
    dyn Fn(
            JobContext,
            App,
            Arc<dyn CatalogStore>,
        ) -> Pin<Box<dyn Future<Output = Result<(), OperationError>> + Send>>
        + Send
        + Sync,
>;

/// The outcome of one job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub job_kind: JobKind,
    pub success: usize,
    pub errors: usize,
}

/// Runs jobs against a shared catalog store.
pub struct Dispatcher {
    store: Arc<dyn CatalogStore>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Entry point for Daily/Monthly/Track: stream Apps off a store cursor.
    ///
    /// `count` has already cleared the [`CAPACITY`] check in
    /// `count_and_cursor`; this is where that deferred check is enforced.
    pub async fn run_over_cursor(
        &self,
        ctx: JobContext,
        job_kind: JobKind,
        operation: Operation,
        count: usize,
        cursor: BoxCursor,
    ) -> Result<Report, DispatchError> {
        if count > CAPACITY {
            return Err(DispatchError::OverCapacity(count));
        }
        let source = CursorBatchSource::new(cursor);
        Ok(self.run(ctx, job_kind, operation, source).await)
    }

    /// Entry point for Refresh/Recovery: dispatch over an already-built
    /// list of Apps (new catalog entries, or hydrated exception replays).
    pub async fn run_over_items(
        &self,
        ctx: JobContext,
        job_kind: JobKind,
        operation: Operation,
        apps: Vec<App>,
    ) -> Result<Report, DispatchError> {
        if apps.len() > CAPACITY {
            return Err(DispatchError::OverCapacity(apps.len()));
        }
        let source = VecBatchSource::new(apps);
        Ok(self.run(ctx, job_kind, operation, source).await)
    }

    async fn run(
        &self,
        ctx: JobContext,
        job_kind: JobKind,
        operation: Operation,
        mut source: impl BatchSource,
    ) -> Report {
        let deadline = Instant::now() + FUNCTION_DURATION;
        let mut success = 0usize;
        let mut errors = 0usize;

        'batches: loop {
            if Instant::now() >= deadline {
                break;
            }

            let batch = source.next_batch(BATCH_SIZE).await;
            if batch.is_empty() {
                break;
            }
            let admitted = batch.len();

            let (tx, mut rx) = mpsc::channel::<bool>(admitted);
            for app in batch {
                let op = Arc::clone(&operation);
                let store = Arc::clone(&self.store);
                let child_ctx = ctx.child();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let outcome = op(child_ctx, app, store).await;
                    // Deferred send in the task wrapper: every spawned task
                    // sends exactly once, success or error, never neither.
                    let _ = tx.send(outcome.is_ok()).await;
                });
            }
            drop(tx);

            let mut received = 0usize;
            while received < admitted {
                tokio::select! {
                    biased;
                    maybe = rx.recv() => {
                        match maybe {
                            Some(ok) => {
                                if ok { success += 1 } else { errors += 1 }
                                received += 1;
                            }
                            None => break,
                        }
                    }
                    () = tokio::time::sleep_until(deadline) => {
                        warn!(job = %job_kind, "deadline hit mid-batch, abandoning in-flight tasks");
                        ctx.cancellation().cancel();
                        break 'batches;
                    }
                }
            }
        }

        info!(job = %job_kind, success, errors, "job finished");
        Report {
            job_kind,
            success,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_core::{AppId, Domain, StaticData};
    use metrics_store::{AppFilter, Collection, InMemoryCatalogStore};

    fn app(id: &str) -> App {
        App::new(
            AppId::new(id),
            StaticData {
                name: "Test".into(),
                external_id: 1,
                domain: Domain::Steam,
            },
        )
    }

    fn always_ok() -> Operation {
        Arc::new(|_ctx, _app, _store| Box::pin(async { Ok(()) }))
    }

    fn fails_for_id(bad_id: &'static str) -> Operation {
        Arc::new(move |_ctx, app, _store| {
            Box::pin(async move {
                if app.id.0 == bad_id {
                    Err(OperationError::Cancelled)
                } else {
                    Ok(())
                }
            })
        })
    }

    fn stub_ctx() -> JobContext {
        use async_trait::async_trait;
        use metrics_provider::{ProviderAdapter, ProviderError};
        use std::collections::HashMap;

        struct Noop;
        #[async_trait]
        impl ProviderAdapter for Noop {
            async fn fetch(&self, _domain: Domain, _external_id: i64) -> Result<i64, ProviderError> {
                Ok(0)
            }
            async fn fetch_catalog(
                &self,
            ) -> Result<HashMap<Domain, HashMap<i64, String>>, ProviderError> {
                Ok(HashMap::new())
            }
        }
        JobContext::new(Arc::new(Noop))
    }

    #[tokio::test]
    async fn run_over_cursor_aborts_before_spawning_when_over_capacity() {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        let (_, cursor) = store
            .count_and_cursor(Collection::Stats, AppFilter::All)
            .await
            .unwrap();

        let dispatcher = Dispatcher::new(Arc::clone(&store));
        let err = dispatcher
            .run_over_cursor(
                stub_ctx(),
                JobKind::Daily,
                always_ok(),
                metrics_core::CAPACITY + 1,
                cursor,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::OverCapacity(n) if n == metrics_core::CAPACITY + 1));
    }

    #[tokio::test]
    async fn empty_cursor_produces_empty_report_with_no_tasks() {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        let (count, cursor) = store
            .count_and_cursor(Collection::Stats, AppFilter::All)
            .await
            .unwrap();

        let dispatcher = Dispatcher::new(Arc::clone(&store));
        let report = dispatcher
            .run_over_cursor(stub_ctx(), JobKind::Daily, always_ok(), count, cursor)
            .await
            .unwrap();

        assert_eq!(report.success, 0);
        assert_eq!(report.errors, 0);
    }

    #[tokio::test]
    async fn exact_accounting_over_a_batch() {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        for i in 0..5 {
            store.insert_app(&app(&format!("a{i}"))).await.unwrap();
        }
        let (count, cursor) = store
            .count_and_cursor(Collection::Stats, AppFilter::All)
            .await
            .unwrap();

        let dispatcher = Dispatcher::new(Arc::clone(&store));
        let report = dispatcher
            .run_over_cursor(stub_ctx(), JobKind::Daily, fails_for_id("a2"), count, cursor)
            .await
            .unwrap();

        assert_eq!(report.success + report.errors, 5);
        assert_eq!(report.errors, 1);
        assert_eq!(report.success, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cuts_off_a_batch_of_tasks_that_never_finish() {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        for i in 0..5 {
            store.insert_app(&app(&format!("a{i}"))).await.unwrap();
        }
        let (count, cursor) = store
            .count_and_cursor(Collection::Stats, AppFilter::All)
            .await
            .unwrap();

        let hangs: Operation = Arc::new(|_ctx, _app, _store| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(9 * 60)).await;
                Ok(())
            })
        });

        let dispatcher = Dispatcher::new(Arc::clone(&store));
        let report = dispatcher
            .run_over_cursor(stub_ctx(), JobKind::Daily, hangs, count, cursor)
            .await
            .unwrap();

        assert_eq!(report.success, 0);
        assert_eq!(report.errors, 0);
    }

    #[tokio::test]
    async fn run_over_items_dispatches_a_materialized_list() {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        let items = vec![app("a1"), app("a2"), app("a3")];

        let dispatcher = Dispatcher::new(Arc::clone(&store));
        let report = dispatcher
            .run_over_items(stub_ctx(), JobKind::Refresh, always_ok(), items)
            .await
            .unwrap();

        assert_eq!(report.success, 3);
        assert_eq!(report.errors, 0);
    }
}
