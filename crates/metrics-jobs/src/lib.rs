//! # Metrics Jobs
//!
//! The five named job entry points (Daily, Monthly, Track, Refresh,
//! Recovery), each binding a per-app operation to the
//! [`metrics_dispatcher::Dispatcher`] with the right cursor, filter, or
//! pre-materialized item list.

mod error;

pub use error::JobError;

use std::sync::Arc;

use metrics_core::{App, AppId, StaticData};
use metrics_dispatcher::{Dispatcher, JobKind, Operation, Report};
use metrics_operations::JobContext;
use metrics_provider::ProviderAdapter;
use metrics_store::{AppFilter, CatalogStore, Collection};
use tracing::warn;

fn op_daily() -> Operation {
    Arc::new(|ctx, app, store| Box::pin(async move { metrics_operations::daily(&ctx, app, store.as_ref()).await }))
}

fn op_monthly() -> Operation {
    Arc::new(|ctx, app, store| Box::pin(async move { metrics_operations::monthly(&ctx, app, store.as_ref()).await }))
}

fn op_track() -> Operation {
    Arc::new(|ctx, app, store| Box::pin(async move { metrics_operations::track(&ctx, app, store.as_ref()).await }))
}

fn op_refresh() -> Operation {
    Arc::new(|ctx, app, store| Box::pin(async move { metrics_operations::refresh(&ctx, app, store.as_ref()).await }))
}

fn op_recovery() -> Operation {
    Arc::new(|ctx, app, store| Box::pin(async move { metrics_operations::recovery(&ctx, app, store.as_ref()).await }))
}

/// Probe every tracked app's live player count, append a sample.
pub async fn daily(
    dispatcher: &Dispatcher,
    store: &Arc<dyn CatalogStore>,
    ctx: JobContext,
) -> Result<Report, JobError> {
    let (count, cursor) = store
        .count_and_cursor(Collection::Stats, AppFilter::TrackedOnly)
        .await?;
    Ok(dispatcher
        .run_over_cursor(ctx, JobKind::Daily, op_daily(), count, cursor)
        .await?)
}

/// Roll every app's daily history into a new month record.
pub async fn monthly(
    dispatcher: &Dispatcher,
    store: &Arc<dyn CatalogStore>,
    ctx: JobContext,
) -> Result<Report, JobError> {
    let (count, cursor) = store
        .count_and_cursor(Collection::Stats, AppFilter::All)
        .await?;
    Ok(dispatcher
        .run_over_cursor(ctx, JobKind::Monthly, op_monthly(), count, cursor)
        .await?)
}

/// Re-evaluate every app's `tracked` flag.
pub async fn track(
    dispatcher: &Dispatcher,
    store: &Arc<dyn CatalogStore>,
    ctx: JobContext,
) -> Result<Report, JobError> {
    let (count, cursor) = store
        .count_and_cursor(Collection::Stats, AppFilter::All)
        .await?;
    Ok(dispatcher
        .run_over_cursor(ctx, JobKind::Track, op_track(), count, cursor)
        .await?)
}

/// Diff the upstream provider catalogs against what's already stored, and
/// insert any app the store has never seen before.
pub async fn refresh(
    dispatcher: &Dispatcher,
    store: &Arc<dyn CatalogStore>,
    ctx: JobContext,
) -> Result<Report, JobError> {
    let present: std::collections::HashSet<i64> = store
        .get_static_data()
        .await?
        .into_iter()
        .map(|s| s.external_id)
        .collect();

    let fetched = ctx.provider().fetch_catalog().await?;

    let mut new_apps = Vec::new();
    for (domain, catalog) in fetched {
        for (external_id, name) in catalog {
            if !present.contains(&external_id) {
                new_apps.push(App::new(
                    AppId::new(format!("{domain}:{external_id}")),
                    StaticData {
                        name,
                        external_id,
                        domain,
                    },
                ));
            }
        }
    }

    Ok(dispatcher
        .run_over_items(ctx, JobKind::Refresh, op_refresh(), new_apps)
        .await?)
}

/// Replay every queued exception: read and flush the Exceptions collection
/// first (so a failure on replay queues a fresh entry rather than piling on
/// the one just drained), then hydrate each into its full App and rerun the
/// daily operation against it.
pub async fn recovery(
    dispatcher: &Dispatcher,
    store: &Arc<dyn CatalogStore>,
    ctx: JobContext,
) -> Result<Report, JobError> {
    let (count, mut cursor) = store
        .count_and_cursor(Collection::Exceptions, AppFilter::All)
        .await?;

    let mut exceptions = Vec::with_capacity(count);
    while let Some(result) = cursor.next().await {
        match result {
            Ok(value) => match serde_json::from_value::<metrics_core::ExceptionEntry>(value) {
                Ok(entry) => exceptions.push(entry),
                Err(err) => warn!(error = %err, "skipping undecodable exception document"),
            },
            Err(err) => warn!(error = %err, "skipping exception after cursor error"),
        }
    }

    store.flush(Collection::Exceptions).await?;

    let mut apps = Vec::with_capacity(exceptions.len());
    for entry in exceptions {
        match store.get_app(&entry.ref_id).await {
            Ok(app) => apps.push(app),
            Err(err) => warn!(app_id = %entry.ref_id, error = %err, "could not hydrate app for recovery replay"),
        }
    }

    Ok(dispatcher
        .run_over_items(ctx, JobKind::Recovery, op_recovery(), apps)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use metrics_core::{Domain, ExceptionEntry};
    use metrics_provider::ProviderError;
    use metrics_store::InMemoryCatalogStore;
    use std::collections::HashMap;

    struct StubCatalogProvider {
        catalog: HashMap<Domain, HashMap<i64, String>>,
    }

    #[async_trait]
    impl ProviderAdapter for StubCatalogProvider {
        async fn fetch(&self, _domain: Domain, _external_id: i64) -> Result<i64, ProviderError> {
            Ok(0)
        }

        async fn fetch_catalog(&self) -> Result<HashMap<Domain, HashMap<i64, String>>, ProviderError> {
            Ok(self.catalog.clone())
        }
    }

    fn static_app(id: &str, external_id: i64) -> App {
        App::new(
            AppId::new(id),
            StaticData {
                name: format!("App {external_id}"),
                external_id,
                domain: Domain::Steam,
            },
        )
    }

    #[tokio::test]
    async fn refresh_inserts_only_the_app_not_already_present() {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        store.insert_app(&static_app("steam:1", 1)).await.unwrap();

        let mut catalog = HashMap::new();
        let mut steam = HashMap::new();
        steam.insert(1, "Already Known".to_string());
        steam.insert(2, "Brand New".to_string());
        catalog.insert(Domain::Steam, steam);

        let provider = Arc::new(StubCatalogProvider { catalog });
        let ctx = JobContext::new(provider);
        let dispatcher = Dispatcher::new(Arc::clone(&store));

        let report = refresh(&dispatcher, &store, ctx).await.unwrap();
        assert_eq!(report.success, 1);

        let ids: Vec<i64> = store
            .get_static_data()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.external_id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&2));
    }

    #[tokio::test]
    async fn recovery_flushes_exceptions_before_replaying() {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        let app = static_app("a1", 1);
        store.insert_app(&app).await.unwrap();
        store
            .push_exception(&ExceptionEntry::new(&app, chrono::Utc::now()))
            .await
            .unwrap();

        let provider = Arc::new(StubCatalogProvider {
            catalog: HashMap::new(),
        });
        let ctx = JobContext::new(provider);
        let dispatcher = Dispatcher::new(Arc::clone(&store));

        let report = recovery(&dispatcher, &store, ctx).await.unwrap();
        assert_eq!(report.success, 1);

        let in_memory = store;
        assert_eq!(
            in_memory
                .count_and_cursor(Collection::Exceptions, AppFilter::All)
                .await
                .unwrap()
                .0,
            0
        );
    }
}
