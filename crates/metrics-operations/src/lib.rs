//! # Metrics Operations
//!
//! The five per-app operations the dispatcher runs: `daily`, `monthly`,
//! `track`, `refresh`, and `recovery` (an alias of `daily`). Each is a free
//! `async fn(ctx, app, store) -> Result<(), OperationError>`, independently
//! unit-testable against [`metrics_store::InMemoryCatalogStore`].

mod context;
mod daily;
mod error;
mod monthly;
mod refresh;
mod track;

pub use context::JobContext;
pub use daily::{daily, recovery};
pub use error::OperationError;
pub use monthly::monthly;
pub use refresh::refresh;
pub use track::track;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use metrics_core::{App, AppId, DailySample, Domain, MonthRecord, StaticData};
    use metrics_provider::{ProviderAdapter, ProviderError};
    use metrics_store::{CatalogStore, InMemoryCatalogStore};
    use std::collections::HashMap;

    use super::*;

    struct StubProvider {
        answer: Result<i64, ()>,
    }

    #[async_trait]
    impl ProviderAdapter for StubProvider {
        async fn fetch(&self, _domain: Domain, _external_id: i64) -> Result<i64, ProviderError> {
            self.answer
                .clone()
                .map_err(|()| ProviderError::Parse("stub failure".into()))
        }

        async fn fetch_catalog(
            &self,
        ) -> Result<HashMap<Domain, HashMap<i64, String>>, ProviderError> {
            Ok(HashMap::new())
        }
    }

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

    #[tokio::test]
    async fn daily_appends_sample_on_success() {
        let store = InMemoryCatalogStore::new();
        let a = app("a1");
        store.insert_app(&a).await.unwrap();

        let ctx = JobContext::new(Arc::new(StubProvider { answer: Ok(42) }));
        daily(&ctx, a, &store).await.unwrap();

        let updated = store.get_app(&AppId::new("a1")).await.unwrap();
        assert_eq!(updated.dailies.len(), 1);
        assert_eq!(updated.dailies[0].count, 42);
        assert_eq!(updated.last_sample.unwrap().count, 42);
    }

    #[tokio::test]
    async fn daily_queues_exception_on_provider_failure() {
        let store = InMemoryCatalogStore::new();
        let a = app("a1");
        store.insert_app(&a).await.unwrap();

        let ctx = JobContext::new(Arc::new(StubProvider { answer: Err(()) }));
        let result = daily(&ctx, a, &store).await;

        assert!(result.is_err());
        assert_eq!(store.exception_count().await, 1);
    }

    #[tokio::test]
    async fn track_enables_tracked_when_recent_month_is_active() {
        let store = InMemoryCatalogStore::new();
        let mut a = app("a1");
        a.months.push(MonthRecord {
            date: Utc::now(),
            avg: 10,
            peak: 20,
            gain: "-".into(),
            gain_pct: "-".into(),
        });
        store.insert_app(&a).await.unwrap();

        let ctx = JobContext::new(Arc::new(StubProvider { answer: Ok(0) }));
        track(&ctx, a, &store).await.unwrap();

        let updated = store.get_app(&AppId::new("a1")).await.unwrap();
        assert!(updated.tracked);
    }

    #[tokio::test]
    async fn track_probes_live_when_no_recent_month_is_active() {
        let store = InMemoryCatalogStore::new();
        let mut a = app("a1");
        a.tracked = true;
        a.months.push(MonthRecord {
            date: Utc::now(),
            avg: 0,
            peak: 0,
            gain: "-".into(),
            gain_pct: "-".into(),
        });
        store.insert_app(&a).await.unwrap();

        let ctx = JobContext::new(Arc::new(StubProvider { answer: Ok(0) }));
        track(&ctx, a, &store).await.unwrap();

        let updated = store.get_app(&AppId::new("a1")).await.unwrap();
        assert!(!updated.tracked);
    }

    #[tokio::test]
    async fn monthly_appends_record_and_prunes_dailies() {
        let store = InMemoryCatalogStore::new();
        let mut a = app("a1");
        a.dailies.push(DailySample {
            date: Utc::now() - chrono::Duration::days(200),
            count: 5,
        });
        a.dailies.push(DailySample {
            date: Utc::now(),
            count: 50,
        });
        store.insert_app(&a).await.unwrap();

        let ctx = JobContext::new(Arc::new(StubProvider { answer: Ok(0) }));
        monthly(&ctx, a, &store).await.unwrap();

        let updated = store.get_app(&AppId::new("a1")).await.unwrap();
        assert_eq!(updated.months.len(), 1);
        assert_eq!(updated.dailies.len(), 1);
    }
}
