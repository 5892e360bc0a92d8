//! In-memory [`CatalogStore`] fake, used by tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use metrics_core::{App, AppId, ExceptionEntry, StaticData};
use tokio::sync::RwLock;

use crate::{check_capacity, AppFilter, BoxCursor, CatalogStore, Collection, StoreError, VecCursor};

/// In-memory [`CatalogStore`]. Not for production use — no persistence,
/// no concurrent-writer isolation beyond the `RwLock`.
#[derive(Default, Clone)]
pub struct InMemoryCatalogStore {
    apps: Arc<RwLock<HashMap<String, App>>>,
    exceptions: Arc<RwLock<HashMap<String, ExceptionEntry>>>,
}

impl InMemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with apps, for test setup.
    pub async fn seed(&self, apps: impl IntoIterator<Item = App>) {
        let mut guard = self.apps.write().await;
        for app in apps {
            guard.insert(app.id.0.clone(), app);
        }
    }

    /// Read back an exception by id, for test assertions.
    pub async fn exception(&self, id: &AppId) -> Option<ExceptionEntry> {
        self.exceptions.read().await.get(&id.0).cloned()
    }

    pub async fn exception_count(&self) -> usize {
        self.exceptions.read().await.len()
    }

    pub async fn app_count(&self) -> usize {
        self.apps.read().await.len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn count_and_cursor(
        &self,
        collection: Collection,
        filter: AppFilter,
    ) -> Result<(usize, BoxCursor), StoreError> {
        let docs: Vec<serde_json::Value> = match collection {
            Collection::Stats => {
                let guard = self.apps.read().await;
                guard
                    .values()
                    .filter(|app| match filter {
                        AppFilter::All => true,
                        AppFilter::TrackedOnly => app.tracked,
                    })
                    .map(|app| serde_json::to_value(app).expect("App always serializes"))
                    .collect()
            }
            Collection::Exceptions => {
                let guard = self.exceptions.read().await;
                guard
                    .values()
                    .map(|entry| serde_json::to_value(entry).expect("ExceptionEntry always serializes"))
                    .collect()
            }
        };

        let count = docs.len();
        check_capacity(count)?;
        Ok((count, Box::new(VecCursor::new(docs))))
    }

    async fn get_static_data(&self) -> Result<Vec<StaticData>, StoreError> {
        let guard = self.apps.read().await;
        Ok(guard.values().map(|app| app.static_data.clone()).collect())
    }

    async fn get_app(&self, id: &AppId) -> Result<App, StoreError> {
        self.apps
            .read()
            .await
            .get(&id.0)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn insert_app(&self, app: &App) -> Result<(), StoreError> {
        self.apps.write().await.insert(app.id.0.clone(), app.clone());
        Ok(())
    }

    async fn replace_app(&self, app: &App) -> Result<(), StoreError> {
        let mut guard = self.apps.write().await;
        if !guard.contains_key(&app.id.0) {
            return Err(StoreError::NotFound(app.id.to_string()));
        }
        guard.insert(app.id.0.clone(), app.clone());
        Ok(())
    }

    async fn set_tracked(&self, id: &AppId, tracked: bool) -> Result<(), StoreError> {
        let mut guard = self.apps.write().await;
        let app = guard
            .get_mut(&id.0)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        app.tracked = tracked;
        Ok(())
    }

    async fn push_exception(&self, entry: &ExceptionEntry) -> Result<(), StoreError> {
        self.exceptions
            .write()
            .await
            .insert(entry.id.0.clone(), entry.clone());
        Ok(())
    }

    async fn flush(&self, collection: Collection) -> Result<(), StoreError> {
        match collection {
            Collection::Stats => self.apps.write().await.clear(),
            Collection::Exceptions => self.exceptions.write().await.clear(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_core::Domain;

    fn app(id: &str, tracked: bool) -> App {
        let mut app = App::new(
            AppId::new(id),
            StaticData {
                name: format!("App {id}"),
                external_id: 1,
                domain: Domain::Steam,
            },
        );
        app.tracked = tracked;
        app
    }

    #[tokio::test]
    async fn replace_app_fails_not_found_when_absent() {
        let store = InMemoryCatalogStore::new();
        let err = store.replace_app(&app("missing", false)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn set_tracked_toggles_flag() {
        let store = InMemoryCatalogStore::new();
        store.insert_app(&app("a1", false)).await.unwrap();
        store.set_tracked(&AppId::new("a1"), true).await.unwrap();
        let fetched = store.get_app(&AppId::new("a1")).await.unwrap();
        assert!(fetched.tracked);
    }

    #[tokio::test]
    async fn count_and_cursor_filters_tracked_only() {
        let store = InMemoryCatalogStore::new();
        store.seed([app("a1", true), app("a2", false)]).await;
        let (count, _) = store
            .count_and_cursor(Collection::Stats, AppFilter::TrackedOnly)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn count_and_cursor_rejects_over_capacity() {
        let store = InMemoryCatalogStore::new();
        store
            .seed((0..=metrics_core::CAPACITY).map(|i| app(&format!("a{i}"), false)))
            .await;

        let err = store
            .count_and_cursor(Collection::Stats, AppFilter::All)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OverCapacity(n) if n == metrics_core::CAPACITY + 1));
    }

    #[tokio::test]
    async fn flush_exceptions_clears_only_that_collection() {
        let store = InMemoryCatalogStore::new();
        store.insert_app(&app("a1", false)).await.unwrap();
        store
            .push_exception(&ExceptionEntry {
                id: AppId::new("a1"),
                ref_id: AppId::new("a1"),
                static_data: app("a1", false).static_data,
                attempted_date: chrono::Utc::now(),
            })
            .await
            .unwrap();

        store.flush(Collection::Exceptions).await.unwrap();
        assert_eq!(store.exception_count().await, 0);
        assert_eq!(store.app_count().await, 1);
    }
}
