//! The `daily` operation: probe the provider once, append the sample.

use chrono::Utc;
use metrics_core::{App, DailySample, ExceptionEntry};
use metrics_store::CatalogStore;
use tracing::warn;

use crate::{context::JobContext, error::OperationError};

/// Probe the app's live player count and append it to its daily history.
///
/// On provider failure, records an [`ExceptionEntry`] so the Recovery job
/// can replay the app later, then returns the error to the dispatcher.
pub async fn daily(
    ctx: &JobContext,
    mut app: App,
    store: &dyn CatalogStore,
) -> Result<(), OperationError> {
    let now = Utc::now();

    let count = match ctx
        .provider()
        .fetch(app.static_data.domain, app.static_data.external_id)
        .await
    {
        Ok(count) => count,
        Err(err) => {
            warn!(app_id = %app.id, error = %err, "daily probe failed, queuing for recovery");
            let entry = ExceptionEntry::new(&app, now);
            store.push_exception(&entry).await?;
            return Err(err.into());
        }
    };

    let sample = DailySample { date: now, count };
    app.dailies.push(sample.clone());
    app.last_sample = Some(sample);
    store.replace_app(&app).await?;
    Ok(())
}

/// Same as [`daily`], applied to an App hydrated from an `ExceptionEntry`.
///
/// The Recovery job surface resolves the App to replay via its own
/// `get_app` hydration step; the per-app behavior once an App is in hand
/// is identical to `daily`, so this is a thin alias rather than a second
/// implementation.
pub use self::daily as recovery;
