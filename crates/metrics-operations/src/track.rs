//! The `track` operation: decide whether an app still earns its `tracked` flag.

use metrics_core::{App, NO_ACTIVITY_LIMIT};
use metrics_store::CatalogStore;
use tracing::warn;

use crate::{context::JobContext, error::OperationError};

/// Re-evaluate `tracked` from recent month averages, falling back to a live
/// probe when no recent month shows activity.
pub async fn track(
    ctx: &JobContext,
    app: App,
    store: &dyn CatalogStore,
) -> Result<(), OperationError> {
    let tail_start = app.months.len().saturating_sub(NO_ACTIVITY_LIMIT);
    let tail = &app.months[tail_start..];
    let mut worth = tail.iter().any(|m| m.avg > 0);

    if !worth {
        match ctx
            .provider()
            .fetch(app.static_data.domain, app.static_data.external_id)
            .await
        {
            Ok(count) => worth = count > 0,
            Err(err) => {
                warn!(app_id = %app.id, error = %err, "track probe failed, leaving tracked unchanged");
                return Err(err.into());
            }
        }
    }

    if worth && !app.tracked {
        store.set_tracked(&app.id, true).await?;
    } else if !worth && app.tracked {
        store.set_tracked(&app.id, false).await?;
    }

    Ok(())
}
