//! The `monthly` operation: purge, reduce, and append a month record.

use chrono::Utc;
use metrics_aggregate::{construct_month_record, monthly_reduce, sort_by_date};
use metrics_core::App;
use metrics_store::CatalogStore;

use crate::{context::JobContext, error::OperationError};

/// Roll the app's daily history into a new month record, pruning retained
/// dailies to the 90-day window as a side effect of `monthly_reduce`.
pub async fn monthly(
    _ctx: &JobContext,
    mut app: App,
    store: &dyn CatalogStore,
) -> Result<(), OperationError> {
    let now = Utc::now();
    let (retained, peak, avg) = monthly_reduce(&app.dailies, now);
    app.dailies = retained;

    sort_by_date(&mut app.months);
    let prev = app.months.last().cloned();
    let record = construct_month_record(prev.as_ref(), peak, avg, now);
    app.months.push(record);

    store.replace_app(&app).await?;
    Ok(())
}
