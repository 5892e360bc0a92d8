//! The `refresh` operation: insert one freshly discovered App.

use metrics_core::App;
use metrics_store::CatalogStore;

use crate::{context::JobContext, error::OperationError};

/// Insert a pre-constructed App. The diff against the upstream catalog that
/// decides which apps are new happens in the job surface, not here.
pub async fn refresh(
    _ctx: &JobContext,
    app: App,
    store: &dyn CatalogStore,
) -> Result<(), OperationError> {
    store.insert_app(&app).await?;
    Ok(())
}
