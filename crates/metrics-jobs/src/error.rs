use metrics_dispatcher::DispatchError;
use metrics_provider::ProviderError;
use metrics_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}
