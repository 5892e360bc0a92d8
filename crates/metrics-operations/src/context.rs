//! The context threaded from a job entry point through the dispatcher to
//! every spawned task.

use std::sync::Arc;

use metrics_provider::ProviderAdapter;
use tokio_util::sync::CancellationToken;

/// Per-job context: the provider handle each operation probes through, and
/// the cancellation token the dispatcher trips on deadline expiry.
#[derive(Clone)]
pub struct JobContext {
    provider: Arc<dyn ProviderAdapter>,
    cancellation: CancellationToken,
}

impl JobContext {
    #[must_use]
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            provider,
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<dyn ProviderAdapter> {
        &self.provider
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Derive a child context for one spawned task: shares the provider
    /// handle, links cancellation so a job-level trip cancels every child.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            cancellation: self.cancellation.child_token(),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
