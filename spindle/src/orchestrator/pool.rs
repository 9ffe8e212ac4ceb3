//! Bounded pool for offloaded command hooks.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::Span;

/// Runs jobs on tokio's blocking threads, at most `size` at a time.
///
/// `submit` waits for a free slot, so a saturated pool pushes back on the
/// event loop instead of queueing without bound. Jobs are never joined.
#[derive(Debug, Clone)]
pub struct OffloadPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl OffloadPool {
    /// Create a pool with `size` slots.
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Number of slots.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of jobs currently running.
    pub fn in_flight(&self) -> usize {
        self.size - self.permits.available_permits()
    }

    /// Run `job` on a blocking thread inside `span`, once a slot is free.
    pub async fn submit<F>(&self, span: Span, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
            tracing::warn!("offload pool closed, dropping job");
            return;
        };
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _enter = span.enter();
            job();
        });
    }

    /// Wait until every submitted job has finished.
    pub async fn drain(&self) {
        let all = u32::try_from(self.size).unwrap_or(u32::MAX);
        match self.permits.acquire_many(all).await {
            Ok(_permits) => tracing::debug!("offload pool drained"),
            Err(_) => tracing::warn!("offload pool closed while draining"),
        }
    }
}
