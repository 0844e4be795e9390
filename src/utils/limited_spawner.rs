use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::JoinHandle;

/// Spawns tasks that wait for a permit before running, so at most
/// `max_concurrent` of them make progress at once.
#[derive(Clone)]
pub struct LimitedSpawner {
    semaphore: Arc<Semaphore>,
}

impl LimitedSpawner {
    pub fn new(max_concurrent: NonZeroUsize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.get())),
        }
    }

    /// Spawns `f` immediately. The task holds its permit until `f` finishes
    /// or the task is aborted; aborting a task still queued for a permit
    /// never runs `f` at all.
    pub fn spawn<F>(&self, f: F) -> JoinHandle<Result<F::Output, AcquireError>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            Ok::<_, AcquireError>(f.await)
        })
    }

    /// Stops handing out permits. Tasks still waiting finish with an
    /// [`AcquireError`] without running; running ones keep their permit.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}
