use std::num::NonZeroUsize;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::AcquireError;
use tokio::task::{AbortHandle, JoinError};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::manifest::{Manifest, ManifestEntry};
use crate::sources::resolver::Resolver;
use crate::utils::limited_spawner::LimitedSpawner;
use crate::utils::multierr::MultiError;

/// What a batch does once one of its artifacts fails. Neither policy ever
/// yields a partial manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Let every resolution finish, then report all failures in input order.
    #[default]
    SettleAll,
    /// Abort everything still running as soon as one resolution fails.
    FailFast,
}

/// Aborts the tasks it tracks when dropped, so in-flight downloads never
/// outlive the batch that started them.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in self.0.iter() {
            handle.abort();
        }
    }
}

type Joined =
    std::result::Result<std::result::Result<Result<ManifestEntry>, AcquireError>, JoinError>;

fn settle(joined: Joined) -> Result<ManifestEntry> {
    joined??
}

pub struct Executor {
    resolver: Resolver,
    spawner: LimitedSpawner,
    policy: FailurePolicy,
}

impl Executor {
    pub fn new(resolver: Resolver, concurrency: NonZeroUsize, policy: FailurePolicy) -> Self {
        Executor {
            resolver,
            spawner: LimitedSpawner::new(concurrency),
            policy,
        }
    }

    /// Resolves every url, one task per occurrence. The manifest lists the
    /// entries in the order of `urls`, whatever order the downloads finish in.
    /// Failing fast closes the limiter, so later batches fail with
    /// [`Error::Limiter`].
    pub async fn resolve_all(&self, urls: &[String]) -> Result<Manifest> {
        let mut pending = FuturesUnordered::new();
        let mut abort = AbortOnDrop(Vec::with_capacity(urls.len()));

        for (index, url) in urls.iter().enumerate() {
            let resolver = self.resolver.clone();
            let url = url.clone();
            let handle = self.spawner.spawn(async move { resolver.resolve(&url).await });
            abort.0.push(handle.abort_handle());
            pending.push(async move { (index, handle.await) });
        }
        debug!(tasks = urls.len(), policy = ?self.policy, "resolutions spawned");

        let mut slots: Vec<Option<ManifestEntry>> = vec![None; urls.len()];
        let mut errors = Vec::new();

        while let Some((index, joined)) = pending.next().await {
            match settle(joined) {
                Ok(entry) => slots[index] = Some(entry),
                Err(err) => {
                    warn!(url = urls[index].as_str(), error = %err, "artifact failed");
                    if self.policy == FailurePolicy::FailFast {
                        info!(remaining = pending.len(), "aborting in-flight downloads");
                        self.spawner.close();
                        drop(abort);
                        return Err(err);
                    }
                    errors.push((index, err));
                }
            }
        }

        if !errors.is_empty() {
            errors.sort_by_key(|(index, _)| *index);
            let errors = errors.into_iter().map(|(_, err)| err).collect();
            return Err(match MultiError::new(errors).flatten() {
                Ok(single) => single,
                Err(many) => Error::Batch(many),
            });
        }

        Ok(Manifest::new(slots.into_iter().flatten().collect()))
    }
}
