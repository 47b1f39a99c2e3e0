//! Waiting for a remote upload to settle.

use std::time::Duration;

use minbar_types::MinbarError;
use tokio::time::Instant;
use tracing::debug;

use crate::{cancel::CancelToken, cancel::sleep_or_cancel, remote::RemoteStore};

/// Default interval between size checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How a remote file is watched until it stops growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive size checks.
    pub interval: Duration,
    /// Upper bound on the whole wait; `None` waits indefinitely.
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Sets the poll interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the overall deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Polls the size of `name` until two consecutive checks agree.
///
/// Returns the settled size.
///
/// # Errors
///
/// - [`MinbarError::ArchiveNotFound`] if the file is absent at any check
/// - [`MinbarError::Timeout`] once the policy deadline has passed
/// - [`MinbarError::Cancelled`] if `cancel` fires during a wait
/// - [`MinbarError::Io`] for transport failures
pub async fn wait_until_stable(
    remote: &dyn RemoteStore,
    name: &str,
    policy: &PollPolicy,
    cancel: &CancelToken,
) -> Result<u64, MinbarError> {
    let started = Instant::now();
    let mut previous = current_size(remote, name).await?;

    loop {
        sleep_or_cancel(policy.interval, cancel).await?;
        if let Some(deadline) = policy.deadline {
            if started.elapsed() >= deadline {
                return Err(MinbarError::Timeout(deadline));
            }
        }

        let size = current_size(remote, name).await?;
        debug!(file = name, previous, size, "Polled remote size");
        if size == previous {
            return Ok(size);
        }
        previous = size;
    }
}

async fn current_size(remote: &dyn RemoteStore, name: &str) -> Result<u64, MinbarError> {
    let size = remote.file_size(name).await?;
    size.ok_or_else(|| MinbarError::ArchiveNotFound {
        path: remote.describe(name).into(),
    })
}
