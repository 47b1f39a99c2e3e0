//! CLI command implementations.

pub(crate) mod calendar;
pub(crate) mod catch_up;
pub(crate) mod fetch;
pub(crate) mod run;

use minbar_lib::{CancelToken, cancel_pair};

/// Returns a token cancelled on the first Ctrl-C.
pub(crate) fn cancel_on_ctrl_c() -> CancelToken {
    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            handle.cancel();
        }
    });
    token
}
