//! Archive retrieval and tick decoding for minbar.
//!
//! This crate turns a `<trading-day>.tar.gz` archive into a stream of ticks:
//!
//! - [`ArchiveLocator`] - Local archive directory first, remote store second
//! - [`RemoteStore`] - Remote archive endpoint, with [`MountedRemote`] for a
//!   mounted remote directory
//! - [`wait_until_stable`] - Waits until a remote upload stops growing
//! - [`with_archive_ticks`] - Gzip + tar unpacking of the single XML member
//! - [`TickReader`] - Streaming XML decoder yielding one [`Tick`] per record
//! - [`CancelToken`] - Cancellation shared by every blocking wait
//!
//! [`Tick`]: minbar_types::Tick

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/minbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod archive;
mod cancel;
mod decode;
mod poll;
mod remote;
mod source;

pub use archive::with_archive_ticks;
pub use cancel::{CancelHandle, CancelToken, cancel_pair, sleep_or_cancel};
pub use decode::{DecodeError, PACKAGE_ELEMENT, TickReader};
pub use poll::{DEFAULT_POLL_INTERVAL, PollPolicy, wait_until_stable};
pub use remote::{MountedRemote, RemoteStore};
pub use source::{ArchiveLocator, ArchiveOrigin, OpenedArchive, archive_name};
