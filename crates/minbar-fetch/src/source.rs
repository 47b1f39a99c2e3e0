//! Locating a day's archive.

use std::{
    fmt,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::Arc,
};

use minbar_types::{MinbarError, TradingDay};
use tracing::{debug, info};

use crate::{
    cancel::CancelToken,
    poll::{PollPolicy, wait_until_stable},
    remote::RemoteStore,
};

/// Returns the archive file name for `day`, e.g. `20230110.tar.gz`.
#[must_use]
pub fn archive_name(day: TradingDay) -> String {
    format!("{day}.tar.gz")
}

/// Where an opened archive came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOrigin {
    /// The local archive directory.
    Local(PathBuf),
    /// A remote store, after its size settled.
    Remote {
        /// Location as described by the store.
        location: String,
        /// Settled size in bytes.
        size: u64,
    },
}

impl fmt::Display for ArchiveOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote { location, .. } => f.write_str(location),
        }
    }
}

/// An archive ready to be unpacked.
pub struct OpenedArchive {
    /// Where the bytes come from.
    pub origin: ArchiveOrigin,
    /// The compressed archive stream.
    pub reader: Box<dyn Read + Send>,
}

impl fmt::Debug for OpenedArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedArchive")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Finds the archive of a trading day: local directory first, then the
/// optional remote store.
#[derive(Debug, Clone)]
pub struct ArchiveLocator {
    local_dir: PathBuf,
    remote: Option<Arc<dyn RemoteStore>>,
    poll: PollPolicy,
}

impl ArchiveLocator {
    /// Creates a locator that only looks in `local_dir`.
    pub fn new(local_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            remote: None,
            poll: PollPolicy::default(),
        }
    }

    /// Adds a remote fallback.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Sets the policy used while waiting on remote uploads.
    #[must_use]
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Returns the local archive directory.
    #[must_use]
    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Returns the remote store, if configured.
    #[must_use]
    pub fn remote(&self) -> Option<&Arc<dyn RemoteStore>> {
        self.remote.as_ref()
    }

    /// Returns the local path where `day`'s archive is expected.
    #[must_use]
    pub fn local_path(&self, day: TradingDay) -> PathBuf {
        self.local_dir.join(archive_name(day))
    }

    /// Opens the archive for `day`.
    ///
    /// A local file wins. Otherwise the remote copy is polled until its size
    /// is stable and then opened.
    ///
    /// # Errors
    ///
    /// Returns [`MinbarError::ArchiveNotFound`] when neither location has the
    /// archive, plus the poll errors of [`wait_until_stable`].
    pub async fn open(
        &self,
        day: TradingDay,
        cancel: &CancelToken,
    ) -> Result<OpenedArchive, MinbarError> {
        let path = self.local_path(day);
        match tokio::fs::File::open(&path).await {
            Ok(file) => {
                debug!(path = %path.display(), "Opened local archive");
                return Ok(OpenedArchive {
                    origin: ArchiveOrigin::Local(path),
                    reader: Box::new(file.into_std().await),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let Some(remote) = &self.remote else {
            return Err(MinbarError::ArchiveNotFound { path });
        };

        let name = archive_name(day);
        let size = wait_until_stable(remote.as_ref(), &name, &self.poll, cancel).await?;
        let reader = remote.open(&name).await?;
        let location = remote.describe(&name);
        info!(%location, size, "Opened remote archive");
        Ok(OpenedArchive {
            origin: ArchiveOrigin::Remote { location, size },
            reader,
        })
    }

    /// Copies `day`'s remote archive into the local directory.
    ///
    /// The copy goes to a `.part` file first and is renamed into place, so a
    /// partial download is never mistaken for an archive. Returns the local
    /// path; an archive already present locally is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MinbarError::Config`] without a remote store, and the errors
    /// of [`ArchiveLocator::open`] or the copy otherwise.
    pub async fn mirror(
        &self,
        day: TradingDay,
        cancel: &CancelToken,
    ) -> Result<PathBuf, MinbarError> {
        let target = self.local_path(day);
        if tokio::fs::try_exists(&target).await? {
            info!(path = %target.display(), "Archive already mirrored");
            return Ok(target);
        }
        if self.remote.is_none() {
            return Err(no_remote());
        }

        let opened = self.open(day, cancel).await?;
        tokio::fs::create_dir_all(&self.local_dir).await?;

        let part = target.with_extension("gz.part");
        let copied = tokio::task::spawn_blocking({
            let part = part.clone();
            let mut reader = opened.reader;
            move || -> io::Result<u64> {
                let mut file = std::fs::File::create(&part)?;
                let copied = io::copy(&mut reader, &mut file)?;
                file.sync_all()?;
                Ok(copied)
            }
        })
        .await
        .map_err(|e| MinbarError::Io(io::Error::other(e)))?;

        let copied = match copied {
            Ok(n) => n,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(e.into());
            }
        };
        tokio::fs::rename(&part, &target).await?;
        info!(path = %target.display(), bytes = copied, "Mirrored archive");
        Ok(target)
    }

    /// Lists the archives published by the remote store.
    ///
    /// # Errors
    ///
    /// Returns [`MinbarError::Config`] without a remote store.
    pub async fn list_remote(&self) -> Result<Vec<String>, MinbarError> {
        let remote = self.remote.as_ref().ok_or_else(no_remote)?;
        Ok(remote.list().await?)
    }
}

fn no_remote() -> MinbarError {
    MinbarError::Config("no remote archive store configured".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cancel::cancel_pair, poll::tests::ScriptedRemote, remote::MountedRemote};
    use std::time::Duration;

    fn day() -> TradingDay {
        "20230110".parse().unwrap()
    }

    fn fast() -> PollPolicy {
        PollPolicy::default().with_interval(Duration::from_millis(10))
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name(day()), "20230110.tar.gz");
        let locator = ArchiveLocator::new("/xml");
        let path = locator.local_path(day());
        assert_eq!(path, PathBuf::from("/xml/20230110.tar.gz"));
    }

    #[tokio::test]
    async fn test_local_wins() {
        let local = tempfile::tempdir().unwrap();
        let archive = local.path().join("20230110.tar.gz");
        std::fs::write(archive, b"local").unwrap();
        let remote = Arc::new(ScriptedRemote::new(&[Some(6)], b"remote".to_vec()));

        let locator = ArchiveLocator::new(local.path()).with_remote(remote);
        let mut opened = locator.open(day(), &CancelToken::never()).await.unwrap();
        assert!(matches!(opened.origin, ArchiveOrigin::Local(_)));

        let mut contents = String::new();
        opened.reader.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "local");
    }

    #[tokio::test]
    async fn test_missing_without_remote() {
        let local = tempfile::tempdir().unwrap();
        let locator = ArchiveLocator::new(local.path());
        let never = CancelToken::never();
        let err = locator.open(day(), &never).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_fallback() {
        let local = tempfile::tempdir().unwrap();
        let remote = Arc::new(ScriptedRemote::new(&[Some(3), Some(6)], b"remote".to_vec()));
        let locator = ArchiveLocator::new(local.path())
            .with_remote(remote)
            .with_poll_policy(fast());

        let mut opened = locator.open(day(), &CancelToken::never()).await.unwrap();
        assert_eq!(
            opened.origin,
            ArchiveOrigin::Remote {
                location: "scripted:20230110.tar.gz".to_string(),
                size: 6,
            }
        );
        let mut contents = String::new();
        opened.reader.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "remote");
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_missing_is_retryable() {
        let local = tempfile::tempdir().unwrap();
        let remote = Arc::new(ScriptedRemote::new(&[None], Vec::new()));
        let locator = ArchiveLocator::new(local.path())
            .with_remote(remote)
            .with_poll_policy(fast());
        let never = CancelToken::never();
        let err = locator.open(day(), &never).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_remote_cancelled() {
        let local = tempfile::tempdir().unwrap();
        let remote = Arc::new(ScriptedRemote::new(&[Some(1), Some(2)], Vec::new()));
        let locator = ArchiveLocator::new(local.path())
            .with_remote(remote)
            .with_poll_policy(fast());
        let (handle, token) = cancel_pair();
        handle.cancel();
        let err = locator.open(day(), &token).await.unwrap_err();
        assert!(matches!(err, MinbarError::Cancelled));
    }

    #[tokio::test]
    async fn test_mirror_and_list() {
        let local = tempfile::tempdir().unwrap();
        let mount = tempfile::tempdir().unwrap();
        let archive = mount.path().join("20230110.tar.gz");
        std::fs::write(archive, b"archive-bytes").unwrap();

        let locator = ArchiveLocator::new(local.path().join("xml"))
            .with_remote(Arc::new(MountedRemote::new(mount.path())))
            .with_poll_policy(fast());

        assert_eq!(locator.list_remote().await.unwrap(), ["20230110.tar.gz"]);

        let path = locator.mirror(day(), &CancelToken::never()).await.unwrap();
        assert_eq!(path, local.path().join("xml").join("20230110.tar.gz"));
        assert_eq!(std::fs::read(&path).unwrap(), b"archive-bytes");
        assert!(!path.with_extension("gz.part").exists());

        let again = locator.mirror(day(), &CancelToken::never()).await.unwrap();
        assert_eq!(again, path);
    }

    #[tokio::test]
    async fn test_mirror_requires_remote() {
        let local = tempfile::tempdir().unwrap();
        let locator = ArchiveLocator::new(local.path());
        let never = CancelToken::never();
        let err = locator.mirror(day(), &never).await.unwrap_err();
        assert!(matches!(err, MinbarError::Config(_)));
        let listed = locator.list_remote().await;
        assert!(matches!(listed, Err(MinbarError::Config(_))));
    }
}
