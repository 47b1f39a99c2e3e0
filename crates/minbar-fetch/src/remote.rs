//! Remote archive endpoints.

use std::{
    fmt,
    io::{self, Read},
    path::{Path, PathBuf},
};

use async_trait::async_trait;

/// A remote location that publishes daily archives by file name.
///
/// Implementations report absence as `Ok(None)` from [`file_size`] so that
/// callers can tell a missing archive apart from a failing transport.
///
/// [`file_size`]: RemoteStore::file_size
#[async_trait]
pub trait RemoteStore: Send + Sync + fmt::Debug {
    /// Returns the current size of `name`, or `None` if it does not exist.
    async fn file_size(&self, name: &str) -> io::Result<Option<u64>>;

    /// Opens `name` for sequential reading.
    async fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>>;

    /// Lists the archive names currently published, sorted.
    async fn list(&self) -> io::Result<Vec<String>>;

    /// Human-readable location of `name`, used in errors and logs.
    fn describe(&self, name: &str) -> String;
}

/// A remote archive directory reachable through the local filesystem,
/// such as an SSHFS or NFS mount.
#[derive(Debug, Clone)]
pub struct MountedRemote {
    root: PathBuf,
}

impl MountedRemote {
    /// Creates a remote rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the mount root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl RemoteStore for MountedRemote {
    async fn file_size(&self, name: &str) -> io::Result<Option<u64>> {
        match tokio::fs::metadata(self.root.join(name)).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        let file = tokio::fs::File::open(self.root.join(name)).await?;
        Ok(Box::new(file.into_std().await))
    }

    async fn list(&self) -> io::Result<Vec<String>> {
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".tar.gz") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn describe(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}
