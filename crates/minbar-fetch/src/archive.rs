//! Gzip + tar unpacking of a daily archive.

use std::io::{BufReader, Read};

use flate2::read::GzDecoder;
use minbar_types::MinbarError;
use tracing::debug;

use crate::decode::TickReader;

const XML_BUFFER_SIZE: usize = 1 << 20;

/// Unpacks a `.tar.gz` stream and hands a tick iterator over its first
/// regular file to `consume`.
///
/// The archive is read incrementally; the XML member is never materialized.
///
/// # Errors
///
/// Returns [`MinbarError::Archive`] if the stream is not a readable tar.gz
/// or has no file member, and whatever `consume` returns otherwise.
pub fn with_archive_ticks<R, T, F>(source: R, consume: F) -> Result<T, MinbarError>
where
    R: Read,
    F: for<'a> FnOnce(
        TickReader<BufReader<tar::Entry<'a, GzDecoder<R>>>>,
    ) -> Result<T, MinbarError>,
{
    let mut archive = tar::Archive::new(GzDecoder::new(source));
    let mut entries = archive.entries().map_err(archive_error)?;

    let entry = loop {
        match entries.next() {
            Some(entry) => {
                let entry = entry.map_err(archive_error)?;
                if entry.header().entry_type().is_file() {
                    break entry;
                }
            }
            None => return Err(MinbarError::Archive("archive has no files".to_string())),
        }
    };

    if let Ok(path) = entry.path() {
        debug!(
            member = %path.display(),
            size = entry.size(),
            "Decoding archive member"
        );
    }

    let reader = BufReader::with_capacity(XML_BUFFER_SIZE, entry);
    consume(TickReader::new(reader))
}

fn archive_error(err: std::io::Error) -> MinbarError {
    MinbarError::Archive(err.to_string())
}
