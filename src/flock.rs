use std::{
    fs::File,
    path::Path,
    time::{Duration, Instant},
};

use fs4::fs_std::FileExt;
use log::{debug, info};
use thiserror::Error;

const LOCK_TIMEOUT: Duration = Duration::from_secs(300);

/// Exclusive lock on a file, released when dropped.
pub struct FileLock {
    _file: File,
}

#[derive(Error, Debug)]
#[error("Cannot lock {path}: {source}")]
pub struct Error {
    path: String,
    #[source]
    source: std::io::Error,
}

impl FileLock {
    /// Blocks until the lock is acquired, giving up after five minutes of contention.
    pub fn new(path: &Path) -> Result<Self, Error> {
        let error = |source| Error {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(error)?;
        let start = Instant::now();
        let mut reported = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(_) => {
                    return Ok(Self { _file: file });
                }
                Err(source)
                    if source.raw_os_error() == fs4::lock_contended_error().raw_os_error()
                        && start.elapsed() < LOCK_TIMEOUT =>
                {
                    if !reported {
                        info!("Waiting for another run to release {}", path.display());
                        reported = true;
                    }
                    debug!("Failed to acquire a lock on {}, retrying", path.display());
                    std::thread::sleep(Duration::from_secs(1));
                }
                Err(source) => return Err(error(source)),
            }
        }
    }
}
