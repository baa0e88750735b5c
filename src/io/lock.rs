use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_FILE: &str = ".lock";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Advisory lock held by a `qt` process while it rewrites tracker state.
///
/// The lock file stays in place between runs and records the pid of the
/// last holder. flock on Unix; a no-op elsewhere.
pub struct FileLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another qt process{} may be writing", holder_suffix(.holder))]
    Timeout { path: PathBuf, holder: Option<u32> },
}

fn holder_suffix(holder: &Option<u32>) -> String {
    holder.map(|pid| format!(" (pid {})", pid)).unwrap_or_default()
}

impl FileLock {
    /// Lock the tracker directory, polling until `timeout` runs out.
    pub fn acquire(tracker_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = tracker_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        while !try_lock(&file) {
            if Instant::now() >= deadline {
                return Err(LockError::Timeout {
                    holder: read_holder(&path),
                    path,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }

        record_holder(&file);
        tracing::trace!(path = %path.display(), "lock acquired");
        Ok(FileLock { _file: file })
    }

    /// Acquire with the default 5 second timeout
    pub fn acquire_default(tracker_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(tracker_dir, Duration::from_secs(5))
    }
}

/// Overwrite the lock file with our pid. Best effort: the lock itself is
/// the flock, not the file content.
fn record_holder(mut file: &File) {
    let written = file
        .set_len(0)
        .and_then(|()| write!(file, "{}", std::process::id()))
        .and_then(|()| file.flush());
    if let Err(e) = written {
        tracing::debug!(error = %e, "could not record lock holder");
    }
}

fn read_holder(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Non-blocking exclusive flock; released when the handle closes
#[cfg(unix)]
fn try_lock(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> bool {
    true
}
