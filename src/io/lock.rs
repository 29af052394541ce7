use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::board_io::BOARD_DIR;

/// Lock file inside the board directory. It is never removed: a waiter may
/// already hold a descriptor to it.
pub const LOCK_FILE: &str = ".lock";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_BACKOFF: Duration = Duration::from_millis(50);

/// Exclusive write access to a board for one load-modify-save cycle.
///
/// Backed by `flock` on `board/.lock`. The lock is released when the value
/// is dropped and its descriptor closes.
#[derive(Debug)]
pub struct BoardLock {
    _file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open board lock {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("board is locked ({path}): another sb process is writing")]
    Timeout { path: PathBuf },
    #[error("lock error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BoardLock {
    /// Lock the board rooted at `root`, waiting up to `timeout`.
    pub fn acquire(root: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = root.join(BOARD_DIR).join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        let mut backoff = Duration::from_millis(2);
        while !try_flock(&file)? {
            if Instant::now() >= deadline {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(backoff);
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
        tracing::debug!(path = %path.display(), "board locked");
        Ok(BoardLock { _file: file, path })
    }

    pub fn acquire_default(root: &Path) -> Result<Self, LockError> {
        Self::acquire(root, DEFAULT_TIMEOUT)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Non-blocking exclusive flock. `Ok(false)` when someone else holds it.
#[cfg(unix)]
fn try_flock(file: &File) -> std::io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(code) if code == libc::EWOULDBLOCK || code == libc::EINTR => Ok(false),
        _ => Err(err),
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> std::io::Result<bool> {
    // No advisory locking off Unix
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::mpsc;
    use std::thread;
    use tempfile::TempDir;

    fn board_root(tmp: &TempDir) -> PathBuf {
        fs::create_dir_all(tmp.path().join(BOARD_DIR)).unwrap();
        tmp.path().to_path_buf()
    }

    #[test]
    fn lock_file_outlives_the_lock() {
        let tmp = TempDir::new().unwrap();
        let root = board_root(&tmp);

        let lock = BoardLock::acquire_default(&root).unwrap();
        let path = lock.path().to_path_buf();
        assert_eq!(path, root.join("board/.lock"));
        drop(lock);
        assert!(path.exists());

        assert!(BoardLock::acquire(&root, Duration::from_millis(100)).is_ok());
    }

    #[test]
    fn second_writer_times_out() {
        let tmp = TempDir::new().unwrap();
        let root = board_root(&tmp);

        let _held = BoardLock::acquire_default(&root).unwrap();
        let err = BoardLock::acquire(&root, Duration::from_millis(50)).err();
        assert!(matches!(err, Some(LockError::Timeout { .. })));
    }

    #[test]
    fn late_arrival_waits_for_handed_over_lock() {
        let tmp = TempDir::new().unwrap();
        let root = board_root(&tmp);
        let first = BoardLock::acquire_default(&root).unwrap();

        let (acquired_tx, acquired_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let waiter = {
            let root = root.clone();
            thread::spawn(move || {
                let _lock = BoardLock::acquire(&root, Duration::from_secs(5)).unwrap();
                acquired_tx.send(()).unwrap();
                release_rx.recv().unwrap();
            })
        };

        // let the waiter open the lock file and start polling
        thread::sleep(Duration::from_millis(50));
        drop(first);
        acquired_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        // a third writer arriving now must see the waiter's lock
        let third = BoardLock::acquire(&root, Duration::from_millis(50));
        assert!(matches!(third.err(), Some(LockError::Timeout { .. })));

        release_tx.send(()).unwrap();
        waiter.join().unwrap();
        assert!(BoardLock::acquire(&root, Duration::from_millis(500)).is_ok());
    }

    #[test]
    fn missing_board_dir_is_a_create_error() {
        let tmp = TempDir::new().unwrap();
        let err = BoardLock::acquire_default(tmp.path()).err();
        assert!(matches!(err, Some(LockError::CreateError { .. })));
    }
}
