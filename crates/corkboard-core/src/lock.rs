//! Advisory lock on a board directory.
//!
//! [`crate::storage::FileStorage`] holds the lock while it swaps a key file
//! into place, so two `cb` processes never interleave their renames. The
//! lock file records the pid of the current holder, which a waiting process
//! reports when it gives up.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read as _, Seek as _, SeekFrom, Write as _};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;
use tracing::{debug, warn};

/// File name of the lock inside the board directory.
pub const LOCK_FILE: &str = "lock";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum LockError {
    #[error(
        "board at {} is locked{}; gave up after {waited:?}",
        board_dir.display(),
        holder_suffix(*holder)
    )]
    Timeout {
        board_dir: PathBuf,
        waited: Duration,
        /// Pid recorded by the process holding the lock, when readable.
        holder: Option<u32>,
    },

    #[error("failed to open board lock: {0}")]
    Io(#[from] io::Error),
}

fn holder_suffix(holder: Option<u32>) -> String {
    holder.map(|pid| format!(" by pid {pid}")).unwrap_or_default()
}

/// Exclusive lock on one board directory, released on drop.
#[derive(Debug)]
pub struct BoardLock {
    file: File,
    path: PathBuf,
}

impl BoardLock {
    /// Where the lock for `board_dir` lives.
    #[must_use]
    pub fn path_in(board_dir: &Path) -> PathBuf {
        board_dir.join(LOCK_FILE)
    }

    /// Lock `board_dir`, creating it if needed and polling until `timeout`.
    ///
    /// # Errors
    ///
    /// [`LockError::Timeout`] when another process keeps the lock, or
    /// [`LockError::Io`] when the lock file cannot be opened or stamped.
    pub fn acquire(board_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        fs::create_dir_all(board_dir)?;
        let path = Self::path_in(board_dir);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        let start = Instant::now();
        while file.try_lock_exclusive().is_err() {
            if start.elapsed() >= timeout {
                let holder = read_holder(&mut file);
                warn!(board = %board_dir.display(), ?holder, "board lock busy");
                return Err(LockError::Timeout {
                    board_dir: board_dir.to_path_buf(),
                    waited: start.elapsed(),
                    holder,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }

        stamp_holder(&mut file)?;
        debug!(path = %path.display(), "board lock acquired");
        Ok(Self { file, path })
    }

    pub fn release(self) {
        drop(self);
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BoardLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn stamp_holder(file: &mut File) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    write!(file, "{}", std::process::id())?;
    file.flush()
}

fn read_holder(file: &mut File) -> Option<u32> {
    let mut raw = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut raw).ok()?;
    raw.trim().parse().ok()
}
