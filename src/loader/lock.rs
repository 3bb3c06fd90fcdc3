//! Cross-process rebuild lock.
//!
//! An advisory exclusive lock (`fs2`) on `.bootstrap.lock` in the cache
//! directory. The file itself stays in place; only the lock on it matters,
//! and the OS drops that lock when the holding process exits, so a crashed
//! rebuild never blocks the next start.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::loader::LoaderError;

pub const LOCK_FILE_NAME: &str = ".bootstrap.lock";

/// Held rebuild lock. Released on drop or when the process dies.
#[derive(Debug)]
pub struct BootstrapLock {
    file: File,
    path: PathBuf,
}

/// How a lock was obtained.
#[derive(Debug)]
pub struct Acquired {
    pub lock: BootstrapLock,
    /// True if another holder had to be waited out first.
    pub contended: bool,
}

impl BootstrapLock {
    /// Try to take the lock without blocking. `Ok(None)` means another holder has it.
    pub fn try_acquire(cache_dir: &Path) -> Result<Option<Self>, LoaderError> {
        let path = cache_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LoaderError::Lock {
                path: path.clone(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Bootstrap lock acquired");
                Ok(Some(Self { file, path }))
            }
            Err(e) if is_contended(&e) => Ok(None),
            Err(source) => Err(LoaderError::Lock { path, source }),
        }
    }

    /// Take the lock, retrying every `poll` for at most `wait`.
    pub fn acquire(cache_dir: &Path, wait: Duration, poll: Duration) -> Result<Acquired, LoaderError> {
        let started = Instant::now();
        let mut contended = false;

        loop {
            if let Some(lock) = Self::try_acquire(cache_dir)? {
                return Ok(Acquired { lock, contended });
            }
            if !contended {
                tracing::info!(path = %cache_dir.join(LOCK_FILE_NAME).display(), "Waiting for another bootstrap to finish");
                contended = true;
            }
            if started.elapsed() >= wait {
                return Err(LoaderError::LockTimeout {
                    path: cache_dir.join(LOCK_FILE_NAME),
                    waited_ms: wait.as_millis() as u64,
                });
            }
            thread::sleep(poll);
        }
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for BootstrapLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release bootstrap lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_lock_is_exclusive_and_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let lock = BootstrapLock::try_acquire(dir.path()).unwrap().unwrap();
        assert!(BootstrapLock::try_acquire(dir.path()).unwrap().is_none());

        drop(lock);
        assert!(BootstrapLock::try_acquire(dir.path()).unwrap().is_some());
    }

    #[test]
    fn test_leftover_lock_file_does_not_block() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LOCK_FILE_NAME), "left by a crashed process").unwrap();

        let acquired = BootstrapLock::acquire(dir.path(), Duration::from_millis(30), Duration::from_millis(5)).unwrap();
        assert!(!acquired.contended);
    }

    #[test]
    fn test_acquire_times_out_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let _held = BootstrapLock::try_acquire(dir.path()).unwrap().unwrap();

        let err = BootstrapLock::acquire(dir.path(), Duration::from_millis(30), Duration::from_millis(5)).unwrap_err();
        assert!(matches!(err, LoaderError::LockTimeout { waited_ms: 30, .. }));
    }

    #[test]
    fn test_acquire_waits_for_release() {
        let dir = tempfile::tempdir().unwrap();
        let held = BootstrapLock::try_acquire(dir.path()).unwrap().unwrap();

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            drop(held);
        });

        let acquired = BootstrapLock::acquire(dir.path(), Duration::from_secs(5), Duration::from_millis(5)).unwrap();
        assert!(acquired.contended);
        releaser.join().unwrap();
    }
}
