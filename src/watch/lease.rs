//! Exclusive lock file held while the auto-backup loop runs

use std::fs::{File, TryLockError};
use std::path::{Path, PathBuf};

use crate::error::{AtssError, AtssResult};

/// Exclusive lock on a lock file, released on drop
#[derive(Debug)]
pub struct SingletonLease {
    file: File,
    path: PathBuf,
}

impl SingletonLease {
    /// Lock `path` without blocking
    ///
    /// Fails with [`AtssError::AlreadyRunning`] when another holder has it.
    pub fn acquire(path: impl AsRef<Path>) -> AtssResult<Self> {
        let path = path.as_ref();
        let file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| {
                AtssError::Io(format!("Failed to open lock file '{}': {}", path.display(), e))
            })?;

        match file.try_lock() {
            Ok(()) => Ok(Self {
                file,
                path: path.to_path_buf(),
            }),
            Err(TryLockError::WouldBlock) => {
                Err(AtssError::AlreadyRunning(path.display().to_string()))
            }
            Err(TryLockError::Error(e)) => Err(AtssError::Io(format!(
                "Failed to lock '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SingletonLease {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::error!("failed unlocking '{}': {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_refused() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".autobackup.lock");

        let lease = SingletonLease::acquire(&path).unwrap();
        assert_eq!(lease.path(), path);

        let err = SingletonLease::acquire(&path).unwrap_err();
        assert!(matches!(err, AtssError::AlreadyRunning(_)));
        assert!(err.is_safety_refusal());
    }

    #[test]
    fn test_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".autobackup.lock");

        drop(SingletonLease::acquire(&path).unwrap());
        assert!(SingletonLease::acquire(&path).is_ok());
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope").join(".autobackup.lock");

        assert!(matches!(
            SingletonLease::acquire(path),
            Err(AtssError::Io(_))
        ));
    }
}
