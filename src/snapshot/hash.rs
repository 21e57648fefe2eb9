//! Content hashing of snapshots

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::find_save_files;
use crate::error::{AtssError, AtssResult};

/// Hash every save file in `dir` with one SHA-256 hasher
///
/// Files are fed in path order, each followed by a NUL separator byte so that
/// moving bytes across a file boundary changes the digest.
pub fn hash_snapshot(dir: &Path) -> AtssResult<String> {
    let files = find_save_files(dir)?;

    let mut hasher = Sha256::new();
    for path in &files {
        let mut file = File::open(path).map_err(|e| {
            AtssError::Io(format!("Failed to read save file '{}': {}", path.display(), e))
        })?;
        io::copy(&mut file, &mut hasher).map_err(|e| {
            AtssError::Io(format!("Failed to read save file '{}': {}", path.display(), e))
        })?;
        hasher.update([0u8]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
