//! File I/O utilities
//!
//! Provides the save-file copy primitive shared by backup and restore, plus
//! safe JSON reads and atomic writes for metadata and settings.

use std::fs::{self, File, FileTimes};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::AtssError;

/// Copy a file, carrying over its modification time
///
/// The destination is created or truncated. Access and modification times of
/// the copy are both set to the source's modification time.
pub fn copy_file<P, Q>(src: P, dst: Q) -> Result<(), AtssError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (src, dst) = (src.as_ref(), dst.as_ref());

    let modified = fs::metadata(src)
        .and_then(|meta| meta.modified())
        .map_err(|e| {
            AtssError::Io(format!("Failed to stat source file '{}': {}", src.display(), e))
        })?;

    let mut input = File::open(src).map_err(|e| {
        AtssError::Io(format!("Failed to open source file '{}': {}", src.display(), e))
    })?;
    let mut output = File::create(dst).map_err(|e| {
        AtssError::Io(format!(
            "Failed to create destination file '{}': {}",
            dst.display(),
            e
        ))
    })?;

    io::copy(&mut input, &mut output).map_err(|e| {
        AtssError::Io(format!(
            "Failed to copy data from '{}' to '{}': {}",
            src.display(),
            dst.display(),
            e
        ))
    })?;

    output
        .set_times(FileTimes::new().set_accessed(modified).set_modified(modified))
        .map_err(|e| {
            AtssError::Io(format!(
                "Failed to copy modification time from '{}' to '{}': {}",
                src.display(),
                dst.display(),
                e
            ))
        })?;

    Ok(())
}

/// Read JSON from a file, returning an error if file doesn't exist
pub fn read_json_required<T, P>(path: P) -> Result<T, AtssError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let file = File::open(path)
        .map_err(|e| AtssError::Io(format!("Failed to open '{}': {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| AtssError::Json(format!("Failed to parse '{}': {}", path.display(), e)))
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<(), AtssError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AtssError::Io(format!(
                "Failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file in the same directory, so the rename stays on one filesystem
    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let file = File::create(&temp_path)
        .map_err(|e| AtssError::Io(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .and_then(|_| writer.flush())
        .map_err(|e| AtssError::Io(format!("Failed to write '{}': {}", path.display(), e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| AtssError::Io(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        AtssError::Io(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Serialize `data` as pretty JSON and write it atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), AtssError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let encoded = serde_json::to_vec_pretty(data)
        .map_err(|e| AtssError::Json(format!("Failed to serialize data: {}", e)))?;
    write_atomic(path, &encoded)
}
