//! Storage layer for AtSS
//!
//! Provides the file copy primitive and JSON files with atomic writes.

pub mod file_io;

pub use file_io::{copy_file, read_json_required, write_atomic, write_json_atomic};
