//! Auto-backup watch loop
//!
//! - `Debouncer`: collapses bursts of save writes into one firing
//! - `SingletonLease`: keeps a second auto-backup instance from starting
//! - `AutoBackup`: the loop itself, reporting through `AutoBackupEvent`

mod auto;
mod debounce;
mod lease;

pub use auto::{AutoBackup, AutoBackupEvent};
pub use debounce::{drive, Debouncer};
pub use lease::SingletonLease;
