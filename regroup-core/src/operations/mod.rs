//! High-level operations that correspond to CLI commands
//!
//! These modules walk the directory tree and run the per-directory engine on
//! each directory, keeping a failure in one directory from affecting the rest.

pub mod rename;
pub mod undo;

pub use rename::{rename_operation, RenameOptions};
pub use undo::{undo_operation, UndoOptions};
