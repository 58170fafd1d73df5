#![allow(unused)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod apply;
pub mod config;
pub mod error;
pub mod identifier;
pub mod journal;
pub mod names;
pub mod notify;
pub mod operations;
pub mod output;
pub mod plan;
pub mod undo;
pub mod walk;

pub use apply::{apply_batch, execute_plan, BatchOutcome};
pub use config::{Config, DefaultsConfig};
pub use error::RegroupError;
pub use identifier::{format_id, IdPattern, DEFAULT_ID_REGEX};
pub use journal::{read_log, timestamp_now, LogRecord, TransactionLog};
pub use names::{fetch_lists, find_case_insensitive, reconcile, Listing, ReconcileOptions};
pub use notify::{Level, Notice, Notifier};
pub use operations::{rename_operation, undo_operation, RenameOptions, UndoOptions};
pub use output::{
    DirStatus, DirectoryReport, OutputFormat, OutputFormatter, RenameResult, UndoDirReport,
    UndoResult, VersionResult,
};
pub use plan::{plan_renames, NamingOptions, PlanEntry, RenamePlan};
pub use undo::{find_history_file, undo_in_dir, DirUndo};
pub use walk::{dirs_to_process, load_ignore_list};
