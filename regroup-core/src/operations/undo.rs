use crate::config::DefaultsConfig;
use crate::notify::Notifier;
use crate::output::{UndoDirReport, UndoResult};
use crate::undo::{undo_in_dir, DirUndo};
use crate::walk::{dirs_to_process, load_ignore_list};
use anyhow::Result;
use std::path::PathBuf;

/// Settings for an undo run
#[derive(Debug, Clone)]
pub struct UndoOptions {
    pub start_dir: PathBuf,
    pub recursive: bool,
    pub history_file: String,
    /// Keep replayed logs as `u_<name>` instead of deleting them
    pub keep_history: bool,
    /// Ignore list, relative to `start_dir` unless absolute
    pub ignore_file: PathBuf,
}

impl UndoOptions {
    pub fn from_defaults(defaults: &DefaultsConfig, start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
            recursive: false,
            history_file: defaults.history_file.clone(),
            keep_history: defaults.keep_history,
            ignore_file: PathBuf::from(&defaults.ignore_file),
        }
    }
}

impl Default for UndoOptions {
    fn default() -> Self {
        Self::from_defaults(&DefaultsConfig::default(), ".")
    }
}

/// Undo operation - reverses the latest batch in every directory visited
pub fn undo_operation(options: &UndoOptions, notifier: &Notifier) -> Result<UndoResult> {
    let prune = load_ignore_list(&options.start_dir.join(&options.ignore_file));
    let dirs = dirs_to_process(&options.start_dir, &prune, options.recursive)?;

    let mut directories = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let report = match undo_in_dir(&dir, &options.history_file, options.keep_history, notifier)
        {
            Ok(undo) => UndoDirReport {
                path: dir,
                undo,
                error: None,
            },
            Err(e) => {
                notifier.problem(format!("skipping {}: {e:#}", dir.display()));
                UndoDirReport {
                    path: dir,
                    undo: DirUndo::default(),
                    error: Some(format!("{e:#}")),
                }
            },
        };
        directories.push(report);
    }

    Ok(UndoResult {
        dry_run: notifier.is_dry_run(),
        directories,
        problems: notifier.problem_count(),
    })
}
