use crate::apply::apply_batch;
use crate::config::DefaultsConfig;
use crate::error::RegroupError;
use crate::identifier::IdPattern;
use crate::journal::timestamp_now;
use crate::names::{exact_name_pattern, fetch_lists, prefix_pattern, reconcile, ReconcileOptions};
use crate::notify::Notifier;
use crate::output::{DirStatus, DirectoryReport, RenameResult};
use crate::plan::{plan_renames, NamingOptions};
use crate::walk::{dirs_to_process, load_ignore_list};
use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Settings for a rename run
#[derive(Debug, Clone)]
pub struct RenameOptions {
    pub start_dir: PathBuf,
    pub recursive: bool,
    pub order_file: String,
    pub history_file: String,
    pub id_regex: String,
    /// Target prefix; "." means the directory's own name plus "_"
    pub prefix: String,
    pub id_prefix: String,
    pub id_start: u64,
    pub id_step: u64,
    pub id_width: usize,
    /// When false, numbering continues from one directory to the next
    pub restart_ids_per_dir: bool,
    pub skip_if_no_order_file: bool,
    pub adapt_case: bool,
    /// Ignore list, relative to `start_dir` unless absolute
    pub ignore_file: PathBuf,
}

impl RenameOptions {
    pub fn from_defaults(defaults: &DefaultsConfig, start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
            recursive: false,
            order_file: defaults.order_file.clone(),
            history_file: defaults.history_file.clone(),
            id_regex: defaults.id_regex.clone(),
            prefix: defaults.prefix.clone(),
            id_prefix: defaults.id_prefix.clone(),
            id_start: defaults.id_start,
            id_step: defaults.id_step,
            id_width: defaults.id_width,
            restart_ids_per_dir: defaults.restart_ids_per_dir,
            skip_if_no_order_file: defaults.skip_if_no_order_file,
            adapt_case: defaults.adapt_case,
            ignore_file: PathBuf::from(&defaults.ignore_file),
        }
    }
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self::from_defaults(&DefaultsConfig::default(), ".")
    }
}

/// Rename operation - returns structured data.
///
/// The identifier pattern, id step and start directory are checked before anything
/// is touched. Each directory is then handled on its own: an error there is
/// reported as a problem, the directory is marked failed and the run moves
/// on.
pub fn rename_operation(options: &RenameOptions, notifier: &Notifier) -> Result<RenameResult> {
    let pattern = IdPattern::new(&options.id_regex)?;
    if options.id_step == 0 {
        return Err(RegroupError::ZeroIdStep.into());
    }
    let prune = load_ignore_list(&options.start_dir.join(&options.ignore_file));
    let dirs = dirs_to_process(&options.start_dir, &prune, options.recursive)?;

    let mut directories = Vec::with_capacity(dirs.len());
    let mut next_start = options.id_start;

    for dir in dirs {
        let id_start = if options.restart_ids_per_dir {
            options.id_start
        } else {
            next_start
        };

        match rename_directory(&dir, id_start, options, &pattern, notifier) {
            Ok((report, last_id)) => {
                if report.renamed > 0 {
                    if let Some(last_id) = last_id {
                        next_start = last_id.saturating_add(options.id_step);
                    }
                }
                directories.push(report);
            },
            Err(e) => {
                notifier.problem(format!("skipping {}: {e:#}", dir.display()));
                directories
                    .push(DirectoryReport::new(dir, DirStatus::Failed).with_message(format!("{e:#}")));
            },
        }
    }

    Ok(RenameResult {
        dry_run: notifier.is_dry_run(),
        directories,
        problems: notifier.problem_count(),
    })
}

fn rename_directory(
    dir: &Path,
    id_start: u64,
    options: &RenameOptions,
    pattern: &IdPattern,
    notifier: &Notifier,
) -> Result<(DirectoryReport, Option<u64>)> {
    let listing = fetch_lists(dir, &options.order_file, options.adapt_case)
        .with_context(|| format!("Failed to read {}", dir.display()))?;

    if listing.order_file.is_none() && options.skip_if_no_order_file {
        let message = format!("no ordering file {}", options.order_file);
        notifier.dir(format!("skipping {}: {message}", dir.display()));
        return Ok((
            DirectoryReport::new(dir.to_path_buf(), DirStatus::Skipped).with_message(message),
            None,
        ));
    }

    let reconcile_options = ReconcileOptions {
        exclude: default_exclusions(options, listing.order_file.as_deref()),
        must_match: Some(pattern.regex().clone()),
        adapt_case: options.adapt_case,
    };
    let candidates = reconcile(&listing.initial_order(), &listing.files, &reconcile_options);

    let naming = NamingOptions {
        target_prefix: target_prefix(&options.prefix, dir),
        id_prefix: options.id_prefix.clone(),
        start: id_start,
        step: options.id_step,
        width: options.id_width,
    };
    let plan = plan_renames(&candidates, pattern, &naming);

    if plan.is_empty() {
        notifier.dir(format!("nothing to rename in {}", dir.display()));
        return Ok((DirectoryReport::new(dir.to_path_buf(), DirStatus::Unchanged), None));
    }

    notifier.dir(format!(
        "{} file(s) in {} group(s) to rename in {}",
        plan.len(),
        plan.groups,
        dir.display()
    ));

    let outcome = apply_batch(
        dir,
        &plan,
        listing.order_file.as_deref(),
        &options.history_file,
        &timestamp_now(),
        notifier,
    )?;

    let status = if outcome.used.is_empty() {
        DirStatus::Unchanged
    } else {
        DirStatus::Renamed
    };
    let report = DirectoryReport {
        renamed: outcome.used.len(),
        log_file: outcome.log_file,
        planned: plan.entries,
        ..DirectoryReport::new(dir.to_path_buf(), status)
    };
    Ok((report, plan.last_id))
}

/// Names the rename run must never touch: the ordering file, its archives,
/// transaction logs current and undone, and the ignore list
fn default_exclusions(options: &RenameOptions, loaded_order_file: Option<&str>) -> Vec<Regex> {
    let mut patterns = vec![
        exact_name_pattern(&options.order_file),
        prefix_pattern(&format!("{}__", file_stem(&options.order_file))),
        exact_name_pattern(".gitignore"),
    ];

    if let Some(loaded) = loaded_order_file.filter(|l| *l != options.order_file) {
        patterns.push(exact_name_pattern(loaded));
        patterns.push(prefix_pattern(&format!("{}__", file_stem(loaded))));
    }

    let history_stem = file_stem(&options.history_file);
    patterns.push(prefix_pattern(history_stem));
    patterns.push(prefix_pattern(&format!("u_{history_stem}")));

    if let Some(ignore_name) = options.ignore_file.file_name().and_then(|n| n.to_str()) {
        patterns.push(exact_name_pattern(ignore_name));
    }

    patterns
}

fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

fn target_prefix(prefix: &str, dir: &Path) -> String {
    if prefix != "." {
        return prefix.to_string();
    }
    dir.file_name()
        .map(|name| format!("{}_", name.to_string_lossy()))
        .unwrap_or_default()
}
