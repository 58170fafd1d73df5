use crate::journal::{log_file_name, TransactionLog};
use crate::notify::Notifier;
use crate::plan::{tagged_name, RenamePlan};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

/// What happened when a plan was applied to one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Target names that were used, or would be used on a dry run
    pub used: Vec<String>,
    /// Name of the transaction log left behind, if any
    pub log_file: Option<String>,
    /// Name the ordering file was archived under, if it was archived
    pub archived_order_file: Option<String>,
    /// True when nothing was renamed and the log and archive were undone
    pub rolled_back: bool,
}

/// Apply each entry of `plan` inside `dir`, in order.
///
/// An entry is skipped with a reported problem when its target already
/// exists or its source has gone missing. With a log every rename is
/// performed and recorded; without one (a dry run) the entries are only
/// reported. A failed rename is reported and the batch carries on.
pub fn execute_plan(
    dir: &Path,
    plan: &RenamePlan,
    mut log: Option<&mut TransactionLog>,
    notifier: &Notifier,
) -> Vec<String> {
    let mut used = Vec::new();

    for entry in &plan.entries {
        let from_path = dir.join(&entry.from);
        let to_path = dir.join(&entry.to);

        if to_path.is_file() {
            notifier.problem(format!(
                "skipping {}: target already exists: {}",
                entry.from,
                to_path.display()
            ));
            continue;
        }
        if !from_path.exists() {
            notifier.problem(format!(
                "skipping {}: file is missing",
                from_path.display()
            ));
            continue;
        }

        notifier.file(format!("renaming: {} to {}", entry.from, entry.to));

        if let Some(log) = log.as_deref_mut() {
            if let Err(e) = fs::rename(&from_path, &to_path) {
                notifier.problem(format!(
                    "failed to rename {} to {}: {e}",
                    from_path.display(),
                    entry.to
                ));
                continue;
            }
            if let Err(e) = log.record(&entry.from, &entry.to) {
                notifier.problem(format!(
                    "renamed {} to {} but could not record it: {e}",
                    entry.from, entry.to
                ));
            }
        }

        used.push(entry.to.clone());
    }

    notifier.dir(format!(
        "{} file(s) {} in {}",
        used.len(),
        if notifier.is_dry_run() {
            "would be renamed"
        } else {
            "renamed"
        },
        dir.display()
    ));

    used
}

/// Apply `plan` to `dir` as one batch.
///
/// On a real run the transaction log `<history stem>__<timestamp><ext>` is
/// opened first, the ordering file (when one was read) is archived as the
/// log's first entry, and then the plan runs. A batch that renames nothing
/// removes its log and puts the ordering file back. A dry run touches
/// nothing on disk.
pub fn apply_batch(
    dir: &Path,
    plan: &RenamePlan,
    order_file: Option<&str>,
    history_root: &str,
    timestamp: &str,
    notifier: &Notifier,
) -> Result<BatchOutcome> {
    if notifier.is_dry_run() {
        return Ok(BatchOutcome {
            used: execute_plan(dir, plan, None, notifier),
            ..BatchOutcome::default()
        });
    }

    let log_name = log_file_name(history_root, timestamp);
    let log_path = dir.join(&log_name);
    if log_path.exists() {
        return Err(anyhow!(
            "history log {} already exists",
            log_path.display()
        ));
    }

    let mut log = TransactionLog::create(&log_path, timestamp)?;

    let archived = match order_file {
        Some(order) => match archive_order_file(dir, order, timestamp, &mut log) {
            Ok(archived) => Some((order, archived)),
            Err(e) => {
                discard_log(log);
                return Err(e);
            },
        },
        None => None,
    };

    let used = execute_plan(dir, plan, Some(&mut log), notifier);

    if used.is_empty() {
        notifier.dir(format!(
            "nothing renamed in {}, removing {log_name}",
            dir.display()
        ));
        log.discard()
            .with_context(|| format!("Failed to remove {}", log_path.display()))?;
        if let Some((order, archived)) = &archived {
            fs::rename(dir.join(archived), dir.join(order)).with_context(|| {
                format!("Failed to restore ordering file {order} in {}", dir.display())
            })?;
        }
        return Ok(BatchOutcome {
            rolled_back: true,
            ..BatchOutcome::default()
        });
    }

    Ok(BatchOutcome {
        used,
        log_file: Some(log_name),
        archived_order_file: archived.map(|(_, archived)| archived),
        rolled_back: false,
    })
}

fn archive_order_file(
    dir: &Path,
    order: &str,
    timestamp: &str,
    log: &mut TransactionLog,
) -> Result<String> {
    let archived = tagged_name(order, timestamp);
    let from = dir.join(order);
    let to = dir.join(&archived);

    if to.exists() {
        return Err(anyhow!("archive {} already exists", to.display()));
    }
    fs::rename(&from, &to)
        .with_context(|| format!("Failed to archive ordering file {}", from.display()))?;

    if let Err(e) = log.record(order, &archived) {
        // Without the log entry undo could never bring it back
        put_back(&to, &from);
        return Err(e.into());
    }
    Ok(archived)
}

/// Move an archived ordering file back, warning when that is not possible
fn put_back(archived: &Path, original: &Path) -> bool {
    match fs::rename(archived, original) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                "could not restore {} from {}: {e}",
                original.display(),
                archived.display()
            );
            false
        },
    }
}

fn discard_log(log: TransactionLog) {
    let path = log.path().to_path_buf();
    if let Err(e) = log.discard() {
        tracing::warn!("could not remove {}: {e}", path.display());
    }
}
