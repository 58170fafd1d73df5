use crate::journal::{conflict_token, read_log, LogRecord};
use crate::names::list_files;
use crate::notify::Notifier;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Counts from undoing the latest batch in one directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirUndo {
    /// Log that was replayed, `None` when the directory had none
    pub log_file: Option<String>,
    /// Files put back under their earlier name
    pub restored: usize,
    /// Files put back under a suffixed name because the earlier name was taken
    pub conflicts: usize,
    /// Entries whose current file was missing
    pub missing: usize,
    /// Records that could not be read as a rename
    pub malformed: usize,
    /// Name the log was kept under
    pub archived_as: Option<String>,
}

/// Pick the log to undo among `names`.
///
/// Candidates share the extension of `history_root` and have a stem that
/// starts with its stem. Timestamps sort chronologically, so the last stem
/// in order is the newest batch.
pub fn find_history_file<S: AsRef<str>>(history_root: &str, names: &[S]) -> Option<String> {
    let root = Path::new(history_root);
    let root_stem = root.file_stem()?.to_str()?;
    let root_ext = root.extension();

    names
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|name| {
            let path = Path::new(name);
            let stem = path.file_stem()?.to_str()?;
            (stem.starts_with(root_stem) && path.extension() == root_ext)
                .then(|| (stem.to_string(), name.to_string()))
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, name)| name)
}

/// Undo the most recent batch applied to `dir`.
///
/// Entries are replayed newest first, each moving `to` back to `from`,
/// until the header is reached. A restore whose name is taken gets
/// `__<token>` appended, the token coming from the log's name. Afterwards
/// the log is removed, or renamed to `u_<log>` when `keep_history` is set.
/// A dry run reports what would happen and changes nothing.
pub fn undo_in_dir(
    dir: &Path,
    history_root: &str,
    keep_history: bool,
    notifier: &Notifier,
) -> Result<DirUndo> {
    let names = list_files(dir)?;
    let Some(log_name) = find_history_file(history_root, &names) else {
        notifier.dir(format!("no history file in {}", dir.display()));
        return Ok(DirUndo::default());
    };

    let log_path = dir.join(&log_name);
    notifier.dir(format!("undoing {}", log_path.display()));

    let token = conflict_token(&log_name);
    let records = read_log(&log_path)?;
    let mut result = DirUndo {
        log_file: Some(log_name.clone()),
        ..DirUndo::default()
    };

    for record in records.iter().rev() {
        match record {
            LogRecord::Header { .. } => break,
            LogRecord::Malformed(line) => {
                notifier.problem(format!(
                    "unreadable record in {}: {line}",
                    log_path.display()
                ));
                result.malformed += 1;
            },
            LogRecord::Entry { from, to } => match restore(dir, to, from, &token, notifier) {
                Restore::Done => result.restored += 1,
                Restore::Suffixed => {
                    result.restored += 1;
                    result.conflicts += 1;
                },
                Restore::Missing => result.missing += 1,
                Restore::Failed => {},
            },
        }
    }

    if !notifier.is_dry_run() {
        if keep_history {
            let archived = format!("u_{log_name}");
            fs::rename(&log_path, dir.join(&archived))
                .with_context(|| format!("Failed to archive {}", log_path.display()))?;
            result.archived_as = Some(archived);
        } else {
            fs::remove_file(&log_path)
                .with_context(|| format!("Failed to remove {}", log_path.display()))?;
        }
    }

    Ok(result)
}

enum Restore {
    Done,
    Suffixed,
    Missing,
    Failed,
}

fn restore(dir: &Path, current: &str, original: &str, token: &str, notifier: &Notifier) -> Restore {
    let current_path = dir.join(current);
    if !current_path.exists() {
        notifier.problem(format!(
            "file to revert does not exist: {}",
            current_path.display()
        ));
        return Restore::Missing;
    }

    let mut target = original.to_string();
    let mut outcome = Restore::Done;
    if dir.join(&target).exists() {
        target = format!("{original}__{token}");
        outcome = Restore::Suffixed;
        if dir.join(&target).exists() {
            notifier.problem(format!(
                "cannot revert {current}: both {original} and {target} exist"
            ));
            return Restore::Failed;
        }
        notifier.problem(format!("{original} exists, reverting {current} to {target}"));
    }

    notifier.file(format!("reverting: {current} to {target}"));
    if !notifier.is_dry_run() {
        if let Err(e) = fs::rename(&current_path, dir.join(&target)) {
            notifier.problem(format!(
                "failed to revert {} to {target}: {e}",
                current_path.display()
            ));
            return Restore::Failed;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name).unwrap();
    }

    #[test]
    fn test_find_history_file_picks_newest() {
        let names = [
            "rename_history__2024_03_01_00_00_00.csv",
            "a_10.jpg",
            "rename_history__2024_03_02_00_00_00.csv",
            "rename_history__2024_03_02_00_00_00.txt",
        ];
        assert_eq!(
            find_history_file("rename_history.csv", &names).as_deref(),
            Some("rename_history__2024_03_02_00_00_00.csv")
        );
    }

    #[test]
    fn test_find_history_file_matches_stem_prefix_and_extension() {
        let names = [
            "HF.csv",
            "HF1.jpg",
            "foo.csv",
            "HF_2021_05_01.csv",
            "HF_2021_05_02.csv",
        ];
        assert_eq!(
            find_history_file("HF.csv", &names).as_deref(),
            Some("HF_2021_05_02.csv")
        );
    }

    #[test]
    fn test_find_history_file_none() {
        let names = ["a_10.jpg", "u_rename_history__2024.csv"];
        assert_eq!(find_history_file("rename_history.csv", &names), None);
    }

    #[test]
    fn test_undo_replays_in_reverse() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        // a -> b then b -> c; only reverse order restores `a`
        touch(dir, "c.jpg");
        fs::write(
            dir.join("rename_history__2024_01_01_00_00_00.csv"),
            "from, to, 2024_01_01_00_00_00\na.jpg,b.jpg\nb.jpg,c.jpg\n",
        )
        .unwrap();

        let notifier = Notifier::capturing(3, false);
        let result = undo_in_dir(dir, "rename_history.csv", false, &notifier).unwrap();

        assert_eq!(result.restored, 2);
        assert!(dir.join("a.jpg").exists());
        assert!(!dir.join("c.jpg").exists());
        assert!(!dir.join("rename_history__2024_01_01_00_00_00.csv").exists());
    }

    #[test]
    fn test_undo_stops_at_header() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "y.jpg");
        touch(dir, "z.jpg");
        fs::write(
            dir.join("rename_history__2024_01_01_00_00_00.csv"),
            "from, to, 2024_01_01_00_00_00\nx.jpg,y.jpg\nfrom, to, 2024_01_01_00_00_00\nw.jpg,z.jpg\n",
        )
        .unwrap();

        let notifier = Notifier::capturing(0, false);
        let result = undo_in_dir(dir, "rename_history.csv", false, &notifier).unwrap();

        assert_eq!(result.restored, 1);
        assert!(dir.join("w.jpg").exists());
        assert!(dir.join("y.jpg").exists());
    }

    #[test]
    fn test_conflicting_restore_gets_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "i0010.jpg");
        touch(dir, "a_10.jpg");
        fs::write(
            dir.join("rename_history__2024_01_01_00_00_00.csv"),
            "from, to, 2024_01_01_00_00_00\na_10.jpg,i0010.jpg\n",
        )
        .unwrap();

        let notifier = Notifier::capturing(1, false);
        let result = undo_in_dir(dir, "rename_history.csv", false, &notifier).unwrap();

        assert_eq!(result.conflicts, 1);
        assert_eq!(fs::read_to_string(dir.join("a_10.jpg")).unwrap(), "a_10.jpg");
        assert_eq!(
            fs::read_to_string(dir.join("a_10.jpg__2024_01_01_00_00_00.csv")).unwrap(),
            "i0010.jpg"
        );
        assert_eq!(notifier.problem_count(), 1);
    }

    #[test]
    fn test_missing_and_malformed_are_reported() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "i0020.jpg");
        fs::write(
            dir.join("rename_history__2024_01_01_00_00_00.csv"),
            "from, to, 2024_01_01_00_00_00\na_10.jpg,i0010.jpg\nlonely\nb_20.jpg,i0020.jpg\n",
        )
        .unwrap();

        let notifier = Notifier::capturing(1, false);
        let result = undo_in_dir(dir, "rename_history.csv", false, &notifier).unwrap();

        assert_eq!(result.restored, 1);
        assert_eq!(result.missing, 1);
        assert_eq!(result.malformed, 1);
        assert_eq!(notifier.messages_at(Level::Problem).len(), 2);
        assert!(dir.join("b_20.jpg").exists());
    }

    #[test]
    fn test_keep_history_archives_log() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "i0010.jpg");
        fs::write(
            dir.join("rename_history__2024_01_01_00_00_00.csv"),
            "from, to, 2024_01_01_00_00_00\na_10.jpg,i0010.jpg\n",
        )
        .unwrap();

        let notifier = Notifier::capturing(0, false);
        let result = undo_in_dir(dir, "rename_history.csv", true, &notifier).unwrap();

        assert_eq!(
            result.archived_as.as_deref(),
            Some("u_rename_history__2024_01_01_00_00_00.csv")
        );
        assert!(dir.join("u_rename_history__2024_01_01_00_00_00.csv").exists());
        assert!(dir.join("a_10.jpg").exists());
    }

    #[test]
    fn test_dry_run_undo_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "i0010.jpg");
        fs::write(
            dir.join("rename_history__2024_01_01_00_00_00.csv"),
            "from, to, 2024_01_01_00_00_00\na_10.jpg,i0010.jpg\n",
        )
        .unwrap();

        let notifier = Notifier::capturing(3, true);
        let result = undo_in_dir(dir, "rename_history.csv", false, &notifier).unwrap();

        assert_eq!(result.restored, 1);
        assert!(dir.join("i0010.jpg").exists());
        assert!(dir.join("rename_history__2024_01_01_00_00_00.csv").exists());
    }

    #[test]
    fn test_no_history_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a_10.jpg");

        let notifier = Notifier::capturing(2, false);
        let result = undo_in_dir(temp_dir.path(), "rename_history.csv", false, &notifier).unwrap();
        assert_eq!(result, DirUndo::default());
    }
}
