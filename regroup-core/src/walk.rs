use crate::error::RegroupError;
use crate::names::load_lines;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names listed in an ignore file, one per line.
///
/// A missing or unreadable file means nothing is pruned.
pub fn load_ignore_list(path: &Path) -> HashSet<String> {
    if !path.is_file() {
        return HashSet::new();
    }
    match load_lines(path) {
        Ok(lines) => lines.into_iter().filter(|l| !l.is_empty()).collect(),
        Err(e) => {
            tracing::warn!("ignoring unreadable ignore list: {e:#}");
            HashSet::new()
        },
    }
}

/// Directories to process, starting with `start` itself.
///
/// When `recursive`, every subdirectory follows in walk order, except those
/// whose name is in `prune`; a pruned directory's descendants are skipped
/// too. Symlinked directories are not followed.
pub fn dirs_to_process(
    start: &Path,
    prune: &HashSet<String>,
    recursive: bool,
) -> Result<Vec<PathBuf>, RegroupError> {
    if !start.is_dir() {
        return Err(RegroupError::StartDirNotFound(start.to_path_buf()));
    }
    let start = start
        .canonicalize()
        .map_err(|_| RegroupError::StartDirNotFound(start.to_path_buf()))?;

    let mut dirs = vec![start.clone()];
    if !recursive {
        return Ok(dirs);
    }

    let walker = WalkDir::new(&start)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(e.file_type().is_dir()
                    && e.file_name().to_str().is_some_and(|n| prune.contains(n)))
        });

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
            Ok(_) => {},
            Err(e) => tracing::debug!("skipping unreadable entry: {e}"),
        }
    }

    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(dirs: &[PathBuf], root: &Path) -> Vec<String> {
        let root = root.canonicalize().unwrap();
        dirs.iter()
            .map(|d| {
                d.strip_prefix(&root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_non_recursive_is_start_only() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let dirs = dirs_to_process(temp_dir.path(), &HashSet::new(), false).unwrap();
        assert_eq!(names(&dirs, temp_dir.path()), vec![""]);
    }

    #[test]
    fn test_recursive_prunes_named_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/deep")).unwrap();
        fs::create_dir_all(root.join("skip/inner")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("a/file.txt"), "").unwrap();

        let prune: HashSet<String> = ["skip".to_string()].into_iter().collect();
        let dirs = dirs_to_process(root, &prune, true).unwrap();

        assert_eq!(names(&dirs, root), vec!["", "a", "a/deep", "b"]);
    }

    #[test]
    fn test_missing_start_dir() {
        let temp_dir = TempDir::new().unwrap();
        let err = dirs_to_process(&temp_dir.path().join("nope"), &HashSet::new(), true).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_load_ignore_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".regroup.ignore");
        assert!(load_ignore_list(&path).is_empty());

        fs::write(&path, "thumbs\n\n  originals \n").unwrap();
        let list = load_ignore_list(&path);
        assert_eq!(list.len(), 2);
        assert!(list.contains("originals"));
    }
}
