//! Reconciling an ordering list with what is actually in a directory.
//!
//! The ordering file is user-authored and may hold blanks, duplicates,
//! differently-cased names and names that no longer exist. Everything here
//! narrows it down to a clean candidate list whose entries are real files,
//! spelled exactly as the directory spells them.

use crate::error::RegroupError;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Remove duplicates (keeping the first occurrence) and blank entries
pub fn scrub_duplicates<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

/// Drop every name matched anywhere by any of `patterns`
pub fn remove_matching<S: AsRef<str>>(names: &[S], patterns: &[Regex]) -> Vec<String> {
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !patterns.iter().any(|rx| rx.is_match(name)))
        .map(str::to_string)
        .collect()
}

/// Keep only names matched by `must_match`; `None` keeps everything
pub fn retain_matching<S: AsRef<str>>(names: &[S], must_match: Option<&Regex>) -> Vec<String> {
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| must_match.map_or(true, |rx| rx.is_match(name)))
        .map(str::to_string)
        .collect()
}

/// Resolve each wanted name against `dir_names` ignoring case, returning the
/// directory's spelling. Unresolvable names are dropped.
///
/// An exact match wins over a case-insensitive one, so a case-sensitive
/// directory holding both `a.jpg` and `A.jpg` resolves each to itself.
pub fn find_case_insensitive<S: AsRef<str>, D: AsRef<str>>(
    wanted: &[S],
    dir_names: &[D],
) -> Vec<String> {
    let lowered: Vec<String> = dir_names
        .iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect();

    wanted
        .iter()
        .filter_map(|want| {
            let want = want.as_ref();
            if let Some(exact) = dir_names.iter().find(|name| name.as_ref() == want) {
                return Some(exact.as_ref().to_string());
            }
            let want_lower = want.to_lowercase();
            lowered
                .iter()
                .position(|name| *name == want_lower)
                .map(|idx| dir_names[idx].as_ref().to_string())
        })
        .collect()
}

/// Filters applied while reconciling
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Any match excludes a name
    pub exclude: Vec<Regex>,
    /// When set, names without a match are dropped
    pub must_match: Option<Regex>,
    /// Compare against the directory case-insensitively
    pub adapt_case: bool,
}

/// Produce the candidate list: de-duplicate, exclude, require the must-match
/// pattern, then resolve against the directory listing.
pub fn reconcile<S: AsRef<str>, D: AsRef<str>>(
    order: &[S],
    dir_names: &[D],
    options: &ReconcileOptions,
) -> Vec<String> {
    let deduped = scrub_duplicates(order);
    let kept = remove_matching(&deduped, &options.exclude);
    let kept = retain_matching(&kept, options.must_match.as_ref());

    let resolved = if options.adapt_case {
        find_case_insensitive(&kept, dir_names)
    } else {
        kept.into_iter()
            .filter(|name| dir_names.iter().any(|d| d.as_ref() == name))
            .collect()
    };

    // Two differently-cased order lines can resolve to the same file
    scrub_duplicates(&resolved)
}

/// Compile exclusion patterns, rejecting the first invalid one
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, RegroupError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p.as_ref()).map_err(|source| RegroupError::InvalidPattern {
                what: "exclusion",
                pattern: p.as_ref().to_string(),
                source,
            })
        })
        .collect()
}

/// Exclusion pattern matching exactly `name`
pub fn exact_name_pattern(name: &str) -> Regex {
    Regex::new(&format!("^{}$", regex::escape(name))).expect("escaped literal is a valid regex")
}

/// Exclusion pattern matching anything that begins with `prefix`
pub fn prefix_pattern(prefix: &str) -> Regex {
    Regex::new(&format!("^{}", regex::escape(prefix))).expect("escaped literal is a valid regex")
}

/// Read a line-structured file, stripping surrounding whitespace from each line
pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.lines().map(|line| line.trim().to_string()).collect())
}

/// Names of the regular files directly inside `dir`
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to list directory {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("Failed to list directory {}", dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::debug!("skipping non UTF-8 file name {:?}", raw),
        }
    }
    Ok(names)
}

/// A directory's files together with its ordering file, if one was found
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub files: Vec<String>,
    /// The ordering file's name as it exists on disk
    pub order_file: Option<String>,
    pub order_lines: Vec<String>,
}

impl Listing {
    /// The ordering lines, or the directory's own files sorted by name when
    /// there is no ordering file
    pub fn initial_order(&self) -> Vec<String> {
        if self.order_file.is_some() {
            self.order_lines.clone()
        } else {
            let mut sorted = self.files.clone();
            sorted.sort();
            sorted
        }
    }
}

/// Load the directory listing and the ordering file.
///
/// With `adapt_case`, an ordering file stored under a differently-cased name
/// is found and loaded.
pub fn fetch_lists(dir: &Path, order_file_name: &str, adapt_case: bool) -> Result<Listing> {
    let files = list_files(dir)?;

    let order_file = if files.iter().any(|f| f == order_file_name) {
        Some(order_file_name.to_string())
    } else if adapt_case {
        find_case_insensitive(&[order_file_name], &files)
            .into_iter()
            .next()
    } else {
        None
    };

    let order_lines = match &order_file {
        Some(name) => load_lines(&dir.join(name))?,
        None => {
            tracing::debug!("no ordering file {} in {}", order_file_name, dir.display());
            Vec::new()
        },
    };

    Ok(Listing {
        files,
        order_file,
        order_lines,
    })
}
