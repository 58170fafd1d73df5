use crate::plan::PlanEntry;
use crate::undo::DirUndo;
use comfy_table::{ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

/// How a directory fared during a rename run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirStatus {
    /// At least one file was (or would be) renamed
    Renamed,
    /// Nothing to rename, or every entry was skipped
    Unchanged,
    /// Passed over, e.g. no ordering file
    Skipped,
    /// An error stopped the directory; other directories carried on
    Failed,
}

/// Per-directory outcome of a rename run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryReport {
    pub path: PathBuf,
    pub status: DirStatus,
    /// Renames planned for the directory
    pub planned: Vec<PlanEntry>,
    /// Renames performed, or that would be performed on a dry run
    pub renamed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DirectoryReport {
    pub fn new(path: PathBuf, status: DirStatus) -> Self {
        Self {
            path,
            status,
            planned: Vec::new(),
            renamed: 0,
            log_file: None,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Result of a rename run over one or more directories
#[derive(Debug, Serialize, Deserialize)]
pub struct RenameResult {
    pub dry_run: bool,
    pub directories: Vec<DirectoryReport>,
    /// Problems reported along the way
    pub problems: usize,
}

impl RenameResult {
    pub fn total_renamed(&self) -> usize {
        self.directories.iter().map(|d| d.renamed).sum()
    }

    pub fn count(&self, status: DirStatus) -> usize {
        self.directories.iter().filter(|d| d.status == status).count()
    }
}

/// Per-directory outcome of an undo run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoDirReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub undo: DirUndo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of an undo run
#[derive(Debug, Serialize, Deserialize)]
pub struct UndoResult {
    pub dry_run: bool,
    pub directories: Vec<UndoDirReport>,
    pub problems: usize,
}

impl UndoResult {
    pub fn total_restored(&self) -> usize {
        self.directories.iter().map(|d| d.undo.restored).sum()
    }

    pub fn total_conflicts(&self) -> usize {
        self.directories.iter().map(|d| d.undo.conflicts).sum()
    }

    /// Directories in which a log was found
    pub fn logs_replayed(&self) -> usize {
        self.directories
            .iter()
            .filter(|d| d.undo.log_file.is_some())
            .count()
    }
}

/// Result of a version command
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResult {
    pub name: String,
    pub version: String,
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }
    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

/// Two-column table of planned renames
pub fn render_plan_table(entries: &[PlanEntry]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Disabled);
    table.set_header(vec!["From", "To"]);
    for entry in entries {
        table.add_row(vec![entry.from.as_str(), entry.to.as_str()]);
    }
    table.to_string()
}

impl OutputFormatter for RenameResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "rename",
            "dry_run": self.dry_run,
            "summary": {
                "directories": self.directories.len(),
                "renamed": self.total_renamed(),
                "skipped": self.count(DirStatus::Skipped),
                "failed": self.count(DirStatus::Failed),
                "problems": self.problems,
            },
            "directories": self.directories,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        if self.dry_run {
            for dir in self.directories.iter().filter(|d| !d.planned.is_empty()) {
                writeln!(output, "{}", dir.path.display()).unwrap();
                writeln!(output, "{}", render_plan_table(&dir.planned)).unwrap();
            }
            writeln!(
                output,
                "Dry run: {} file(s) would be renamed in {} director{}",
                self.total_renamed(),
                self.directories.len(),
                if self.directories.len() == 1 { "y" } else { "ies" }
            )
            .unwrap();
        } else {
            writeln!(
                output,
                "✓ Renamed {} file(s) in {} director{}",
                self.total_renamed(),
                self.count(DirStatus::Renamed),
                if self.count(DirStatus::Renamed) == 1 { "y" } else { "ies" }
            )
            .unwrap();
            for dir in self.directories.iter().filter(|d| d.log_file.is_some()) {
                writeln!(
                    output,
                    "  {}: {} ({})",
                    dir.path.display(),
                    dir.renamed,
                    dir.log_file.as_deref().unwrap_or_default()
                )
                .unwrap();
            }
        }

        let skipped = self.count(DirStatus::Skipped);
        if skipped > 0 {
            writeln!(output, "Skipped {skipped} director{}", if skipped == 1 { "y" } else { "ies" })
                .unwrap();
        }
        for dir in self.directories.iter().filter(|d| d.status == DirStatus::Failed) {
            writeln!(
                output,
                "✗ {}: {}",
                dir.path.display(),
                dir.message.as_deref().unwrap_or("failed")
            )
            .unwrap();
        }
        if self.problems > 0 {
            writeln!(output, "{} problem(s) reported", self.problems).unwrap();
        }

        output
    }
}

impl OutputFormatter for UndoResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "undo",
            "dry_run": self.dry_run,
            "summary": {
                "logs": self.logs_replayed(),
                "restored": self.total_restored(),
                "conflicts": self.total_conflicts(),
                "problems": self.problems,
            },
            "directories": self.directories,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        if self.logs_replayed() == 0 {
            output.push_str("No history to undo\n");
        } else {
            writeln!(
                output,
                "{} {} file(s) from {} history log(s)",
                if self.dry_run { "Would restore" } else { "✓ Restored" },
                self.total_restored(),
                self.logs_replayed()
            )
            .unwrap();
        }

        let conflicts = self.total_conflicts();
        if conflicts > 0 {
            writeln!(
                output,
                "{conflicts} file(s) restored under a suffixed name because the original name was taken"
            )
            .unwrap();
        }
        for dir in &self.directories {
            if let Some(error) = &dir.error {
                writeln!(output, "✗ {}: {error}", dir.path.display()).unwrap();
            }
        }
        if self.problems > 0 {
            writeln!(output, "{} problem(s) reported", self.problems).unwrap();
        }

        output
    }
}

impl OutputFormatter for VersionResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&self).unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}
