use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::types::OutputFormat;

/// Rename files to sequential IDs in the order given by an ordering file,
/// keeping grouped files together, with undo
#[derive(Parser, Debug)]
#[command(name = "regroup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// File in the start directory listing directory names to skip when recursing
    #[arg(long, global = true, value_name = "FILE")]
    pub ignore_file: Option<PathBuf>,
}

/// Arguments shared by rename and undo
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory to start in
    #[arg(value_name = "START_DIR", default_value = ".")]
    pub start_dir: PathBuf,

    /// Also process every subdirectory
    #[arg(short, long)]
    pub recursive: bool,

    /// Root name of the history logs, e.g. rename_history.csv
    #[arg(long, value_name = "NAME")]
    pub history_file: Option<String>,

    /// Report what would happen without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// 0 = silent, 1 = problems, 2 = per directory, 3 = per file
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub verbosity: Option<u8>,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Suppress the result summary
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rename the files listed in each directory's ordering file
    Rename {
        #[command(flatten)]
        run: RunArgs,

        /// Leading text of every new name; "." uses the directory name plus "_"
        #[arg(long, allow_hyphen_values = true)]
        prefix: Option<String>,

        /// Text placed before the numeric ID
        #[arg(long, allow_hyphen_values = true)]
        id_prefix: Option<String>,

        /// Ordering file name
        #[arg(long, value_name = "NAME")]
        order_file: Option<String>,

        /// Regex locating the identifier inside a file name
        #[arg(long, value_name = "REGEX")]
        id_regex: Option<String>,

        /// First ID handed out
        #[arg(long)]
        id_start: Option<u64>,

        /// Increment between IDs
        #[arg(long)]
        id_step: Option<u64>,

        /// Minimum number of digits in an ID
        #[arg(long)]
        id_width: Option<usize>,

        /// Continue numbering across directories instead of restarting
        #[arg(long)]
        continue_ids: bool,

        /// Use the sorted directory listing where there is no ordering file
        #[arg(long)]
        process_without_order_file: bool,

        /// Match ordering lines to files case-sensitively
        #[arg(long)]
        no_adapt_case: bool,
    },

    /// Undo the latest rename batch in each directory
    Undo {
        #[command(flatten)]
        run: RunArgs,

        /// Keep the replayed history log as u_<name>
        #[arg(long)]
        keep_history: bool,
    },

    /// Show version information
    Version {
        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rename_flags() {
        let cli = Cli::parse_from([
            "regroup",
            "rename",
            "photos",
            "-r",
            "--prefix",
            "b_1965",
            "--id-step",
            "4",
            "-v",
            "3",
            "--continue-ids",
        ]);
        match cli.command {
            Commands::Rename {
                run,
                prefix,
                id_step,
                continue_ids,
                ..
            } => {
                assert_eq!(run.start_dir, PathBuf::from("photos"));
                assert!(run.recursive);
                assert_eq!(run.verbosity, Some(3));
                assert_eq!(prefix.as_deref(), Some("b_1965"));
                assert_eq!(id_step, Some(4));
                assert!(continue_ids);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbosity_is_bounded() {
        assert!(Cli::try_parse_from(["regroup", "undo", "-v", "4"]).is_err());
    }

    #[test]
    fn test_undo_defaults() {
        let cli = Cli::parse_from(["regroup", "undo"]);
        match cli.command {
            Commands::Undo { run, keep_history } => {
                assert_eq!(run.start_dir, PathBuf::from("."));
                assert!(!run.recursive);
                assert!(!run.dry_run);
                assert!(!keep_history);
                assert_eq!(run.output, OutputFormat::Summary);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
