use anyhow::Result;
use regroup_core::{rename_operation, Notifier, OutputFormatter, RenameOptions};

use crate::cli::OutputFormat;

pub fn handle_rename(
    options: &RenameOptions,
    verbosity: u8,
    dry_run: bool,
    output: OutputFormat,
    quiet: bool,
    use_color: bool,
) -> Result<()> {
    let notifier = match output {
        OutputFormat::Json => Notifier::logging(verbosity, dry_run),
        OutputFormat::Summary => Notifier::new(verbosity, dry_run).with_color(use_color),
    };

    let result = rename_operation(options, &notifier)?;

    match output {
        OutputFormat::Json => {
            print!("{}", result.format_json());
        },
        OutputFormat::Summary => {
            if !quiet {
                print!("{}", result.format_summary());
            }
        },
    }

    Ok(())
}
