use anyhow::Result;
use clap::Parser;
use regroup_core::{Config, OutputFormatter, RegroupError, RenameOptions, UndoOptions, VersionResult};
use std::io::{self, IsTerminal};
use std::process;

mod cli;
mod logging;
mod rename;
mod undo;

use cli::{Cli, Commands, OutputFormat};

fn main() {
    let cli = Cli::parse();

    // Load config to get defaults
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        },
    };
    let defaults = &config.defaults;

    let use_color = !cli.no_color
        && defaults
            .use_color
            .unwrap_or_else(|| io::stdout().is_terminal());

    let verbosity = match &cli.command {
        Commands::Rename { run, .. } | Commands::Undo { run, .. } => {
            run.verbosity.unwrap_or(defaults.verbosity)
        },
        Commands::Version { .. } => defaults.verbosity,
    };
    logging::init_logger(verbosity, use_color);

    let result = match cli.command {
        Commands::Rename {
            run,
            prefix,
            id_prefix,
            order_file,
            id_regex,
            id_start,
            id_step,
            id_width,
            continue_ids,
            process_without_order_file,
            no_adapt_case,
        } => {
            let mut options = RenameOptions::from_defaults(defaults, run.start_dir);
            options.recursive = run.recursive;
            if let Some(history_file) = run.history_file {
                options.history_file = history_file;
            }
            if let Some(ignore_file) = cli.ignore_file {
                options.ignore_file = ignore_file;
            }
            if let Some(prefix) = prefix {
                options.prefix = prefix;
            }
            if let Some(id_prefix) = id_prefix {
                options.id_prefix = id_prefix;
            }
            if let Some(order_file) = order_file {
                options.order_file = order_file;
            }
            if let Some(id_regex) = id_regex {
                options.id_regex = id_regex;
            }
            options.id_start = id_start.unwrap_or(options.id_start);
            options.id_step = id_step.unwrap_or(options.id_step);
            options.id_width = id_width.unwrap_or(options.id_width);
            if continue_ids {
                options.restart_ids_per_dir = false;
            }
            if process_without_order_file {
                options.skip_if_no_order_file = false;
            }
            if no_adapt_case {
                options.adapt_case = false;
            }

            rename::handle_rename(
                &options,
                verbosity,
                run.dry_run,
                run.output,
                run.quiet,
                use_color,
            )
        },

        Commands::Undo { run, keep_history } => {
            let mut options = UndoOptions::from_defaults(defaults, run.start_dir);
            options.recursive = run.recursive;
            options.keep_history = keep_history || options.keep_history;
            if let Some(history_file) = run.history_file {
                options.history_file = history_file;
            }
            if let Some(ignore_file) = cli.ignore_file {
                options.ignore_file = ignore_file;
            }

            undo::handle_undo(
                &options,
                verbosity,
                run.dry_run,
                run.output,
                run.quiet,
                use_color,
            )
        },

        Commands::Version { output } => handle_version(output),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(exit_code(&e));
        },
    }
}

/// 2 for bad input (invalid pattern, zero step, missing start directory), 3 otherwise
fn exit_code(error: &anyhow::Error) -> i32 {
    let invalid_input = error.chain().any(|cause| {
        cause
            .downcast_ref::<RegroupError>()
            .is_some_and(RegroupError::is_invalid_input)
    });
    if invalid_input {
        2
    } else {
        3
    }
}

fn handle_version(output: OutputFormat) -> Result<()> {
    let version_result = VersionResult {
        name: "regroup".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("{}", version_result.format(output.into()));
    Ok(())
}
