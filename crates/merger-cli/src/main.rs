//! `datamerger` binary.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use merger_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use merger_cli::commands::{
    load_registry, merge_json, open_store, report_failures, run_diagnose, run_inspect,
    run_mapping, run_merge,
};
use merger_cli::logging::{LogConfig, LogFormat, init_logging, resolve_log_file};
use merger_cli::summary::{print_inspect, print_merge_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let store = open_store(cli.mappings.as_deref());
    let result = match &cli.command {
        Command::Merge(args) => {
            let registry = load_registry(&store);
            run_merge(args, &registry).and_then(|run| {
                report_failures(&run.failures);
                if args.json {
                    println!("{}", merge_json(&run)?);
                } else {
                    print_merge_summary(&run.outcome, &run.output);
                }
                Ok(())
            })
        }
        Command::Inspect(args) => {
            let registry = load_registry(&store);
            run_inspect(args, &registry).and_then(|report| {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_inspect(&report);
                }
                Ok(())
            })
        }
        Command::Diagnose(args) => {
            let registry = load_registry(&store);
            run_diagnose(args, &registry).map(|text| print!("{text}"))
        }
        Command::Mapping(command) => run_mapping(command, &store),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = resolve_log_file(
        cli.log_file.as_deref(),
        cli.log_dir.as_deref(),
        chrono::Local::now().date_naive(),
    );
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => config.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
