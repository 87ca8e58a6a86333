use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use ecosense_core::{Engine, KeywordClassifier};

mod cli;
mod commands;
mod config;
mod format;
mod style;
mod util;

use cli::{Cli, Commands};
use commands::{CompareArgs, OutputContext};
use config::{Config, resolve_analysis, resolve_format, resolve_preset};
use format::FormatOptions;
use util::require_data_path;

fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "ecosense", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load();
    let no_color = cli.no_color || config.no_color;

    if let Commands::Config { action } = cli.command {
        return commands::cmd_config(action, no_color);
    }

    let preset = resolve_preset(cli.preset, &config)?;
    let engine = Engine::new(resolve_analysis(preset, &config))?;
    let data = cli.data.clone().or_else(|| config.data.clone());
    let ctx = OutputContext {
        format: resolve_format(cli.json, cli.format, &config),
        output: cli.output.clone(),
        quiet: cli.quiet,
        opts: FormatOptions::new(no_color, cli.compact),
    };
    if let Some(ref path) = ctx.output {
        tracing::debug!("Output will be written to: {}", path.display());
    }

    match cli.command {
        Commands::Summary => commands::cmd_summary(&require_data_path(data)?, &engine, &ctx),
        Commands::Stats { window } => {
            commands::cmd_stats(&require_data_path(data)?, &window, &engine, &ctx)
        }
        Commands::Recommend => commands::cmd_recommend(&require_data_path(data)?, &engine, &ctx),
        Commands::Compare {
            since,
            until,
            baseline_since,
            baseline_until,
        } => {
            let args = CompareArgs {
                since,
                until,
                baseline_since,
                baseline_until,
            };
            commands::cmd_compare(&require_data_path(data)?, &args, &engine, &ctx)
        }
        Commands::Ask { question } => {
            let classifier = KeywordClassifier::default();
            commands::cmd_ask(data, &question.join(" "), &classifier, &engine, &ctx)
        }
        Commands::Config { .. } | Commands::Completions { .. } => {
            // Already handled above
            Ok(())
        }
    }
}
