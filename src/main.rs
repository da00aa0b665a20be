mod adjust;
mod bench;
mod config;
mod group;
mod model;
mod stats;

use crate::adjust::adjust;
use crate::bench::{BackendReport, run_benchmark};
use crate::config::{BenchConfig, Input};
use crate::group::Backend;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::{fs, path::PathBuf};

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Demean the values of an input file.
    Adjust {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t)]
        backend: Backend,

        /// Write the result here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Time every backend on synthetic data.
    Bench {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Serialize)]
struct AdjustOutput {
    demeaned: Vec<f64>,
}

#[derive(Serialize)]
struct BenchOutput {
    reports: Vec<BackendReport>,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    match args.command {
        Command::Adjust {
            input,
            backend,
            output,
        } => run_adjust(input, backend, output)?,
        Command::Bench { config } => {
            let cfg = BenchConfig::from_file(&config).context("failed to construct cfg")?;
            log::info!("{cfg:#?}");

            let reports = run_benchmark(&cfg).context("failed to run benchmark")?;
            let text =
                toml::to_string(&BenchOutput { reports }).context("failed to serialize reports")?;
            print!("{text}");
        }
    }

    Ok(())
}

fn run_adjust(input: PathBuf, backend: Backend, output: Option<PathBuf>) -> Result<()> {
    let input = Input::from_file(&input).context("failed to construct input")?;

    let vals = model::coerce_all(&input.values);
    let n_missing = vals.iter().filter(|val| val.is_none()).count();
    log::info!(
        "read {} values ({n_missing} missing) and {} groups",
        vals.len(),
        input.groups.len()
    );

    let demeaned = adjust(&vals, &input.groups, &input.weights, backend)
        .context("failed to adjust values")?;

    // TOML has no null, so missing values are written as nan.
    let demeaned = demeaned
        .into_iter()
        .map(|val| val.unwrap_or(f64::NAN))
        .collect();
    let text = toml::to_string(&AdjustOutput { demeaned }).context("failed to serialize result")?;

    match output {
        Some(file) => {
            fs::write(&file, text).with_context(|| format!("failed to write {file:?}"))?;
            log::info!("wrote {file:?}");
        }
        None => print!("{text}"),
    }

    Ok(())
}
