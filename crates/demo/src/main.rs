//! Replay a random input script against the demo scene on the headless
//! platform and print the resulting tree.

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use grove::{config::Config, geom::Expanse};
use grove_demo::{Options, run};
use tracing_subscriber::EnvFilter;

/// CLI flags for the demo.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Window width.
    #[clap(long, default_value_t = 16)]
    width: u32,

    /// Window height.
    #[clap(long, default_value_t = 12)]
    height: u32,

    /// Rows in the list.
    #[clap(short, long, default_value_t = 6)]
    rows: usize,

    /// Seed for the input script.
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of scripted inputs.
    #[clap(short = 'n', long, default_value_t = 20)]
    steps: usize,

    /// JSON configuration file.
    #[clap(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the full window dump with colors.
    #[clap(long)]
    color: bool,

    /// Print the effective configuration and exit.
    #[clap(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if args.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let report = run(&Options {
        size: Expanse::new(args.width, args.height),
        rows: args.rows,
        seed: args.seed,
        steps: args.steps,
        config,
        color: args.color,
    })?;
    print!("{}", report.dump);
    println!(
        "{} pushes, {} platform requests, {} header activations",
        report.pushes, report.requests, report.activations
    );
    Ok(())
}
