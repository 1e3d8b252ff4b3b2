use anyhow::{Context, Result};
use clap::Parser;
use hm_core::config::resolve_config;

pub mod cli;
pub mod pcm;
pub mod report;

use cli::{Cli, OutputFormat};
use report::Report;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Config : défauts, puis TOML, puis variables HYDROMON_*
    let config = resolve_config(cli.config.as_deref(), std::env::vars())?;

    // 4. Lire le PCM
    let samples = pcm::read_pcm(&cli.input)?;

    // 5. Classifier
    let previous = cli.previous.hysteresis_seed();
    match hm_audio::analyze(&samples, cli.sample_rate, cli.channels, previous, &config) {
        Ok(info) => emit(&Report::from_info(&info, cli.previous), cli.format),
        Err(e) => {
            log::warn!("Analysis failed, keeping previous status '{}': {e}", cli.previous);
            emit(&Report::retained(cli.previous, &e), cli.format)?;
            Err(e).context("Classification failed")
        }
    }
}

fn emit(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json().context("Cannot encode report")?),
    }
    Ok(())
}
