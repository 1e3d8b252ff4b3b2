use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use hm_core::status::NodeStatus;

/// hydromon: report whether a raw PCM capture carries live audio.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Raw interleaved little-endian f32 PCM file.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Sample rate of the input, in Hz.
    #[arg(long, default_value_t = 44_100)]
    pub sample_rate: u32,

    /// Number of interleaved channels.
    #[arg(long, default_value_t = 1)]
    pub channels: usize,

    /// Status reported by the previous run: absent, silent, unintelligible,
    /// online, offline, hidden, unauthorized, no-view, lagged.
    #[arg(long, default_value = "absent")]
    pub previous: NodeStatus,

    /// TOML configuration file with `[classifier]` and `[chart]` sections.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per channel plus the node status.
    Text,
    /// Full report with aligned charts.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["hydromon", "--input", "in.raw"])?;
        assert_eq!(cli.sample_rate, 44_100);
        assert_eq!(cli.channels, 1);
        assert_eq!(cli.previous, NodeStatus::Absent);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.config.is_none());
        assert_eq!(cli.log_level, "warn");
        Ok(())
    }

    #[test]
    fn parses_node_status_and_format() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "hydromon", "-i", "in.raw", "--previous", "no-view", "--format", "json",
            "--channels", "2",
        ])?;
        assert_eq!(cli.previous, NodeStatus::NoView);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.channels, 2);
        Ok(())
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(Cli::try_parse_from(["hydromon", "-i", "in.raw", "--previous", "loud"]).is_err());
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["hydromon"]).is_err());
    }
}
