//! Configuration, status types, and spectrum primitives for hydromon.
//!
//! This crate contains the shared types used by the analysis crate and
//! the command-line front end.

pub mod config;
pub mod error;
pub mod spectrum;
pub mod status;

pub use config::{ChartConfig, ClassifierConfig, MonitorConfig};
pub use error::CoreError;
pub use spectrum::{HumBand, Spectrum, SpectrumBin};
pub use status::{ChannelStatus, NodeStatus};
