// Spectral analysis and stream status classification for hydromon.

pub mod aggregate;
pub mod bucket;
pub mod classify;
pub mod error;
pub mod fft;
pub mod frequency_info;

pub use error::AnalysisError;
pub use frequency_info::{FrequencyInfo, analyze};
