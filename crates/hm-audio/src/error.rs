use thiserror::Error;

/// Errors originating from spectral analysis.
///
/// Either variant aborts the whole classification for that sample; no
/// partial result is ever produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Sample buffer, sample rate, or channel layout cannot be analyzed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The FFT backend rejected its buffers.
    #[error("Transform failure: {0}")]
    Transform(String),
}
