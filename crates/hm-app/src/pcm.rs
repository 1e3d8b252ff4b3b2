use std::path::Path;

use anyhow::{Context, Result};

/// Bytes per f32 sample.
const SAMPLE_BYTES: usize = 4;

/// Decode raw little-endian f32 PCM.
///
/// A trailing partial sample is dropped with a warning.
#[must_use]
pub fn decode_f32le(bytes: &[u8]) -> Vec<f32> {
    let chunks = bytes.chunks_exact(SAMPLE_BYTES);
    let remainder = chunks.remainder().len();
    if remainder != 0 {
        log::warn!("Ignoring {remainder} trailing byte(s) after the last f32 sample");
    }
    chunks
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Read a raw interleaved f32le PCM file.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_pcm(path: &Path) -> Result<Vec<f32>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Cannot read PCM file {}", path.display()))?;
    let samples = decode_f32le(&bytes);
    log::info!("Read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn encode(samples: &[f32]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn decodes_little_endian() {
        let samples = [0.0f32, 1.0, -0.5, f32::MIN_POSITIVE];
        assert_eq!(decode_f32le(&encode(&samples)), samples);
    }

    #[test]
    fn drops_partial_sample() {
        let mut bytes = encode(&[0.25, 0.75]);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(decode_f32le(&bytes), vec![0.25, 0.75]);
        assert!(decode_f32le(&[9, 9]).is_empty());
    }

    #[test]
    fn reads_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&encode(&[0.5; 16]))?;
        let samples = read_pcm(file.path())?;
        assert_eq!(samples.len(), 16);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_pcm(Path::new("/nonexistent/hydromon.raw"));
        assert!(err.is_err());
    }
}
