use std::sync::Arc;

use hm_core::spectrum::Spectrum;
use rayon::prelude::*;
use realfft::{RealFftPlanner, RealToComplex};

use crate::error::AnalysisError;

/// Interleaved multi-channel PCM, validated on construction.
///
/// # Example
/// ```
/// use hm_audio::fft::AudioSample;
/// let pcm = [0.1f32, -0.1, 0.2, -0.2];
/// let sample = AudioSample::new(&pcm, 44100, 2).unwrap();
/// assert_eq!(sample.frames(), 2);
/// assert!(AudioSample::new(&pcm[..3], 44100, 2).is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct AudioSample<'a> {
    samples: &'a [f32],
    sample_rate: u32,
    channels: usize,
}

impl<'a> AudioSample<'a> {
    /// Wrap a PCM buffer.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidInput`] if `samples` is empty, the
    /// sample rate or channel count is zero, or the buffer length is not a
    /// multiple of the channel count.
    pub fn new(samples: &'a [f32], sample_rate: u32, channels: usize) -> Result<Self, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::InvalidInput("empty sample buffer".to_string()));
        }
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput("sample rate must be > 0".to_string()));
        }
        if channels == 0 {
            return Err(AnalysisError::InvalidInput("channel count must be >= 1".to_string()));
        }
        if samples.len() % channels != 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "{} samples do not divide into {channels} channels",
                samples.len()
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples per channel.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// De-interleaved samples of one channel.
    pub fn channel(&self, index: usize) -> impl Iterator<Item = f32> + '_ {
        self.samples
            .iter()
            .skip(index)
            .step_by(self.channels)
            .copied()
    }
}

/// FFT pipeline: zero-padded, Hann-windowed real FFT using realfft.
///
/// The plan and window are built once per size; buffers are allocated per
/// call so one pipeline can serve several channels in parallel.
///
/// # Example
/// ```
/// use hm_audio::fft::FftPipeline;
/// let fft = FftPipeline::new(256);
/// let magnitudes = fft.process(std::iter::repeat(0.0f32).take(200)).unwrap();
/// assert_eq!(magnitudes.len(), 128); // N/2
/// ```
pub struct FftPipeline {
    fft_size: usize,
    plan: Arc<dyn RealToComplex<f64>>,
    /// Hann window coefficients.
    window: Vec<f64>,
}

impl FftPipeline {
    /// Create a pipeline for transforms of exactly `size` points.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be > 0");

        let mut planner = RealFftPlanner::<f64>::new();
        let plan = planner.plan_fft_forward(size);

        // Hann window
        let window: Vec<f64> = if size < 2 {
            vec![1.0; size]
        } else {
            (0..size)
                .map(|i| {
                    0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (size as f64 - 1.0)).cos())
                })
                .collect()
        };

        Self {
            fft_size: size,
            plan,
            window,
        }
    }

    /// Window and transform up to `fft_size` samples, zero-padding the rest.
    ///
    /// Returns `|X[i]|` for the first N/2 bins (DC up to, excluding, Nyquist).
    ///
    /// # Errors
    /// Returns [`AnalysisError::Transform`] if realfft rejects the buffers.
    pub fn process(&self, samples: impl IntoIterator<Item = f32>) -> Result<Vec<f64>, AnalysisError> {
        let half = self.fft_size / 2;
        if half == 0 {
            return Ok(Vec::new());
        }

        let mut input = self.plan.make_input_vec();
        let mut spectrum = self.plan.make_output_vec();
        let mut scratch = self.plan.make_scratch_vec();

        // Copy, zero-pad, window
        let mut source = samples.into_iter();
        for (slot, w) in input.iter_mut().zip(&self.window) {
            *slot = source.next().map_or(0.0, |s| f64::from(s) * w);
        }

        self.plan
            .process_with_scratch(&mut input, &mut spectrum, &mut scratch)
            .map_err(|e| AnalysisError::Transform(e.to_string()))?;

        Ok(spectrum.iter().take(half).map(|c| c.norm()).collect())
    }

    /// FFT window size.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
}

/// Per-channel spectra plus their bin-wise average.
#[derive(Clone, Debug)]
pub struct SpectralAnalysis {
    /// One spectrum per channel, in channel order.
    pub channels: Vec<Spectrum>,
    /// Bin-wise mean of `channels`.
    pub summary: Spectrum,
    /// Transform length after zero-padding.
    pub fft_size: usize,
}

/// Transform every channel of `sample` into a magnitude spectrum.
///
/// Each channel is padded to the next power of two of its length, so the
/// bin spacing is `sample_rate / fft_size`. Channels are transformed in
/// parallel on the rayon pool.
///
/// # Errors
/// Propagates [`AnalysisError::Transform`] from any channel.
///
/// # Example
/// ```
/// use hm_audio::fft::{analyze_spectrum, AudioSample};
/// let pcm = vec![0.0f32; 2 * 1000];
/// let sample = AudioSample::new(&pcm, 8000, 2).unwrap();
/// let analysis = analyze_spectrum(&sample).unwrap();
/// assert_eq!(analysis.fft_size, 1024);
/// assert_eq!(analysis.channels.len(), 2);
/// assert_eq!(analysis.summary.len(), 512);
/// ```
pub fn analyze_spectrum(sample: &AudioSample<'_>) -> Result<SpectralAnalysis, AnalysisError> {
    let fft_size = sample.frames().next_power_of_two();
    let bin_hz = f64::from(sample.sample_rate()) / fft_size as f64;
    let pipeline = FftPipeline::new(fft_size);

    let channels = (0..sample.channels())
        .into_par_iter()
        .map(|ch| -> Result<Spectrum, AnalysisError> {
            let magnitudes = pipeline.process(sample.channel(ch))?;
            log::trace!(
                "Channel {ch}: {} frames -> {} bins @ {bin_hz:.3} Hz",
                sample.frames(),
                magnitudes.len()
            );
            Ok(Spectrum::from_magnitudes(magnitudes, bin_hz))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let summary = Spectrum::average(&channels);

    Ok(SpectralAnalysis {
        channels,
        summary,
        fft_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, sample_rate: u32, frames: usize, amplitude: f32) -> Vec<f32> {
        (0..frames)
            .map(|i| {
                let t = i as f64 / f64::from(sample_rate);
                amplitude * (2.0 * std::f64::consts::PI * freq * t).sin() as f32
            })
            .collect()
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(matches!(
            AudioSample::new(&[], 44100, 1),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            AudioSample::new(&[0.0; 4], 0, 1),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            AudioSample::new(&[0.0; 7], 44100, 2),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            AudioSample::new(&[0.0; 4], 44100, 0),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn deinterleaves_channels() -> Result<(), AnalysisError> {
        let pcm = [1.0f32, 10.0, 2.0, 20.0, 3.0, 30.0];
        let sample = AudioSample::new(&pcm, 8000, 2)?;
        assert_eq!(sample.channel(0).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(sample.channel(1).collect::<Vec<_>>(), vec![10.0, 20.0, 30.0]);
        Ok(())
    }

    #[test]
    fn hann_window_endpoints_are_zero() {
        let fft = FftPipeline::new(64);
        assert!(fft.window[0].abs() < 1e-12);
        assert!(fft.window[63].abs() < 1e-12);
        assert!(fft.window.iter().all(|w| (0.0..=1.0).contains(w)));
    }

    #[test]
    fn peak_lands_on_tone_bin() -> Result<(), AnalysisError> {
        // 7680 Hz / 1024 points = 7.5 Hz bins; 997.5 Hz is bin 133.
        let pcm = tone(997.5, 7680, 1024, 0.5);
        let sample = AudioSample::new(&pcm, 7680, 1)?;
        let analysis = analyze_spectrum(&sample)?;
        let peak = analysis
            .summary
            .iter()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
            .map(|bin| bin.frequency);
        assert_eq!(peak, Some(997.5));
        Ok(())
    }

    #[test]
    fn pads_to_power_of_two() -> Result<(), AnalysisError> {
        let pcm = vec![0.0f32; 1000];
        let analysis = analyze_spectrum(&AudioSample::new(&pcm, 44100, 1)?)?;
        assert_eq!(analysis.fft_size, 1024);
        assert_eq!(analysis.channels[0].len(), 512);
        let last = analysis.channels[0].bins()[511].frequency;
        assert!((last - 511.0 * 44100.0 / 1024.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn single_frame_yields_empty_spectrum() -> Result<(), AnalysisError> {
        let analysis = analyze_spectrum(&AudioSample::new(&[0.3, 0.4], 8000, 2)?)?;
        assert_eq!(analysis.fft_size, 1);
        assert!(analysis.summary.is_empty());
        Ok(())
    }

    #[test]
    fn summary_averages_channels() -> Result<(), AnalysisError> {
        let left = tone(997.5, 7680, 1024, 0.5);
        let pcm: Vec<f32> = left.iter().flat_map(|&s| [s, 0.0]).collect();
        let analysis = analyze_spectrum(&AudioSample::new(&pcm, 7680, 2)?)?;
        let loud = analysis.channels[0].bins()[133].magnitude;
        let avg = analysis.summary.bins()[133].magnitude;
        assert!((avg - loud / 2.0).abs() < 1e-9);
        Ok(())
    }
}
