use hm_core::config::MonitorConfig;
use hm_core::spectrum::Spectrum;
use hm_core::status::ChannelStatus;

use crate::aggregate::aggregate_status;
use crate::bucket::{AlignedChart, BucketSeries, Bucketizer, align};
use crate::classify::{MagnitudeClassifier, SpectrumStats};
use crate::error::AnalysisError;
use crate::fft::{AudioSample, analyze_spectrum};

/// Everything learned from one PCM sample.
///
/// Built fresh per call and discarded once the status store and the
/// renderer have read it.
#[derive(Clone, Debug)]
pub struct FrequencyInfo {
    pub sample_rate: u32,
    /// Transform length after zero-padding.
    pub fft_size: usize,
    pub channel_count: usize,
    /// Magnitude spectrum of each channel.
    pub spectra: Vec<Spectrum>,
    /// Bin-wise mean of `spectra`.
    pub summary_spectrum: Spectrum,
    pub channel_stats: Vec<SpectrumStats>,
    pub summary_stats: SpectrumStats,
    pub channel_statuses: Vec<ChannelStatus>,
    /// Status of the averaged spectrum, reported for diagnostics.
    pub summary_status: ChannelStatus,
    /// Node-level status: priority reduction of `channel_statuses` only;
    /// `summary_status` is not folded in.
    /// Feed this back as `previous` on the next call.
    pub status: ChannelStatus,
    pub summary_series: BucketSeries,
    pub channel_series: Vec<BucketSeries>,
    pub hum_series: Vec<BucketSeries>,
    pub non_hum_series: Vec<BucketSeries>,
}

impl FrequencyInfo {
    /// Analyze, classify, and bucket one sample.
    ///
    /// `previous` is the node status from the last successful call
    /// (`Absent` for a node never classified before); it seeds the
    /// hysteresis band for every channel and for the summary.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Transform`] if the FFT fails. Input
    /// validation already happened in [`AudioSample::new`].
    pub fn from_sample(
        sample: &AudioSample<'_>,
        previous: ChannelStatus,
        config: &MonitorConfig,
    ) -> Result<Self, AnalysisError> {
        let analysis = analyze_spectrum(sample)?;
        let classifier = MagnitudeClassifier::new(&config.classifier);
        let bucketizer = Bucketizer::new(&config.chart);
        let hum = classifier.hum_band();

        let channel_stats: Vec<SpectrumStats> = analysis
            .channels
            .iter()
            .map(|s| classifier.measure(s))
            .collect();
        let channel_statuses: Vec<ChannelStatus> = channel_stats
            .iter()
            .map(|stats| classifier.classify_stats(stats, previous))
            .collect();

        let summary_stats = classifier.measure(&analysis.summary);
        let summary_status = classifier.classify_stats(&summary_stats, previous);
        let status = aggregate_status(channel_statuses.iter().copied());

        let channel_series = analysis
            .channels
            .iter()
            .map(|s| bucketizer.bucketize(s))
            .collect();
        let hum_series = analysis
            .channels
            .iter()
            .map(|s| bucketizer.bucketize(&s.filter(|f| hum.contains(f))))
            .collect();
        let non_hum_series = analysis
            .channels
            .iter()
            .map(|s| bucketizer.bucketize(&s.filter(|f| !hum.contains(f))))
            .collect();
        let summary_series = bucketizer.bucketize(&analysis.summary);

        log::debug!(
            "Classified {} channel(s) @ {} Hz: {status} (previous {previous}, summary {summary_status})",
            sample.channels(),
            sample.sample_rate()
        );

        Ok(Self {
            sample_rate: sample.sample_rate(),
            fft_size: analysis.fft_size,
            channel_count: sample.channels(),
            spectra: analysis.channels,
            summary_spectrum: analysis.summary,
            channel_stats,
            summary_stats,
            channel_statuses,
            summary_status,
            status,
            summary_series,
            channel_series,
            hum_series,
            non_hum_series,
        })
    }

    /// Summary series aligned with every channel series.
    #[must_use]
    pub fn summary_chart(&self) -> AlignedChart {
        let names: Vec<String> = (0..self.channel_count).map(channel_name).collect();
        let mut series: Vec<(&str, &BucketSeries)> = vec![("summary", &self.summary_series)];
        series.extend(names.iter().map(String::as_str).zip(&self.channel_series));
        align(&series)
    }

    /// Hum and non-hum series of one channel on a shared axis.
    #[must_use]
    pub fn hum_chart(&self, channel: usize) -> Option<AlignedChart> {
        let hum = self.hum_series.get(channel)?;
        let non_hum = self.non_hum_series.get(channel)?;
        Some(align(&[("hum", hum), ("non-hum", non_hum)]))
    }

    /// Mean hum level of a channel; `Some(0.0)` also means "no data".
    #[must_use]
    pub fn average_hum_decibels(&self, channel: usize) -> Option<f64> {
        self.hum_series.get(channel).map(BucketSeries::average_decibels)
    }

    /// Mean non-hum level of a channel; `Some(0.0)` also means "no data".
    #[must_use]
    pub fn average_non_hum_decibels(&self, channel: usize) -> Option<f64> {
        self.non_hum_series
            .get(channel)
            .map(BucketSeries::average_decibels)
    }
}

/// Chart name of channel `index`.
#[must_use]
pub fn channel_name(index: usize) -> String {
    format!("channel-{index}")
}

/// Validate, analyze, and classify raw interleaved PCM.
///
/// # Errors
/// Returns [`AnalysisError::InvalidInput`] for an empty buffer, a zero
/// sample rate or channel count, or a length not divisible by the channel
/// count; [`AnalysisError::Transform`] if the FFT fails.
///
/// # Example
/// ```
/// use hm_audio::analyze;
/// use hm_core::config::MonitorConfig;
/// use hm_core::status::ChannelStatus;
///
/// let pcm = vec![0.0f32; 4096];
/// let info = analyze(&pcm, 44100, 2, ChannelStatus::Online, &MonitorConfig::default()).unwrap();
/// assert_eq!(info.status, ChannelStatus::Silent);
/// assert_eq!(info.channel_statuses, vec![ChannelStatus::Silent; 2]);
/// ```
pub fn analyze(
    samples: &[f32],
    sample_rate: u32,
    channels: usize,
    previous: ChannelStatus,
    config: &MonitorConfig,
) -> Result<FrequencyInfo, AnalysisError> {
    let sample = AudioSample::new(samples, sample_rate, channels)?;
    FrequencyInfo::from_sample(&sample, previous, config)
}
