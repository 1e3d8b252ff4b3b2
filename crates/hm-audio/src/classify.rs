use hm_core::config::ClassifierConfig;
use hm_core::spectrum::{HumBand, Spectrum, decibels};
use hm_core::status::ChannelStatus;
use serde::Serialize;

/// Level and hum measurements of one spectrum.
///
/// Decibel fields are negative infinity when the relevant bins are all
/// zero (or there are none).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpectrumStats {
    /// Loudest bin overall.
    pub max_decibels: f64,
    /// Loudest bin outside the hum band.
    pub max_non_hum_decibels: f64,
    /// Sum of magnitudes inside the hum band.
    pub hum_magnitude: f64,
    /// Sum of magnitudes outside the hum band.
    pub non_hum_magnitude: f64,
    /// `non_hum_magnitude / max(hum_magnitude, 1)`.
    pub signal_ratio: f64,
}

impl SpectrumStats {
    /// Measure `spectrum` against `hum` in a single pass.
    ///
    /// # Example
    /// ```
    /// use hm_audio::classify::SpectrumStats;
    /// use hm_core::spectrum::{HumBand, Spectrum};
    /// // 20 Hz bins: 60 Hz and 120 Hz are hum.
    /// let s = Spectrum::from_magnitudes([0.0, 4.0, 0.0, 2.0, 0.0, 0.0, 2.0], 20.0);
    /// let stats = SpectrumStats::measure(&s, &HumBand::default());
    /// assert!((stats.hum_magnitude - 4.0).abs() < 1e-12);
    /// assert!((stats.non_hum_magnitude - 4.0).abs() < 1e-12);
    /// assert!((stats.signal_ratio - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn measure(spectrum: &Spectrum, hum: &HumBand) -> Self {
        let mut max_decibels = f64::NEG_INFINITY;
        let mut max_non_hum_decibels = f64::NEG_INFINITY;
        let mut hum_magnitude = 0.0;
        let mut non_hum_magnitude = 0.0;

        for bin in spectrum.iter() {
            let db = decibels(bin.magnitude);
            max_decibels = max_decibels.max(db);
            if hum.contains(bin.frequency) {
                hum_magnitude += bin.magnitude;
            } else {
                non_hum_magnitude += bin.magnitude;
                max_non_hum_decibels = max_non_hum_decibels.max(db);
            }
        }

        Self {
            max_decibels,
            max_non_hum_decibels,
            hum_magnitude,
            non_hum_magnitude,
            signal_ratio: non_hum_magnitude / f64::max(hum_magnitude, 1.0),
        }
    }
}

/// Turns a spectrum into a [`ChannelStatus`], with hysteresis against the
/// previous status.
///
/// Decision order:
/// 1. peak below `min_noise_decibels` -> `Silent`;
/// 2. peak at or below `max_silence_decibels` -> previous status;
/// 3. non-hum peak below `min_noise_decibels` -> `Unintelligible`;
/// 4. signal ratio below `min_signal_ratio` -> `Unintelligible`;
/// 5. otherwise `Online`.
///
/// # Example
/// ```
/// use hm_audio::classify::MagnitudeClassifier;
/// use hm_core::config::ClassifierConfig;
/// use hm_core::spectrum::Spectrum;
/// use hm_core::status::ChannelStatus;
///
/// let config = ClassifierConfig::default();
/// let classifier = MagnitudeClassifier::new(&config);
/// let silence = Spectrum::from_magnitudes([0.0; 16], 10.0);
/// assert_eq!(classifier.classify(&silence, ChannelStatus::Online), ChannelStatus::Silent);
/// ```
#[derive(Clone, Debug)]
pub struct MagnitudeClassifier<'a> {
    config: &'a ClassifierConfig,
    hum: HumBand,
}

impl<'a> MagnitudeClassifier<'a> {
    #[must_use]
    pub fn new(config: &'a ClassifierConfig) -> Self {
        Self {
            config,
            hum: config.hum_band(),
        }
    }

    #[must_use]
    pub fn hum_band(&self) -> HumBand {
        self.hum
    }

    /// Measure and classify `spectrum` in one go.
    #[must_use]
    pub fn classify(&self, spectrum: &Spectrum, previous: ChannelStatus) -> ChannelStatus {
        self.classify_stats(&self.measure(spectrum), previous)
    }

    #[must_use]
    pub fn measure(&self, spectrum: &Spectrum) -> SpectrumStats {
        SpectrumStats::measure(spectrum, &self.hum)
    }

    /// Classify from already measured statistics.
    #[must_use]
    pub fn classify_stats(&self, stats: &SpectrumStats, previous: ChannelStatus) -> ChannelStatus {
        let (status, reason) = self.decide(stats, previous);
        log::debug!(
            "{status} ({reason}): max {:.1} dB, non-hum max {:.1} dB, ratio {:.2}",
            stats.max_decibels,
            stats.max_non_hum_decibels,
            stats.signal_ratio
        );
        status
    }

    fn decide(&self, stats: &SpectrumStats, previous: ChannelStatus) -> (ChannelStatus, &'static str) {
        let c = self.config;

        if stats.max_decibels < c.min_noise_decibels {
            return (ChannelStatus::Silent, "below noise floor");
        }
        if stats.max_decibels <= c.max_silence_decibels {
            return (previous, "hysteresis band");
        }
        if stats.max_non_hum_decibels < c.min_noise_decibels {
            return (ChannelStatus::Unintelligible, "hum only");
        }
        if stats.signal_ratio < c.min_signal_ratio() {
            return (ChannelStatus::Unintelligible, "signal ratio too low");
        }
        (ChannelStatus::Online, "signal above hum")
    }
}
