use serde::{Deserialize, Serialize};

/// Convert a linear magnitude to decibels (`20 * log10(magnitude)`).
///
/// A zero magnitude maps to negative infinity.
///
/// # Example
/// ```
/// use hm_core::spectrum::decibels;
/// assert!((decibels(1.0)).abs() < 1e-12);
/// assert!((decibels(0.1) + 20.0).abs() < 1e-9);
/// assert_eq!(decibels(0.0), f64::NEG_INFINITY);
/// ```
#[inline]
#[must_use]
pub fn decibels(magnitude: f64) -> f64 {
    if magnitude <= 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * magnitude.log10()
}

/// One frequency bin of a magnitude spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct SpectrumBin {
    /// Bin centre frequency in Hz.
    pub frequency: f64,
    /// Linear magnitude, non-negative.
    pub magnitude: f64,
}

/// Magnitude spectrum ordered by strictly increasing frequency.
///
/// Holds either a full FFT half-spectrum or a filtered subset of one
/// (e.g. only the hum bins), so bins are stored with their frequency
/// rather than implied by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    bins: Vec<SpectrumBin>,
}

impl Spectrum {
    /// Build from evenly spaced magnitudes, bin `i` at `i * bin_hz`.
    ///
    /// # Example
    /// ```
    /// use hm_core::spectrum::Spectrum;
    /// let s = Spectrum::from_magnitudes([0.0, 1.0, 0.5], 10.0);
    /// assert_eq!(s.len(), 3);
    /// assert!((s.bins()[2].frequency - 20.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn from_magnitudes(magnitudes: impl IntoIterator<Item = f64>, bin_hz: f64) -> Self {
        let bins = magnitudes
            .into_iter()
            .enumerate()
            .map(|(i, magnitude)| SpectrumBin {
                frequency: i as f64 * bin_hz,
                magnitude,
            })
            .collect();
        Self { bins }
    }

    /// Build from explicit bins. Bins are sorted by frequency; later
    /// duplicates of a frequency are dropped.
    #[must_use]
    pub fn from_bins(mut bins: Vec<SpectrumBin>) -> Self {
        bins.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        bins.dedup_by(|later, earlier| later.frequency == earlier.frequency);
        Self { bins }
    }

    /// Bin-wise mean of several spectra of equal resolution.
    ///
    /// Frequencies are taken from the first spectrum; a single input is
    /// returned unchanged. Extra bins in longer inputs are ignored.
    #[must_use]
    pub fn average(spectra: &[Spectrum]) -> Self {
        let Some(first) = spectra.first() else {
            return Self::default();
        };
        if spectra.len() == 1 {
            return first.clone();
        }

        let len = spectra.iter().map(Spectrum::len).min().unwrap_or(0);
        let count = spectra.len() as f64;
        let bins = (0..len)
            .map(|i| SpectrumBin {
                frequency: first.bins[i].frequency,
                magnitude: spectra.iter().map(|s| s.bins[i].magnitude).sum::<f64>() / count,
            })
            .collect();
        Self { bins }
    }

    /// Subset of bins whose frequency satisfies `keep`.
    #[must_use]
    pub fn filter(&self, mut keep: impl FnMut(f64) -> bool) -> Self {
        Self {
            bins: self
                .bins
                .iter()
                .copied()
                .filter(|bin| keep(bin.frequency))
                .collect(),
        }
    }

    #[must_use]
    pub fn bins(&self) -> &[SpectrumBin] {
        &self.bins
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpectrumBin> {
        self.bins.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Loudest bin in decibels; negative infinity for an empty or all-zero spectrum.
    #[must_use]
    pub fn max_decibels(&self) -> f64 {
        self.bins
            .iter()
            .map(|bin| decibels(bin.magnitude))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Sum of linear magnitudes.
    #[must_use]
    pub fn magnitude_sum(&self) -> f64 {
        self.bins.iter().map(|bin| bin.magnitude).sum()
    }
}

/// Mains hum band: every integer multiple of `frequency_hz`, plus or minus
/// `tolerance_hz`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct HumBand {
    pub frequency_hz: f64,
    pub tolerance_hz: f64,
}

impl Default for HumBand {
    fn default() -> Self {
        Self {
            frequency_hz: 60.0,
            tolerance_hz: 1.05,
        }
    }
}

impl HumBand {
    /// `true` if `frequency` lies within tolerance of a hum harmonic.
    /// DC (0 Hz) is never hum.
    ///
    /// # Example
    /// ```
    /// use hm_core::spectrum::HumBand;
    /// let hum = HumBand::default();
    /// assert!(hum.contains(60.0));
    /// assert!(hum.contains(119.5));
    /// assert!(hum.contains(180.9));
    /// assert!(!hum.contains(0.0));
    /// assert!(!hum.contains(1000.0));
    /// ```
    #[must_use]
    pub fn contains(&self, frequency: f64) -> bool {
        if frequency == 0.0 || self.frequency_hz <= 0.0 {
            return false;
        }
        let offset = frequency.rem_euclid(self.frequency_hz);
        offset <= self.tolerance_hz || offset >= self.frequency_hz - self.tolerance_hz
    }
}
