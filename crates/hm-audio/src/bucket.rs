use std::collections::{BTreeMap, BTreeSet};

use hm_core::config::ChartConfig;
use hm_core::spectrum::{Spectrum, decibels};
use serde::Serialize;

/// Loudest bin of one chart bucket.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BucketPoint {
    /// Integer label, the representative frequency truncated to whole Hz.
    pub label: u64,
    /// Frequency of the bin that produced `decibels`.
    pub frequency: f64,
    /// Loudest level seen in the bucket; may be negative infinity.
    pub decibels: f64,
}

/// Bucketed spectrum, ascending by label with no duplicate labels.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BucketSeries {
    points: Vec<BucketPoint>,
}

impl BucketSeries {
    #[must_use]
    pub fn points(&self) -> &[BucketPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Labels as chart strings, in emission order.
    pub fn labels(&self) -> impl Iterator<Item = String> + '_ {
        self.points.iter().map(|p| p.label.to_string())
    }

    /// Level for `label`, `None` when the series has no such bucket.
    #[must_use]
    pub fn get(&self, label: u64) -> Option<f64> {
        self.points
            .binary_search_by_key(&label, |p| p.label)
            .ok()
            .map(|i| self.points[i].decibels)
    }

    /// Mean of the finite levels in the series.
    ///
    /// An empty series (or one with only infinite levels) averages to 0,
    /// which callers must read as "no data" rather than a real 0 dB.
    ///
    /// # Example
    /// ```
    /// use hm_audio::bucket::Bucketizer;
    /// use hm_core::config::ChartConfig;
    /// use hm_core::spectrum::Spectrum;
    /// let bucketizer = Bucketizer::new(&ChartConfig::default());
    /// let series = bucketizer.bucketize(&Spectrum::from_magnitudes([0.0, 1.0, 10.0], 100.0));
    /// // 0 dB and 20 dB, the DC bin at -inf is skipped.
    /// assert!((series.average_decibels() - 10.0).abs() < 1e-9);
    /// assert_eq!(bucketizer.bucketize(&Spectrum::default()).average_decibels(), 0.0);
    /// ```
    #[must_use]
    pub fn average_decibels(&self) -> f64 {
        let (sum, count) = self
            .points
            .iter()
            .map(|p| p.decibels)
            .filter(|db| db.is_finite())
            .fold((0.0, 0usize), |(sum, count), db| (sum + db, count + 1));
        if count == 0 {
            return 0.0;
        }
        sum / count as f64
    }
}

/// Reduces a spectrum to log-spaced buckets for charting.
///
/// Bucket `i` starts at `b^i` Hz with `b = max_frequency^(1/bucket_count)`;
/// everything below 1 Hz lands in bucket 0 and everything above the last
/// boundary in the last bucket.
#[derive(Clone, Debug)]
pub struct Bucketizer {
    bucket_count: usize,
    /// `ln(b)`.
    log_base: f64,
}

impl Bucketizer {
    #[must_use]
    pub fn new(config: &ChartConfig) -> Self {
        let bucket_count = config.bucket_count.max(1);
        let max_frequency = config.max_frequency_hz.max(2.0);
        Self {
            bucket_count,
            log_base: max_frequency.ln() / bucket_count as f64,
        }
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Bucket index for `frequency`.
    ///
    /// # Example
    /// ```
    /// use hm_audio::bucket::Bucketizer;
    /// use hm_core::config::ChartConfig;
    /// let b = Bucketizer::new(&ChartConfig::default());
    /// assert_eq!(b.bucket_index(0.0), 0);
    /// assert_eq!(b.bucket_index(0.5), 0);
    /// assert_eq!(b.bucket_index(1_000_000.0), 999);
    /// assert!(b.bucket_index(100.0) < b.bucket_index(1000.0));
    /// ```
    #[must_use]
    pub fn bucket_index(&self, frequency: f64) -> usize {
        if frequency.is_nan() || frequency < 1.0 {
            return 0;
        }
        let index = (frequency.ln() / self.log_base).floor() as usize;
        index.min(self.bucket_count - 1)
    }

    /// Bucket `spectrum`, keeping the loudest bin of each bucket.
    ///
    /// Only non-empty buckets are emitted, ascending by frequency. Two
    /// buckets whose representatives truncate to the same whole Hz are
    /// merged, keeping the louder one.
    #[must_use]
    pub fn bucketize(&self, spectrum: &Spectrum) -> BucketSeries {
        // Sparse: memory follows the bin count, not the bucket count.
        let mut buckets: BTreeMap<usize, (f64, f64)> = BTreeMap::new();

        for bin in spectrum.iter() {
            let db = decibels(bin.magnitude);
            buckets
                .entry(self.bucket_index(bin.frequency))
                .and_modify(|best| {
                    if db > best.1 {
                        *best = (bin.frequency, db);
                    }
                })
                .or_insert((bin.frequency, db));
        }

        let mut points: Vec<BucketPoint> = Vec::new();
        for (frequency, db) in buckets.into_values() {
            let label = frequency as u64;
            match points.last_mut() {
                Some(last) if last.label == label => {
                    if db > last.decibels {
                        last.frequency = frequency;
                        last.decibels = db;
                    }
                }
                _ => points.push(BucketPoint {
                    label,
                    frequency,
                    decibels: db,
                }),
            }
        }

        BucketSeries { points }
    }
}

/// One named series re-indexed onto a shared label axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub name: String,
    /// One entry per chart label; `None` where the series has no bucket.
    pub values: Vec<Option<f64>>,
}

/// Several series sharing one sorted label axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AlignedChart {
    pub labels: Vec<String>,
    pub series: Vec<AlignedSeries>,
}

/// Align named series onto the union of their labels.
///
/// Labels are sorted numerically. A series missing a label reports `None`
/// for it, so charts draw a gap instead of a dip to zero.
///
/// # Example
/// ```
/// use hm_audio::bucket::{align, Bucketizer};
/// use hm_core::config::ChartConfig;
/// use hm_core::spectrum::Spectrum;
///
/// let b = Bucketizer::new(&ChartConfig::default());
/// let low = b.bucketize(&Spectrum::from_magnitudes([0.0, 1.0], 100.0));
/// let high = b.bucketize(&Spectrum::from_magnitudes([0.0, 0.0, 1.0], 100.0));
/// let chart = align(&[("low", &low), ("high", &high)]);
/// assert_eq!(chart.labels, vec!["0", "100", "200"]);
/// assert_eq!(chart.series[0].values[2], None);
/// assert_eq!(chart.series[1].values[1], Some(f64::NEG_INFINITY));
/// ```
#[must_use]
pub fn align(series: &[(&str, &BucketSeries)]) -> AlignedChart {
    let axis: BTreeSet<u64> = series
        .iter()
        .flat_map(|(_, s)| s.points.iter().map(|p| p.label))
        .collect();

    let aligned = series
        .iter()
        .map(|(name, s)| AlignedSeries {
            name: (*name).to_string(),
            values: axis.iter().map(|&label| s.get(label)).collect(),
        })
        .collect();

    AlignedChart {
        labels: axis.iter().map(u64::to_string).collect(),
        series: aligned,
    }
}
