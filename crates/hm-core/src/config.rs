use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::spectrum::HumBand;

/// Prefix of environment variables that override configuration keys.
///
/// `HYDROMON_MIN_NOISE_DECIBELS` sets `min-noise-decibels`, and so on.
pub const ENV_PREFIX: &str = "HYDROMON_";

/// Upper bound of `bucket-count` after [`MonitorConfig::clamp_all`].
pub const MAX_BUCKET_COUNT: usize = 65_536;

/// Every key accepted by [`MonitorConfig::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "min-noise-decibels",
    "max-silence-decibels",
    "min-signal-ratio-percent",
    "hum-frequency-hz",
    "hum-tolerance-hz",
    "max-frequency-hz",
    "bucket-count",
];

/// Thresholds used to turn a spectrum into a status.
///
/// # Example
/// ```
/// use hm_core::config::ClassifierConfig;
/// let config = ClassifierConfig::default();
/// assert!((config.min_signal_ratio() - 14.0).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassifierConfig {
    /// Below this peak level the spectrum is silence.
    pub min_noise_decibels: f64,
    /// Upper edge of the hysteresis band; between the two levels the
    /// previous status is kept.
    pub max_silence_decibels: f64,
    /// Minimum non-hum / hum magnitude ratio, in percent, for `Online`.
    pub min_signal_ratio_percent: f64,
    /// Mains frequency whose harmonics count as hum.
    pub hum_frequency_hz: f64,
    /// Half-width of each hum harmonic.
    pub hum_tolerance_hz: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let hum = HumBand::default();
        Self {
            min_noise_decibels: -95.0,
            max_silence_decibels: -80.0,
            min_signal_ratio_percent: 1400.0,
            hum_frequency_hz: hum.frequency_hz,
            hum_tolerance_hz: hum.tolerance_hz,
        }
    }
}

impl ClassifierConfig {
    /// Signal ratio threshold as a plain factor (1400% -> 14.0).
    #[must_use]
    pub fn min_signal_ratio(&self) -> f64 {
        self.min_signal_ratio_percent / 100.0
    }

    #[must_use]
    pub fn hum_band(&self) -> HumBand {
        HumBand {
            frequency_hz: self.hum_frequency_hz,
            tolerance_hz: self.hum_tolerance_hz,
        }
    }
}

/// Layout of the log-frequency chart buckets.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChartConfig {
    /// Highest frequency a bucket can start at.
    pub max_frequency_hz: f64,
    /// Number of logarithmically spaced buckets.
    pub bucket_count: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_frequency_hz: 24_000.0,
            bucket_count: 1000,
        }
    }
}

/// Full configuration snapshot, built once and passed by reference into
/// every classification.
///
/// # Example
/// ```
/// use hm_core::config::MonitorConfig;
/// let mut config = MonitorConfig::default();
/// config.set("bucket-count", "200").unwrap();
/// assert_eq!(config.chart.bucket_count, 200);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MonitorConfig {
    pub classifier: ClassifierConfig,
    pub chart: ChartConfig,
}

impl MonitorConfig {
    /// Set one key from its textual value.
    ///
    /// Keys use the kebab-case names of [`CONFIG_KEYS`]; underscores and
    /// case are tolerated.
    ///
    /// # Errors
    /// Returns [`CoreError::UnknownKey`] or [`CoreError::InvalidValue`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let normalized = key.trim().to_ascii_lowercase().replace('_', "-");
        let c = &mut self.classifier;
        match normalized.as_str() {
            "min-noise-decibels" => c.min_noise_decibels = parse_value(key, value)?,
            "max-silence-decibels" => c.max_silence_decibels = parse_value(key, value)?,
            "min-signal-ratio-percent" => c.min_signal_ratio_percent = parse_value(key, value)?,
            "hum-frequency-hz" => c.hum_frequency_hz = parse_value(key, value)?,
            "hum-tolerance-hz" => c.hum_tolerance_hz = parse_value(key, value)?,
            "max-frequency-hz" => self.chart.max_frequency_hz = parse_value(key, value)?,
            "bucket-count" => self.chart.bucket_count = parse_value(key, value)?,
            _ => {
                return Err(CoreError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Apply a sequence of key/value overrides in order.
    ///
    /// # Errors
    /// Stops at the first key that fails [`MonitorConfig::set`].
    pub fn apply_pairs<K, V>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), CoreError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            self.set(key.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    /// Apply `HYDROMON_*` variables from `vars`, ignoring everything else.
    ///
    /// Returns how many overrides were applied.
    ///
    /// # Errors
    /// Fails on a prefixed variable with an unknown key or unparsable value.
    pub fn apply_env_vars(
        &mut self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<usize, CoreError> {
        let mut applied = 0;
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            self.set(key, &value)?;
            log::debug!("Config override from {name}: {value}");
            applied += 1;
        }
        Ok(applied)
    }

    /// Clamp numeric fields to usable ranges.
    /// Runs once on the fully merged config, see [`resolve_config`].
    pub fn clamp_all(&mut self) {
        let c = &mut self.classifier;
        c.min_signal_ratio_percent = c.min_signal_ratio_percent.max(0.0);
        if !(c.hum_frequency_hz.is_finite() && c.hum_frequency_hz > 0.0) {
            c.hum_frequency_hz = HumBand::default().frequency_hz;
        }
        if !c.hum_tolerance_hz.is_finite() {
            c.hum_tolerance_hz = HumBand::default().tolerance_hz;
        }
        c.hum_tolerance_hz = c.hum_tolerance_hz.clamp(0.0, c.hum_frequency_hz / 2.0);

        self.chart.bucket_count = self.chart.bucket_count.clamp(1, MAX_BUCKET_COUNT);
        if !(self.chart.max_frequency_hz.is_finite() && self.chart.max_frequency_hz >= 2.0) {
            self.chart.max_frequency_hz = 2.0;
        }
    }

    /// Reject combinations that clamping cannot repair.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if a threshold is not finite or the
    /// silence ceiling sits below the noise floor.
    pub fn validate(&self) -> Result<(), CoreError> {
        let c = &self.classifier;
        if !c.min_noise_decibels.is_finite() || !c.max_silence_decibels.is_finite() {
            return Err(CoreError::Config(
                "decibel thresholds must be finite".to_string(),
            ));
        }
        if c.min_noise_decibels > c.max_silence_decibels {
            return Err(CoreError::Config(format!(
                "min-noise-decibels ({}) is above max-silence-decibels ({})",
                c.min_noise_decibels, c.max_silence_decibels
            )));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CoreError> {
    value.trim().parse().map_err(|_| CoreError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// TOML file layout, every field optional for partial override.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    classifier: Option<ClassifierSection>,
    chart: Option<ChartSection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ClassifierSection {
    min_noise_decibels: Option<f64>,
    max_silence_decibels: Option<f64>,
    min_signal_ratio_percent: Option<f64>,
    hum_frequency_hz: Option<f64>,
    hum_tolerance_hz: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ChartSection {
    max_frequency_hz: Option<f64>,
    bucket_count: Option<usize>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this layout.
///
/// The result is neither clamped nor validated: later overrides may still
/// repair it, see [`resolve_config`].
///
/// # Example
/// ```
/// use hm_core::config::parse_config;
/// let config = parse_config("[classifier]\nmin-noise-decibels = -90.0\n").unwrap();
/// assert!((config.classifier.min_noise_decibels + 90.0).abs() < f64::EPSILON);
/// assert_eq!(config.chart.bucket_count, 1000);
/// ```
pub fn parse_config(content: &str) -> Result<MonitorConfig> {
    let file: ConfigFile = toml::from_str(content).context("TOML parse error")?;

    let mut config = MonitorConfig::default();

    if let Some(s) = file.classifier {
        let c = &mut config.classifier;
        if let Some(v) = s.min_noise_decibels {
            c.min_noise_decibels = v;
        }
        if let Some(v) = s.max_silence_decibels {
            c.max_silence_decibels = v;
        }
        if let Some(v) = s.min_signal_ratio_percent {
            c.min_signal_ratio_percent = v;
        }
        if let Some(v) = s.hum_frequency_hz {
            c.hum_frequency_hz = v;
        }
        if let Some(v) = s.hum_tolerance_hz {
            c.hum_tolerance_hz = v;
        }
    }

    if let Some(s) = file.chart {
        if let Some(v) = s.max_frequency_hz {
            config.chart.max_frequency_hz = v;
        }
        if let Some(v) = s.bucket_count {
            config.chart.bucket_count = v;
        }
    }

    Ok(config)
}

/// Load a TOML file and merge it over the defaults.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use hm_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("hydromon.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<MonitorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config in {}", path.display()))
}

/// Build the effective configuration once at startup.
///
/// Defaults, then the optional TOML file, then `HYDROMON_*` entries of
/// `vars`. Clamping and validation run once on the merged result.
///
/// # Errors
/// Returns an error if the file cannot be loaded, an override is invalid,
/// or the merged configuration fails [`MonitorConfig::validate`].
///
/// # Example
/// ```
/// use hm_core::config::resolve_config;
/// let vars = [("HYDROMON_BUCKET_COUNT".to_string(), "200".to_string())];
/// let config = resolve_config(None, vars).unwrap();
/// assert_eq!(config.chart.bucket_count, 200);
/// ```
pub fn resolve_config(
    path: Option<&Path>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<MonitorConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };
    let overrides = config
        .apply_env_vars(vars)
        .context("Invalid HYDROMON_* environment override")?;
    if overrides > 0 {
        log::info!("Applied {overrides} environment override(s)");
    }
    config.clamp_all();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
