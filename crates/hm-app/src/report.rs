use hm_audio::AnalysisError;
use hm_audio::bucket::AlignedChart;
use hm_audio::classify::SpectrumStats;
use hm_audio::frequency_info::{FrequencyInfo, channel_name};
use hm_core::status::{ChannelStatus, NodeStatus};
use serde::Serialize;

/// What one run reports about a node.
///
/// Non-finite decibel values (a fully silent spectrum is at -inf dB)
/// serialize as JSON `null`.
#[derive(Debug, Serialize)]
pub struct Report {
    /// Status to store for the node and pass back as `--previous`.
    pub status: NodeStatus,
    pub previous: NodeStatus,
    /// True when analysis failed and `status` is `previous` unchanged.
    pub retained: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisReport>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub sample_rate: u32,
    pub fft_size: usize,
    pub summary: ChannelReport,
    pub channels: Vec<ChannelReport>,
    pub summary_chart: AlignedChart,
    pub hum_charts: Vec<AlignedChart>,
}

#[derive(Debug, Serialize)]
pub struct ChannelReport {
    pub name: String,
    pub status: ChannelStatus,
    pub stats: SpectrumStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_hum_decibels: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_non_hum_decibels: Option<f64>,
}

impl Report {
    /// Report a successful classification.
    #[must_use]
    pub fn from_info(info: &FrequencyInfo, previous: NodeStatus) -> Self {
        let channels = (0..info.channel_count)
            .map(|i| ChannelReport {
                name: channel_name(i),
                status: info.channel_statuses[i],
                stats: info.channel_stats[i],
                average_hum_decibels: info.average_hum_decibels(i),
                average_non_hum_decibels: info.average_non_hum_decibels(i),
            })
            .collect();
        let hum_charts = (0..info.channel_count)
            .filter_map(|i| info.hum_chart(i))
            .collect();

        Self {
            status: info.status.into(),
            previous,
            retained: false,
            error: None,
            analysis: Some(AnalysisReport {
                sample_rate: info.sample_rate,
                fft_size: info.fft_size,
                summary: ChannelReport {
                    name: "summary".to_string(),
                    status: info.summary_status,
                    stats: info.summary_stats,
                    average_hum_decibels: None,
                    average_non_hum_decibels: None,
                },
                channels,
                summary_chart: info.summary_chart(),
                hum_charts,
            }),
        }
    }

    /// Report a failed analysis: the node keeps its previous status.
    #[must_use]
    pub fn retained(previous: NodeStatus, error: &AnalysisError) -> Self {
        Self {
            status: previous,
            previous,
            retained: true,
            error: Some(error.to_string()),
            analysis: None,
        }
    }

    /// Human-readable summary, one line per channel.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!("status: {}", self.status);
        if self.retained {
            out.push_str(" (retained)");
        }
        out.push('\n');
        if let Some(ref error) = self.error {
            out.push_str(&format!("error: {error}\n"));
        }
        if let Some(ref analysis) = self.analysis {
            out.push_str(&format!(
                "input: {} Hz, {} channel(s), fft {}\n",
                analysis.sample_rate,
                analysis.channels.len(),
                analysis.fft_size
            ));
            for channel in std::iter::once(&analysis.summary).chain(&analysis.channels) {
                out.push_str(&format!(
                    "  {:<12} {:<15} peak {:>8} dB  ratio {:.2}\n",
                    channel.name,
                    channel.status.as_str(),
                    format_decibels(channel.stats.max_decibels),
                    channel.stats.signal_ratio
                ));
            }
        }
        out
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn format_decibels(db: f64) -> String {
    if db.is_finite() {
        format!("{db:.1}")
    } else {
        "-inf".to_string()
    }
}
