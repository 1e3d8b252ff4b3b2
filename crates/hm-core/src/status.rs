use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status the classifier can assign to one channel, or to a whole sample.
///
/// Variants are declared in ascending priority so that `Ord` matches the
/// aggregation order: `Absent < Silent < Unintelligible < Online`.
///
/// # Example
/// ```
/// use hm_core::status::ChannelStatus;
/// assert!(ChannelStatus::Online > ChannelStatus::Unintelligible);
/// assert_eq!("silent".parse::<ChannelStatus>().unwrap(), ChannelStatus::Silent);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelStatus {
    /// No classification yet (first sample ever seen for a node).
    #[default]
    Absent,
    /// Spectrum sits at the noise floor.
    Silent,
    /// Energy present, but only (or mostly) mains hum.
    Unintelligible,
    /// Real signal outside the hum band.
    Online,
}

impl ChannelStatus {
    /// All values, lowest priority first.
    pub const ALL: [Self; 4] = [
        Self::Absent,
        Self::Silent,
        Self::Unintelligible,
        Self::Online,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Silent => "silent",
            Self::Unintelligible => "unintelligible",
            Self::Online => "online",
        }
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// Node-level status as kept by the status store.
///
/// A superset of [`ChannelStatus`]: the extra variants describe the node
/// itself (reachability, visibility, lag) and never come out of audio
/// analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    #[default]
    Absent,
    Silent,
    Unintelligible,
    Online,
    Offline,
    Hidden,
    Unauthorized,
    NoView,
    Lagged,
}

impl NodeStatus {
    pub const ALL: [Self; 9] = [
        Self::Absent,
        Self::Silent,
        Self::Unintelligible,
        Self::Online,
        Self::Offline,
        Self::Hidden,
        Self::Unauthorized,
        Self::NoView,
        Self::Lagged,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Silent => "silent",
            Self::Unintelligible => "unintelligible",
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Hidden => "hidden",
            Self::Unauthorized => "unauthorized",
            Self::NoView => "no-view",
            Self::Lagged => "lagged",
        }
    }

    /// The channel-level status carried by this value, if any.
    #[must_use]
    pub fn channel_status(self) -> Option<ChannelStatus> {
        match self {
            Self::Absent => Some(ChannelStatus::Absent),
            Self::Silent => Some(ChannelStatus::Silent),
            Self::Unintelligible => Some(ChannelStatus::Unintelligible),
            Self::Online => Some(ChannelStatus::Online),
            Self::Offline | Self::Hidden | Self::Unauthorized | Self::NoView | Self::Lagged => {
                None
            }
        }
    }

    /// Previous status to feed into the classifier's hysteresis band.
    ///
    /// Node-level-only values carry no audio history, so they seed as
    /// `Absent`.
    ///
    /// # Example
    /// ```
    /// use hm_core::status::{ChannelStatus, NodeStatus};
    /// assert_eq!(NodeStatus::Online.hysteresis_seed(), ChannelStatus::Online);
    /// assert_eq!(NodeStatus::Lagged.hysteresis_seed(), ChannelStatus::Absent);
    /// ```
    #[must_use]
    pub fn hysteresis_seed(self) -> ChannelStatus {
        self.channel_status().unwrap_or_else(|| {
            log::warn!("Node-level status '{self}' used as previous audio status, seeding as absent");
            ChannelStatus::Absent
        })
    }
}

impl From<ChannelStatus> for NodeStatus {
    fn from(status: ChannelStatus) -> Self {
        match status {
            ChannelStatus::Absent => Self::Absent,
            ChannelStatus::Silent => Self::Silent,
            ChannelStatus::Unintelligible => Self::Unintelligible,
            ChannelStatus::Online => Self::Online,
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_priority_order() {
        let mut all = ChannelStatus::ALL;
        all.reverse();
        all.sort();
        assert_eq!(all, ChannelStatus::ALL);
        assert_eq!(ChannelStatus::default(), ChannelStatus::Absent);
    }

    #[test]
    fn parse_round_trips_display() {
        for status in NodeStatus::ALL {
            assert_eq!(status.to_string().parse::<NodeStatus>(), Ok(status));
        }
        assert_eq!("NO_VIEW".parse::<NodeStatus>(), Ok(NodeStatus::NoView));
        assert_eq!(" Online ".parse::<ChannelStatus>(), Ok(ChannelStatus::Online));
        assert!("lagged".parse::<ChannelStatus>().is_err());
    }

    #[test]
    fn node_level_values_seed_as_absent() {
        for status in NodeStatus::ALL {
            let seed = status.hysteresis_seed();
            match status.channel_status() {
                Some(channel) => {
                    assert_eq!(seed, channel);
                    assert_eq!(NodeStatus::from(channel), status);
                }
                None => assert_eq!(seed, ChannelStatus::Absent),
            }
        }
    }
}
