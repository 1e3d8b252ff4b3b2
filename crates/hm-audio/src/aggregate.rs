use hm_core::status::ChannelStatus;

/// Combine two statuses, keeping the higher priority one.
///
/// Priority: `Online > Unintelligible > Silent > Absent`.
#[inline]
#[must_use]
pub fn merge(a: ChannelStatus, b: ChannelStatus) -> ChannelStatus {
    a.max(b)
}

/// Reduce per-channel statuses to one node status.
///
/// Starts from `Absent`, so an empty input yields `Absent` and any other
/// value overrides it.
///
/// # Example
/// ```
/// use hm_audio::aggregate::aggregate_status;
/// use hm_core::status::ChannelStatus::*;
/// assert_eq!(aggregate_status([Silent, Online]), Online);
/// assert_eq!(aggregate_status([Unintelligible, Silent]), Unintelligible);
/// assert_eq!(aggregate_status([]), Absent);
/// ```
#[must_use]
pub fn aggregate_status(statuses: impl IntoIterator<Item = ChannelStatus>) -> ChannelStatus {
    statuses.into_iter().fold(ChannelStatus::Absent, merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ChannelStatus::{Absent, Online, Silent, Unintelligible};

    #[test]
    fn absent_never_wins() {
        for status in ChannelStatus::ALL {
            assert_eq!(aggregate_status([Absent, status]), status);
            assert_eq!(aggregate_status([status, Absent]), status);
        }
    }

    #[test]
    fn priority_order() {
        assert_eq!(aggregate_status([Online, Silent]), Online);
        assert_eq!(aggregate_status([Silent, Unintelligible, Silent]), Unintelligible);
        assert_eq!(aggregate_status([Silent, Silent]), Silent);
        assert_eq!(aggregate_status([Unintelligible, Online, Absent]), Online);
    }

    #[test]
    fn order_independent() {
        let statuses = [Silent, Online, Unintelligible, Absent];
        let mut reversed = statuses;
        reversed.reverse();
        assert_eq!(aggregate_status(statuses), aggregate_status(reversed));
    }
}
