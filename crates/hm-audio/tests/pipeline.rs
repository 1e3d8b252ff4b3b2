//! End-to-end classification of synthetic PCM.
//!
//! Tones use 7680 Hz / 1024 frames so the bin spacing is exactly 7.5 Hz:
//! 60 Hz is bin 8 and 997.5 Hz is bin 133.

use hm_audio::{AnalysisError, analyze};
use hm_core::config::MonitorConfig;
use hm_core::status::ChannelStatus;

const RATE: u32 = 7680;
const FRAMES: usize = 1024;

fn tone(freq: f64, amplitude: f32) -> Vec<f32> {
    (0..FRAMES)
        .map(|i| {
            let t = i as f64 / f64::from(RATE);
            amplitude * (2.0 * std::f64::consts::PI * freq * t).sin() as f32
        })
        .collect()
}

fn interleave(channels: &[Vec<f32>]) -> Vec<f32> {
    (0..FRAMES)
        .flat_map(|i| channels.iter().map(move |ch| ch[i]))
        .collect()
}

#[test]
fn zeros_are_silent_for_any_layout() -> Result<(), AnalysisError> {
    let config = MonitorConfig::default();
    for channels in 1..=3 {
        for frames in [1usize, 17, 1000, 4096] {
            let pcm = vec![0.0f32; frames * channels];
            let info = analyze(&pcm, 44100, channels, ChannelStatus::Online, &config)?;
            assert_eq!(info.status, ChannelStatus::Silent);
            assert_eq!(info.summary_status, ChannelStatus::Silent);
            assert_eq!(info.channel_statuses, vec![ChannelStatus::Silent; channels]);
        }
    }
    Ok(())
}

#[test]
fn mains_hum_is_unintelligible() -> Result<(), AnalysisError> {
    let config = MonitorConfig::default();
    for freq in [60.0, 120.0, 180.0] {
        let pcm = tone(freq, 0.5);
        for previous in ChannelStatus::ALL {
            let info = analyze(&pcm, RATE, 1, previous, &config)?;
            assert_eq!(info.status, ChannelStatus::Unintelligible, "{freq} Hz");
        }
    }
    Ok(())
}

#[test]
fn clear_tone_is_online() -> Result<(), AnalysisError> {
    let config = MonitorConfig::default();
    let pcm = tone(997.5, 0.5);
    let info = analyze(&pcm, RATE, 1, ChannelStatus::Silent, &config)?;
    assert_eq!(info.status, ChannelStatus::Online);
    assert!(info.channel_stats[0].signal_ratio >= config.classifier.min_signal_ratio());
    Ok(())
}

#[test]
fn faint_tone_keeps_previous_status() -> Result<(), AnalysisError> {
    let config = MonitorConfig::default();
    // Peak around -87 dB: A * N / 4 = 10^(-87/20).
    let amplitude = (4.0 * 10f64.powf(-87.0 / 20.0) / FRAMES as f64) as f32;
    let pcm = tone(997.5, amplitude);
    for previous in ChannelStatus::ALL {
        let first = analyze(&pcm, RATE, 1, previous, &config)?;
        let max_db = first.channel_stats[0].max_decibels;
        assert!(max_db > -95.0 && max_db < -80.0, "peak {max_db} dB");
        assert_eq!(first.status, previous);
        let second = analyze(&pcm, RATE, 1, first.status, &config)?;
        assert_eq!(second.status, previous);
    }
    Ok(())
}

#[test]
fn aggregate_takes_highest_priority_channel() -> Result<(), AnalysisError> {
    let config = MonitorConfig::default();
    let silent = vec![0.0f32; FRAMES];

    let pcm = interleave(&[tone(997.5, 0.5), silent.clone()]);
    let info = analyze(&pcm, RATE, 2, ChannelStatus::Absent, &config)?;
    assert_eq!(
        info.channel_statuses,
        vec![ChannelStatus::Online, ChannelStatus::Silent]
    );
    assert_eq!(info.status, ChannelStatus::Online);

    let pcm = interleave(&[silent, tone(60.0, 0.5)]);
    let info = analyze(&pcm, RATE, 2, ChannelStatus::Absent, &config)?;
    assert_eq!(
        info.channel_statuses,
        vec![ChannelStatus::Silent, ChannelStatus::Unintelligible]
    );
    assert_eq!(info.status, ChannelStatus::Unintelligible);
    Ok(())
}

#[test]
fn invalid_input_is_rejected() {
    let config = MonitorConfig::default();
    let previous = ChannelStatus::Online;
    assert!(matches!(
        analyze(&[], 44100, 1, previous, &config),
        Err(AnalysisError::InvalidInput(_))
    ));
    assert!(matches!(
        analyze(&[0.0; 8], 0, 1, previous, &config),
        Err(AnalysisError::InvalidInput(_))
    ));
    assert!(matches!(
        analyze(&[0.0; 7], 44100, 2, previous, &config),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn charts_cover_every_series() -> Result<(), AnalysisError> {
    let config = MonitorConfig::default();
    let pcm = interleave(&[tone(60.0, 0.5), tone(997.5, 0.5)]);
    let info = analyze(&pcm, RATE, 2, ChannelStatus::Absent, &config)?;

    let chart = info.summary_chart();
    assert_eq!(chart.series.len(), 3);
    assert_eq!(chart.series[0].name, "summary");
    assert_eq!(chart.series[2].name, "channel-1");
    assert!(chart.series.iter().all(|s| s.values.len() == chart.labels.len()));

    let Some(hum_chart) = info.hum_chart(0) else {
        panic!("channel 0 should have a hum chart");
    };
    let hum = &hum_chart.series[0];
    let non_hum = &hum_chart.series[1];
    // Hum and non-hum bins never share a bucket label here, so every label
    // is a gap in exactly one of the two series.
    for (h, n) in hum.values.iter().zip(&non_hum.values) {
        assert!(h.is_some() != n.is_some());
    }
    assert!(info.hum_chart(2).is_none());

    let loudest_hum = info.hum_series[0]
        .points()
        .iter()
        .max_by(|a, b| a.decibels.total_cmp(&b.decibels))
        .map(|p| p.label);
    assert_eq!(loudest_hum, Some(60));

    let Some(hum_db) = info.average_hum_decibels(0) else {
        panic!("channel 0 exists");
    };
    assert!(hum_db.is_finite());
    assert!(info.average_non_hum_decibels(0).is_some());
    assert!(info.average_hum_decibels(5).is_none());
    Ok(())
}
