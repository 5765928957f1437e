// tests/config_integration.rs
//! Configuration file to running sequencer, end to end

use hfac_core::config::{ConfigLoader, TrialConfig};
use hfac_core::engine::{ProtocolSequencer, SequencerState};
use hfac_core::waveform::PulsePolarity;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn loaded_config_drives_a_trial() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[timing]
stim_amplitude = 2.0
stim_width_s = 0.0045
stim_delay_s = 0.0025
hfac_frequency_hz = 10.0
hfac_amplitude = 3.0
trial_duration_s = 0.05
polarity = "NegativeThenPositive"

[host]
sample_period_s = 0.001
event_queue_capacity = 8
        "#
    )
    .unwrap();

    let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()]);
    let config = loader.load().unwrap();
    assert_eq!(config.timing.polarity, PulsePolarity::NegativeThenPositive);

    let mut seq =
        ProtocolSequencer::new(config.timing, config.host.sample_period_s).unwrap();
    seq.send_single_pulse();

    // 2 delay zeros, then the negative lobe leads at the configured
    // amplitude.
    assert_eq!(seq.tick().ap_stim, 0.0);
    assert_eq!(seq.tick().ap_stim, 0.0);
    assert_eq!(seq.tick().ap_stim, -2.0);

    while seq.state() == SequencerState::PulseActive {
        let _ = seq.tick();
    }
    assert_eq!(seq.state(), SequencerState::Idle);
}

#[test]
fn exported_config_reloads_identically() {
    let file = NamedTempFile::new().unwrap();
    let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()]);

    let mut config = TrialConfig::default();
    config.timing.hfac_frequency_hz = 2500.0;
    config.timing.polarity = PulsePolarity::NegativeThenPositive;
    config.host.sample_period_s = 2e-5;

    loader.export_config(&config, file.path()).unwrap();
    let reloaded = loader.load().unwrap();
    assert_eq!(reloaded, config);
}
