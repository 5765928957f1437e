//! Offline trial runner
//!
//! Drives one timed protocol trial without a real-time host: loads a TOML
//! trial configuration (or the built-in defaults), runs the sequencer tick
//! loop to completion, streams per-tick samples as CSV to stdout, and
//! reports sequencer events on stderr.
//!
//! ```bash
//! trial-runner [config.toml] > trial.csv
//! ```

use hfac_core::config::{ConfigLoader, TrialConfig};
use hfac_core::engine::{ProtocolSequencer, SequencerState};
use hfac_core::host::ChannelSink;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

fn main() -> ExitCode {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to install log subscriber");
        return ExitCode::FAILURE;
    }

    let config = match load_config(std::env::args().nth(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run_trial(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("trial failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<String>) -> Result<TrialConfig, hfac_core::config::ConfigError> {
    let loader = match path {
        Some(path) => ConfigLoader::with_paths(vec![PathBuf::from(path)]),
        None => ConfigLoader::new(),
    };
    loader.load()
}

fn run_trial(config: &TrialConfig) -> Result<(), Box<dyn std::error::Error>> {
    let dt = config.host.sample_period_s;
    let (sink, events) = ChannelSink::bounded(config.host.event_queue_capacity);
    let mut seq = ProtocolSequencer::with_sink(config.timing, dt, sink)?;

    info!(
        trial_duration_s = config.timing.trial_duration_s,
        sample_period_s = dt,
        "starting protocol trial"
    );
    seq.run_protocol();

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    writeln!(out, "time_s,ap_stim,hfac")?;
    loop {
        let t = seq.systime();
        let sample = seq.tick();
        writeln!(out, "{t},{},{}", sample.ap_stim, sample.hfac)?;
        if seq.state() == SequencerState::Idle {
            break;
        }
    }
    out.flush()?;

    for event in events.try_iter() {
        info!(?event, "sequencer event");
    }
    info!(ticks = seq.elapsed_ticks(), "trial complete");

    Ok(())
}
