// src/config/constants.rs
//! Named defaults and limits for the stimulation core

/// AP stimulus pulse defaults.
pub mod stim {
    pub const DEFAULT_AMPLITUDE: f64 = 1.0;
    pub const DEFAULT_WIDTH_S: f64 = 0.4e-3;
    pub const DEFAULT_DELAY_S: f64 = 0.15e-3;
    pub const DEFAULT_TRIAL_DURATION_S: f64 = 2.0;
}

/// HFAC blocking signal defaults.
pub mod hfac {
    pub const DEFAULT_FREQUENCY_HZ: f64 = 10_000.0;
    pub const DEFAULT_AMPLITUDE: f64 = 3.0;
}

/// Host-side execution defaults.
pub mod host {
    /// 100 kHz tick rate, fast enough to resolve a 10 kHz blocking signal.
    pub const DEFAULT_SAMPLE_PERIOD_S: f64 = 1e-5;
    pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 64;
}

/// Configuration file locations, in order of precedence.
pub mod paths {
    pub const DEFAULT_CONFIG_FILE: &str = "hfac.toml";
    pub const LOCAL_CONFIG_FILE: &str = "hfac.local.toml";
}
