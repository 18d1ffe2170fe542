//! Context configuration.

use serde::{Deserialize, Serialize};

/// Utterance segmentation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Treat the entire buffered stream as a single utterance on demand.
    OneShot,
    /// Run the energy-based VAD state machine continuously.
    FreeRunning,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::FreeRunning
    }
}

/// Mutable configuration for a `Context`. Safe to change between calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sample rate, in Hz, of the audio that will be passed to `feed_input`.
    pub input_sample_rate: u32,
    pub mode: Mode,
    /// If set, consecutive input samples are paired and summed (stereo -> mono)
    /// before resampling. See spec §4.1 and §9 for the odd-length edge case.
    pub downmix_stereo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_sample_rate: 16_000,
            mode: Mode::default(),
            downmix_stereo: false,
        }
    }
}

impl Config {
    /// Serializes this configuration as JSON, the same way the teacher
    /// codebase persists plugin preset state.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Restores a configuration previously written by [`Config::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let config = Config {
            input_sample_rate: 44_100,
            mode: Mode::OneShot,
            downmix_stereo: true,
        };
        let json = config.to_json().unwrap();
        let restored = Config::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }
}
