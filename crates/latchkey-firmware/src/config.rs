//! # Configuration
//!
//! Firmware settings loaded from a TOML file. Every section and field is
//! optional; anything left out takes the reference value from
//! [`latchkey_core::constants`].
//!
//! ```toml
//! [access]
//! authorized_uid = "B8 24 A4 51"
//! relay_hold_secs = 2
//!
//! [indicator]
//! authorized = "magenta"
//! unauthorized = "red"
//!
//! [buzzer.denied]
//! beeps = 3
//! frequency_hz = 1000
//! interval_ms = 100
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use latchkey_core::Identifier;
use latchkey_core::constants::*;
use latchkey_hardware::LedColor;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::buzzer::{BeepPattern, SweepPattern};
use crate::error::{FirmwareError, Result};

/// Complete firmware configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmwareConfig {
    /// Who gets in and for how long
    pub access: AccessConfig,
    /// Indicator colors per outcome
    pub indicator: IndicatorConfig,
    /// Beep patterns and the power-on sweep
    pub buzzer: BuzzerConfig,
    /// Loop cadence
    pub timing: TimingConfig,
}

/// Authorized identifier and relay hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// The single identifier that opens the lock
    pub authorized_uid: Identifier,
    /// Seconds the relay stays energized after a grant
    pub relay_hold_secs: u64,
}

impl AccessConfig {
    /// Relay hold as a duration.
    pub fn relay_hold(&self) -> Duration {
        Duration::from_secs(self.relay_hold_secs)
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            authorized_uid: Identifier::from_array(DEFAULT_AUTHORIZED_UID),
            relay_hold_secs: DEFAULT_RELAY_HOLD_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Shown at startup and after shutdown
    pub idle: LedColor,
    pub authorized: LedColor,
    pub unauthorized: LedColor,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            idle: LedColor::Off,
            authorized: LedColor::Magenta,
            unauthorized: LedColor::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuzzerConfig {
    pub granted: BeepPattern,
    pub denied: BeepPattern,
    pub startup_sweep: SweepPattern,
}

impl Default for BuzzerConfig {
    fn default() -> Self {
        Self {
            granted: BeepPattern::new(
                DEFAULT_GRANTED_BEEPS,
                DEFAULT_GRANTED_FREQUENCY_HZ,
                DEFAULT_BEEP_INTERVAL_MS,
            ),
            denied: BeepPattern::new(
                DEFAULT_DENIED_BEEPS,
                DEFAULT_DENIED_FREQUENCY_HZ,
                DEFAULT_BEEP_INTERVAL_MS,
            ),
            startup_sweep: SweepPattern::default(),
        }
    }
}

/// Cadence of the two runtime tickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Reader poll period in milliseconds
    pub poll_interval_ms: u64,
    /// Scheduler tick period in milliseconds
    pub tick_interval_ms: u64,
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl FirmwareConfig {
    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `FirmwareError::ConfigParse` for malformed TOML or an invalid
    /// identifier, and `FirmwareError::Core` if validation fails.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: FirmwareConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a file.
    ///
    /// Unlike a missing section, a missing file is an error: the caller asked
    /// for that file explicitly.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| FirmwareError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            path = %path.display(),
            authorized_uid = %config.access.authorized_uid,
            "loaded configuration"
        );
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject settings the firmware cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending field.
    pub fn validate(&self) -> latchkey_core::Result<()> {
        fn invalid(message: String) -> latchkey_core::Result<()> {
            Err(latchkey_core::Error::Config(message))
        }

        fn period(field: &str, value: u64, max: u64) -> latchkey_core::Result<()> {
            if value == 0 {
                return invalid(format!("{field} must be non-zero"));
            }
            if value > max {
                return invalid(format!("{field} must be at most {max}, got {value}"));
            }
            Ok(())
        }

        if self.access.relay_hold_secs > MAX_RELAY_HOLD_SECS {
            return invalid(format!(
                "access.relay_hold_secs must be at most {MAX_RELAY_HOLD_SECS}, got {}",
                self.access.relay_hold_secs
            ));
        }

        let patterns = [
            ("buzzer.granted", &self.buzzer.granted),
            ("buzzer.denied", &self.buzzer.denied),
        ];
        for (name, pattern) in patterns {
            period(&format!("{name}.interval_ms"), pattern.interval_ms, MAX_TONE_INTERVAL_MS)?;
            if pattern.beeps > 0 && pattern.frequency_hz == 0 {
                return invalid(format!("{name}.frequency_hz must be non-zero"));
            }
        }

        let sweep = &self.buzzer.startup_sweep;
        if sweep.enabled {
            period("buzzer.startup_sweep.step_ms", sweep.step_ms, MAX_TONE_INTERVAL_MS)?;
            if sweep.start_hz == 0 {
                return invalid("buzzer.startup_sweep.start_hz must be non-zero".to_string());
            }
            if sweep.end_hz < sweep.start_hz {
                return invalid("buzzer.startup_sweep.end_hz must not be below start_hz".to_string());
            }
        }

        period("timing.poll_interval_ms", self.timing.poll_interval_ms, MAX_LOOP_INTERVAL_MS)?;
        period("timing.tick_interval_ms", self.timing.tick_interval_ms, MAX_LOOP_INTERVAL_MS)
    }
}
