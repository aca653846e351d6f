//! Reference values for the access-control firmware.
//!
//! These constants are the defaults used when no configuration file
//! overrides them. They describe a single-door installation: one authorized
//! card, a status pixel, a piezo buzzer and a lock relay.
//!
//! # Usage
//!
//! ```
//! use latchkey_core::constants::*;
//! use std::time::Duration;
//!
//! let beep = Duration::from_millis(DEFAULT_BEEP_INTERVAL_MS);
//! assert_eq!(beep.as_millis(), 100);
//! assert!(DEFAULT_AUTHORIZED_UID.len() >= MIN_UID_LENGTH);
//! ```

// ============================================================================
// Card Identifiers
// ============================================================================

/// Minimum card identifier length in bytes (single-size ISO 14443A UID).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum card identifier length in bytes (triple-size ISO 14443A UID).
pub const MAX_UID_LENGTH: usize = 10;

/// Authorized card identifier used when the configuration does not name one.
pub const DEFAULT_AUTHORIZED_UID: [u8; 4] = [0xB8, 0x24, 0xA4, 0x51];

// ============================================================================
// Buzzer Patterns
// ============================================================================

/// Beeps played when an authorized card is presented.
pub const DEFAULT_GRANTED_BEEPS: u32 = 1;

/// Tone frequency for the authorized beep, in hertz.
pub const DEFAULT_GRANTED_FREQUENCY_HZ: u32 = 1500;

/// Beeps played when an unknown card is presented.
pub const DEFAULT_DENIED_BEEPS: u32 = 3;

/// Tone frequency for the unauthorized beeps, in hertz.
///
/// Lower than [`DEFAULT_GRANTED_FREQUENCY_HZ`] so the two outcomes are
/// distinguishable by ear.
pub const DEFAULT_DENIED_FREQUENCY_HZ: u32 = 1000;

/// Duration of one tone toggle (beep length and gap length), in milliseconds.
pub const DEFAULT_BEEP_INTERVAL_MS: u64 = 100;

/// Longest accepted beep interval or sweep step, in milliseconds.
pub const MAX_TONE_INTERVAL_MS: u64 = 10_000;

// ============================================================================
// Startup Sweep
// ============================================================================

/// First frequency of the power-on sweep, in hertz.
pub const DEFAULT_SWEEP_START_HZ: u32 = 500;

/// Last frequency of the power-on sweep, in hertz (inclusive).
pub const DEFAULT_SWEEP_END_HZ: u32 = 1500;

/// Frequency increment between sweep steps, in hertz.
pub const DEFAULT_SWEEP_STEP_HZ: u32 = 100;

/// Duration of each sweep step, in milliseconds.
pub const DEFAULT_SWEEP_STEP_MS: u64 = 100;

// ============================================================================
// Relay
// ============================================================================

/// How long the lock relay stays energized after an authorized card, in seconds.
pub const DEFAULT_RELAY_HOLD_SECS: u64 = 2;

/// Longest accepted relay hold, in seconds.
pub const MAX_RELAY_HOLD_SECS: u64 = 3600;

// ============================================================================
// Timing
// ============================================================================

/// Interval between reader presence polls, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Scheduler tick resolution, in milliseconds.
///
/// Must be no coarser than the shortest buzzer interval or beeps will be
/// stretched to the tick period.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// Longest accepted poll or tick period, in milliseconds.
pub const MAX_LOOP_INTERVAL_MS: u64 = 60_000;

/// Number of decision-loop state transitions retained for diagnostics.
pub const MAX_TRANSITION_HISTORY: usize = 64;
