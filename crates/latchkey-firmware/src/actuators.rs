//! Timed actuator outputs handed to scheduler callbacks.

use latchkey_hardware::{RelayOutput, ToneOutput};
use tracing::warn;

/// The buzzer and relay drivers, owned together so scheduled tasks can
/// drive them from the tick without touching the decision loop.
///
/// Driver failures are logged and absorbed: a missed beep or a failed GPIO
/// write must not stop the loop.
#[derive(Debug)]
pub struct Actuators<T, R> {
    tone: T,
    relay: R,
}

impl<T: ToneOutput, R: RelayOutput> Actuators<T, R> {
    /// Bundle a tone generator and a relay.
    pub fn new(tone: T, relay: R) -> Self {
        Self { tone, relay }
    }

    /// Start a tone, logging any driver failure.
    pub fn emit_tone(&mut self, frequency_hz: u32) {
        if let Err(e) = self.tone.emit(frequency_hz) {
            warn!(error = %e, frequency_hz, "tone driver failed to start");
        }
    }

    /// Stop the tone, logging any driver failure.
    pub fn silence_tone(&mut self) {
        if let Err(e) = self.tone.silence() {
            warn!(error = %e, "tone driver failed to stop");
        }
    }

    /// Drive the relay, logging any driver failure.
    pub fn set_relay(&mut self, energized: bool) {
        if let Err(e) = self.relay.set_energized(energized) {
            warn!(error = %e, energized, "relay driver write failed");
        }
    }

    /// Tone generator driver.
    pub fn tone(&self) -> &T {
        &self.tone
    }

    /// Relay driver.
    pub fn relay(&self) -> &R {
        &self.relay
    }
}
