//! Mock buzzer tone generator.

use crate::{Result, traits::ToneOutput};
use tracing::debug;

/// Command received by a [`MockTone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneEvent {
    /// Tone started at the given frequency in hertz.
    Emit(u32),

    /// Tone stopped.
    Silence,
}

/// Mock tone generator recording every command.
#[derive(Debug, Default)]
pub struct MockTone {
    events: Vec<ToneEvent>,
    frequency: Option<u32>,
}

impl MockTone {
    /// Create a new silent tone generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received, oldest first.
    pub fn events(&self) -> &[ToneEvent] {
        &self.events
    }

    /// Frequency currently sounding, or `None` when silent.
    pub fn frequency(&self) -> Option<u32> {
        self.frequency
    }

    /// Number of tone pulses started.
    pub fn pulse_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ToneEvent::Emit(_)))
            .count()
    }

    /// Forget recorded events, keeping the current output state.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ToneOutput for MockTone {
    fn emit(&mut self, frequency_hz: u32) -> Result<()> {
        debug!("tone: {frequency_hz} Hz");
        self.events.push(ToneEvent::Emit(frequency_hz));
        self.frequency = Some(frequency_hz);
        Ok(())
    }

    fn silence(&mut self) -> Result<()> {
        debug!("tone: silent");
        self.events.push(ToneEvent::Silence);
        self.frequency = None;
        Ok(())
    }
}
