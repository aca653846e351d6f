//! Buzzer pattern player.
//!
//! Beep patterns and the startup sweep run as repeating tasks in the
//! scheduler's [`Slot::Buzzer`]. Starting either one preempts whatever the
//! buzzer was doing: the tone is silenced on the spot and the preempted state
//! is dropped with its registration, never to tick again.

use std::time::{Duration, Instant};

use latchkey_core::Result;
use latchkey_hardware::{RelayOutput, ToneOutput};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actuators::Actuators;
use crate::scheduler::{Scheduler, Slot, TaskControl, TimerHandle};

/// A run of identical beeps.
///
/// Each beep is a tone of `interval_ms` followed by `interval_ms` of silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeepPattern {
    /// Number of audible beeps.
    pub beeps: u32,

    /// Tone frequency in hertz.
    pub frequency_hz: u32,

    /// Length of each tone and each gap, in milliseconds.
    pub interval_ms: u64,
}

impl BeepPattern {
    /// Create a new pattern.
    pub fn new(beeps: u32, frequency_hz: u32, interval_ms: u64) -> Self {
        Self {
            beeps,
            frequency_hz,
            interval_ms,
        }
    }

    /// Toggle interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Rising tone sweep played at power-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepPattern {
    /// Play the sweep at startup.
    pub enabled: bool,

    /// First frequency, in hertz.
    pub start_hz: u32,

    /// Last frequency (inclusive), in hertz.
    pub end_hz: u32,

    /// Increment between steps, in hertz.
    pub step_hz: u32,

    /// Duration of each step, in milliseconds.
    pub step_ms: u64,
}

impl SweepPattern {
    /// Step duration.
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }
}

impl Default for SweepPattern {
    fn default() -> Self {
        use latchkey_core::constants::*;
        Self {
            enabled: true,
            start_hz: DEFAULT_SWEEP_START_HZ,
            end_hz: DEFAULT_SWEEP_END_HZ,
            step_hz: DEFAULT_SWEEP_STEP_HZ,
            step_ms: DEFAULT_SWEEP_STEP_MS,
        }
    }
}

/// Progress of a running beep pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuzzerPatternState {
    total_toggles: u32,
    elapsed_toggles: u32,
    frequency_hz: u32,
    interval: Duration,
    tone_on: bool,
}

impl BuzzerPatternState {
    /// Fresh state for `pattern`: nothing played yet, tone off.
    pub fn new(pattern: &BeepPattern) -> Self {
        Self {
            total_toggles: pattern.beeps.saturating_mul(2),
            elapsed_toggles: 0,
            frequency_hz: pattern.frequency_hz,
            interval: pattern.interval(),
            tone_on: false,
        }
    }

    /// Toggles the pattern plays in total (two per beep).
    pub fn total_toggles(&self) -> u32 {
        self.total_toggles
    }

    /// Toggles played so far.
    pub fn elapsed_toggles(&self) -> u32 {
        self.elapsed_toggles
    }

    /// Time between toggles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the tone is currently sounding.
    pub fn is_tone_on(&self) -> bool {
        self.tone_on
    }

    /// Whether every toggle has been played.
    pub fn is_complete(&self) -> bool {
        self.elapsed_toggles >= self.total_toggles
    }

    /// Advance the pattern by one interval.
    ///
    /// Once complete, every further tick silences the tone and asks to be
    /// retired.
    pub fn tick<T: ToneOutput, R: RelayOutput>(
        &mut self,
        actuators: &mut Actuators<T, R>,
    ) -> TaskControl {
        if self.is_complete() {
            actuators.silence_tone();
            return TaskControl::Retire;
        }

        if self.tone_on {
            actuators.silence_tone();
        } else {
            actuators.emit_tone(self.frequency_hz);
        }
        self.tone_on = !self.tone_on;
        self.elapsed_toggles += 1;

        TaskControl::Continue
    }
}

/// Progress of the startup sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepState {
    next_hz: Option<u32>,
    end_hz: u32,
    step_hz: u32,
}

impl SweepState {
    /// Fresh state positioned at the first frequency.
    pub fn new(sweep: &SweepPattern) -> Self {
        Self {
            next_hz: Some(sweep.start_hz),
            end_hz: sweep.end_hz,
            step_hz: sweep.step_hz,
        }
    }

    /// Sound the next frequency, or silence and retire past the end.
    pub fn tick<T: ToneOutput, R: RelayOutput>(
        &mut self,
        actuators: &mut Actuators<T, R>,
    ) -> TaskControl {
        match self.next_hz {
            Some(hz) if hz <= self.end_hz => {
                actuators.emit_tone(hz);
                self.next_hz = hz.checked_add(self.step_hz).filter(|_| self.step_hz > 0);
                TaskControl::Continue
            }
            _ => {
                actuators.silence_tone();
                TaskControl::Retire
            }
        }
    }
}

/// Start a beep pattern, preempting anything in the buzzer slot.
///
/// The first toggle sounds one interval after `now`.
///
/// # Errors
///
/// Returns `Error::ZeroInterval` if the pattern interval is zero. The running
/// pattern, if any, is left alone.
pub fn start_pattern<T, R>(
    scheduler: &mut Scheduler<Actuators<T, R>>,
    actuators: &mut Actuators<T, R>,
    pattern: &BeepPattern,
    now: Instant,
) -> Result<TimerHandle>
where
    T: ToneOutput + 'static,
    R: RelayOutput + 'static,
{
    let mut state = BuzzerPatternState::new(pattern);
    debug!(
        beeps = pattern.beeps,
        frequency_hz = pattern.frequency_hz,
        interval_ms = pattern.interval_ms,
        "starting beep pattern"
    );
    preempt(scheduler, actuators, |scheduler| {
        scheduler.repeat_every(Slot::Buzzer, pattern.interval(), now, move |actuators| {
            state.tick(actuators)
        })
    })
}

/// Start the power-on sweep, preempting anything in the buzzer slot.
///
/// # Errors
///
/// Returns `Error::ZeroInterval` if the step duration is zero.
pub fn start_sweep<T, R>(
    scheduler: &mut Scheduler<Actuators<T, R>>,
    actuators: &mut Actuators<T, R>,
    sweep: &SweepPattern,
    now: Instant,
) -> Result<TimerHandle>
where
    T: ToneOutput + 'static,
    R: RelayOutput + 'static,
{
    let mut state = SweepState::new(sweep);
    debug!(start_hz = sweep.start_hz, end_hz = sweep.end_hz, "starting sweep");
    preempt(scheduler, actuators, |scheduler| {
        scheduler.repeat_every(Slot::Buzzer, sweep.step(), now, move |actuators| {
            state.tick(actuators)
        })
    })
}

/// Run `register` and, if it replaced a live buzzer task, cut that task's
/// tone immediately.
fn preempt<T, R>(
    scheduler: &mut Scheduler<Actuators<T, R>>,
    actuators: &mut Actuators<T, R>,
    register: impl FnOnce(&mut Scheduler<Actuators<T, R>>) -> Result<TimerHandle>,
) -> Result<TimerHandle>
where
    T: ToneOutput,
    R: RelayOutput,
{
    let occupied = scheduler.is_active(Slot::Buzzer);
    let handle = register(scheduler)?;
    if occupied {
        debug!("buzzer preempted");
        actuators.silence_tone();
    }
    Ok(handle)
}
