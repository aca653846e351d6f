//! Tick-driven actuation scheduler.
//!
//! The scheduler holds at most one timed task per named [`Slot`] and fires
//! due tasks when [`Scheduler::run_due`] is called with the current time.
//! Nothing here sleeps: the caller decides how often to tick, and the main
//! loop stays free to poll the reader between ticks.
//!
//! # Slots
//!
//! Each actuator sequence owns a slot. Registering into an occupied slot
//! drops the previous task, closure state included, before the new one is
//! armed. A task's state therefore has exactly one writer at any time: its
//! own callback.
//!
//! # Examples
//!
//! ```
//! use std::time::{Duration, Instant};
//! use latchkey_firmware::scheduler::{Scheduler, Slot, TaskControl};
//!
//! let mut scheduler: Scheduler<Vec<&str>> = Scheduler::new();
//! let t0 = Instant::now();
//!
//! scheduler
//!     .run_once_after(Slot::Relay, Duration::from_secs(2), t0, |log| log.push("release"))
//!     .unwrap();
//!
//! let mut log = Vec::new();
//! assert_eq!(scheduler.run_due(t0 + Duration::from_secs(1), &mut log), 0);
//! assert_eq!(scheduler.run_due(t0 + Duration::from_secs(2), &mut log), 1);
//! assert_eq!(log, vec!["release"]);
//! assert!(!scheduler.is_active(Slot::Relay));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use latchkey_core::{Error, Result};
use tracing::{trace, warn};

/// Named registration slot.
///
/// The declaration order is the tie-break when two slots fall due at the
/// same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// Buzzer beep pattern or startup sweep.
    Buzzer,

    /// Pending lock relay release.
    Relay,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Buzzer => write!(f, "buzzer"),
            Slot::Relay => write!(f, "relay"),
        }
    }
}

/// What a callback wants after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    /// Keep a repeating task armed for its next interval.
    Continue,

    /// Remove the task from its slot.
    Retire,
}

/// Identifies one registration.
///
/// A handle goes stale once its task retires or is replaced; cancelling a
/// stale handle does nothing, so it can never remove a newer task that took
/// over the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    slot: Slot,
    generation: u64,
}

type Callback<C> = Box<dyn FnMut(&mut C) -> TaskControl + Send>;

#[derive(Debug, Clone, Copy)]
enum Cadence {
    Every(Duration),
    Once,
}

struct Registration<C> {
    generation: u64,
    due: Instant,
    cadence: Cadence,
    callback: Callback<C>,
}

/// Cooperative timer service over a caller-supplied clock.
///
/// `C` is the context handed to every callback, typically the actuator
/// drivers. Callbacks cannot reach the scheduler itself, so a running task
/// never re-registers or cancels anything mid-tick.
pub struct Scheduler<C> {
    slots: BTreeMap<Slot, Registration<C>>,
    next_generation: u64,
}

impl<C> Scheduler<C> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            next_generation: 0,
        }
    }

    /// Invoke `callback` once per elapsed `interval`, starting one interval
    /// after `now`, until it returns [`TaskControl::Retire`] or is cancelled.
    ///
    /// Replaces any task already in `slot`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ZeroInterval` if `interval` is zero.
    pub fn repeat_every<F>(
        &mut self,
        slot: Slot,
        interval: Duration,
        now: Instant,
        callback: F,
    ) -> Result<TimerHandle>
    where
        F: FnMut(&mut C) -> TaskControl + Send + 'static,
    {
        if interval.is_zero() {
            return Err(Error::ZeroInterval {
                slot: slot.to_string(),
            });
        }

        let due = deadline(slot, now, interval)?;
        Ok(self.register(slot, due, Cadence::Every(interval), Box::new(callback)))
    }

    /// Invoke `callback` exactly once, `delay` after `now`.
    ///
    /// Replaces any task already in `slot`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeadlineOverflow` if `now + delay` is not a
    /// representable instant. The slot is left untouched.
    pub fn run_once_after<F>(
        &mut self,
        slot: Slot,
        delay: Duration,
        now: Instant,
        callback: F,
    ) -> Result<TimerHandle>
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        let due = deadline(slot, now, delay)?;
        let mut callback = Some(callback);
        Ok(self.register(
            slot,
            due,
            Cadence::Once,
            Box::new(move |context| {
                if let Some(callback) = callback.take() {
                    callback(context);
                }
                TaskControl::Retire
            }),
        ))
    }

    /// Cancel a registration if it is still the live task for its slot.
    ///
    /// Returns `true` if a task was removed.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        self.slots.remove(&handle.slot);
        trace!(slot = %handle.slot, "task cancelled");
        true
    }

    /// Cancel whatever task occupies `slot`.
    ///
    /// Returns `true` if a task was removed.
    pub fn cancel_slot(&mut self, slot: Slot) -> bool {
        self.slots.remove(&slot).is_some()
    }

    /// Whether `slot` holds a task.
    pub fn is_active(&self, slot: Slot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Whether `handle` still refers to the task in its slot.
    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.slots
            .get(&handle.slot)
            .is_some_and(|reg| reg.generation == handle.generation)
    }

    /// Occupied slots, in slot order.
    pub fn active_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.slots.keys().copied()
    }

    /// Earliest instant at which some task falls due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.values().map(|reg| reg.due).min()
    }

    /// Fire every task due at or before `now`.
    ///
    /// Tasks fire in strictly increasing deadline order. A repeating task
    /// that is several intervals overdue fires once per elapsed interval.
    /// Returns the number of callbacks invoked.
    pub fn run_due(&mut self, now: Instant, context: &mut C) -> usize {
        let mut fired = 0;

        while let Some(slot) = self.earliest_due(now) {
            let Some(mut reg) = self.slots.remove(&slot) else {
                break;
            };

            let control = (reg.callback)(context);
            fired += 1;

            match (control, reg.cadence) {
                (TaskControl::Continue, Cadence::Every(interval)) => {
                    match reg.due.checked_add(interval) {
                        Some(due) => {
                            reg.due = due;
                            self.slots.insert(slot, reg);
                        }
                        None => warn!(%slot, "next deadline out of range, task retired"),
                    }
                }
                _ => trace!(%slot, "task retired"),
            }
        }

        fired
    }

    fn register(
        &mut self,
        slot: Slot,
        due: Instant,
        cadence: Cadence,
        callback: Callback<C>,
    ) -> TimerHandle {
        let generation = self.next_generation;
        self.next_generation += 1;

        let reg = Registration {
            generation,
            due,
            cadence,
            callback,
        };

        if self.slots.insert(slot, reg).is_some() {
            trace!(%slot, "previous task replaced");
        }

        TimerHandle { slot, generation }
    }

    fn earliest_due(&self, now: Instant) -> Option<Slot> {
        self.slots
            .iter()
            .filter(|(_, reg)| reg.due <= now)
            .min_by_key(|(slot, reg)| (reg.due, **slot))
            .map(|(slot, _)| *slot)
    }
}

fn deadline(slot: Slot, now: Instant, after: Duration) -> Result<Instant> {
    now.checked_add(after).ok_or_else(|| Error::DeadlineOverflow {
        slot: slot.to_string(),
    })
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("active_slots", &self.slots.keys().collect::<Vec<_>>())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}
