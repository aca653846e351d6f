//! Relay delay controller.
//!
//! The relay is energized on the spot and its release is a one-shot task in
//! [`Slot::Relay`]. Activating again while a release is pending replaces
//! that release, so the hold window restarts instead of stacking.

use std::time::{Duration, Instant};

use latchkey_core::Result;
use latchkey_hardware::{RelayOutput, ToneOutput};
use tracing::debug;

use crate::actuators::Actuators;
use crate::scheduler::{Scheduler, Slot, TimerHandle};

/// Energize the relay now and release it `hold` after `now`.
///
/// # Errors
///
/// Returns `Error::DeadlineOverflow` if the release cannot be scheduled. The
/// relay is not energized in that case, and any pending release stays armed.
pub fn activate_then_release<T, R>(
    scheduler: &mut Scheduler<Actuators<T, R>>,
    actuators: &mut Actuators<T, R>,
    hold: Duration,
    now: Instant,
) -> Result<TimerHandle>
where
    T: ToneOutput + 'static,
    R: RelayOutput + 'static,
{
    let handle = scheduler.run_once_after(Slot::Relay, hold, now, |actuators| {
        debug!("relay hold elapsed");
        actuators.set_relay(false);
    })?;

    actuators.set_relay(true);
    debug!(?hold, "relay energized");
    Ok(handle)
}

/// Drop any pending release and de-energize the relay immediately.
pub fn release_now<T, R>(
    scheduler: &mut Scheduler<Actuators<T, R>>,
    actuators: &mut Actuators<T, R>,
) where
    T: ToneOutput,
    R: RelayOutput,
{
    scheduler.cancel_slot(Slot::Relay);
    actuators.set_relay(false);
}
