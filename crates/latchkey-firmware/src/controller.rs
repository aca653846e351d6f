//! Authorization decision loop.
//!
//! [`AccessController`] owns the reader, the indicator and the timed
//! actuators. Each [`poll`](AccessController::poll) runs one iteration of the
//! card flow; [`tick`](AccessController::tick) advances buzzer patterns and
//! relay releases independently of the poll cadence.

use std::collections::VecDeque;
use std::time::Instant;

use latchkey_core::Identifier;
use latchkey_hardware::{CardReader, Indicator, LedColor, RelayOutput, ToneOutput};
use tracing::{debug, info, warn};

use crate::actuators::Actuators;
use crate::buzzer;
use crate::config::FirmwareConfig;
use crate::error::Result;
use crate::relay;
use crate::scheduler::{Scheduler, Slot};
use crate::session::ReaderSession;
use crate::state_machine::{AccessState, StateMachine, StateTransition};

/// Result of one decision loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing in the field, or presence sensing failed.
    NoCard,
    /// A card was sensed but its serial could not be read.
    ReadFailed,
    /// The authorized card was presented.
    Granted(Identifier),
    /// Some other card was presented.
    Denied(Identifier),
}

impl PollOutcome {
    /// Identifier that was read, if any.
    pub fn uid(&self) -> Option<Identifier> {
        match self {
            PollOutcome::Granted(uid) | PollOutcome::Denied(uid) => Some(*uid),
            PollOutcome::NoCard | PollOutcome::ReadFailed => None,
        }
    }
}

/// Everything a decision drives. Kept apart from the reader so a response
/// can be issued while the reader session is still borrowed.
#[derive(Debug)]
struct Outputs<I, T, R> {
    indicator: I,
    actuators: Actuators<T, R>,
    scheduler: Scheduler<Actuators<T, R>>,
}

impl<I, T, R> Outputs<I, T, R>
where
    I: Indicator,
    T: ToneOutput + 'static,
    R: RelayOutput + 'static,
{
    fn show(&mut self, color: LedColor) {
        if let Err(e) = self.indicator.show(color) {
            warn!(error = %e, ?color, "indicator update failed");
        }
    }

    fn grant(&mut self, config: &FirmwareConfig, now: Instant) -> Result<()> {
        self.show(config.indicator.authorized);
        buzzer::start_pattern(
            &mut self.scheduler,
            &mut self.actuators,
            &config.buzzer.granted,
            now,
        )?;
        relay::activate_then_release(
            &mut self.scheduler,
            &mut self.actuators,
            config.access.relay_hold(),
            now,
        )?;
        Ok(())
    }

    fn deny(&mut self, config: &FirmwareConfig, now: Instant) -> Result<()> {
        self.show(config.indicator.unauthorized);
        buzzer::start_pattern(
            &mut self.scheduler,
            &mut self.actuators,
            &config.buzzer.denied,
            now,
        )?;
        Ok(())
    }
}

/// The access-control firmware: one reader, one indicator, one buzzer, one
/// relay and one authorized identifier.
#[derive(Debug)]
pub struct AccessController<Rd, I, T, R> {
    reader: Rd,
    outputs: Outputs<I, T, R>,
    config: FirmwareConfig,
    machine: StateMachine,
}

impl<Rd, I, T, R> AccessController<Rd, I, T, R>
where
    Rd: CardReader,
    I: Indicator,
    T: ToneOutput + 'static,
    R: RelayOutput + 'static,
{
    /// Assemble a controller from its drivers.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `config` fails validation.
    pub fn new(reader: Rd, indicator: I, tone: T, relay: R, config: FirmwareConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            outputs: Outputs {
                indicator,
                actuators: Actuators::new(tone, relay),
                scheduler: Scheduler::new(),
            },
            config,
            machine: StateMachine::new(),
        })
    }

    /// Power-on sequence: idle color, reader banner, startup sweep.
    pub fn start(&mut self, now: Instant) -> Result<()> {
        self.outputs.show(self.config.indicator.idle);

        match self.reader.reader_info() {
            Ok(info) => info!(
                reader = %info.name,
                firmware = info.firmware_version.as_deref().unwrap_or("unknown"),
                "reader ready"
            ),
            Err(e) => warn!(error = %e, "could not query reader"),
        }

        let sweep = &self.config.buzzer.startup_sweep;
        if sweep.enabled {
            let outputs = &mut self.outputs;
            buzzer::start_sweep(&mut outputs.scheduler, &mut outputs.actuators, sweep, now)?;
        }
        Ok(())
    }

    /// Run one decision loop iteration.
    ///
    /// Driver faults never end the loop: a failed presence check counts as
    /// no card and a failed read returns [`PollOutcome::ReadFailed`] with no
    /// side effects.
    ///
    /// # Errors
    ///
    /// Only broken internal invariants are reported. The state machine is
    /// back in `Idle` afterwards either way.
    pub fn poll(&mut self, now: Instant) -> Result<PollOutcome> {
        match self.reader.is_card_present() {
            Ok(true) => {}
            Ok(false) => return Ok(PollOutcome::NoCard),
            Err(e) => {
                warn!(error = %e, "presence check failed");
                return Ok(PollOutcome::NoCard);
            }
        }

        self.machine.transition_to(AccessState::CardDetected, now)?;
        let outcome = self.handle_card(now);
        if outcome.is_err() {
            self.machine.reset(now);
        }
        outcome
    }

    fn handle_card(&mut self, now: Instant) -> Result<PollOutcome> {
        let session = match ReaderSession::select(&mut self.reader) {
            Ok(session) => session,
            Err(e) => {
                debug!(error = %e, transient = e.is_transient(), "card read failed");
                self.machine.transition_to(AccessState::Idle, now)?;
                return Ok(PollOutcome::ReadFailed);
            }
        };
        self.machine.transition_to(AccessState::CardSelected, now)?;

        let uid = session.uid();
        info!("Card UID: {uid}");

        let outcome = if self.config.access.authorized_uid.matches(&uid) {
            self.machine.transition_to(AccessState::Authorized, now)?;
            info!("Authorized card detected!");
            self.outputs.grant(&self.config, now)?;
            PollOutcome::Granted(uid)
        } else {
            self.machine.transition_to(AccessState::Unauthorized, now)?;
            info!("Unknown card");
            self.outputs.deny(&self.config, now)?;
            PollOutcome::Denied(uid)
        };

        if let Err(e) = session.release() {
            warn!(error = %e, %uid, "failed to release reader session");
        }
        self.machine.transition_to(AccessState::Idle, now)?;
        Ok(outcome)
    }

    /// Fire every scheduled actuation due at `now`.
    pub fn tick(&mut self, now: Instant) -> usize {
        let outputs = &mut self.outputs;
        outputs.scheduler.run_due(now, &mut outputs.actuators)
    }

    /// Power-down sequence: silence, lock, indicator off.
    pub fn shutdown(&mut self) {
        let outputs = &mut self.outputs;
        outputs.scheduler.cancel_slot(Slot::Buzzer);
        outputs.actuators.silence_tone();
        relay::release_now(&mut outputs.scheduler, &mut outputs.actuators);
        outputs.show(LedColor::Off);
        info!("outputs released");
    }

    pub fn config(&self) -> &FirmwareConfig {
        &self.config
    }

    pub fn reader(&self) -> &Rd {
        &self.reader
    }

    pub fn indicator(&self) -> &I {
        &self.outputs.indicator
    }

    pub fn actuators(&self) -> &Actuators<T, R> {
        &self.outputs.actuators
    }

    pub fn scheduler(&self) -> &Scheduler<Actuators<T, R>> {
        &self.outputs.scheduler
    }

    /// Current decision loop state. `Idle` between iterations.
    pub fn state(&self) -> AccessState {
        *self.machine.current_state()
    }

    /// Recent decision loop transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        self.machine.history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_hardware::mock::{
        MockCardReader, MockCardReaderHandle, MockIndicator, MockRelay, MockTone, ToneEvent,
    };
    use std::time::Duration;

    type TestController = AccessController<MockCardReader, MockIndicator, MockTone, MockRelay>;

    const AUTHORIZED: [u8; 4] = [0xB8, 0x24, 0xA4, 0x51];
    const STRANGER: [u8; 4] = [0x12, 0x34, 0x56, 0x78];

    fn controller() -> (TestController, MockCardReaderHandle) {
        let (reader, handle) = MockCardReader::new();
        let controller = AccessController::new(
            reader,
            MockIndicator::new(),
            MockTone::new(),
            MockRelay::new(),
            FirmwareConfig::default(),
        )
        .unwrap();
        (controller, handle)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_authorized_card_grants_access() {
        let (mut controller, handle) = controller();
        let t0 = Instant::now();
        handle.present_card(Identifier::from_array(AUTHORIZED)).unwrap();

        let outcome = controller.poll(t0).unwrap();
        assert_eq!(outcome, PollOutcome::Granted(Identifier::from_array(AUTHORIZED)));
        assert_eq!(controller.indicator().current(), Some((255, 0, 255)));
        assert!(controller.actuators().relay().is_energized());
        assert!(controller.scheduler().is_active(Slot::Buzzer));
        assert!(controller.scheduler().is_active(Slot::Relay));

        for step in 1..=3 {
            controller.tick(t0 + ms(100 * step));
        }
        assert_eq!(
            controller.actuators().tone().events(),
            &[ToneEvent::Emit(1500), ToneEvent::Silence, ToneEvent::Silence]
        );
        assert!(!controller.scheduler().is_active(Slot::Buzzer));

        controller.tick(t0 + Duration::from_secs(2));
        assert!(!controller.actuators().relay().is_energized());
        assert_eq!(controller.actuators().relay().release_count(), 1);
    }

    #[test]
    fn test_unknown_card_denies_access() {
        let (mut controller, handle) = controller();
        let t0 = Instant::now();
        handle.present_card(Identifier::from_array(STRANGER)).unwrap();

        let outcome = controller.poll(t0).unwrap();
        assert_eq!(outcome, PollOutcome::Denied(Identifier::from_array(STRANGER)));
        assert_eq!(controller.indicator().current(), Some((255, 0, 0)));
        assert!(controller.actuators().relay().writes().is_empty());
        assert!(!controller.scheduler().is_active(Slot::Relay));

        for step in 1..=7 {
            controller.tick(t0 + ms(100 * step));
        }
        assert_eq!(controller.actuators().tone().pulse_count(), 3);
        assert!(controller.actuators().tone().events().iter().all(|event| match event {
            ToneEvent::Emit(hz) => *hz == 1000,
            ToneEvent::Silence => true,
        }));
        assert!(!controller.scheduler().is_active(Slot::Buzzer));
    }

    #[test]
    fn test_no_card_has_no_side_effects() {
        let (mut controller, _handle) = controller();

        assert_eq!(controller.poll(Instant::now()).unwrap(), PollOutcome::NoCard);
        assert_eq!(controller.indicator().current(), None);
        assert!(controller.actuators().tone().events().is_empty());
        assert!(controller.actuators().relay().writes().is_empty());
        assert_eq!(controller.scheduler().active_slots().count(), 0);
        assert!(controller.history().is_empty());
    }

    #[test]
    fn test_presence_check_failure_counts_as_no_card() {
        let (mut reader, handle) = MockCardReader::new();
        reader.set_presence_failing(true);
        handle.present_card(Identifier::from_array(AUTHORIZED)).unwrap();
        let mut controller = AccessController::new(
            reader,
            MockIndicator::new(),
            MockTone::new(),
            MockRelay::new(),
            FirmwareConfig::default(),
        )
        .unwrap();

        assert_eq!(controller.poll(Instant::now()).unwrap(), PollOutcome::NoCard);
        assert_eq!(controller.state(), AccessState::Idle);
        assert!(controller.history().is_empty());
        assert_eq!(controller.indicator().current(), None);
        assert!(controller.actuators().tone().events().is_empty());
        assert!(controller.actuators().relay().writes().is_empty());
        assert_eq!(controller.reader().select_count(), 0);
        assert_eq!(controller.reader().presence_polls(), 1);
    }

    #[test]
    fn test_failed_read_has_no_side_effects() {
        let (mut controller, handle) = controller();
        handle.present_unreadable_card().unwrap();

        assert_eq!(controller.poll(Instant::now()).unwrap(), PollOutcome::ReadFailed);
        assert_eq!(controller.state(), AccessState::Idle);
        assert_eq!(controller.indicator().current(), None);
        assert!(controller.actuators().tone().events().is_empty());
        assert!(controller.actuators().relay().writes().is_empty());
        assert_eq!(controller.reader().halt_count(), 0);

        // The reader is not locked: the next card is still seen.
        handle.present_card(Identifier::from_array(STRANGER)).unwrap();
        assert!(matches!(controller.poll(Instant::now()).unwrap(), PollOutcome::Denied(_)));
    }

    #[test]
    fn test_session_released_once_per_decision() {
        let (mut controller, handle) = controller();
        let t0 = Instant::now();
        handle.present_card(Identifier::from_array(AUTHORIZED)).unwrap();
        handle.present_card(Identifier::from_array(STRANGER)).unwrap();

        controller.poll(t0).unwrap();
        assert_eq!(controller.reader().halt_count(), 1);
        assert!(!controller.reader().is_session_open());

        controller.poll(t0 + ms(50)).unwrap();
        assert_eq!(controller.reader().halt_count(), 2);
        assert!(!controller.reader().is_session_open());

        assert_eq!(controller.poll(t0 + ms(100)).unwrap(), PollOutcome::NoCard);
        assert_eq!(controller.reader().halt_count(), 2);
    }

    #[test]
    fn test_decision_history() {
        let (mut controller, handle) = controller();
        handle.present_card(Identifier::from_array(STRANGER)).unwrap();
        controller.poll(Instant::now()).unwrap();

        let states: Vec<_> = controller.history().iter().map(|t| t.to).collect();
        assert_eq!(
            states,
            vec![
                AccessState::CardDetected,
                AccessState::CardSelected,
                AccessState::Unauthorized,
                AccessState::Idle,
            ]
        );
    }

    #[test]
    fn test_denied_beep_preempts_granted() {
        let (mut controller, handle) = controller();
        let t0 = Instant::now();
        handle.present_card(Identifier::from_array(AUTHORIZED)).unwrap();
        handle.present_card(Identifier::from_array(STRANGER)).unwrap();

        controller.poll(t0).unwrap();
        controller.tick(t0 + ms(100));
        controller.poll(t0 + ms(150)).unwrap();

        for step in 1..=7 {
            controller.tick(t0 + ms(150 + 100 * step));
        }
        let emitted: Vec<_> = controller
            .actuators()
            .tone()
            .events()
            .iter()
            .filter_map(|event| match event {
                ToneEvent::Emit(hz) => Some(*hz),
                ToneEvent::Silence => None,
            })
            .collect();
        assert_eq!(emitted, vec![1500, 1000, 1000, 1000]);
        // The relay window from the granted card still runs.
        assert!(controller.scheduler().is_active(Slot::Relay));
    }

    #[test]
    fn test_indicator_failure_does_not_stop_loop() {
        let (reader, handle) = MockCardReader::new();
        let mut indicator = MockIndicator::new();
        indicator.set_failing(true);
        let mut controller = AccessController::new(
            reader,
            indicator,
            MockTone::new(),
            MockRelay::new(),
            FirmwareConfig::default(),
        )
        .unwrap();
        handle.present_card(Identifier::from_array(AUTHORIZED)).unwrap();

        assert!(matches!(controller.poll(Instant::now()).unwrap(), PollOutcome::Granted(_)));
        assert!(controller.actuators().relay().is_energized());
        assert_eq!(controller.reader().halt_count(), 1);
    }

    #[test]
    fn test_configured_identifier_is_used() {
        let (reader, handle) = MockCardReader::new();
        let mut config = FirmwareConfig::default();
        config.access.authorized_uid = Identifier::from_array(STRANGER);
        let mut controller =
            AccessController::new(reader, MockIndicator::new(), MockTone::new(), MockRelay::new(), config)
                .unwrap();

        handle.present_card(Identifier::from_array(STRANGER)).unwrap();
        handle.present_card(Identifier::from_array(AUTHORIZED)).unwrap();
        assert!(matches!(controller.poll(Instant::now()).unwrap(), PollOutcome::Granted(_)));
        assert!(matches!(controller.poll(Instant::now()).unwrap(), PollOutcome::Denied(_)));
    }

    #[test]
    fn test_longer_identifier_with_matching_prefix_is_denied() {
        let (mut controller, handle) = controller();
        let long = Identifier::new(&[0xB8, 0x24, 0xA4, 0x51, 0x00, 0x00, 0x00]).unwrap();
        handle.present_card(long).unwrap();

        assert_eq!(controller.poll(Instant::now()).unwrap(), PollOutcome::Denied(long));
    }

    #[test]
    fn test_start_and_shutdown() {
        let (mut controller, handle) = controller();
        let t0 = Instant::now();

        controller.start(t0).unwrap();
        assert_eq!(controller.indicator().current(), Some((0, 0, 0)));
        assert!(controller.scheduler().is_active(Slot::Buzzer));
        controller.tick(t0 + ms(100));
        assert_eq!(controller.actuators().tone().frequency(), Some(500));

        handle.present_card(Identifier::from_array(AUTHORIZED)).unwrap();
        controller.poll(t0 + ms(120)).unwrap();
        controller.shutdown();

        assert_eq!(controller.scheduler().active_slots().count(), 0);
        assert!(!controller.actuators().relay().is_energized());
        assert_eq!(controller.actuators().tone().events().last(), Some(&ToneEvent::Silence));
        assert_eq!(controller.indicator().current(), Some((0, 0, 0)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (reader, _handle) = MockCardReader::new();
        let mut config = FirmwareConfig::default();
        config.timing.poll_interval_ms = 0;

        let result =
            AccessController::new(reader, MockIndicator::new(), MockTone::new(), MockRelay::new(), config);
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_relay_hold_rejected() {
        let (reader, _handle) = MockCardReader::new();
        let mut config = FirmwareConfig::default();
        config.access.relay_hold_secs = i64::MAX as u64;

        let result =
            AccessController::new(reader, MockIndicator::new(), MockTone::new(), MockRelay::new(), config);
        assert!(matches!(
            result,
            Err(crate::FirmwareError::Core(latchkey_core::Error::Config(_)))
        ));
    }
}
