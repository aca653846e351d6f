//! Latchkey access-control firmware.
//!
//! Polls a contactless reader, compares the presented card against one
//! authorized identifier and answers with the indicator, the buzzer and the
//! lock relay. Buzzer patterns and relay release run on a cooperative
//! [`Scheduler`] so nothing in the loop ever sleeps.
//!
//! # Examples
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use latchkey_core::Identifier;
//! use latchkey_firmware::{AccessController, FirmwareConfig, PollOutcome};
//! use latchkey_hardware::mock::{MockCardReader, MockIndicator, MockRelay, MockTone};
//!
//! # fn main() -> latchkey_firmware::Result<()> {
//! let (reader, handle) = MockCardReader::new();
//! let mut controller = AccessController::new(
//!     reader,
//!     MockIndicator::new(),
//!     MockTone::new(),
//!     MockRelay::new(),
//!     FirmwareConfig::default(),
//! )?;
//!
//! handle.present_card(Identifier::from_array([0xB8, 0x24, 0xA4, 0x51])).unwrap();
//! let now = Instant::now();
//! assert!(matches!(controller.poll(now)?, PollOutcome::Granted(_)));
//!
//! controller.tick(now + Duration::from_secs(2));
//! assert!(!controller.actuators().relay().is_energized());
//! # Ok(())
//! # }
//! ```

pub mod actuators;
pub mod buzzer;
pub mod config;
pub mod controller;
pub mod error;
pub mod relay;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod state_machine;

pub use actuators::Actuators;
pub use buzzer::{BeepPattern, BuzzerPatternState, SweepPattern, start_pattern, start_sweep};
pub use config::{AccessConfig, BuzzerConfig, FirmwareConfig, IndicatorConfig, TimingConfig};
pub use controller::{AccessController, PollOutcome};
pub use error::{FirmwareError, Result};
pub use relay::{activate_then_release, release_now};
pub use runtime::{RunSummary, run};
pub use scheduler::{Scheduler, Slot, TaskControl, TimerHandle};
pub use session::ReaderSession;
pub use state_machine::{AccessState, StateMachine, StateTransition};
