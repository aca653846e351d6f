//! Hardware device abstraction layer for the Latchkey access-control firmware.
//!
//! This crate provides trait-based abstractions for the peripherals a
//! single-door controller drives: a contactless card reader, a status
//! indicator pixel, a buzzer tone generator and a lock relay. The traits
//! allow easy substitution between mock implementations (for development and
//! testing) and real board drivers.
//!
//! # Design Philosophy
//!
//! - **Non-blocking**: every call returns promptly; the firmware expresses
//!   all waiting as scheduled callbacks, never as driver-side sleeps.
//! - **Error-aware**: all operations return `Result<T>` with detailed error
//!   information.
//! - **Send**: drivers can be moved onto whichever task runs the control loop.
//!
//! # Device Traits
//!
//! ## Card Readers
//!
//! The [`CardReader`] trait represents ISO 14443A readers such as the
//! MFRC522:
//!
//! ```no_run
//! use latchkey_hardware::traits::CardReader;
//! use latchkey_hardware::error::Result;
//!
//! fn read_serial<R: CardReader>(reader: &mut R) -> Result<Option<String>> {
//!     if !reader.is_card_present()? {
//!         return Ok(None);
//!     }
//!     let uid = reader.select_card()?;
//!     reader.halt_and_release()?;
//!     Ok(Some(uid.to_string()))
//! }
//! ```
//!
//! ## Outputs
//!
//! [`Indicator`], [`ToneOutput`] and [`RelayOutput`] cover the three
//! actuators:
//!
//! ```no_run
//! use latchkey_hardware::traits::{Indicator, RelayOutput, ToneOutput};
//! use latchkey_hardware::types::LedColor;
//! use latchkey_hardware::error::Result;
//!
//! fn unlock<I: Indicator, T: ToneOutput, R: RelayOutput>(
//!     led: &mut I,
//!     tone: &mut T,
//!     relay: &mut R,
//! ) -> Result<()> {
//!     led.show(LedColor::Green)?;
//!     tone.emit(1500)?;
//!     relay.set_energized(true)
//! }
//! ```
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides recording implementations of every trait for
//! development and testing without physical hardware.
//!
//! [`CardReader`]: traits::CardReader
//! [`Indicator`]: traits::Indicator
//! [`ToneOutput`]: traits::ToneOutput
//! [`RelayOutput`]: traits::RelayOutput

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{CardReader, Indicator, RelayOutput, ToneOutput};
pub use types::{LedColor, ReaderInfo};
