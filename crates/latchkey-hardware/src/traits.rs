//! Hardware device trait definitions.
//!
//! These traits are the contract between the access-control core and the
//! peripheral drivers it treats as black boxes: the contactless card reader,
//! the status indicator pixel, the buzzer tone generator and the lock relay.
//!
//! All methods are synchronous and expected to return promptly. The decision
//! loop and the actuation scheduler run on a single cooperative task, so a
//! driver that blocks stalls both card polling and beep timing.

use crate::error::Result;
use crate::types::{LedColor, ReaderInfo};
use latchkey_core::Identifier;

/// Contactless card reader (e.g. MFRC522 over SPI).
///
/// A successful [`select_card`](CardReader::select_card) opens a reader
/// session that must be closed with
/// [`halt_and_release`](CardReader::halt_and_release) before the next
/// presence poll. A reader left with an open session stops reporting new
/// cards.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::traits::CardReader;
/// use latchkey_hardware::Result;
/// use latchkey_core::Identifier;
///
/// fn poll_once<R: CardReader>(reader: &mut R) -> Result<Option<Identifier>> {
///     if !reader.is_card_present()? {
///         return Ok(None);
///     }
///     let uid = reader.select_card()?;
///     reader.halt_and_release()?;
///     Ok(Some(uid))
/// }
/// ```
pub trait CardReader: Send {
    /// Check whether a new card has entered the field.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader cannot be reached.
    fn is_card_present(&mut self) -> Result<bool>;

    /// Select the card in the field and read its serial number.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::CardReadError`](crate::HardwareError::CardReadError)
    /// if the card left the field or the anticollision exchange failed.
    fn select_card(&mut self) -> Result<Identifier>;

    /// Halt the selected card and stop the cipher session.
    ///
    /// # Errors
    ///
    /// Returns an error if the halt command could not be delivered.
    fn halt_and_release(&mut self) -> Result<()>;

    /// Get reader information.
    ///
    /// # Errors
    ///
    /// Returns an error if the version register cannot be read.
    fn reader_info(&self) -> Result<ReaderInfo>;
}

/// Single-pixel status indicator (e.g. one WS2812 LED).
///
/// Colors are latched by [`set_color`](Indicator::set_color) and become
/// visible on [`flush`](Indicator::flush).
pub trait Indicator: Send {
    /// Set the pixel color.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver rejects the command.
    fn set_color(&mut self, r: u8, g: u8, b: u8) -> Result<()>;

    /// Push the latched color out to the pixel.
    ///
    /// # Errors
    ///
    /// Returns an error if the data line write fails.
    fn flush(&mut self) -> Result<()>;

    /// Set and flush in one call.
    ///
    /// # Errors
    ///
    /// Returns the first error from either step.
    fn show(&mut self, color: LedColor) -> Result<()> {
        let (r, g, b) = color.as_rgb();
        self.set_color(r, g, b)?;
        self.flush()
    }
}

/// Square-wave tone generator driving a piezo buzzer.
pub trait ToneOutput: Send {
    /// Start emitting a tone at `frequency_hz` until silenced.
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM channel cannot be configured.
    fn emit(&mut self, frequency_hz: u32) -> Result<()>;

    /// Stop the tone. Silencing an already silent output is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM channel cannot be stopped.
    fn silence(&mut self) -> Result<()>;
}

/// Lock relay output.
///
/// Implementations map "energized" to the electrical level their board
/// needs (many relay modules are active-low).
pub trait RelayOutput: Send {
    /// Drive the relay to its energized (`true`) or released (`false`) state.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO write fails.
    fn set_energized(&mut self, energized: bool) -> Result<()>;
}
