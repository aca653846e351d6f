//! Scoped reader session.

use latchkey_core::Identifier;
use latchkey_hardware::{CardReader, Result};
use tracing::warn;

/// A selected card, held until the reader is told to halt it.
///
/// The session exists only after a successful selection. Release happens
/// exactly once: explicitly via [`release`](ReaderSession::release), or on
/// drop for any path that leaves early. A reader whose session is never
/// released stops reporting new cards.
#[derive(Debug)]
pub struct ReaderSession<'a, R: CardReader> {
    reader: &'a mut R,
    uid: Identifier,
    released: bool,
}

impl<'a, R: CardReader> ReaderSession<'a, R> {
    /// Select the card in the field and open a session on it.
    ///
    /// # Errors
    ///
    /// Returns the reader's error if the serial number could not be read; no
    /// session is opened in that case.
    pub fn select(reader: &'a mut R) -> Result<Self> {
        let uid = reader.select_card()?;
        Ok(Self {
            reader,
            uid,
            released: false,
        })
    }

    /// Identifier of the selected card.
    pub fn uid(&self) -> Identifier {
        self.uid
    }

    /// Halt the card and stop the cipher session.
    ///
    /// # Errors
    ///
    /// Returns the reader's error if the halt could not be delivered. The
    /// session counts as released either way.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.reader.halt_and_release()
    }
}

impl<R: CardReader> Drop for ReaderSession<'_, R> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.reader.halt_and_release() {
            warn!(error = %e, uid = %self.uid, "failed to release reader session");
        }
    }
}
