//! Mock card reader implementation for testing and development.
//!
//! This module provides a simulated contactless reader that can be
//! controlled programmatically for testing without requiring physical
//! hardware.

use crate::{
    HardwareError, Result,
    traits::CardReader,
    types::ReaderInfo,
};
use latchkey_core::Identifier;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Capacity of the card event queue between handle and reader.
const EVENT_QUEUE_CAPACITY: usize = 32;

/// Mock card reader for testing and development.
///
/// Cards are queued through a [`MockCardReaderHandle`] and reported one at a
/// time by [`is_card_present`](CardReader::is_card_present). Like a real
/// MFRC522, the mock stops reporting new cards while a selected card has not
/// been halted.
///
/// # Examples
///
/// ```
/// use latchkey_core::Identifier;
/// use latchkey_hardware::mock::MockCardReader;
/// use latchkey_hardware::traits::CardReader;
///
/// # fn main() -> latchkey_hardware::Result<()> {
/// let (mut reader, handle) = MockCardReader::new();
///
/// let uid = Identifier::from_array([0x04, 0xAB, 0xCD, 0xEF]);
/// handle.present_card(uid)?;
///
/// assert!(reader.is_card_present()?);
/// assert_eq!(reader.select_card()?, uid);
/// reader.halt_and_release()?;
/// assert!(!reader.is_card_present()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockCardReader {
    /// Channel receiver for card events
    event_rx: mpsc::Receiver<CardEvent>,

    /// Card sensed by the last presence poll and not yet selected
    in_field: Option<CardEvent>,

    /// Device name
    name: String,

    /// A selected card has not been halted yet
    session_open: bool,

    /// Presence polls fail as if the SPI bus were down
    presence_failing: bool,

    presence_polls: usize,
    select_count: usize,
    halt_count: usize,
}

impl MockCardReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockCardReader, MockCardReaderHandle) where the
    /// handle can be used to simulate card presentations.
    pub fn new() -> (Self, MockCardReaderHandle) {
        Self::with_name("Mock MFRC522".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockCardReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

        let reader = Self {
            event_rx,
            in_field: None,
            name,
            session_open: false,
            presence_failing: false,
            presence_polls: 0,
            select_count: 0,
            halt_count: 0,
        };

        (reader, MockCardReaderHandle { event_tx })
    }

    /// Number of presence polls answered so far.
    pub fn presence_polls(&self) -> usize {
        self.presence_polls
    }

    /// Number of successful card selections.
    pub fn select_count(&self) -> usize {
        self.select_count
    }

    /// Number of halt-and-release calls.
    pub fn halt_count(&self) -> usize {
        self.halt_count
    }

    /// Whether a selected card is still waiting to be halted.
    pub fn is_session_open(&self) -> bool {
        self.session_open
    }

    /// Make presence polls fail with a communication error until cleared.
    ///
    /// Queued cards stay queued and are reported once polls succeed again.
    pub fn set_presence_failing(&mut self, failing: bool) {
        self.presence_failing = failing;
    }
}

impl CardReader for MockCardReader {
    fn is_card_present(&mut self) -> Result<bool> {
        self.presence_polls += 1;

        if self.presence_failing {
            return Err(HardwareError::communication(format!(
                "{}: no response to REQA",
                self.name
            )));
        }

        if self.session_open {
            warn!("{}: presence poll with an open session, reader is locked", self.name);
            return Ok(false);
        }

        if self.in_field.is_none() {
            self.in_field = self.event_rx.try_recv().ok();
        }

        Ok(self.in_field.is_some())
    }

    fn select_card(&mut self) -> Result<Identifier> {
        match self.in_field.take() {
            Some(CardEvent::Presented(uid)) => {
                self.session_open = true;
                self.select_count += 1;
                debug!("{}: selected card {}", self.name, uid);
                Ok(uid)
            }
            Some(CardEvent::Unreadable) => Err(HardwareError::card_read("anticollision failed")),
            None => Err(HardwareError::card_read("no card in field")),
        }
    }

    fn halt_and_release(&mut self) -> Result<()> {
        self.halt_count += 1;
        self.session_open = false;
        debug!("{}: card halted, cipher session stopped", self.name);
        Ok(())
    }

    fn reader_info(&self) -> Result<ReaderInfo> {
        Ok(ReaderInfo::new(self.name.clone(), vec!["ISO14443A".to_string()])
            .with_firmware_version("v2.0"))
    }
}

/// Internal event type for the mock reader.
#[derive(Debug, Clone, Copy)]
enum CardEvent {
    Presented(Identifier),
    Unreadable,
}

/// Handle for controlling a mock card reader.
///
/// Handles are cheap to clone; every clone feeds the same reader.
#[derive(Debug, Clone)]
pub struct MockCardReaderHandle {
    /// Channel sender for card events
    event_tx: mpsc::Sender<CardEvent>,
}

impl MockCardReaderHandle {
    /// Present a card to the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped or its event queue is
    /// full.
    pub fn present_card(&self, uid: Identifier) -> Result<()> {
        self.send(CardEvent::Presented(uid))
    }

    /// Present a card whose serial number cannot be read.
    ///
    /// The reader senses presence but the following selection fails, as when
    /// a card is pulled away mid-read.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped or its event queue is
    /// full.
    pub fn present_unreadable_card(&self) -> Result<()> {
        self.send(CardEvent::Unreadable)
    }

    fn send(&self, event: CardEvent) -> Result<()> {
        self.event_tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => HardwareError::communication("card event queue full"),
            TrySendError::Closed(_) => HardwareError::disconnected("card reader event channel closed"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(bytes: &[u8]) -> Identifier {
        Identifier::new(bytes).unwrap()
    }

    #[test]
    fn test_mock_reader_present_and_select() {
        let (mut reader, handle) = MockCardReader::new();
        let card = uid(&[0x04, 0xAB, 0xCD, 0xEF]);

        assert!(!reader.is_card_present().unwrap());

        handle.present_card(card).unwrap();
        assert!(reader.is_card_present().unwrap());
        assert_eq!(reader.select_card().unwrap(), card);
        assert!(reader.is_session_open());

        reader.halt_and_release().unwrap();
        assert!(!reader.is_session_open());
        assert_eq!(reader.select_count(), 1);
        assert_eq!(reader.halt_count(), 1);
    }

    #[test]
    fn test_mock_reader_locks_until_halted() {
        let (mut reader, handle) = MockCardReader::new();
        handle.present_card(uid(&[1, 2, 3, 4])).unwrap();
        handle.present_card(uid(&[5, 6, 7, 8])).unwrap();

        assert!(reader.is_card_present().unwrap());
        reader.select_card().unwrap();

        // Second card stays invisible while the first session is open.
        assert!(!reader.is_card_present().unwrap());

        reader.halt_and_release().unwrap();
        assert!(reader.is_card_present().unwrap());
        assert_eq!(reader.select_card().unwrap(), uid(&[5, 6, 7, 8]));
    }

    #[test]
    fn test_mock_reader_unreadable_card() {
        let (mut reader, handle) = MockCardReader::new();
        handle.present_unreadable_card().unwrap();

        assert!(reader.is_card_present().unwrap());
        let err = reader.select_card().unwrap_err();
        assert!(matches!(err, HardwareError::CardReadError { .. }));
        assert!(!reader.is_session_open());

        // The failed card is gone from the field.
        assert!(!reader.is_card_present().unwrap());
    }

    #[test]
    fn test_mock_reader_presence_failure_keeps_queue() {
        let (mut reader, handle) = MockCardReader::new();
        handle.present_card(uid(&[1, 2, 3, 4])).unwrap();

        reader.set_presence_failing(true);
        let err = reader.is_card_present().unwrap_err();
        assert!(matches!(err, HardwareError::CommunicationError { .. }));
        assert!(err.is_transient());

        reader.set_presence_failing(false);
        assert!(reader.is_card_present().unwrap());
        assert_eq!(reader.select_card().unwrap(), uid(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_mock_reader_select_without_card() {
        let (mut reader, _handle) = MockCardReader::new();
        assert!(reader.select_card().is_err());
    }

    #[test]
    fn test_mock_reader_dropped_handle_target() {
        let (reader, handle) = MockCardReader::new();
        drop(reader);

        let err = handle.present_card(uid(&[1, 2, 3, 4])).unwrap_err();
        assert!(matches!(err, HardwareError::Disconnected { .. }));
    }

    #[test]
    fn test_mock_reader_info() {
        let (reader, _handle) = MockCardReader::with_name("Door Reader".to_string());

        let info = reader.reader_info().unwrap();
        assert_eq!(info.name, "Door Reader");
        assert!(info.protocols.contains(&"ISO14443A".to_string()));
        assert_eq!(info.firmware_version.as_deref(), Some("v2.0"));
    }
}
