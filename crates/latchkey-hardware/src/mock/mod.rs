//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that record every command they
//! receive, so tests can assert on exactly what the firmware drove.

pub mod indicator;
pub mod reader;
pub mod relay;
pub mod tone;

// Re-export commonly used types
pub use indicator::MockIndicator;
pub use reader::{MockCardReader, MockCardReaderHandle};
pub use relay::MockRelay;
pub use tone::{MockTone, ToneEvent};
