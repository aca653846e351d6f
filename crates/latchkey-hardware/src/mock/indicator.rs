//! Mock status indicator.

use crate::{HardwareError, Result, traits::Indicator};
use tracing::info;

/// Mock single-pixel indicator.
///
/// Keeps the latched color separately from the displayed one so tests can
/// check that every color change was flushed.
#[derive(Debug, Default)]
pub struct MockIndicator {
    latched: (u8, u8, u8),
    shown: Vec<(u8, u8, u8)>,
    failing: bool,
}

impl MockIndicator {
    /// Create a new indicator that starts dark.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail, to exercise driver error handling.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Color currently visible on the pixel, if anything was ever flushed.
    pub fn current(&self) -> Option<(u8, u8, u8)> {
        self.shown.last().copied()
    }

    /// Every color flushed to the pixel, oldest first.
    pub fn history(&self) -> &[(u8, u8, u8)] {
        &self.shown
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(HardwareError::output("indicator", "data line stuck"));
        }
        Ok(())
    }
}

impl Indicator for MockIndicator {
    fn set_color(&mut self, r: u8, g: u8, b: u8) -> Result<()> {
        self.check()?;
        self.latched = (r, g, b);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.check()?;
        let (r, g, b) = self.latched;
        info!("indicator: rgb({r}, {g}, {b})");
        self.shown.push(self.latched);
        Ok(())
    }
}
