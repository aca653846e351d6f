//! Mock lock relay.

use crate::{Result, traits::RelayOutput};
use tracing::info;

/// Mock relay recording every level change.
#[derive(Debug, Default)]
pub struct MockRelay {
    energized: bool,
    writes: Vec<bool>,
}

impl MockRelay {
    /// Create a new relay in the released state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the relay is currently energized.
    pub fn is_energized(&self) -> bool {
        self.energized
    }

    /// Every level written, oldest first.
    pub fn writes(&self) -> &[bool] {
        &self.writes
    }

    /// Number of writes that released the relay.
    pub fn release_count(&self) -> usize {
        self.writes.iter().filter(|level| !**level).count()
    }

    /// Number of writes that energized the relay.
    pub fn energize_count(&self) -> usize {
        self.writes.iter().filter(|level| **level).count()
    }
}

impl RelayOutput for MockRelay {
    fn set_energized(&mut self, energized: bool) -> Result<()> {
        info!("relay: {}", if energized { "energized" } else { "released" });
        self.energized = energized;
        self.writes.push(energized);
        Ok(())
    }
}
