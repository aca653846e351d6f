//! Common types shared across hardware device implementations.
//!
//! This module defines types used by multiple device traits, such as
//! reader information and indicator colors.

use serde::{Deserialize, Serialize};

/// Card reader information.
///
/// Logged once at startup so a misbehaving or unpowered reader is visible in
/// the diagnostics before any card is presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// List of supported protocols (e.g., ["ISO14443A"]).
    pub protocols: Vec<String>,

    /// Optional firmware version string reported by the reader chip.
    pub firmware_version: Option<String>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, protocols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            protocols,
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Colors for the status indicator pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum LedColor {
    /// LED off.
    Off,

    /// Red LED.
    Red,

    /// Green LED.
    Green,

    /// Blue LED.
    Blue,

    /// Yellow LED.
    Yellow,

    /// Magenta LED.
    Magenta,

    /// White LED.
    White,

    /// Custom RGB color (red, green, blue).
    Custom(u8, u8, u8),
}

impl LedColor {
    /// Get the RGB components of the LED color.
    pub fn as_rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Off => (0, 0, 0),
            Self::Red => (255, 0, 0),
            Self::Green => (0, 255, 0),
            Self::Blue => (0, 0, 255),
            Self::Yellow => (255, 255, 0),
            Self::Magenta => (255, 0, 255),
            Self::White => (255, 255, 255),
            Self::Custom(r, g, b) => (*r, *g, *b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_info() {
        let info = ReaderInfo::new("MFRC522", vec!["ISO14443A".to_string()])
            .with_firmware_version("v2.0");

        assert_eq!(info.name, "MFRC522");
        assert_eq!(info.protocols, vec!["ISO14443A"]);
        assert_eq!(info.firmware_version, Some("v2.0".to_string()));
    }

    #[test]
    fn test_led_color_rgb() {
        assert_eq!(LedColor::Red.as_rgb(), (255, 0, 0));
        assert_eq!(LedColor::Magenta.as_rgb(), (255, 0, 255));
        assert_eq!(LedColor::Off.as_rgb(), (0, 0, 0));
    }

    #[test]
    fn test_led_color_custom() {
        let custom = LedColor::Custom(128, 64, 32);
        assert_eq!(custom.as_rgb(), (128, 64, 32));
    }

    #[test]
    fn test_led_color_serialization() {
        assert_eq!(serde_json::to_string(&LedColor::Magenta).unwrap(), "\"magenta\"");

        let custom: LedColor = serde_json::from_str(r#"{"custom":[1,2,3]}"#).unwrap();
        assert_eq!(custom, LedColor::Custom(1, 2, 3));
    }
}
