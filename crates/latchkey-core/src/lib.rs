//! Core types shared by the Latchkey access-control firmware.
//!
//! This crate holds the pieces every other crate needs and that carry no
//! hardware dependency: the card [`Identifier`], the positional
//! [`uid_equal`] comparator, reference configuration constants and the
//! common [`Error`] type.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
