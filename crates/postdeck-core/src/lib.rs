//! `postdeck-core` — configuration, errors and timestamp encoding shared by
//! every postdeck crate.

pub mod config;
pub mod error;
pub mod time;

pub use config::PostdeckConfig;
pub use error::{PostdeckError, Result};
