//! `postdeck-scheduler` — publishes posts whose scheduled time has passed.
//!
//! # Overview
//!
//! A sweep captures `now` once and publishes every post with
//! `scheduled_time <= now AND published_time IS NULL` in a single
//! conditional UPDATE, stamping all of them with that same instant. A second
//! sweep with no intervening writes therefore publishes nothing.
//!
//! [`Sweeper`] runs one sweep on demand (HTTP trigger, CLI). [`SweepEngine`]
//! drives the sweeper from a tokio interval until shutdown.

pub mod engine;
pub mod error;
pub mod sweeper;
pub mod types;

pub use engine::SweepEngine;
pub use error::{Result, SweepError};
pub use sweeper::Sweeper;
pub use types::SweepReport;
