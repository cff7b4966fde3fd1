#![forbid(unsafe_code)]

//! Core domain model and business logic for the Bump pregnancy tracker.
//!
//! This crate provides:
//! - Domain types (profile, progress, sessions, checkups)
//! - Pregnancy progress calculations and the baby growth chart
//! - The movement counting session state machine
//! - Persistence (profile store, session WAL, CSV archive, checkup book)
//! - Reminder-time computation for the notification layer

pub mod types;
pub mod error;
pub mod progress;
pub mod growth;
pub mod session;
pub mod config;
pub mod logging;
pub mod profile;
pub mod wal;
pub mod history;
pub mod csv_rollup;
pub mod checkups;
pub mod reminders;
pub mod paths;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use checkups::{CheckupBook, CHECKUP_TEMPLATES};
pub use history::{load_sessions, SortOrder};
pub use paths::DataPaths;
pub use progress::pregnancy_info;
pub use session::{SessionEvent, SessionTracker};
pub use wal::{JsonlSink, SessionSink};
