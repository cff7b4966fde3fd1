//! On-disk layout of the data directory.
//!
//! Everything the app persists lives under one data directory:
//!
//! ```text
//! <data_dir>/
//!   profile.json          user profile
//!   checkups.json         checkup book
//!   sessions.csv          archived session history
//!   wal/
//!     movement_sessions.wal   JSONL log of recently saved sessions
//! ```

use crate::Result;
use std::path::{Path, PathBuf};

/// Resolved file locations under a data directory.
#[derive(Clone, Debug)]
pub struct DataPaths {
    data_dir: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn profile(&self) -> PathBuf {
        self.data_dir.join("profile.json")
    }

    pub fn checkups(&self) -> PathBuf {
        self.data_dir.join("checkups.json")
    }

    pub fn wal_dir(&self) -> PathBuf {
        self.data_dir.join("wal")
    }

    pub fn wal(&self) -> PathBuf {
        self.wal_dir().join("movement_sessions.wal")
    }

    pub fn sessions_csv(&self) -> PathBuf {
        self.data_dir.join("sessions.csv")
    }

    /// Full data reset: removes the profile, the checkup book, the session
    /// archive, and the WAL directory (current and processed files alike).
    ///
    /// After this, the onboarding check reports false and every history
    /// query comes back empty.
    pub fn purge_all(&self) -> Result<()> {
        crate::profile::clear(&self.profile())?;
        crate::checkups::clear_file(&self.checkups())?;

        match std::fs::remove_file(self.sessions_csv()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        match std::fs::remove_dir_all(self.wal_dir()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        tracing::info!("Purged all data under {:?}", self.data_dir);
        Ok(())
    }
}
