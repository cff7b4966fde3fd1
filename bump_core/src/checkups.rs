//! Prenatal checkup book.
//!
//! All checkups live in a single JSON file managed with the same locked,
//! atomic load/modify/save pattern as the profile. The book is small (a
//! pregnancy has a few dozen checkups at most), so whole-file rewrites
//! are the simplest safe store.

use crate::{Checkup, CheckupKind, CheckupTemplate, Error, Result};
use chrono::NaiveDateTime;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// The suggested checkup schedule, by pregnancy week.
pub const CHECKUP_TEMPLATES: [CheckupTemplate; 5] = [
    CheckupTemplate {
        kind: CheckupKind::FirstVisit,
        week: 6,
        description: "Confirm the pregnancy and open the maternity record",
    },
    CheckupTemplate {
        kind: CheckupKind::NtScan,
        week: 11,
        description: "Nuchal translucency ultrasound",
    },
    CheckupTemplate {
        kind: CheckupKind::SerumScreening,
        week: 15,
        description: "Maternal serum screening",
    },
    CheckupTemplate {
        kind: CheckupKind::AnomalyScan,
        week: 20,
        description: "Fetal anomaly ultrasound",
    },
    CheckupTemplate {
        kind: CheckupKind::GlucoseTolerance,
        week: 24,
        description: "Gestational diabetes screening",
    },
];

/// The persisted collection of checkups.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckupBook {
    checkups: Vec<Checkup>,
}

impl CheckupBook {
    /// Load the book from a file with shared locking.
    ///
    /// Returns an empty book if the file doesn't exist; a corrupted file
    /// logs a warning and also yields an empty book.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No checkup book found, starting empty");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open checkup book {:?}: {}. Starting empty.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock checkup book {:?}: {}. Starting empty.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read checkup book {:?}: {}. Starting empty.", path, e);
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<CheckupBook>(&contents) {
            Ok(book) => {
                tracing::debug!("Loaded {} checkups from {:?}", book.checkups.len(), path);
                Ok(book)
            }
            Err(e) => {
                tracing::warn!("Failed to parse checkup book {:?}: {}. Starting empty.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save the book with exclusive locking and an atomic rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "checkup book path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved checkup book to {:?}", path);
        Ok(())
    }

    /// Load the book, modify it, and save it back atomically.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut CheckupBook) -> Result<()>,
    {
        let mut book = Self::load(path)?;
        f(&mut book)?;
        book.save(path)?;
        Ok(book)
    }

    /// Add a checkup to the book, returning its id.
    pub fn add(&mut self, checkup: Checkup) -> Uuid {
        let id = checkup.id;
        self.checkups.push(checkup);
        tracing::info!("Added checkup {}", id);
        id
    }

    /// Replace the checkup with the same id. Errors if it doesn't exist.
    pub fn replace(&mut self, checkup: Checkup) -> Result<()> {
        match self.checkups.iter_mut().find(|c| c.id == checkup.id) {
            Some(slot) => {
                *slot = checkup;
                Ok(())
            }
            None => Err(Error::Checkup(format!("no checkup with id {}", checkup.id))),
        }
    }

    /// Remove a checkup by id; returns whether anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.checkups.len();
        self.checkups.retain(|c| c.id != id);
        before != self.checkups.len()
    }

    /// Mark a checkup completed (or not). Errors on an unknown id.
    pub fn set_completed(&mut self, id: Uuid, completed: bool) -> Result<()> {
        match self.checkups.iter_mut().find(|c| c.id == id) {
            Some(checkup) => {
                checkup.completed = completed;
                Ok(())
            }
            None => Err(Error::Checkup(format!("no checkup with id {}", id))),
        }
    }

    /// Look up a checkup by id.
    pub fn get(&self, id: Uuid) -> Option<&Checkup> {
        self.checkups.iter().find(|c| c.id == id)
    }

    /// All checkups ordered by scheduled time, soonest first.
    pub fn ordered(&self) -> Vec<&Checkup> {
        let mut out: Vec<&Checkup> = self.checkups.iter().collect();
        out.sort_by_key(|c| c.date);
        out
    }

    /// Open (not completed) checkups scheduled in `[now, now + window]`.
    pub fn upcoming(&self, now: NaiveDateTime, window_hours: i64) -> Vec<&Checkup> {
        let deadline = now + chrono::Duration::hours(window_hours);
        let mut out: Vec<&Checkup> = self
            .checkups
            .iter()
            .filter(|c| !c.completed && c.date >= now && c.date <= deadline)
            .collect();
        out.sort_by_key(|c| c.date);
        out
    }

    pub fn len(&self) -> usize {
        self.checkups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkups.is_empty()
    }

    /// Drop every checkup. Part of full data reset.
    pub fn clear(&mut self) {
        self.checkups.clear();
    }
}

/// Remove the book file entirely. Missing file is fine.
pub fn clear_file(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("Removed checkup book {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
