//! User profile persistence with file locking.
//!
//! The profile is a single JSON file. Reads take a shared lock; writes go
//! through a temp file with an exclusive lock and an atomic rename, so a
//! crashed writer can never leave a half-written profile behind.
//!
//! A missing or unreadable file means "not onboarded" - first-run
//! behavior, not an error.

use crate::progress::PREGNANCY_DURATION_DAYS;
use crate::{Error, NotificationPermission, Result, UserProfile};
use chrono::{Duration, NaiveDate};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl UserProfile {
    /// Build the profile created at onboarding completion.
    ///
    /// The pregnancy start date is derived here, once, and stored; it is
    /// never recomputed from the due date on later reads.
    pub fn onboard(due_date: NaiveDate, user_name: Option<String>) -> Self {
        Self {
            due_date,
            user_name,
            pregnancy_start_date: due_date - Duration::days(PREGNANCY_DURATION_DAYS),
            onboarding_completed: true,
            notification_permission: NotificationPermission::Default,
            prefer_in_app_notifications: false,
        }
    }

    /// Load the profile from a file with shared locking.
    ///
    /// Returns `None` if the file doesn't exist. If the file is corrupted
    /// or unreadable, logs a warning and returns `None` as well.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::info!("No profile file found, treating as first run");
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open profile {:?}: {}. Treating as unset.", path, e);
                return Ok(None);
            }
        };

        // Shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock profile {:?}: {}. Treating as unset.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read profile {:?}: {}. Treating as unset.", path, e);
            return Ok(None);
        }

        file.unlock()?;

        match serde_json::from_str::<UserProfile>(&contents) {
            Ok(profile) => {
                tracing::debug!("Loaded profile from {:?}", path);
                Ok(Some(profile))
            }
            Err(e) => {
                tracing::warn!("Failed to parse profile {:?}: {}. Treating as unset.", path, e);
                Ok(None)
            }
        }
    }

    /// Save the profile with exclusive locking.
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "profile path missing parent")
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

        tracing::debug!("Saved profile to {:?}", path);
        Ok(())
    }

    /// Load the profile, modify it, and save it back atomically.
    ///
    /// Errors if no profile exists yet: updates only make sense after
    /// onboarding created one.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut UserProfile) -> Result<()>,
    {
        let mut profile = Self::load(path)?
            .ok_or_else(|| Error::Profile("no profile to update; run setup first".into()))?;
        f(&mut profile)?;
        profile.save(path)?;
        Ok(profile)
    }

    /// Change the due date, re-deriving the stored start date (this is the
    /// one place besides onboarding where the derivation happens).
    pub fn set_due_date(&mut self, due_date: NaiveDate) {
        self.due_date = due_date;
        self.pregnancy_start_date = due_date - Duration::days(PREGNANCY_DURATION_DAYS);
    }
}

/// Whether onboarding has completed (gates the first-run flow).
pub fn is_onboarded(path: &Path) -> bool {
    matches!(
        UserProfile::load(path),
        Ok(Some(UserProfile {
            onboarding_completed: true,
            ..
        }))
    )
}

/// Remove the profile file. Part of full data reset; missing file is fine.
pub fn clear(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("Removed profile {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
