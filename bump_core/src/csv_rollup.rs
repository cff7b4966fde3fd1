//! CSV rollup functionality for archiving WAL sessions.
//!
//! Implements atomic WAL-to-CSV conversion with proper error handling to
//! prevent data loss. The CSV doubles as the long-term, spreadsheet-
//! friendly export of the counting history.

use crate::{MovementSession, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    date: String,
    started_at: String,
    ended_at: Option<String>,
    count: u32,
    duration_minutes: Option<i64>,
    completed: bool,
}

impl From<&MovementSession> for CsvRow {
    fn from(session: &MovementSession) -> Self {
        CsvRow {
            id: session.id.to_string(),
            date: session.date.to_string(),
            started_at: session.started_at.to_rfc3339(),
            ended_at: session.ended_at.map(|t| t.to_rfc3339()),
            count: session.count,
            duration_minutes: session.duration_minutes,
            completed: session.completed,
        }
    }
}

/// Roll up WAL sessions into CSV and archive the WAL atomically
///
/// This function:
/// 1. Reads all sessions from the WAL
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the WAL to .processed
/// 5. Returns the number of sessions processed
///
/// # Safety
/// - CSV is fsynced before WAL is renamed
/// - WAL is renamed (not deleted) to allow manual recovery if needed
/// - Processed WAL files can be cleaned up manually
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let sessions = crate::wal::read_sessions(wal_path)?;

    if sessions.is_empty() {
        tracing::info!("No sessions in WAL to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Write headers only when the file is fresh
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for session in &sessions {
        writer.serialize(CsvRow::from(session))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sessions to CSV", sessions.len());

    // Atomically archive the WAL by renaming it
    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived WAL to {:?}", processed_path);

    Ok(sessions.len())
}

/// Clean up old processed WAL files
///
/// Removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed WAL: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed WAL files", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::{JsonlSink, SessionSink};
    use chrono::{Duration, TimeZone, Utc};
    use std::fs::File;
    use uuid::Uuid;

    fn finished_session(count: u32) -> MovementSession {
        let started_at = Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap();
        MovementSession {
            id: Uuid::new_v4(),
            date: started_at.date_naive(),
            started_at,
            ended_at: Some(started_at + Duration::minutes(8)),
            count,
            duration_minutes: Some(8),
            completed: count >= 10,
        }
    }

    #[test]
    fn test_wal_to_csv_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        for count in [3, 7, 10] {
            sink.append(&finished_session(count)).unwrap();
        }

        let count = wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!wal_path.exists());
        assert!(wal_path.with_extension("wal.processed").exists());
    }

    #[test]
    fn test_wal_to_csv_appends() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&finished_session(5)).unwrap();
        assert_eq!(wal_to_csv_and_archive(&wal_path, &csv_path).unwrap(), 1);

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&finished_session(10)).unwrap();
        assert_eq!(wal_to_csv_and_archive(&wal_path, &csv_path).unwrap(), 1);

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 2);
    }

    #[test]
    fn test_empty_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("empty.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        File::create(&wal_path).unwrap();

        let count = wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cleanup_processed_wals() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("s1.wal.processed")).unwrap();
        File::create(temp_dir.path().join("s2.wal.processed")).unwrap();
        File::create(temp_dir.path().join("keep.wal")).unwrap();

        let count = cleanup_processed_wals(temp_dir.path()).unwrap();
        assert_eq!(count, 2);

        assert!(!temp_dir.path().join("s1.wal.processed").exists());
        assert!(temp_dir.path().join("keep.wal").exists());
    }
}
