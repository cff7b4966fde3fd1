//! Core domain types for the Bump pregnancy tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - The user profile and its notification fields
//! - Derived pregnancy progress (weeks, trimester, baby size)
//! - Movement counting sessions and aggregate stats
//! - Prenatal checkups and the suggested schedule

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Profile Types
// ============================================================================

/// Browser/OS notification permission state, mirrored into the profile
/// by the notification collaborator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPermission {
    Granted,
    Denied,
    Default,
}

/// The single persisted user profile.
///
/// `pregnancy_start_date` is derived from `due_date` exactly once, when the
/// profile is created or the due date is updated. It is stored redundantly
/// for display and never re-derived on read.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub due_date: NaiveDate,
    pub user_name: Option<String>,
    pub pregnancy_start_date: NaiveDate,
    pub onboarding_completed: bool,
    pub notification_permission: NotificationPermission,
    pub prefer_in_app_notifications: bool,
}

// ============================================================================
// Pregnancy Progress Types
// ============================================================================

/// Coarse pregnancy phase derived from elapsed weeks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trimester {
    Early,
    Mid,
    Late,
}

/// Week-indexed size descriptor for display ("your baby is the size of…").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BabySize {
    pub name: String,
    pub emoji: String,
    pub length_cm: f64,
}

/// Elapsed pregnancy time split into whole weeks plus leftover days.
///
/// `weeks` may be zero or negative when "today" precedes the pregnancy
/// start date; `days` is always in `0..7`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeksPregnant {
    pub weeks: i64,
    pub days: i64,
}

/// The full derived progress view, recomputed on every read from the due
/// date and the current date. Never persisted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PregnancyInfo {
    pub weeks: i64,
    pub days: i64,
    pub days_until_due: i64,
    pub trimester: Trimester,
    pub baby_size: BabySize,
}

// ============================================================================
// Movement Session Types
// ============================================================================

/// One fetal-movement counting session.
///
/// `date` carries day granularity for grouping and history queries;
/// `started_at`/`ended_at` carry full timestamps for duration math.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MovementSession {
    pub id: Uuid,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub count: u32,
    pub duration_minutes: Option<i64>,
    pub completed: bool,
}

/// Aggregate stats over a slice of session history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MovementStats {
    pub total_sessions: usize,
    pub average_count: f64,
    pub average_duration_minutes: f64,
    pub sessions_per_week: f64,
}

// ============================================================================
// Checkup Types
// ============================================================================

/// Closed set of prenatal checkup kinds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheckupKind {
    FirstVisit,
    NtScan,
    SerumScreening,
    AnomalyScan,
    GlucoseTolerance,
    Routine,
    Other,
}

impl CheckupKind {
    /// All kinds, in the order they are offered for selection.
    pub const ALL: [CheckupKind; 7] = [
        CheckupKind::FirstVisit,
        CheckupKind::NtScan,
        CheckupKind::SerumScreening,
        CheckupKind::AnomalyScan,
        CheckupKind::GlucoseTolerance,
        CheckupKind::Routine,
        CheckupKind::Other,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            CheckupKind::FirstVisit => "First visit",
            CheckupKind::NtScan => "NT scan",
            CheckupKind::SerumScreening => "Serum screening",
            CheckupKind::AnomalyScan => "Anomaly scan",
            CheckupKind::GlucoseTolerance => "Glucose tolerance test",
            CheckupKind::Routine => "Routine checkup",
            CheckupKind::Other => "Other",
        }
    }
}

/// A scheduled prenatal checkup.
///
/// `date` is local wall-clock time (timezone-naive). When reminders are
/// enabled, `reminder_offsets_minutes` holds the minutes-before offsets the
/// notification collaborator should fire at.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Checkup {
    pub id: Uuid,
    pub date: NaiveDateTime,
    pub kind: CheckupKind,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub reminder_enabled: bool,
    pub reminder_offsets_minutes: Vec<u32>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Checkup {
    /// Build a new checkup, stamping reminder offsets from the given policy
    /// when reminders are enabled.
    pub fn new(
        kind: CheckupKind,
        date: NaiveDateTime,
        location: Option<String>,
        notes: Option<String>,
        reminder_enabled: bool,
        offsets_minutes: &[u32],
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
            location,
            notes,
            reminder_enabled,
            reminder_offsets_minutes: if reminder_enabled {
                offsets_minutes.to_vec()
            } else {
                Vec::new()
            },
            completed: false,
            created_at,
        }
    }
}

/// An entry in the suggested checkup schedule.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CheckupTemplate {
    pub kind: CheckupKind,
    pub week: u32,
    pub description: &'static str,
}
