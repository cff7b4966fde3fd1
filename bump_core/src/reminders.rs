//! Reminder-time computation for checkups.
//!
//! Pure functions consumed by the notification collaborator: given a
//! checkup and "now", compute when reminders should fire. Actually
//! displaying an alert (and asking for permission) is the collaborator's
//! job, not this module's.
//!
//! Checkup times are local wall-clock (timezone-naive), so "now" is
//! passed as a `NaiveDateTime` too.

use crate::Checkup;
use chrono::{Duration, NaiveDateTime};

/// One scheduled reminder firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReminderInstant {
    /// When the reminder should fire.
    pub at: NaiveDateTime,
    /// The offset that produced it, in minutes before the checkup.
    pub offset_minutes: u32,
}

/// Future reminder instants for a checkup.
///
/// Empty when reminders are disabled, the checkup is completed, or every
/// offset already lies in the past. Instants come out soonest-last, in
/// offset order (largest offset = earliest firing first).
pub fn reminder_instants(checkup: &Checkup, now: NaiveDateTime) -> Vec<ReminderInstant> {
    if !checkup.reminder_enabled || checkup.completed {
        return Vec::new();
    }

    let mut instants: Vec<ReminderInstant> = checkup
        .reminder_offsets_minutes
        .iter()
        .map(|&offset_minutes| ReminderInstant {
            at: checkup.date - Duration::minutes(offset_minutes as i64),
            offset_minutes,
        })
        .filter(|instant| instant.at > now)
        .collect();

    instants.sort_by_key(|instant| instant.at);
    instants
}

/// Human description of an offset: "45 minutes before", "3 hours before",
/// "1 day before".
pub fn format_offset(minutes: u32) -> String {
    if minutes < 60 {
        format!("{} minutes before", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        format!("{} hour{} before", hours, if hours == 1 { "" } else { "s" })
    } else {
        let days = minutes / 1440;
        format!("{} day{} before", days, if days == 1 { "" } else { "s" })
    }
}
