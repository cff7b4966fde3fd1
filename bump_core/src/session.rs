//! Movement counting session state machine.
//!
//! One `SessionTracker` owns the single "current session" slot: idle until
//! a session starts, tracking while kicks are recorded, and back to idle
//! after the session is saved or cancelled. Reaching the kick target marks
//! the session completed and arms an auto-save deadline that the caller
//! polls; ending or resetting the session first disarms it, so a deadline
//! can never fire after the user already acted.
//!
//! Every mutating operation returns the event it produced, or `None` when
//! called in a state where it has no effect. Invalid transitions are
//! no-ops, never errors.
//!
//! Duration math here is timestamp arithmetic over `DateTime<Utc>`;
//! calendar-day math stays in `progress`.

use crate::config::TrackingConfig;
use crate::MovementSession;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Notification emitted by a state transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new session was created and tracking began.
    Started,
    /// A movement was recorded; `count` is the new total.
    Recorded { count: u32 },
    /// The recorded movement reached the kick target; the session is now
    /// completed and the auto-save deadline is armed.
    Completed { count: u32 },
    /// The session was ended; `duration_minutes` is the whole-minute gap
    /// between start and end.
    Ended { duration_minutes: i64 },
    /// The session slot was cleared.
    Reset,
}

/// State container for the single active counting session.
#[derive(Clone, Debug)]
pub struct SessionTracker {
    kick_target: u32,
    auto_save_delay: Duration,
    current: Option<MovementSession>,
    tracking: bool,
    auto_save_at: Option<DateTime<Utc>>,
}

impl SessionTracker {
    pub fn new(kick_target: u32, auto_save_delay: Duration) -> Self {
        Self {
            kick_target,
            auto_save_delay,
            current: None,
            tracking: false,
            auto_save_at: None,
        }
    }

    pub fn from_config(config: &TrackingConfig) -> Self {
        Self::new(
            config.kick_target,
            Duration::seconds(config.auto_save_delay_seconds as i64),
        )
    }

    /// The kick count at which a session auto-completes.
    pub fn kick_target(&self) -> u32 {
        self.kick_target
    }

    /// Whether a session is currently being tracked (including a completed
    /// session that has not yet been ended or reset).
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// The session currently occupying the slot, if any.
    pub fn current(&self) -> Option<&MovementSession> {
        self.current.as_ref()
    }

    /// Start a new session. No-op unless the tracker is idle: a second
    /// start while a session occupies the slot leaves it untouched.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        if self.current.is_some() {
            tracing::debug!("start ignored: a session is already active");
            return None;
        }

        self.current = Some(MovementSession {
            id: Uuid::new_v4(),
            date: now.date_naive(),
            started_at: now,
            ended_at: None,
            count: 0,
            duration_minutes: None,
            completed: false,
        });
        self.tracking = true;
        self.auto_save_at = None;

        tracing::info!("Started movement session");
        Some(SessionEvent::Started)
    }

    /// Record one movement. No-op with no active session, after the
    /// session has ended, or once the kick target has been reached (the
    /// cap is an invariant of the tracker, not a caller obligation).
    ///
    /// Reaching the target marks the session completed and arms the
    /// auto-save deadline at `now + delay`.
    pub fn record_movement(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        if !self.tracking {
            tracing::debug!("record ignored: no active session");
            return None;
        }

        let session = self.current.as_mut()?;
        if session.count >= self.kick_target {
            tracing::debug!("record ignored: kick target already reached");
            return None;
        }

        session.count += 1;

        if session.count >= self.kick_target {
            session.completed = true;
            self.auto_save_at = Some(now + self.auto_save_delay);
            tracing::info!(count = session.count, "Session completed");
            Some(SessionEvent::Completed {
                count: session.count,
            })
        } else {
            tracing::debug!(count = session.count, "Recorded movement");
            Some(SessionEvent::Recorded {
                count: session.count,
            })
        }
    }

    /// Whether the armed auto-save deadline has elapsed.
    ///
    /// Only true while the completed session is still tracking; `end` and
    /// `reset` both disarm the deadline.
    pub fn auto_save_due(&self, now: DateTime<Utc>) -> bool {
        self.tracking && self.auto_save_at.is_some_and(|at| now >= at)
    }

    /// End the active session: stamp `ended_at` and the whole-minute
    /// duration, stop tracking, disarm the auto-save deadline. The session
    /// stays in the slot for the caller to persist; persistence itself is
    /// not this tracker's job.
    pub fn end(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        if !self.tracking {
            tracing::debug!("end ignored: no active session");
            return None;
        }

        let session = self.current.as_mut()?;
        let duration_minutes = (now - session.started_at).num_minutes();
        session.ended_at = Some(now);
        session.duration_minutes = Some(duration_minutes);
        self.tracking = false;
        self.auto_save_at = None;

        tracing::info!(duration_minutes, count = session.count, "Ended session");
        Some(SessionEvent::Ended { duration_minutes })
    }

    /// Clear the session slot from any state, returning to idle. Used both
    /// after a successful save and on cancel; the discarded session (if
    /// any) is handed back to the caller.
    pub fn reset(&mut self) -> Option<(MovementSession, SessionEvent)> {
        self.tracking = false;
        self.auto_save_at = None;

        let discarded = self.current.take()?;
        tracing::debug!("Reset session slot");
        Some((discarded, SessionEvent::Reset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tracker() -> SessionTracker {
        SessionTracker::new(10, Duration::seconds(2))
    }

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, hour, min, sec).unwrap()
    }

    #[test]
    fn test_completed_flips_exactly_on_tenth_kick() {
        let mut t = tracker();
        let now = at(9, 0, 0);
        assert_eq!(t.start(now), Some(SessionEvent::Started));

        for expected in 1..=9 {
            assert_eq!(
                t.record_movement(now),
                Some(SessionEvent::Recorded { count: expected })
            );
            assert!(!t.current().unwrap().completed);
        }

        assert_eq!(
            t.record_movement(now),
            Some(SessionEvent::Completed { count: 10 })
        );
        let session = t.current().unwrap();
        assert_eq!(session.count, 10);
        assert!(session.completed);
    }

    #[test]
    fn test_cap_blocks_further_records() {
        let mut t = tracker();
        let now = at(9, 0, 0);
        t.start(now);
        for _ in 0..10 {
            t.record_movement(now);
        }

        assert_eq!(t.record_movement(now), None);
        assert_eq!(t.current().unwrap().count, 10);
    }

    #[test]
    fn test_record_with_no_session_is_noop() {
        let mut t = tracker();
        assert_eq!(t.record_movement(at(9, 0, 0)), None);
        assert!(t.current().is_none());
        assert!(!t.is_tracking());
    }

    #[test]
    fn test_start_is_idempotent_while_tracking() {
        let mut t = tracker();
        t.start(at(9, 0, 0));
        t.record_movement(at(9, 1, 0));
        let id = t.current().unwrap().id;

        assert_eq!(t.start(at(9, 2, 0)), None);
        assert_eq!(t.current().unwrap().id, id);
        assert_eq!(t.current().unwrap().count, 1);
    }

    #[test]
    fn test_duration_is_floor_minutes() {
        let mut t = tracker();
        t.start(at(9, 0, 0));
        for _ in 0..3 {
            t.record_movement(at(9, 1, 0));
        }

        // 5 minutes 59 seconds rounds down to 5.
        let event = t.end(at(9, 5, 59));
        assert_eq!(event, Some(SessionEvent::Ended { duration_minutes: 5 }));

        let session = t.current().unwrap();
        assert_eq!(session.count, 3);
        assert_eq!(session.duration_minutes, Some(5));
        assert!(!session.completed);
        assert!(!t.is_tracking());
    }

    #[test]
    fn test_end_then_reset_clears_regardless_of_completed() {
        let mut t = tracker();
        t.start(at(9, 0, 0));
        t.record_movement(at(9, 0, 30));
        t.end(at(9, 5, 0));

        let (discarded, event) = t.reset().unwrap();
        assert_eq!(event, SessionEvent::Reset);
        assert_eq!(discarded.count, 1);
        assert!(t.current().is_none());
        assert!(!t.is_tracking());

        // Reset from idle is a quiet no-op.
        assert!(t.reset().is_none());
    }

    #[test]
    fn test_end_without_session_is_noop() {
        let mut t = tracker();
        assert_eq!(t.end(at(9, 0, 0)), None);

        // Ending twice is also a no-op.
        t.start(at(9, 0, 0));
        t.end(at(9, 1, 0));
        assert_eq!(t.end(at(9, 2, 0)), None);
    }

    #[test]
    fn test_auto_save_deadline_arms_on_completion() {
        let mut t = tracker();
        let start = at(9, 0, 0);
        t.start(start);
        for _ in 0..10 {
            t.record_movement(start);
        }

        assert!(!t.auto_save_due(start));
        assert!(!t.auto_save_due(at(9, 0, 1)));
        assert!(t.auto_save_due(at(9, 0, 2)));
        assert!(t.auto_save_due(at(9, 0, 10)));
    }

    #[test]
    fn test_deadline_never_fires_after_end_or_reset() {
        let mut t = tracker();
        let start = at(9, 0, 0);
        t.start(start);
        for _ in 0..10 {
            t.record_movement(start);
        }

        t.end(at(9, 0, 1));
        assert!(!t.auto_save_due(at(9, 0, 30)));

        // Same for reset before the deadline elapses.
        let mut t = tracker();
        t.start(start);
        for _ in 0..10 {
            t.record_movement(start);
        }
        t.reset();
        assert!(!t.auto_save_due(at(9, 0, 30)));
    }

    #[test]
    fn test_deadline_not_armed_before_completion() {
        let mut t = tracker();
        t.start(at(9, 0, 0));
        for _ in 0..9 {
            t.record_movement(at(9, 0, 0));
        }
        assert!(!t.auto_save_due(at(10, 0, 0)));
    }

    #[test]
    fn test_session_date_matches_start_day() {
        let mut t = tracker();
        t.start(at(23, 59, 0));
        let session = t.current().unwrap();
        assert_eq!(session.date, session.started_at.date_naive());
    }

    #[test]
    fn test_start_after_reset_creates_fresh_session() {
        let mut t = tracker();
        t.start(at(9, 0, 0));
        let first_id = t.current().unwrap().id;
        t.end(at(9, 1, 0));

        // Slot still occupied by the ended session: start must not clobber it.
        assert_eq!(t.start(at(9, 2, 0)), None);

        t.reset();
        assert_eq!(t.start(at(9, 3, 0)), Some(SessionEvent::Started));
        assert_ne!(t.current().unwrap().id, first_id);
        assert_eq!(t.current().unwrap().count, 0);
    }
}
