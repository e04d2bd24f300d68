use chrono::{DateTime, Duration, Utc};

pub const MAX_FAILED_ATTEMPTS: i32 = 5;
pub const LOCKOUT_WINDOW_HOURS: i64 = 2;

/// Lock status derived from the stored `locked_until` timestamp. There is no
/// stored boolean; an expired timestamp simply reads as unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked { until: DateTime<Utc> },
}

pub fn lock_state(locked_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> LockState {
    match locked_until {
        Some(until) if until > now => LockState::Locked { until },
        _ => LockState::Unlocked,
    }
}

/// Transition applied on a failed login. Returns the new attempt counter and
/// lock timestamp.
///
/// A failure after an expired lock restarts the counter at 1 and clears the
/// timestamp. The lock is set exactly once, on the attempt that reaches the
/// threshold.
pub fn on_failed_attempt(
    attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (i32, Option<DateTime<Utc>>) {
    if let Some(until) = locked_until {
        if until <= now {
            return (1, None);
        }
    }
    let next = attempts + 1;
    let until = if next >= MAX_FAILED_ATTEMPTS && locked_until.is_none() {
        Some(now + Duration::hours(LOCKOUT_WINDOW_HOURS))
    } else {
        locked_until
    };
    (next, until)
}
