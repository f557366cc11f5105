use chrono::{DateTime, Duration, Utc};

/// Brute-force lockout policy for administrative accounts. Ordinary accounts
/// carry no failure counter; the asymmetry is inherited behavior, not an
/// oversight in this module.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lock_duration: Duration,
}

impl LockoutPolicy {
    pub fn new(max_attempts: u32, lock_duration: Duration) -> Self {
        Self {
            max_attempts,
            lock_duration,
        }
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        // 5 failed attempts lock the account for 2 hours
        Self::new(5, Duration::hours(2))
    }
}

/// Target state after a failed credential check. The store must apply this
/// in a single atomic update so concurrent failures cannot lose increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureTransition {
    pub attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

/// Failure transition of the lockout state machine.
///
/// A lock that has already expired means the counter restarts: this failure
/// counts as attempt #1 and the stale lock is cleared. Otherwise the counter
/// increments, and reaching the threshold sets the lock window.
pub fn on_failure(
    policy: &LockoutPolicy,
    attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> FailureTransition {
    if let Some(until) = locked_until {
        if until <= now {
            return FailureTransition {
                attempts: 1,
                locked_until: None,
            };
        }
    }

    let next = attempts.saturating_add(1);
    let locked_until = if locked_until.is_none() && next >= policy.max_attempts as i32 {
        Some(now + policy.lock_duration)
    } else {
        locked_until
    };

    FailureTransition {
        attempts: next,
        locked_until,
    }
}

/// Derived lock state at `now`.
pub fn is_locked(locked_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    locked_until.map_or(false, |until| until > now)
}
