use time::{macros::datetime, Duration, OffsetDateTime};

/// Minimum time between two successful mines.
pub const COOLDOWN: Duration = Duration::hours(8);

/// Amount credited by one successful mine.
pub const MINE_REWARD: f64 = 10.0;

/// `last_mine_at` of an account that has never mined.
///
/// Earliest instant the stored RFC 3339 form can hold, so any real clock is
/// more than one cooldown past it.
pub const NEVER_MINED: OffsetDateTime = datetime!(0001-01-01 0:00 UTC);

/// Outcome of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    NotYet(Duration),
}

/// Decide whether a mine at `now` is allowed after one at `last_mine_at`.
pub fn evaluate(last_mine_at: OffsetDateTime, now: OffsetDateTime) -> Eligibility {
    let elapsed = now - last_mine_at;
    if elapsed >= COOLDOWN {
        Eligibility::Eligible
    } else {
        Eligibility::NotYet(COOLDOWN - elapsed)
    }
}

/// Returns `(reward, new_balance)`.
pub fn apply_reward(current_balance: f64) -> (f64, f64) {
    (MINE_REWARD, current_balance + MINE_REWARD)
}

/// Split a duration into whole `(hours, minutes, seconds)`, truncating
/// sub-second precision.
pub fn format_remaining(remaining: Duration) -> (i64, i64, i64) {
    let total = remaining.whole_seconds();
    (total / 3600, (total % 3600) / 60, total % 60)
}

/// Human readable form of [`format_remaining`].
pub fn describe_remaining(remaining: Duration) -> String {
    let (hours, minutes, seconds) = format_remaining(remaining);
    format!("{hours} hours, {minutes} minutes, {seconds} seconds")
}
