//! Per-move time budgets.
//!
//! Correspondence time control: each player has the same fixed budget for
//! every move, and the clock restarts when a move is made. Running out is
//! detected by readers; the explicit `forfeit_on_time` transition lives on
//! the game itself.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The per-move budget, fixed when the challenge is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeControl {
    seconds: i64,
}

impl TimeControl {
    /// The usual correspondence speeds are whole days per move.
    pub fn days(days: i64) -> Self {
        Self {
            seconds: days.max(0) * 86_400,
        }
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self {
            seconds: duration.num_seconds().max(0),
        }
    }

    pub fn per_move(&self) -> Duration {
        Duration::seconds(self.seconds)
    }

    /// Remaining budget for the player on move, clamped at zero.
    pub fn time_left(&self, last_move_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        let left = self.per_move() - (now - last_move_at);
        left.max(Duration::zero())
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, unit) = if self.seconds % 86_400 == 0 && self.seconds > 0 {
            (self.seconds / 86_400, "day")
        } else if self.seconds % 3_600 == 0 && self.seconds > 0 {
            (self.seconds / 3_600, "hour")
        } else if self.seconds % 60 == 0 && self.seconds > 0 {
            (self.seconds / 60, "min")
        } else {
            (self.seconds, "sec")
        };
        if value == 1 {
            write!(f, "1 {unit}")
        } else {
            write!(f, "{value} {unit}s")
        }
    }
}

/// Listing-friendly remaining time, e.g. "2 days 3 hours 4 mins 5 secs".
/// Leading zero units are skipped, later ones are kept so columns line up.
pub fn format_time_left(left: Duration) -> String {
    let secs = left.num_seconds().max(0);
    let units = [
        ("days", secs / 86_400),
        ("hours", secs / 3_600 % 24),
        ("mins", secs / 60 % 60),
        ("secs", secs % 60),
    ];

    let mut parts = Vec::new();
    for (unit, value) in units {
        if value > 0 || !parts.is_empty() {
            parts.push(format!("{value} {unit}"));
        }
    }
    if parts.is_empty() {
        return "0 secs".to_string();
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_time_left_counts_down_and_clamps() {
        let control = TimeControl::days(1);
        assert_eq!(control.time_left(at(0), at(0)), Duration::days(1));
        assert_eq!(
            control.time_left(at(0), at(3_600)),
            Duration::days(1) - Duration::hours(1)
        );
        assert_eq!(control.time_left(at(0), at(86_400)), Duration::zero());
        assert_eq!(control.time_left(at(0), at(500_000)), Duration::zero());
    }

    #[test]
    fn test_display_speeds() {
        assert_eq!(TimeControl::days(3).to_string(), "3 days");
        assert_eq!(TimeControl::days(1).to_string(), "1 day");
        assert_eq!(
            TimeControl::from_duration(Duration::hours(12)).to_string(),
            "12 hours"
        );
    }

    #[test]
    fn test_format_time_left() {
        let left = Duration::days(2) + Duration::hours(3) + Duration::minutes(4) + Duration::seconds(5);
        assert_eq!(format_time_left(left), "2 days 3 hours 4 mins 5 secs");
        assert_eq!(
            format_time_left(Duration::hours(1) + Duration::seconds(2)),
            "1 hours 0 mins 2 secs"
        );
        assert_eq!(format_time_left(Duration::zero()), "0 secs");
        assert_eq!(format_time_left(Duration::seconds(-5)), "0 secs");
    }
}
