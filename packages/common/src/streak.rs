//! Consecutive-day streak transitions.
//!
//! Two independent paths share the day-difference primitive but read
//! different date fields with different semantics: the login path works on
//! local calendar days with an absolute day difference, the problem-solved
//! path works strictly in UTC with a signed difference so that a
//! future-dated record is detected instead of silently resetting.
//!
//! The functions here are pure; persistence and locking live in the server.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Truncate a timestamp to UTC midnight of the same calendar day.
pub fn utc_day_start(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Outcome of a problem-solved streak update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SolveOutcome {
    /// First problem the user has ever solved.
    FirstSolve,
    /// Already solved something today; the counter stays put.
    Maintained,
    /// Solved on the day after the previous solve.
    Extended,
    /// A gap of more than one day; the counter starts over.
    Reset,
    /// The stored solve date is in the future relative to "now".
    DateAnomaly,
}

impl SolveOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::FirstSolve => "First problem solved! Streak started.",
            Self::Maintained => "Streak already counted for today.",
            Self::Extended => "Streak extended!",
            Self::Reset => "Streak reset. A new streak starts today.",
            Self::DateAnomaly => "Solve date anomaly detected; streak unchanged.",
        }
    }
}

/// New streak state produced by [`apply_solve`], ready to persist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolveUpdate {
    pub streak: i32,
    pub longest_streak: i32,
    pub last_solved_date: Option<DateTime<Utc>>,
    pub outcome: SolveOutcome,
}

/// Apply one problem-solved event to the stored streak state.
///
/// Day difference is computed between UTC midnights only, so the result is
/// invariant to the hour of day the user acts and to the server's local
/// timezone. A negative difference means the stored date is ahead of the
/// clock (skew or corrupted data); it is logged and treated as a no-op.
///
/// Whatever branch is taken, `longest_streak >= streak` holds afterwards.
pub fn apply_solve(
    streak: i32,
    longest_streak: i32,
    last_solved_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SolveUpdate {
    let today = utc_day_start(now);

    let (new_streak, new_last_solved, outcome) = match last_solved_date {
        None => (1, Some(today), SolveOutcome::FirstSolve),
        Some(last) => {
            let last_day = utc_day_start(last);
            let diff = (today - last_day).num_days();
            if diff == 0 {
                (streak, Some(last_day), SolveOutcome::Maintained)
            } else if diff == 1 {
                (streak + 1, Some(today), SolveOutcome::Extended)
            } else if diff > 1 {
                (1, Some(today), SolveOutcome::Reset)
            } else {
                tracing::warn!(
                    last_solved = %last,
                    now = %now,
                    day_diff = diff,
                    "Last solve date is in the future; leaving streak untouched"
                );
                (streak, last_solved_date, SolveOutcome::DateAnomaly)
            }
        }
    };

    SolveUpdate {
        streak: new_streak,
        longest_streak: longest_streak.max(new_streak),
        last_solved_date: new_last_solved,
        outcome,
    }
}

/// Apply one login event to the streak counter, on local calendar days.
///
/// Both dates are already reduced to calendar days by the caller. The day
/// difference is taken as an absolute value (`ceil(|delta| / day)` over
/// midnight-aligned instants), so a one-day gap in either direction counts
/// as consecutive.
pub fn apply_login(streak: i32, last_active_day: Option<NaiveDate>, today: NaiveDate) -> i32 {
    let Some(last) = last_active_day else {
        return 1;
    };

    match (today - last).num_days().abs() {
        0 => streak,
        1 => streak + 1,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 21, 7).unwrap()
    }

    #[test]
    fn first_solve_starts_a_streak() {
        let update = apply_solve(0, 0, None, at(2024, 5, 10, 9));
        assert_eq!(update.streak, 1);
        assert_eq!(update.longest_streak, 1);
        assert_eq!(update.outcome, SolveOutcome::FirstSolve);
        assert_eq!(update.last_solved_date, Some(utc_day_start(at(2024, 5, 10, 9))));
    }

    #[test]
    fn solving_the_day_after_extends() {
        let yesterday = utc_day_start(at(2024, 5, 9, 0));
        let update = apply_solve(2, 2, Some(yesterday), at(2024, 5, 10, 23));
        assert_eq!(update.streak, 3);
        assert_eq!(update.longest_streak, 3);
        assert_eq!(update.outcome, SolveOutcome::Extended);
    }

    #[test]
    fn a_gap_resets_but_keeps_the_record() {
        let three_days_ago = utc_day_start(at(2024, 5, 7, 12));
        let update = apply_solve(3, 3, Some(three_days_ago), at(2024, 5, 10, 8));
        assert_eq!(update.streak, 1);
        assert_eq!(update.longest_streak, 3);
        assert_eq!(update.outcome, SolveOutcome::Reset);
    }

    #[test]
    fn second_solve_on_the_same_day_is_a_noop() {
        let morning = at(2024, 5, 10, 7);
        let evening = at(2024, 5, 10, 22);

        let first = apply_solve(4, 6, Some(utc_day_start(at(2024, 5, 9, 1))), morning);
        assert_eq!(first.streak, 5);

        let second = apply_solve(first.streak, first.longest_streak, first.last_solved_date, evening);
        assert_eq!(second.streak, 5);
        assert_eq!(second.longest_streak, 6);
        assert_eq!(second.outcome, SolveOutcome::Maintained);
        assert_eq!(second.last_solved_date, first.last_solved_date);
    }

    #[test]
    fn future_dated_record_is_left_alone() {
        let tomorrow = utc_day_start(at(2024, 5, 11, 0));
        let update = apply_solve(2, 4, Some(tomorrow), at(2024, 5, 10, 10));
        assert_eq!(update.streak, 2);
        assert_eq!(update.longest_streak, 4);
        assert_eq!(update.last_solved_date, Some(tomorrow));
        assert_eq!(update.outcome, SolveOutcome::DateAnomaly);
    }

    #[test]
    fn stored_solve_date_is_always_utc_midnight() {
        let mut state = apply_solve(0, 0, None, at(2024, 1, 31, 23));
        for day in 1..=28 {
            state = apply_solve(
                state.streak,
                state.longest_streak,
                state.last_solved_date,
                at(2024, 2, day, (day * 5) % 24),
            );
            let stored = state.last_solved_date.expect("date is set after a solve");
            assert_eq!(stored.time().hour(), 0);
            assert_eq!(stored.time().minute(), 0);
            assert_eq!(stored.time().second(), 0);
        }
    }

    #[test]
    fn longest_never_drops_below_current() {
        // Mixed sequence of extends, gaps and repeats.
        let days = [1, 2, 3, 3, 6, 7, 8, 9, 20, 21];
        let mut state = apply_solve(0, 0, None, at(2024, 3, days[0], 10));
        for &d in &days[1..] {
            state = apply_solve(
                state.streak,
                state.longest_streak,
                state.last_solved_date,
                at(2024, 3, d, 10),
            );
            assert!(state.longest_streak >= state.streak);
        }
        assert_eq!(state.streak, 2);
        assert_eq!(state.longest_streak, 4);
    }

    #[test]
    fn utc_normalization_ignores_hour_of_day() {
        let late = apply_solve(1, 1, Some(utc_day_start(at(2024, 5, 9, 0))), at(2024, 5, 10, 23));
        let early = apply_solve(1, 1, Some(utc_day_start(at(2024, 5, 9, 0))), at(2024, 5, 10, 0));
        assert_eq!(late.streak, early.streak);
        assert_eq!(late.last_solved_date, early.last_solved_date);
    }

    #[test]
    fn login_with_no_history_starts_at_one() {
        let today = at(2024, 5, 10, 9).date_naive();
        assert_eq!(apply_login(0, None, today), 1);
    }

    #[test]
    fn login_transitions() {
        let today = at(2024, 5, 10, 9).date_naive();
        assert_eq!(apply_login(3, Some(today), today), 3);
        assert_eq!(apply_login(3, Some(today - Duration::days(1)), today), 4);
        assert_eq!(apply_login(3, Some(today - Duration::days(2)), today), 1);
        // Absolute difference: a record one day ahead also counts as adjacent.
        assert_eq!(apply_login(3, Some(today + Duration::days(1)), today), 4);
    }

    #[test]
    fn day_boundary_is_utc_not_local() {
        // 23:30 UTC and 00:30 UTC the next day are different days regardless
        // of any local offset.
        let before = Utc.with_ymd_and_hms(2024, 5, 9, 23, 30, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 5, 10, 0, 30, 0).unwrap();
        let update = apply_solve(1, 1, Some(utc_day_start(before)), after);
        assert_eq!(update.outcome, SolveOutcome::Extended);
        assert_eq!(update.streak, 2);
    }
}
