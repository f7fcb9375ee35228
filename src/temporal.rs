//! Temporal state calculator.
//!
//! Pure functions of the current wall-clock time and the schedule. Nothing
//! here suspends or mutates; the driver calls [`TimelineSnapshot::compute`]
//! on every accepted clock tick. One-minute resolution is sufficient; the
//! sub-second all-aboard countdown is the separate [`Countdown`] helper.

use serde::Serialize;

use crate::schedule::Schedule;
use crate::types::{ActivityId, TimeOfDay};

/// Discrete lifecycle of one activity at a given instant.
///
/// `Completed` always wins over the clock-derived states: the flag is user
/// intent, never inferred. `ElapsedIncomplete` is deliberately distinct
/// from `Completed` so a missed stop can be styled as missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    Upcoming,
    Active,
    Completed,
    ElapsedIncomplete,
}

/// Derived temporal view of one activity. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityTemporal {
    pub id: ActivityId,
    pub state: LifecycleState,
    /// Window progress, 0..=100.
    pub progress: f64,
}

/// Derived view of the idle interval between two consecutive activities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapState {
    /// Id of the activity the gap leads into.
    pub before: ActivityId,
    pub duration_minutes: u32,
    /// Progress through the gap, 0..=100.
    pub progress: f64,
}

/// Progress through `[start, end)` at time `now`, clamped to 0..=100.
///
/// Returns 0 before the window, 100 at or past its end. A numerically
/// inverted window (`end < start`) is treated as wrapping past midnight so
/// the result stays in range; the schedule validator prevents such windows
/// from loading in the first place.
pub fn window_progress(now: TimeOfDay, start: TimeOfDay, end: TimeOfDay) -> f64 {
    let total = start.until(end);
    if total == 0 {
        return if now >= start { 100.0 } else { 0.0 };
    }
    if now < start {
        return 0.0;
    }
    let elapsed = start.until(now);
    (100.0 * elapsed as f64 / total as f64).clamp(0.0, 100.0)
}

/// Lifecycle state for a window with the given completion flag.
pub fn lifecycle(now: TimeOfDay, start: TimeOfDay, end: TimeOfDay, completed: bool) -> LifecycleState {
    if completed {
        LifecycleState::Completed
    } else if now < start {
        LifecycleState::Upcoming
    } else if now < end {
        LifecycleState::Active
    } else {
        LifecycleState::ElapsedIncomplete
    }
}

/// Everything the timeline surface needs for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSnapshot {
    pub now: TimeOfDay,
    pub activities: Vec<ActivityTemporal>,
    /// One entry per consecutive pair with a positive gap.
    pub gaps: Vec<GapState>,
}

impl TimelineSnapshot {
    /// Recompute the derived temporal state for every activity and gap.
    pub fn compute(now: TimeOfDay, schedule: &Schedule) -> Self {
        let activities = schedule
            .activities()
            .iter()
            .map(|act| ActivityTemporal {
                id: act.id.clone(),
                state: lifecycle(now, act.start, act.end, act.completed),
                progress: window_progress(now, act.start, act.end),
            })
            .collect();

        let gaps = schedule
            .activities()
            .windows(2)
            .filter_map(|pair| {
                let (prev, next) = (&pair[0], &pair[1]);
                if next.start <= prev.end {
                    return None;
                }
                Some(GapState {
                    before: next.id.clone(),
                    duration_minutes: prev.end.until(next.start),
                    progress: window_progress(now, prev.end, next.start),
                })
            })
            .collect();

        TimelineSnapshot { now, activities, gaps }
    }

    pub fn for_activity(&self, id: &ActivityId) -> Option<&ActivityTemporal> {
        self.activities.iter().find(|a| &a.id == id)
    }
}

/// Format a minute count the way the timeline shows it: "1h 30min",
/// "2h", "45min".
pub fn format_minutes(mins: u32) -> String {
    let h = mins / 60;
    let m = mins % 60;
    match (h, m) {
        (0, m) => format!("{m}min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}min"),
    }
}

/// Remaining time until a fixed deadline, at second resolution.
///
/// This backs the all-aboard countdown, which ticks every second and is
/// independent of the one-minute timeline recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Still before the deadline.
    Remaining { hours: u32, minutes: u32, seconds: u32 },
    /// Deadline reached or passed.
    Elapsed,
}

impl Countdown {
    /// Count down from `now_seconds` (seconds since local midnight) to a
    /// same-day deadline.
    pub fn to_deadline(deadline: TimeOfDay, now_seconds: u32) -> Self {
        let target = deadline.minutes() * 60;
        if now_seconds >= target {
            return Countdown::Elapsed;
        }
        let diff = target - now_seconds;
        Countdown::Remaining { hours: diff / 3600, minutes: (diff % 3600) / 60, seconds: diff % 60 }
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Countdown::Remaining { hours, minutes, seconds } => {
                write!(f, "{hours:02}h {minutes:02}m {seconds:02}s")
            }
            Countdown::Elapsed => f.write_str("ALL ABOARD"),
        }
    }
}
