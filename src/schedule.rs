//! The schedule model: an ordered, mostly-immutable activity sequence.
//!
//! Activities are sorted by start time at load and never reordered
//! afterwards. The only mutation the engine performs is flipping the
//! per-activity `completed` flag on explicit user action.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::TrackingError;
use crate::types::{Activity, ActivityId, ActivityKind};

/// Ordered single-day itinerary.
#[derive(Debug, Clone)]
pub struct Schedule {
    activities: Vec<Activity>,
}

impl Schedule {
    /// Build a schedule, sorting by start time ascending.
    ///
    /// Rejects duplicate ids and windows where `end <= start`
    /// (cross-midnight activities are unsupported).
    pub fn new(mut activities: Vec<Activity>) -> crate::Result<Self> {
        let mut seen = HashSet::new();
        for act in &activities {
            if !seen.insert(act.id.clone()) {
                return Err(TrackingError::schedule(format!("duplicate activity id {}", act.id)));
            }
            if act.end <= act.start {
                return Err(TrackingError::schedule(format!(
                    "activity {} window {}-{} ends before it starts",
                    act.id, act.start, act.end
                )));
            }
        }
        activities.sort_by_key(|a| a.start);
        Ok(Self { activities })
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn get(&self, id: &ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|a| &a.id == id)
    }

    /// Flip an activity's completed flag. Returns the new value, or `None`
    /// for an unknown id.
    pub fn toggle_completed(&mut self, id: &ActivityId) -> Option<bool> {
        let act = self.activities.iter_mut().find(|a| &a.id == id)?;
        act.completed = !act.completed;
        debug!(activity = %id, completed = act.completed, "completion toggled");
        Some(act.completed)
    }

    /// Merge a persisted id→completed mapping into the schedule.
    ///
    /// Unknown ids are ignored; activities absent from the mapping keep
    /// their current flag. Malformed persisted shapes never reach this
    /// point (the store degrades them to an empty mapping).
    pub fn apply_completion(&mut self, state: &HashMap<ActivityId, bool>) {
        for act in &mut self.activities {
            if let Some(&done) = state.get(&act.id) {
                act.completed = done;
            }
        }
    }

    /// Export the current id→completed mapping for persistence.
    pub fn completion_state(&self) -> HashMap<ActivityId, bool> {
        self.activities.iter().map(|a| (a.id.clone(), a.completed)).collect()
    }

    /// Total planned spend across the itinerary, in EUR.
    pub fn total_price_eur(&self) -> f64 {
        self.activities.iter().map(|a| a.price_eur).sum()
    }

    /// Number of activities of a given kind.
    pub fn count_of_kind(&self, kind: ActivityKind) -> usize {
        self.activities.iter().filter(|a| a.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;

    fn activity(id: &str, start: &str, end: &str) -> Activity {
        Activity {
            id: ActivityId::new(id),
            title: id.to_uppercase(),
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            location_name: format!("{id} square"),
            end_location_name: None,
            coords: Coordinate::new(43.77, 11.25),
            end_coords: None,
            description: String::new(),
            key_details: String::new(),
            price_eur: 10.0,
            kind: ActivityKind::Sightseeing,
            completed: false,
            critical: false,
            contingency_note: None,
        }
    }

    #[test]
    fn sorts_by_start_time() {
        let sched = Schedule::new(vec![
            activity("later", "14:00", "15:00"),
            activity("first", "09:00", "10:00"),
        ])
        .unwrap();
        assert_eq!(sched.activities()[0].id.as_str(), "first");
        assert_eq!(sched.activities()[1].id.as_str(), "later");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Schedule::new(vec![
            activity("dup", "09:00", "10:00"),
            activity("dup", "11:00", "12:00"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_inverted_window() {
        let err = Schedule::new(vec![activity("bad", "15:00", "14:00")]).unwrap_err();
        assert!(err.to_string().contains("ends before"));
    }

    #[test]
    fn toggle_flips_and_reports() {
        let mut sched = Schedule::new(vec![activity("a", "09:00", "10:00")]).unwrap();
        let id = ActivityId::new("a");
        assert_eq!(sched.toggle_completed(&id), Some(true));
        assert_eq!(sched.toggle_completed(&id), Some(false));
        assert_eq!(sched.toggle_completed(&ActivityId::new("nope")), None);
    }

    #[test]
    fn completion_merge_ignores_unknown_ids() {
        let mut sched = Schedule::new(vec![
            activity("a", "09:00", "10:00"),
            activity("b", "10:00", "11:00"),
        ])
        .unwrap();
        let mut state = HashMap::new();
        state.insert(ActivityId::new("a"), true);
        state.insert(ActivityId::new("ghost"), true);
        sched.apply_completion(&state);
        assert!(sched.get(&ActivityId::new("a")).unwrap().completed);
        assert!(!sched.get(&ActivityId::new("b")).unwrap().completed);
    }

    #[test]
    fn budget_and_kind_counts() {
        let sched = Schedule::new(vec![
            activity("a", "09:00", "10:00"),
            activity("b", "10:00", "11:00"),
        ])
        .unwrap();
        assert_eq!(sched.total_price_eur(), 20.0);
        assert_eq!(sched.count_of_kind(ActivityKind::Sightseeing), 2);
        assert_eq!(sched.count_of_kind(ActivityKind::Food), 0);
    }
}
