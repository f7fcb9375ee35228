//! End-to-end tests for the tracking engine: scripted sensor events in,
//! derived snapshots out.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;

use portcall::{
    Activity, ActivityId, ActivityKind, CompletionStore, Coordinate, ExcursionTracker,
    JsonCompletionStore, LifecycleState, Result, Schedule, SensorEvent, SensorHub, SpatialConfig,
    TimeOfDay,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Hub fed from a test-side channel. `None` after the sender closes.
struct ChannelHub {
    rx: mpsc::Receiver<SensorEvent>,
}

#[async_trait::async_trait]
impl SensorHub for ChannelHub {
    async fn next_event(&mut self) -> Result<Option<SensorEvent>> {
        Ok(self.rx.recv().await)
    }
}

fn hub() -> (mpsc::Sender<SensorEvent>, ChannelHub) {
    let (tx, rx) = mpsc::channel(16);
    (tx, ChannelHub { rx })
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn activity(id: &str, start: &str, end: &str, lat: f64, lng: f64) -> Activity {
    Activity {
        id: ActivityId::new(id),
        title: id.to_uppercase(),
        start: t(start),
        end: t(end),
        location_name: format!("{id} location"),
        end_location_name: None,
        coords: Coordinate::new(lat, lng),
        end_coords: None,
        description: String::new(),
        key_details: String::new(),
        price_eur: 0.0,
        kind: ActivityKind::Sightseeing,
        completed: false,
        critical: false,
        contingency_note: None,
    }
}

fn schedule() -> Schedule {
    Schedule::new(vec![
        activity("duomo", "09:00", "11:00", 43.7731, 11.2553),
        activity("lunch", "12:00", "13:00", 43.7700, 11.2500),
    ])
    .unwrap()
}

#[tokio::test]
async fn snapshots_follow_sensor_events() {
    init_tracing();
    let (tx, hub) = hub();
    let tracker =
        ExcursionTracker::start(schedule(), hub, None, SpatialConfig::default()).unwrap();
    let mut snapshots = tracker.subscribe();

    // First tick establishes the timeline
    tx.send(SensorEvent::Tick(t("10:00"))).await.unwrap();
    let snap = snapshots.next().await.unwrap();
    assert_eq!(snap.now, t("10:00"));
    let duomo = snap.timeline.for_activity(&ActivityId::new("duomo")).unwrap();
    assert_eq!(duomo.state, LifecycleState::Active);
    assert_eq!(duomo.progress, 50.0);
    // No position yet: spatial map is empty, not zeroed
    assert!(snap.spatial.is_empty());

    // A fix arrives: spatial relations appear
    tx.send(SensorEvent::Position(Some(Coordinate::new(43.7696, 11.2558)))).await.unwrap();
    let snap = snapshots.next().await.unwrap();
    let rel = snap.spatial.get(&ActivityId::new("duomo")).unwrap();
    assert!((rel.distance_km - 0.39).abs() < 0.01);
    assert!(!rel.near);

    // Heading rotates the pointer
    tx.send(SensorEvent::Heading(Some(90.0))).await.unwrap();
    let snap = snapshots.next().await.unwrap();
    let rel = snap.spatial.get(&ActivityId::new("duomo")).unwrap();
    let expected = ((rel.bearing_deg - 90.0) % 360.0 + 360.0) % 360.0;
    assert!((rel.pointing_deg - expected).abs() < 1e-9);
}

#[tokio::test]
async fn clock_rollback_is_ignored() {
    init_tracing();
    let (tx, hub) = hub();
    let tracker =
        ExcursionTracker::start(schedule(), hub, None, SpatialConfig::default()).unwrap();
    let mut snapshots = tracker.subscribe();

    tx.send(SensorEvent::Tick(t("10:00"))).await.unwrap();
    assert_eq!(snapshots.next().await.unwrap().now, t("10:00"));

    // Rollback produces no snapshot; the next accepted event still
    // computes at the last good clock value
    tx.send(SensorEvent::Tick(t("09:30"))).await.unwrap();
    tx.send(SensorEvent::Heading(Some(10.0))).await.unwrap();
    let snap = snapshots.next().await.unwrap();
    assert_eq!(snap.now, t("10:00"));
    assert_eq!(snap.heading, Some(10.0));
}

#[tokio::test]
async fn non_finite_fix_keeps_prior_position() {
    init_tracing();
    let (tx, hub) = hub();
    let tracker =
        ExcursionTracker::start(schedule(), hub, None, SpatialConfig::default()).unwrap();
    let mut snapshots = tracker.subscribe();

    let good = Coordinate::new(43.7696, 11.2558);
    tx.send(SensorEvent::Tick(t("10:00"))).await.unwrap();
    snapshots.next().await.unwrap();
    tx.send(SensorEvent::Position(Some(good))).await.unwrap();
    assert_eq!(snapshots.next().await.unwrap().position, Some(good));

    // Garbage reading is dropped, lost fix keeps the value too
    tx.send(SensorEvent::Position(Some(Coordinate::new(f64::NAN, 11.0)))).await.unwrap();
    tx.send(SensorEvent::Position(None)).await.unwrap();
    tx.send(SensorEvent::Heading(Some(0.0))).await.unwrap();
    let snap = snapshots.next().await.unwrap();
    assert_eq!(snap.position, Some(good));
}

#[tokio::test]
async fn completed_activities_lose_their_spatial_entry() {
    init_tracing();
    let (tx, hub) = hub();
    let tracker =
        ExcursionTracker::start(schedule(), hub, None, SpatialConfig::default()).unwrap();
    let mut snapshots = tracker.subscribe();

    tx.send(SensorEvent::Tick(t("10:00"))).await.unwrap();
    snapshots.next().await.unwrap();
    tx.send(SensorEvent::Position(Some(Coordinate::new(43.7696, 11.2558)))).await.unwrap();
    let snap = snapshots.next().await.unwrap();
    assert!(snap.spatial.contains_key(&ActivityId::new("duomo")));

    // Toggling recomputes without any new sensor event
    tracker.toggle_completed(&ActivityId::new("duomo")).unwrap();
    let snap = snapshots.next().await.unwrap();
    let duomo = snap.timeline.for_activity(&ActivityId::new("duomo")).unwrap();
    assert_eq!(duomo.state, LifecycleState::Completed);
    assert!(!snap.spatial.contains_key(&ActivityId::new("duomo")));
    assert!(snap.spatial.contains_key(&ActivityId::new("lunch")));
}

#[tokio::test]
async fn toggle_persists_through_the_store() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("completion.json");
    let store: Arc<dyn CompletionStore> = Arc::new(JsonCompletionStore::new(&path));

    let (_tx, hub) = hub();
    let tracker =
        ExcursionTracker::start(schedule(), hub, Some(store.clone()), SpatialConfig::default())
            .unwrap();

    tracker.toggle_completed(&ActivityId::new("duomo")).unwrap();
    let persisted = store.load().unwrap();
    assert_eq!(persisted.get(&ActivityId::new("duomo")), Some(&true));
    assert_eq!(persisted.get(&ActivityId::new("lunch")), Some(&false));

    // A fresh tracker restores the flags
    let (_tx2, hub2) = self::hub();
    let restored =
        ExcursionTracker::start(schedule(), hub2, Some(store), SpatialConfig::default()).unwrap();
    assert!(restored.schedule().get(&ActivityId::new("duomo")).unwrap().completed);
}

#[tokio::test]
async fn unknown_toggle_id_is_a_no_op() {
    init_tracing();
    let (_tx, hub) = hub();
    let tracker =
        ExcursionTracker::start(schedule(), hub, None, SpatialConfig::default()).unwrap();
    assert_eq!(tracker.toggle_completed(&ActivityId::new("ghost")).unwrap(), None);
}

#[tokio::test]
async fn hub_end_terminates_the_stream() {
    init_tracing();
    let (tx, hub) = hub();
    let tracker =
        ExcursionTracker::start(schedule(), hub, None, SpatialConfig::default()).unwrap();
    let mut snapshots = tracker.subscribe();

    tx.send(SensorEvent::Tick(t("10:00"))).await.unwrap();
    snapshots.next().await.unwrap();

    drop(tx);
    assert!(snapshots.next().await.is_none());
}

#[tokio::test]
async fn drop_unsubscribes_the_sensor_task() {
    init_tracing();
    let (tx, hub) = hub();
    let tracker =
        ExcursionTracker::start(schedule(), hub, None, SpatialConfig::default()).unwrap();

    drop(tracker);

    // The driver task drops the hub (and with it our receiver) once the
    // cancellation token fires
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !tx.is_closed() {
        assert!(tokio::time::Instant::now() < deadline, "sensor task still running");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
