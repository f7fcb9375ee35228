//! Driver spawns and manages the tracking recomputation task

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::schedule::Schedule;
use crate::sources::{SensorEvent, SensorHub};
use crate::spatial::{SpatialConfig, SpatialRelation};
use crate::temporal::TimelineSnapshot;
use crate::types::{ActivityId, Coordinate, TimeOfDay};

/// One consistent derived view of the whole itinerary.
///
/// Recomputed whenever an accepted sensor event or a schedule change
/// arrives, published as a whole so consumers never observe the timeline
/// and the spatial relations out of step.
#[derive(Debug, Clone)]
pub struct TrackerSnapshot {
    pub now: TimeOfDay,
    /// Latest known-good fix; `None` until the first finite reading.
    pub position: Option<Coordinate>,
    /// Latest compass heading; `None` when the sensor is unavailable.
    pub heading: Option<f64>,
    pub timeline: TimelineSnapshot,
    /// Spatial relation per activity. Completed activities and unknown
    /// positions have no entry; absence means "unknown", never "here".
    pub spatial: HashMap<ActivityId, SpatialRelation>,
}

impl TrackerSnapshot {
    fn compute(
        now: TimeOfDay,
        position: Option<Coordinate>,
        heading: Option<f64>,
        schedule: &Schedule,
        config: &SpatialConfig,
    ) -> Self {
        let timeline = TimelineSnapshot::compute(now, schedule);
        let spatial = schedule
            .activities()
            .iter()
            .filter_map(|act| {
                SpatialRelation::compute(position, heading, act, config)
                    .map(|rel| (act.id.clone(), rel))
            })
            .collect();
        Self { now, position, heading, timeline, spatial }
    }
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for derived snapshots
    pub snapshots: watch::Receiver<Option<Arc<TrackerSnapshot>>>,
    /// Cancellation token for graceful teardown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the tracking recomputation task
///
/// Spawns a reader task that owns the SensorHub, holds the latest-known
/// sensor state, and republishes a fresh snapshot on every accepted event.
pub struct Driver;

impl Driver {
    /// Spawn the driver task for the given hub
    ///
    /// The schedule arrives through a watch channel so completion toggles
    /// trigger a recomputation just like sensor events do.
    pub fn spawn<H>(
        hub: H,
        schedule: watch::Receiver<Schedule>,
        config: SpatialConfig,
    ) -> DriverChannels
    where
        H: SensorHub,
    {
        let (snap_tx, snap_rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::reader_task(hub, schedule, config, snap_tx, cancel_task).await;
        });

        DriverChannels { snapshots: snap_rx, cancel }
    }

    async fn reader_task<H>(
        mut hub: H,
        mut schedule: watch::Receiver<Schedule>,
        config: SpatialConfig,
        snap_tx: watch::Sender<Option<Arc<TrackerSnapshot>>>,
        cancel: CancellationToken,
    ) where
        H: SensorHub,
    {
        info!("Tracking driver started");
        let mut event_count = 0u64;
        let mut error_count = 0u32;
        const MAX_ERRORS: u32 = 10;

        // Latest-known sensor state
        let mut last_tick: Option<TimeOfDay> = None;
        let mut position: Option<Coordinate> = None;
        let mut heading: Option<f64> = None;

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Tracking driver cancelled");
                    break;
                }
                changed = schedule.changed() => {
                    if changed.is_err() {
                        info!("Schedule owner dropped, shutting down");
                        let _ = snap_tx.send(None);
                        break;
                    }
                    // Completion toggle (or reload): recompute at the last
                    // accepted clock value
                    if let Some(now) = last_tick {
                        let snap = TrackerSnapshot::compute(
                            now, position, heading, &schedule.borrow(), &config,
                        );
                        if snap_tx.send(Some(Arc::new(snap))).is_err() {
                            debug!("Snapshot receiver dropped, shutting down");
                            break;
                        }
                    }
                    continue;
                }
                result = hub.next_event() => result,
            };

            match event {
                Ok(Some(event)) => {
                    event_count += 1;
                    error_count = 0;
                    trace!("Event {}: {:?}", event_count, event);

                    match event {
                        SensorEvent::Tick(now) => {
                            // Monotonic guard: never recompute on a clock
                            // rollback (includes the midnight wrap)
                            if let Some(last) = last_tick
                                && now < last
                            {
                                warn!("Clock rollback {} -> {}, ignoring tick", last, now);
                                continue;
                            }
                            last_tick = Some(now);
                        }
                        SensorEvent::Position(Some(fix)) => {
                            if !fix.is_finite() {
                                warn!("Dropping non-finite position reading");
                                continue;
                            }
                            position = Some(fix);
                        }
                        SensorEvent::Position(None) => {
                            // Fix lost: keep the prior known-good value
                            debug!("Position fix lost, keeping last known");
                            continue;
                        }
                        SensorEvent::Heading(h) => {
                            heading = h;
                        }
                    }

                    // No derived state exists before the first tick
                    let Some(now) = last_tick else { continue };

                    let snap = TrackerSnapshot::compute(
                        now, position, heading, &schedule.borrow(), &config,
                    );
                    if snap_tx.send(Some(Arc::new(snap))).is_err() {
                        debug!("Snapshot receiver dropped, shutting down");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Sensor hub ended after {} events", event_count);
                    let _ = snap_tx.send(None);
                    break;
                }
                Err(e) => {
                    // Sensor error - degrade, never crash the view
                    error_count += 1;
                    warn!("Sensor error ({}/{}): {}", error_count, MAX_ERRORS, e);

                    if error_count >= MAX_ERRORS {
                        warn!("Too many sensor errors, shutting down");
                        let _ = snap_tx.send(None);
                        break;
                    }

                    // Exponential backoff: 50ms, 100ms, 200ms, ...
                    let backoff = std::time::Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        info!("Tracking driver ended (processed {} events)", event_count);
    }
}
