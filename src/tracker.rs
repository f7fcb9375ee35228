//! The tracking view's connection to its sensors and schedule.
//!
//! [`ExcursionTracker`] wires a [`SensorHub`] and a [`Schedule`] through
//! the driver task and hands out snapshot streams. It owns the schedule's
//! mutable side (completion toggles) and the subscription lifetime: the
//! sensor task is cancelled exactly once when the tracker drops.

use std::sync::Arc;

use futures::future;
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::Result;
use crate::driver::{Driver, TrackerSnapshot};
use crate::persist::CompletionStore;
use crate::schedule::Schedule;
use crate::sources::{SensorFeeds, SensorHub, SystemSensors};
use crate::spatial::SpatialConfig;
use crate::types::ActivityId;

/// Live tracking session for one day ashore.
pub struct ExcursionTracker {
    schedule: watch::Sender<Schedule>,
    snapshots: watch::Receiver<Option<Arc<TrackerSnapshot>>>,
    store: Option<Arc<dyn CompletionStore>>,
    cancel: CancellationToken,
}

impl ExcursionTracker {
    /// Start tracking: restore persisted completion flags, spawn the
    /// driver over the hub, and begin publishing snapshots.
    pub fn start<H>(
        mut schedule: Schedule,
        hub: H,
        store: Option<Arc<dyn CompletionStore>>,
        config: SpatialConfig,
    ) -> Result<Self>
    where
        H: SensorHub,
    {
        if let Some(store) = &store {
            // Store degradation is non-fatal by contract, but an I/O-level
            // failure still surfaces here
            let persisted = store.load()?;
            schedule.apply_completion(&persisted);
        }

        let (schedule_tx, schedule_rx) = watch::channel(schedule);
        let channels = Driver::spawn(hub, schedule_rx, config);

        info!("Excursion tracker started");

        Ok(Self {
            schedule: schedule_tx,
            snapshots: channels.snapshots,
            store,
            cancel: channels.cancel,
        })
    }

    /// Start with the default system sensors (one-minute clock tick),
    /// returning the push handles for the platform's position and heading
    /// adapters.
    pub fn with_system_sensors(
        schedule: Schedule,
        store: Option<Arc<dyn CompletionStore>>,
        config: SpatialConfig,
    ) -> Result<(Self, SensorFeeds)> {
        let (hub, feeds) = SystemSensors::new(SystemSensors::DEFAULT_TICK);
        let tracker = Self::start(schedule, hub, store, config)?;
        Ok((tracker, feeds))
    }

    /// Subscribe to derived snapshots.
    ///
    /// The stream skips the leading empty state while the first clock tick
    /// is pending, then yields every recomputation until the sensor hub
    /// ends or the tracker is dropped.
    pub fn subscribe(&self) -> impl Stream<Item = Arc<TrackerSnapshot>> + Unpin + 'static {
        WatchStream::new(self.snapshots.clone())
            .skip_while(|opt| future::ready(opt.is_none()))
            .take_while(|opt| future::ready(opt.is_some()))
            .filter_map(future::ready)
    }

    /// Latest snapshot, if the first tick has happened.
    pub fn current_snapshot(&self) -> Option<Arc<TrackerSnapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Current schedule state (including completion flags).
    pub fn schedule(&self) -> Schedule {
        self.schedule.borrow().clone()
    }

    /// Toggle an activity's completed flag and persist the new mapping.
    ///
    /// Returns the new flag value, or `None` for an unknown id. This is
    /// the only write path into the schedule and the only point that
    /// touches the persistence collaborator.
    pub fn toggle_completed(&self, id: &ActivityId) -> Result<Option<bool>> {
        let mut toggled = None;
        self.schedule.send_modify(|s| toggled = s.toggle_completed(id));

        if toggled.is_some()
            && let Some(store) = &self.store
        {
            let state = self.schedule.borrow().completion_state();
            store.save(&state)?;
        }
        Ok(toggled)
    }
}

impl Drop for ExcursionTracker {
    fn drop(&mut self) {
        debug!("Dropping excursion tracker");
        // Unsubscribes the sensor task exactly once
        self.cancel.cancel();
    }
}
