//! Sensor source abstraction.
//!
//! The engine consumes one multiplexed pull-stream of sensor events:
//! clock ticks, position fixes, and compass headings. Platform adapters
//! (browser geolocation, CoreLocation, a replay file) sit behind the
//! [`SensorHub`] trait; [`SystemSensors`] is the default implementation
//! that ticks the wall clock itself and forwards externally pushed
//! position/heading readings.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior, interval};

use crate::Result;
use crate::types::{Coordinate, TimeOfDay};

/// One reading from any of the three sources.
///
/// `Position(None)` / `Heading(None)` mean the sensor reported a lost fix;
/// the driver keeps its prior known-good value in that case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    /// Wall-clock tick, minute resolution.
    Tick(TimeOfDay),
    Position(Option<Coordinate>),
    Heading(Option<f64>),
}

/// Trait for multiplexed sensor sources
///
/// Hubs abstract over where readings come from (device sensors, a replay
/// script in tests) and handle their own timing internally.
#[async_trait::async_trait]
pub trait SensorHub: Send + 'static {
    /// Get the next sensor event
    ///
    /// Returns:
    /// - `Ok(Some(event))` - New reading available
    /// - `Ok(None)` - Source ended (view torn down)
    /// - `Err(e)` - Transient sensor error; the driver logs and retries
    async fn next_event(&mut self) -> Result<Option<SensorEvent>>;
}

/// Push handles for platform adapters feeding [`SystemSensors`].
///
/// Dropping both senders does not end the hub; the clock keeps ticking and
/// the position/heading simply stop updating (sensor-unavailable
/// degradation).
#[derive(Debug, Clone)]
pub struct SensorFeeds {
    pub position: watch::Sender<Option<Coordinate>>,
    pub heading: watch::Sender<Option<f64>>,
}

/// Default hub: internal clock tick plus watch-channel position/heading.
pub struct SystemSensors {
    ticker: Interval,
    position: watch::Receiver<Option<Coordinate>>,
    heading: watch::Receiver<Option<f64>>,
    position_open: bool,
    heading_open: bool,
}

impl SystemSensors {
    /// Default recomputation period. One minute is enough for timeline
    /// progress; the sub-second countdown runs off its own timer.
    pub const DEFAULT_TICK: Duration = Duration::from_secs(60);

    /// Create a hub ticking at `tick_period`, returning the push side for
    /// platform adapters.
    pub fn new(tick_period: Duration) -> (Self, SensorFeeds) {
        let (pos_tx, pos_rx) = watch::channel(None);
        let (head_tx, head_rx) = watch::channel(None);

        let mut ticker = interval(tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let hub = Self {
            ticker,
            position: pos_rx,
            heading: head_rx,
            position_open: true,
            heading_open: true,
        };
        (hub, SensorFeeds { position: pos_tx, heading: head_tx })
    }
}

#[async_trait::async_trait]
impl SensorHub for SystemSensors {
    async fn next_event(&mut self) -> Result<Option<SensorEvent>> {
        loop {
            tokio::select! {
                _ = self.ticker.tick() => {
                    return Ok(Some(SensorEvent::Tick(TimeOfDay::now_local())));
                }
                changed = self.position.changed(), if self.position_open => {
                    match changed {
                        Ok(()) => {
                            let fix = *self.position.borrow_and_update();
                            return Ok(Some(SensorEvent::Position(fix)));
                        }
                        // Feed dropped: position stops updating, clock keeps going
                        Err(_) => self.position_open = false,
                    }
                }
                changed = self.heading.changed(), if self.heading_open => {
                    match changed {
                        Ok(()) => {
                            let heading = *self.heading.borrow_and_update();
                            return Ok(Some(SensorEvent::Heading(heading)));
                        }
                        Err(_) => self.heading_open = false,
                    }
                }
            }
        }
    }
}
