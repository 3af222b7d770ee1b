//! Progressive, segment-paced reveal of a route geometry.
//!
//! The renderer reveals a fixed batch of points per tick until the next
//! waypoint is reached, pauses, then continues with the next leg:
//!
//! ```text
//! Idle -> Revealing -> (Paused -> Revealing)* -> Complete
//!           \______________\__________________\-> Cancelled
//! ```
//!
//! It owns its tick and delay timers. [`ProgressiveRenderer::on_timer`]
//! ignores any timer id it does not currently hold, so a callback that
//! outlives a cancellation does nothing.

use std::rc::Rc;

use tracing::{debug, info};

use crate::config::AnimationConfig;
use crate::coordinate::Coordinate;
use crate::route::RouteGeometry;
use crate::scheduler::{Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Revealing,
    Paused,
    Complete,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Started { points: usize, segments: usize },
    PointsRevealed { from: usize, count: usize },
    SegmentCompleted { segment: usize },
    Resumed { segment: usize },
    Completed { distance_m: f64 },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationState {
    pub phase: Phase,
    pub current_segment_index: usize,
    pub current_point_index: usize,
    pub revealed_points: Vec<Coordinate>,
}

#[derive(Debug)]
pub struct ProgressiveRenderer {
    config: AnimationConfig,
    state: AnimationState,
    geometry: Option<Rc<RouteGeometry>>,
    revealed_m: f64,
    tick: Option<TimerId>,
    delay: Option<TimerId>,
}

impl ProgressiveRenderer {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            state: AnimationState::default(),
            geometry: None,
            revealed_m: 0.0,
            tick: None,
            delay: None,
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn revealed_points(&self) -> &[Coordinate] {
        &self.state.revealed_points
    }

    /// Live distance readout: meters along the revealed part of the path.
    pub fn revealed_distance_m(&self) -> f64 {
        self.revealed_m
    }

    /// Geometry being (or last) revealed; `None` after cancellation.
    pub fn geometry(&self) -> Option<&Rc<RouteGeometry>> {
        self.geometry.as_ref()
    }

    /// True while timers are armed.
    pub fn is_animating(&self) -> bool {
        matches!(self.state.phase, Phase::Revealing | Phase::Paused)
    }

    /// Starts revealing `geometry`, cancelling any previous animation first.
    pub fn start(&mut self, geometry: Rc<RouteGeometry>, scheduler: &mut Scheduler) -> RenderEvent {
        self.cancel(scheduler);

        let event = RenderEvent::Started {
            points: geometry.points().len(),
            segments: geometry.segment_count(),
        };
        info!(?event, "route reveal started");

        self.geometry = Some(geometry);
        self.state = AnimationState {
            phase: Phase::Revealing,
            ..AnimationState::default()
        };
        self.revealed_m = 0.0;
        self.tick = Some(scheduler.set_interval(self.config.tick()));
        event
    }

    /// Stops every pending timer and discards the animation state.
    ///
    /// Returns `None` when there was nothing to cancel.
    pub fn cancel(&mut self, scheduler: &mut Scheduler) -> Option<RenderEvent> {
        if self.state.phase == Phase::Idle || self.state.phase == Phase::Cancelled {
            return None;
        }

        for id in [self.tick.take(), self.delay.take()].into_iter().flatten() {
            scheduler.cancel(id);
        }
        self.geometry = None;
        self.revealed_m = 0.0;
        self.state = AnimationState {
            phase: Phase::Cancelled,
            ..AnimationState::default()
        };
        debug!("route reveal cancelled");
        Some(RenderEvent::Cancelled)
    }

    /// Handles a fired timer. Ids this renderer does not hold are stale and
    /// produce no events.
    pub fn on_timer(&mut self, id: TimerId, scheduler: &mut Scheduler) -> Vec<RenderEvent> {
        if self.tick == Some(id) {
            self.reveal_tick(scheduler)
        } else if self.delay == Some(id) {
            self.delay = None;
            self.state.phase = Phase::Revealing;
            self.tick = Some(scheduler.set_interval(self.config.tick()));
            vec![RenderEvent::Resumed {
                segment: self.state.current_segment_index,
            }]
        } else {
            Vec::new()
        }
    }

    fn reveal_tick(&mut self, scheduler: &mut Scheduler) -> Vec<RenderEvent> {
        let Some(geometry) = self.geometry.clone() else {
            return Vec::new();
        };
        let points = geometry.points();
        let last = points.len() - 1;
        let segment = self.state.current_segment_index;
        let segment_end = geometry.segment_end(segment).unwrap_or(last);

        let from = self.state.current_point_index;
        for _ in 0..self.config.points_per_tick.max(1) {
            let index = self.state.current_point_index;
            if index > segment_end {
                break;
            }
            let point = points[index];
            if let Some(previous) = self.state.revealed_points.last() {
                self.revealed_m += previous.distance_m(&point);
            }
            self.state.revealed_points.push(point);
            self.state.current_point_index += 1;
        }

        let mut events = Vec::new();
        let count = self.state.current_point_index - from;
        if count > 0 {
            events.push(RenderEvent::PointsRevealed { from, count });
        }

        if self.state.current_point_index > segment_end {
            if let Some(tick) = self.tick.take() {
                scheduler.cancel(tick);
            }
            self.state.current_segment_index += 1;
            events.push(RenderEvent::SegmentCompleted { segment });

            let more = self.state.current_segment_index < geometry.segment_count()
                || self.state.current_point_index <= last;
            if more {
                self.state.phase = Phase::Paused;
                self.delay = Some(scheduler.set_timeout(self.config.segment_delay()));
            } else {
                self.state.phase = Phase::Complete;
                info!(distance_m = self.revealed_m, "route reveal complete");
                events.push(RenderEvent::Completed {
                    distance_m: self.revealed_m,
                });
            }
        }

        events
    }
}
