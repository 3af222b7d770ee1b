//! Marching direction arrows along a route.

use tracing::debug;

use crate::config::ArrowConfig;
use crate::coordinate::Coordinate;
use crate::polyline::Polyline;
use crate::scheduler::{Scheduler, TimerId};

/// Arrows closer together than this would flood the overlay.
const MIN_REPEAT_M: f64 = 1.0;

/// One arrow glyph placed on the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowMark {
    pub coordinate: Coordinate,
    /// Heading of the path at the mark, degrees clockwise from north.
    pub bearing_deg: f64,
}

/// Owns the arrow overlay and its animation timer.
///
/// The overlay is independent of the growing route line: stopping the
/// decorator never touches the renderer's path and vice versa.
#[derive(Debug)]
pub struct DirectionDecorator {
    config: ArrowConfig,
    enabled: bool,
    path: Option<Polyline>,
    offset_m: f64,
    timer: Option<TimerId>,
}

impl DirectionDecorator {
    pub fn new(config: ArrowConfig) -> Self {
        Self {
            enabled: config.enabled,
            config,
            path: None,
            offset_m: 0.0,
            timer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Path currently decorated.
    pub fn path(&self) -> Option<&Polyline> {
        self.path.as_ref()
    }

    pub fn offset_m(&self) -> f64 {
        self.offset_m
    }

    /// (Re)starts decorating `path`. Does nothing while disabled.
    pub fn start(&mut self, path: &Polyline, scheduler: &mut Scheduler) -> bool {
        self.stop(scheduler);
        if !self.enabled {
            return false;
        }

        self.path = Some(path.clone());
        self.timer = Some(scheduler.set_interval(self.config.interval()));
        debug!(points = path.len(), "direction arrows started");
        true
    }

    /// Removes the overlay and its timer. Safe to call repeatedly.
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
            debug!("direction arrows stopped");
        }
        self.path = None;
        self.offset_m = 0.0;
    }

    /// Turns arrows on or off. Turning them on with a known route restarts
    /// the overlay on `route`.
    pub fn set_enabled(&mut self, enabled: bool, route: Option<&Polyline>, scheduler: &mut Scheduler) {
        self.enabled = enabled;
        match (enabled, route) {
            (true, Some(path)) => {
                self.start(path, scheduler);
            }
            (true, None) => {}
            (false, _) => self.stop(scheduler),
        }
    }

    /// Advances the pattern offset. Returns false for timers this
    /// decorator does not hold.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.timer != Some(id) {
            return false;
        }
        self.offset_m = (self.offset_m + self.config.step_m) % self.repeat_m();
        true
    }

    /// Arrow placements at `offset + k * repeat` meters along the path.
    pub fn marks(&self) -> Vec<ArrowMark> {
        let Some(path) = &self.path else {
            return Vec::new();
        };

        path.points_every(self.offset_m, self.repeat_m())
            .into_iter()
            .map(|(coordinate, bearing_deg)| ArrowMark {
                coordinate,
                bearing_deg,
            })
            .collect()
    }

    fn repeat_m(&self) -> f64 {
        self.config.repeat_m.max(MIN_REPEAT_M)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn path() -> Polyline {
        // Roughly 1.1 km heading east along the equator.
        Polyline::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.01)])
    }

    fn tick(decorator: &mut DirectionDecorator, scheduler: &mut Scheduler, ms: u64) {
        let until = scheduler.now() + Duration::from_millis(ms);
        while let Some(id) = scheduler.pop_due(until) {
            decorator.on_timer(id);
        }
        scheduler.advance_to(until);
    }

    #[test]
    fn stop_is_idempotent_and_safe_before_start() {
        let mut scheduler = Scheduler::new();
        let mut decorator = DirectionDecorator::new(ArrowConfig::default());
        decorator.stop(&mut scheduler);
        decorator.stop(&mut scheduler);
        assert!(!decorator.is_running());
        assert!(decorator.marks().is_empty());
    }

    #[test]
    fn offset_marches_and_wraps() {
        let mut scheduler = Scheduler::new();
        let config = ArrowConfig {
            step_m: 100.0,
            ..ArrowConfig::default()
        };
        let mut decorator = DirectionDecorator::new(config);
        assert!(decorator.start(&path(), &mut scheduler));

        tick(&mut decorator, &mut scheduler, 100);
        assert_eq!(decorator.offset_m(), 200.0);
        tick(&mut decorator, &mut scheduler, 50);
        assert_eq!(decorator.offset_m(), 0.0);
    }

    #[test]
    fn marks_repeat_along_the_path() {
        let mut scheduler = Scheduler::new();
        let mut decorator = DirectionDecorator::new(ArrowConfig::default());
        decorator.start(&path(), &mut scheduler);

        let marks = decorator.marks();
        // 0, 300, 600, 900 m on a ~1112 m path.
        assert_eq!(marks.len(), 4);
        assert!(marks.iter().all(|m| (m.bearing_deg - 90.0).abs() < 1e-6));
        assert!(marks.windows(2).all(|w| w[0].coordinate.lng < w[1].coordinate.lng));
    }

    #[test]
    fn tiny_repeat_is_clamped_to_one_meter() {
        let mut scheduler = Scheduler::new();
        let mut decorator = DirectionDecorator::new(ArrowConfig {
            repeat_m: 0.001,
            ..ArrowConfig::default()
        });
        decorator.start(&path(), &mut scheduler);

        let marks = decorator.marks();
        let length = path().length_m();
        assert_eq!(marks.len(), length.floor() as usize + 1);

        tick(&mut decorator, &mut scheduler, 50);
        assert_eq!(decorator.offset_m(), 0.0);
    }

    #[test]
    fn disabled_decorator_does_not_start() {
        let mut scheduler = Scheduler::new();
        let mut decorator = DirectionDecorator::new(ArrowConfig {
            enabled: false,
            ..ArrowConfig::default()
        });
        assert!(!decorator.start(&path(), &mut scheduler));
        assert_eq!(scheduler.pending(), 0);

        decorator.set_enabled(true, Some(&path()), &mut scheduler);
        assert!(decorator.is_running());

        decorator.set_enabled(false, Some(&path()), &mut scheduler);
        assert!(!decorator.is_running());
        assert!(decorator.path().is_none());
        assert_eq!(scheduler.pending(), 0);
    }
}
