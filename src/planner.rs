//! Route planner session.
//!
//! [`RoutePlanner`] owns the stop registry, the timer scheduler, the
//! renderer and the arrow decorator, and exposes the operations behind the
//! user-facing controls. Remote services are passed in per call, so the
//! session itself holds no network state.
//!
//! Every operation that invalidates the drawn route (a new calculation, a
//! stop edit or removal, clearing) cancels the running animation before
//! anything new is scheduled.

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::coordinate::Coordinate;
use crate::decorator::{ArrowMark, DirectionDecorator};
use crate::error::PlannerError;
use crate::geocode::{resolve, Place};
use crate::markers::{CandidateMarker, MarkerId, MarkerKind, MarkerRegistry};
use crate::optimizer::{optimize, OptimizedOrder};
use crate::poi::{self, PoiMatches, PointOfInterest};
use crate::registry::{default_label, StopRegistry};
use crate::renderer::{Phase, ProgressiveRenderer, RenderEvent};
use crate::route::{fetch_geometry, RouteGeometry};
use crate::scheduler::Scheduler;
use crate::summary::{build_summary, marker_color, marker_glyph, step_label, RouteSummary};
use crate::traits::{CostMatrixProvider, Geocoder, PoiDirectory, RouteProvider};

const ERROR_NOTICE_TTL: Duration = Duration::from_secs(5);
const INFO_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// How long the host should keep it on screen.
    pub ttl: Duration,
}

/// The route currently on display.
#[derive(Debug, Clone)]
pub struct ActiveRoute {
    pub order: OptimizedOrder,
    pub geometry: Rc<RouteGeometry>,
    pub summary: RouteSummary,
}

/// What a successful calculation produced.
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub summary: RouteSummary,
    /// The input order was kept because the cost matrix failed.
    pub used_input_order: bool,
}

/// A stop marker as it should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct StopMarker {
    pub slot: usize,
    pub coordinate: Coordinate,
    pub glyph: String,
    pub color: &'static str,
    pub tooltip: String,
    /// Tooltips stay open while a route is shown.
    pub permanent: bool,
}

#[derive(Debug)]
pub struct RoutePlanner {
    config: PlannerConfig,
    registry: StopRegistry,
    scheduler: Scheduler,
    renderer: ProgressiveRenderer,
    decorator: DirectionDecorator,
    markers: MarkerRegistry,
    pois: Vec<PointOfInterest>,
    route: Option<ActiveRoute>,
    notices: Vec<Notice>,
    events: Vec<RenderEvent>,
}

impl Default for RoutePlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl RoutePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            registry: StopRegistry::new(config.home.clone(), config.max_stops),
            scheduler: Scheduler::new(),
            renderer: ProgressiveRenderer::new(config.animation.clone()),
            decorator: DirectionDecorator::new(config.arrows.clone()),
            markers: MarkerRegistry::new(),
            pois: Vec::new(),
            route: None,
            notices: Vec::new(),
            events: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn registry(&self) -> &StopRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &ProgressiveRenderer {
        &self.renderer
    }

    pub fn decorator(&self) -> &DirectionDecorator {
        &self.decorator
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    pub fn route(&self) -> Option<&ActiveRoute> {
        self.route.as_ref()
    }

    pub fn arrow_marks(&self) -> Vec<ArrowMark> {
        self.decorator.marks()
    }

    /// Drains queued user notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Drains render events produced since the last call.
    pub fn take_events(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_stop(
        &mut self,
        coordinate: Option<Coordinate>,
        label: Option<String>,
    ) -> Result<usize, PlannerError> {
        self.registry
            .add_stop(coordinate, label)
            .map_err(|err| self.report(err))
    }

    /// Removes a stop and clears the drawn route. Empty slots are ignored.
    pub fn remove_stop(&mut self, slot: usize) {
        if self.registry.remove_stop(slot).is_some() {
            self.clear_route();
        }
    }

    pub fn update_stop(
        &mut self,
        slot: usize,
        coordinate: Coordinate,
        label: impl Into<String>,
    ) -> Result<(), PlannerError> {
        self.registry
            .update_stop_coordinate(slot, coordinate, label)
            .map_err(|err| self.report(err))?;
        self.clear_route();
        Ok(())
    }

    /// Drops every stop, marker and route, then restores the default origin.
    pub fn clear_all(&mut self) {
        self.clear_route();
        self.registry.clear_all();
        self.markers.clear();
        self.notices.clear();
    }

    /// Cancels the animation and removes every route artifact.
    pub fn clear_route(&mut self) {
        if let Some(event) = self.renderer.cancel(&mut self.scheduler) {
            self.events.push(event);
        }
        self.decorator.stop(&mut self.scheduler);
        self.route = None;
    }

    /// Stop markers, relabelled by visiting order while a route is shown.
    pub fn stop_markers(&self) -> Vec<StopMarker> {
        if let Some(route) = &self.route {
            let waypoints = route.order.waypoints();
            // The closing leg repeats the origin; draw each stop once.
            let visits = &waypoints[..waypoints.len().saturating_sub(1)];
            return visits
                .iter()
                .enumerate()
                .map(|(position, waypoint)| StopMarker {
                    slot: waypoint.original_slot,
                    coordinate: waypoint.coordinate,
                    glyph: marker_glyph(position),
                    color: marker_color(position),
                    tooltip: format!(
                        "{} ({})",
                        step_label(position),
                        default_label(waypoint.original_slot)
                    ),
                    permanent: true,
                })
                .collect();
        }

        self.registry
            .stops()
            .filter_map(|stop| {
                stop.coordinate().map(|coordinate| StopMarker {
                    slot: stop.slot(),
                    coordinate,
                    glyph: marker_glyph(stop.slot()),
                    color: marker_color(stop.slot()),
                    tooltip: default_label(stop.slot()),
                    permanent: false,
                })
            })
            .collect()
    }

    /// Optimizes the visiting order, fetches geometry and starts the reveal.
    ///
    /// A failed cost matrix falls back to input order with a notice; a
    /// failed geometry request draws nothing. The stop registry is never
    /// modified.
    pub fn calculate_route<O>(&mut self, oracle: &O) -> Result<RouteOutcome, PlannerError>
    where
        O: CostMatrixProvider + RouteProvider,
    {
        let waypoints = self.registry.waypoints();
        if waypoints.len() < 2 {
            return Err(self.report(PlannerError::NotEnoughStops {
                located: waypoints.len(),
            }));
        }

        self.clear_route();
        info!(stops = waypoints.len(), "calculating route");

        let optimization = optimize(&waypoints, oracle)?;
        let used_input_order = optimization.error.is_some();
        if let Some(err) = optimization.error {
            self.report(err);
        }

        let geometry = fetch_geometry(&optimization.order, oracle).map_err(|err| self.report(err))?;
        let geometry = Rc::new(geometry);
        let summary = build_summary(optimization.order.waypoints(), geometry.distance_m());

        let started = self.renderer.start(Rc::clone(&geometry), &mut self.scheduler);
        self.events.push(started);
        self.route = Some(ActiveRoute {
            order: optimization.order,
            geometry,
            summary: summary.clone(),
        });

        Ok(RouteOutcome {
            summary,
            used_input_order,
        })
    }

    /// Shareable deep link for the route on display.
    pub fn share_link(&self) -> Option<&str> {
        self.route
            .as_ref()
            .and_then(|route| route.summary.external_map_url.as_deref())
    }

    /// Turns direction arrows on or off. Turning them on while a route is
    /// shown restarts them on the full route, even mid-reveal.
    pub fn set_arrows_enabled(&mut self, enabled: bool) {
        let path = self.route.as_ref().map(|route| route.geometry.path());
        self.decorator.set_enabled(enabled, path, &mut self.scheduler);
    }

    /// Runs every timer due within the next `elapsed` of virtual time.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.scheduler.now() + elapsed;
        while let Some(id) = self.scheduler.pop_due(until) {
            let events = self.renderer.on_timer(id, &mut self.scheduler);
            if events.is_empty() {
                self.decorator.on_timer(id);
                continue;
            }

            for event in &events {
                if let RenderEvent::Completed { .. } = event {
                    if let Some(route) = &self.route {
                        self.decorator.start(route.geometry.path(), &mut self.scheduler);
                    }
                }
            }
            self.events.extend(events);
        }
        self.scheduler.advance_to(until);
    }

    /// Runs timers until the reveal finishes, or `limit` elapses.
    pub fn run_until_revealed(&mut self, limit: Duration) -> Phase {
        let step = self.config.animation.tick().max(Duration::from_millis(1));
        let deadline = self.scheduler.now() + limit;
        while self.renderer.is_animating() && self.scheduler.now() < deadline {
            self.advance(step.min(deadline - self.scheduler.now()));
        }
        self.renderer.phase()
    }

    /// Resolves search text and drops a candidate marker on the result.
    pub fn search_location<G>(&mut self, geocoder: &G, text: &str) -> Result<MarkerId, PlannerError>
    where
        G: Geocoder,
    {
        let place = resolve(geocoder, text).map_err(|err| self.report(err))?;
        let kind = if place.from_coordinates {
            MarkerKind::Coordinates
        } else {
            MarkerKind::Location
        };
        Ok(self.markers.insert(place.coordinate, place.display_name, kind))
    }

    /// Turns a candidate marker into a new stop.
    pub fn add_marker_as_stop(&mut self, id: MarkerId) -> Result<usize, PlannerError> {
        let Some(marker) = self.markers.get(id).cloned() else {
            return Err(self.report(PlannerError::MarkerNotFound(id)));
        };
        let slot = self.add_stop(Some(marker.coordinate), Some(marker.name.clone()))?;
        self.markers.take(id);
        self.info(format!("Added {} to destinations", marker.name));
        Ok(slot)
    }

    /// Locates a stop from text typed into its row.
    ///
    /// Exact POI names win over the geocoder.
    pub fn locate_stop<G>(&mut self, geocoder: &G, slot: usize, text: &str) -> Result<(), PlannerError>
    where
        G: Geocoder,
    {
        if self.registry.get(slot).is_none() {
            return Err(self.report(PlannerError::NotFound { slot }));
        }

        let known = poi::find_by_name(&self.pois, text).map(|poi| Place {
            coordinate: poi.coordinate,
            display_name: poi.name.clone(),
            from_coordinates: false,
        });
        let place = match known {
            Some(place) => place,
            None => resolve(geocoder, text).map_err(|err| self.report(err))?,
        };
        self.update_stop(slot, place.coordinate, place.display_name)
    }

    /// Adds a stop where the map was clicked and names it by reverse
    /// geocoding. A failed lookup keeps the coordinate label.
    pub fn add_stop_at<G>(&mut self, geocoder: &G, coordinate: Coordinate) -> Result<usize, PlannerError>
    where
        G: Geocoder,
    {
        let slot = self.add_stop(Some(coordinate), Some(coordinate.to_fixed_label()))?;
        match geocoder.reverse(coordinate) {
            Ok(Some(address)) => self.registry.relabel(slot, address)?,
            Ok(None) => debug!(slot, "no address for clicked location"),
            Err(err) => warn!(error = %err, "reverse geocoding failed"),
        }
        Ok(slot)
    }

    /// Loads the POI directory, replacing any earlier list.
    pub fn load_pois<D>(&mut self, directory: &D) -> Result<usize, PlannerError>
    where
        D: PoiDirectory,
    {
        let pois = directory
            .locations()
            .map_err(|err| self.report(PlannerError::DirectoryUnavailable(err)))?;
        self.pois = pois;
        self.info(format!("Showing {} farm locations", self.pois.len()));
        Ok(self.pois.len())
    }

    pub fn pois(&self) -> &[PointOfInterest] {
        &self.pois
    }

    pub fn search_pois(&self, query: &str) -> PoiMatches<'_> {
        poi::search(&self.pois, query, poi::SUGGESTION_LIMIT)
    }

    /// Places a candidate marker for a POI so it can be added as a stop.
    pub fn poi_marker(&mut self, poi_id: &str) -> Option<MarkerId> {
        let poi = self.pois.iter().find(|poi| poi.id == poi_id)?;
        Some(self.markers.insert(poi.coordinate, poi.name.clone(), MarkerKind::Poi))
    }

    pub fn candidate(&self, id: MarkerId) -> Option<&CandidateMarker> {
        self.markers.get(id)
    }

    /// Logs a failure and queues it for the user. Missing slots are only
    /// logged.
    fn report(&mut self, err: PlannerError) -> PlannerError {
        if let PlannerError::NotFound { slot } = err {
            debug!(slot, "no stop in slot");
            return err;
        }
        warn!(error = %err, "planner operation failed");
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            message: err.to_string(),
            ttl: ERROR_NOTICE_TTL,
        });
        err
    }

    fn info(&mut self, message: String) {
        self.notices.push(Notice {
            level: NoticeLevel::Info,
            message,
            ttl: INFO_NOTICE_TTL,
        });
    }
}
