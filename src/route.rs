//! Route geometry retrieval and segment boundaries.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::coordinate::Coordinate;
use crate::error::{OracleError, PlannerError};
use crate::optimizer::OptimizedOrder;
use crate::polyline::Polyline;
use crate::traits::RouteProvider;

/// One turn-by-turn step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Maneuver type, e.g. `turn`, `depart`, `arrive`.
    pub kind: String,
    pub modifier: Option<String>,
    pub road: String,
    pub distance_m: f64,
    /// Index into the route geometry where the maneuver happens.
    pub geometry_index: usize,
}

impl Instruction {
    /// True for the arrival step of each leg.
    pub fn is_arrival(&self) -> bool {
        self.kind == "arrive"
    }
}

/// Raw answer from a [`RouteProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub path: Polyline,
    /// For each requested location, the geometry index where it is reached.
    pub waypoint_indices: Vec<usize>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub instructions: Vec<Instruction>,
}

/// Accepted route geometry.
///
/// `segment_boundaries` is non-decreasing, has one entry per waypoint of the
/// order, starts at 0 and ends at the last geometry index.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    path: Polyline,
    segment_boundaries: Vec<usize>,
    distance_m: f64,
    duration_s: f64,
    instructions: Vec<Instruction>,
}

impl RouteGeometry {
    /// Validates a provider response against the number of waypoints that
    /// were requested.
    pub fn from_response(
        response: RouteResponse,
        expected_waypoints: usize,
    ) -> Result<Self, OracleError> {
        check_boundaries(&response.waypoint_indices, response.path.len(), expected_waypoints)?;

        Ok(Self {
            path: response.path,
            segment_boundaries: response.waypoint_indices,
            distance_m: response.distance_m,
            duration_s: response.duration_s,
            instructions: response.instructions,
        })
    }

    pub fn path(&self) -> &Polyline {
        &self.path
    }

    pub fn points(&self) -> &[Coordinate] {
        self.path.points()
    }

    pub fn segment_boundaries(&self) -> &[usize] {
        &self.segment_boundaries
    }

    /// Number of legs between consecutive waypoints.
    pub fn segment_count(&self) -> usize {
        self.segment_boundaries.len().saturating_sub(1)
    }

    /// Last geometry index of `segment` (inclusive).
    pub fn segment_end(&self, segment: usize) -> Option<usize> {
        self.segment_boundaries.get(segment + 1).copied()
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

/// Requests driving geometry for `order` from the routing oracle.
///
/// There is no local fallback: an oracle failure or a response that breaks
/// the boundary invariant is [`PlannerError::RoutingUnavailable`].
pub fn fetch_geometry<P>(order: &OptimizedOrder, provider: &P) -> Result<RouteGeometry, PlannerError>
where
    P: RouteProvider,
{
    let locations = order.coordinates();
    let geometry = provider
        .route_for(&locations)
        .and_then(|response| RouteGeometry::from_response(response, locations.len()));

    match geometry {
        Ok(geometry) => {
            info!(
                points = geometry.points().len(),
                segments = geometry.segment_count(),
                distance_m = geometry.distance_m(),
                "route geometry accepted"
            );
            Ok(geometry)
        }
        Err(err) => {
            warn!(error = %err, "route geometry unavailable");
            Err(PlannerError::RoutingUnavailable(err))
        }
    }
}

/// Arrival indices for `locations` along `path`.
///
/// Each location is matched to its nearest path point, searching forward
/// from the previous match so the result never goes backwards. The first
/// index is pinned to 0 and the last to the end of the path.
pub fn arrival_indices(path: &Polyline, locations: &[Coordinate]) -> Vec<usize> {
    if path.is_empty() || locations.is_empty() {
        return Vec::new();
    }

    let last = path.len() - 1;
    let mut indices = Vec::with_capacity(locations.len());
    let mut cursor = 0;

    for (position, location) in locations.iter().enumerate() {
        let index = if position == 0 {
            0
        } else if position == locations.len() - 1 {
            last
        } else {
            path.nearest_index_from(cursor, *location).unwrap_or(last)
        };
        cursor = index;
        indices.push(index);
    }

    indices
}

fn check_boundaries(boundaries: &[usize], points: usize, expected: usize) -> Result<(), OracleError> {
    if points == 0 {
        return Err(OracleError::Malformed("route geometry is empty".to_string()));
    }
    if boundaries.len() != expected {
        return Err(OracleError::Malformed(format!(
            "expected {} waypoint indices, got {}",
            expected,
            boundaries.len()
        )));
    }
    if boundaries.first() != Some(&0) || boundaries.last() != Some(&(points - 1)) {
        return Err(OracleError::Malformed(
            "waypoint indices must span the whole geometry".to_string(),
        ));
    }
    if boundaries.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(OracleError::Malformed(
            "waypoint indices go backwards".to_string(),
        ));
    }
    Ok(())
}
