//! Interfaces to the remote services the planner depends on.
//!
//! These are intentionally minimal. The crate ships HTTP adapters (OSRM,
//! Nominatim, the POI directory) and tests substitute in-memory mocks.

use crate::coordinate::Coordinate;
use crate::error::OracleError;
use crate::geocode::Place;
use crate::poi::PointOfInterest;
use crate::route::RouteResponse;

/// Square matrix of pairwise travel costs, indexed by request order.
pub type CostMatrix = Vec<Vec<f64>>;

/// Provides a travel-cost matrix for a set of locations.
///
/// The matrix is indexed by the provided location order. Unreachable pairs
/// are reported as `f64::INFINITY`.
pub trait CostMatrixProvider {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<CostMatrix, OracleError>;
}

/// Provides path geometry for an ordered list of locations.
pub trait RouteProvider {
    fn route_for(&self, locations: &[Coordinate]) -> Result<RouteResponse, OracleError>;
}

/// Forward and reverse geocoding.
pub trait Geocoder {
    /// Best match for free text, or `None` when nothing matched.
    fn search(&self, query: &str) -> Result<Option<Place>, OracleError>;

    /// Display address for a position, or `None` when unknown.
    fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, OracleError>;
}

/// A directory of curated named locations.
pub trait PoiDirectory {
    fn locations(&self) -> Result<Vec<PointOfInterest>, OracleError>;
}
