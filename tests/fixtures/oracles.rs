//! In-memory oracles.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use route_planner::coordinate::Coordinate;
use route_planner::error::OracleError;
use route_planner::geocode::Place;
use route_planner::haversine::haversine_m;
use route_planner::poi::PointOfInterest;
use route_planner::polyline::Polyline;
use route_planner::route::RouteResponse;
use route_planner::traits::{CostMatrix, CostMatrixProvider, Geocoder, PoiDirectory, RouteProvider};

/// Routing oracle with scripted costs and straight-line geometry.
///
/// Each leg is drawn as `points_per_leg` evenly spaced points, so leg `i`
/// starts at geometry index `i * points_per_leg`.
pub struct MockOracle {
    costs: Option<(Vec<Coordinate>, CostMatrix)>,
    points_per_leg: usize,
    fail_matrix: bool,
    fail_route: bool,
    broken_boundaries: bool,
    pub matrix_calls: Cell<usize>,
    pub route_calls: Cell<usize>,
    pub last_route: RefCell<Vec<Coordinate>>,
}

impl MockOracle {
    /// Costs are great-circle distances.
    pub fn haversine() -> Self {
        Self {
            costs: None,
            points_per_leg: 5,
            fail_matrix: false,
            fail_route: false,
            broken_boundaries: false,
            matrix_calls: Cell::new(0),
            route_calls: Cell::new(0),
            last_route: RefCell::new(Vec::new()),
        }
    }

    /// Costs come from `costs`, indexed like `known`.
    pub fn with_costs(known: Vec<Coordinate>, costs: CostMatrix) -> Self {
        Self {
            costs: Some((known, costs)),
            ..Self::haversine()
        }
    }

    pub fn points_per_leg(mut self, points: usize) -> Self {
        self.points_per_leg = points.max(1);
        self
    }

    pub fn failing_matrix(mut self) -> Self {
        self.fail_matrix = true;
        self
    }

    pub fn failing_route(mut self) -> Self {
        self.fail_route = true;
        self
    }

    /// Reports one waypoint index too few.
    pub fn broken_boundaries(mut self) -> Self {
        self.broken_boundaries = true;
        self
    }

    fn index_of(known: &[Coordinate], location: &Coordinate) -> Result<usize, OracleError> {
        known
            .iter()
            .position(|candidate| candidate == location)
            .ok_or_else(|| OracleError::Malformed(format!("unknown location {}", location)))
    }
}

impl CostMatrixProvider for MockOracle {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<CostMatrix, OracleError> {
        self.matrix_calls.set(self.matrix_calls.get() + 1);
        if self.fail_matrix {
            return Err(OracleError::Status("503 Service Unavailable".to_string()));
        }

        match &self.costs {
            Some((known, costs)) => {
                let indices = locations
                    .iter()
                    .map(|location| Self::index_of(known, location))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(indices
                    .iter()
                    .map(|&from| indices.iter().map(|&to| costs[from][to]).collect())
                    .collect())
            }
            None => Ok(locations
                .iter()
                .map(|&from| locations.iter().map(|&to| haversine_m(from, to)).collect())
                .collect()),
        }
    }
}

impl RouteProvider for MockOracle {
    fn route_for(&self, locations: &[Coordinate]) -> Result<RouteResponse, OracleError> {
        self.route_calls.set(self.route_calls.get() + 1);
        *self.last_route.borrow_mut() = locations.to_vec();
        if self.fail_route {
            return Err(OracleError::Status("NoRoute".to_string()));
        }

        let mut points = Vec::new();
        let mut indices = Vec::new();
        let mut distance_m = 0.0;
        for leg in locations.windows(2) {
            indices.push(points.len());
            distance_m += haversine_m(leg[0], leg[1]);
            points.push(leg[0]);
            for k in 1..self.points_per_leg {
                points.push(leg[0].interpolate(&leg[1], k as f64 / self.points_per_leg as f64));
            }
        }
        if let Some(&last) = locations.last() {
            indices.push(points.len());
            points.push(last);
        }
        if self.broken_boundaries {
            indices.pop();
        }

        Ok(RouteResponse {
            path: Polyline::new(points),
            waypoint_indices: indices,
            distance_m,
            duration_s: distance_m / 10.0,
            instructions: Vec::new(),
        })
    }
}

/// Geocoder answering from a fixed gazetteer.
#[derive(Default)]
pub struct MockGeocoder {
    places: HashMap<String, Coordinate>,
    addresses: Vec<(Coordinate, String)>,
    failing: bool,
    pub search_calls: Cell<usize>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(mut self, name: &str, coordinate: Coordinate) -> Self {
        self.places.insert(name.to_lowercase(), coordinate);
        self
    }

    pub fn address(mut self, coordinate: Coordinate, address: &str) -> Self {
        self.addresses.push((coordinate, address.to_string()));
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl Geocoder for MockGeocoder {
    fn search(&self, query: &str) -> Result<Option<Place>, OracleError> {
        self.search_calls.set(self.search_calls.get() + 1);
        if self.failing {
            return Err(OracleError::Status("429 Too Many Requests".to_string()));
        }
        Ok(self.places.get(&query.to_lowercase()).map(|&coordinate| Place {
            coordinate,
            display_name: query.to_string(),
            from_coordinates: false,
        }))
    }

    fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, OracleError> {
        if self.failing {
            return Err(OracleError::Status("429 Too Many Requests".to_string()));
        }
        Ok(self
            .addresses
            .iter()
            .find(|(known, _)| *known == coordinate)
            .map(|(_, address)| address.clone()))
    }
}

/// POI directory serving a fixed list.
pub struct MockDirectory {
    pub pois: Option<Vec<PointOfInterest>>,
}

impl PoiDirectory for MockDirectory {
    fn locations(&self) -> Result<Vec<PointOfInterest>, OracleError> {
        self.pois
            .clone()
            .ok_or_else(|| OracleError::Status("502 Bad Gateway".to_string()))
    }
}

pub fn poi(id: &str, name: &str, coordinate: Coordinate) -> PointOfInterest {
    PointOfInterest {
        id: id.to_string(),
        name: name.to_string(),
        coordinate,
        tree_type: Some("coffee".to_string()),
        is_exhibit: false,
    }
}
