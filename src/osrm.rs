//! OSRM HTTP adapter for cost matrices and route geometry.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::OracleError;
use crate::polyline::Polyline;
use crate::route::{arrival_indices, Instruction, RouteResponse};
use crate::traits::{CostMatrix, CostMatrixProvider, RouteProvider};

/// Precision of the `polyline6` geometry format.
const GEOMETRY_PRECISION: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn url(&self, service: &str, locations: &[Coordinate]) -> String {
        format!(
            "{}/{}/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            service,
            self.config.profile,
            coordinate_list(locations)
        )
    }
}

impl CostMatrixProvider for OsrmClient {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<CostMatrix, OracleError> {
        if locations.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}?annotations=distance", self.url("table", locations));
        debug!(%url, "requesting cost matrix");

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmTableResponse>())?;

        table_to_matrix(body)
    }
}

impl RouteProvider for OsrmClient {
    fn route_for(&self, locations: &[Coordinate]) -> Result<RouteResponse, OracleError> {
        if locations.len() < 2 {
            return Err(OracleError::Malformed(
                "a route needs at least two locations".to_string(),
            ));
        }

        let url = format!(
            "{}?overview=full&geometries=polyline6&steps=true",
            self.url("route", locations)
        );
        debug!(%url, "requesting route geometry");

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>())?;

        route_to_response(body)
    }
}

/// `lng,lat;lng,lat;...` as OSRM expects.
fn coordinate_list(locations: &[Coordinate]) -> String {
    locations
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.lng, c.lat))
        .collect::<Vec<_>>()
        .join(";")
}

fn lng_lat(pair: [f64; 2]) -> Coordinate {
    Coordinate::new(pair[1], pair[0])
}

fn check_code(code: &str, message: Option<String>) -> Result<(), OracleError> {
    if code == "Ok" {
        return Ok(());
    }
    Err(OracleError::Status(match message {
        Some(message) => format!("{}: {}", code, message),
        None => code.to_string(),
    }))
}

fn table_to_matrix(body: OsrmTableResponse) -> Result<CostMatrix, OracleError> {
    check_code(&body.code, body.message)?;

    let distances = body
        .distances
        .ok_or_else(|| OracleError::Malformed("table response has no distances".to_string()))?;

    Ok(distances
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| value.unwrap_or(f64::INFINITY))
                .collect()
        })
        .collect())
}

fn route_to_response(body: OsrmRouteResponse) -> Result<RouteResponse, OracleError> {
    check_code(&body.code, body.message)?;

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| OracleError::Malformed("route response has no routes".to_string()))?;

    let path = Polyline::decode(&route.geometry, GEOMETRY_PRECISION)
        .map_err(|err| OracleError::Malformed(err.to_string()))?;

    let snapped: Vec<Coordinate> = body.waypoints.iter().map(|w| lng_lat(w.location)).collect();
    let waypoint_indices = arrival_indices(&path, &snapped);

    let mut instructions = Vec::new();
    let mut cursor = 0;
    for step in route.legs.iter().flat_map(|leg| leg.steps.iter()) {
        let geometry_index = path
            .nearest_index_from(cursor, lng_lat(step.maneuver.location))
            .unwrap_or(cursor);
        cursor = geometry_index;
        instructions.push(Instruction {
            kind: step.maneuver.kind.clone(),
            modifier: step.maneuver.modifier.clone(),
            road: step.name.clone(),
            distance_m: step.distance,
            geometry_index,
        });
    }

    Ok(RouteResponse {
        path,
        waypoint_indices,
        distance_m: route.distance,
        duration_s: route.duration,
        instructions,
    })
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
    distance: f64,
    duration: f64,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    distance: f64,
    #[serde(default)]
    name: String,
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    kind: String,
    modifier: Option<String>,
    location: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    location: [f64; 2],
}
