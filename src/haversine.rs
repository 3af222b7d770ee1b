//! Haversine cost matrix provider (offline stand-in for the routing oracle).
//!
//! Uses great-circle distance in meters. Less accurate than OSRM (ignores
//! roads) but needs no network, which makes it handy for demos and tests.

use rayon::prelude::*;

use crate::coordinate::Coordinate;
use crate::error::OracleError;
use crate::traits::{CostMatrix, CostMatrixProvider};

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters.
pub fn haversine_m(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Straight-line distance matrix, scaled by a detour factor.
///
/// A factor above 1.0 roughly accounts for roads not running straight.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    pub detour_factor: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self { detour_factor: 1.0 }
    }
}

impl HaversineMatrix {
    pub fn new(detour_factor: f64) -> Self {
        Self { detour_factor }
    }
}

impl CostMatrixProvider for HaversineMatrix {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<CostMatrix, OracleError> {
        let matrix = locations
            .par_iter()
            .enumerate()
            .map(|(i, from)| {
                locations
                    .iter()
                    .enumerate()
                    .map(|(j, to)| {
                        if i == j {
                            0.0
                        } else {
                            haversine_m(*from, *to) * self.detour_factor
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(matrix)
    }
}
