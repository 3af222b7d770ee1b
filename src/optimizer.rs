//! Visit-order optimization (nearest-neighbor round trip).

use tracing::{debug, warn};

use crate::coordinate::Coordinate;
use crate::error::{OracleError, PlannerError};
use crate::registry::Waypoint;
use crate::traits::{CostMatrix, CostMatrixProvider};

/// Visiting order closed into a loop: the first waypoint is repeated at the
/// end, every other waypoint appears exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedOrder {
    waypoints: Vec<Waypoint>,
}

impl OptimizedOrder {
    /// Orders `waypoints` by `indices`, which must start and end with the
    /// same index.
    fn from_indices(waypoints: &[Waypoint], indices: &[usize]) -> Self {
        Self {
            waypoints: indices.iter().map(|&i| waypoints[i].clone()).collect(),
        }
    }

    /// Input order with the origin appended to close the loop.
    pub fn identity(waypoints: &[Waypoint]) -> Self {
        let indices = closed_identity(waypoints.len());
        Self::from_indices(waypoints, &indices)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.waypoints.iter().map(|w| w.coordinate).collect()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn slots(&self) -> Vec<usize> {
        self.waypoints.iter().map(|w| w.original_slot).collect()
    }
}

/// Result of [`optimize`].
#[derive(Debug)]
pub struct Optimization {
    pub order: OptimizedOrder,
    /// Total cost of the closed tour, when a matrix was available.
    pub tour_cost: Option<f64>,
    /// Set when the matrix could not be used and input order was kept.
    pub error: Option<PlannerError>,
}

/// Computes a round-trip visiting order starting at `waypoints[0]`.
///
/// One cost-matrix request is made. If it fails, the input order is used
/// (closed into a loop) and the failure is reported in
/// [`Optimization::error`]; routing can still proceed.
pub fn optimize<M>(waypoints: &[Waypoint], matrix_provider: &M) -> Result<Optimization, PlannerError>
where
    M: CostMatrixProvider,
{
    if waypoints.len() < 2 {
        return Err(PlannerError::NotEnoughStops {
            located: waypoints.len(),
        });
    }

    let locations: Vec<Coordinate> = waypoints.iter().map(|w| w.coordinate).collect();
    let matrix = matrix_provider
        .matrix_for(&locations)
        .and_then(|matrix| validate_matrix(matrix, waypoints.len()));

    match matrix {
        Ok(matrix) => {
            let indices = nearest_neighbor_order(&matrix);
            let cost = tour_cost(&matrix, &indices);
            debug!(?indices, cost, "nearest-neighbor order");
            Ok(Optimization {
                order: OptimizedOrder::from_indices(waypoints, &indices),
                tour_cost: Some(cost),
                error: None,
            })
        }
        Err(err) => {
            warn!(error = %err, "cost matrix unavailable, keeping input order");
            Ok(Optimization {
                order: OptimizedOrder::identity(waypoints),
                tour_cost: None,
                error: Some(PlannerError::OptimizationFailed(err)),
            })
        }
    }
}

/// Nearest-neighbor tour over `matrix`, starting and ending at index 0.
///
/// Ties go to the lowest index. Non-finite costs never beat a finite one,
/// but a step is always taken so the tour covers every index.
pub fn nearest_neighbor_order(matrix: &[Vec<f64>]) -> Vec<usize> {
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order = Vec::with_capacity(n + 1);
    let mut visited = vec![false; n];
    let mut current = 0;
    order.push(current);
    visited[current] = true;

    for _ in 1..n {
        let mut best: Option<(usize, f64)> = None;
        for (candidate, seen) in visited.iter().enumerate() {
            if *seen {
                continue;
            }
            let cost = sanitize(matrix[current][candidate]);
            if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                best = Some((candidate, cost));
            }
        }

        let Some((next, _)) = best else { break };
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order.push(0);
    order
}

/// Sum of consecutive costs along `order`.
pub fn tour_cost(matrix: &[Vec<f64>], order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|pair| sanitize(matrix[pair[0]][pair[1]]))
        .sum()
}

fn sanitize(cost: f64) -> f64 {
    if cost.is_nan() { f64::INFINITY } else { cost }
}

fn closed_identity(n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    (0..n).chain(std::iter::once(0)).collect()
}

fn validate_matrix(matrix: CostMatrix, n: usize) -> Result<CostMatrix, OracleError> {
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(OracleError::Malformed(format!(
            "expected a {n}x{n} cost matrix, got {} rows",
            matrix.len()
        )));
    }
    Ok(matrix)
}
