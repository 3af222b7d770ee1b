//! Error taxonomy for planner operations and remote oracle calls.

use std::fmt;

use crate::markers::MarkerId;

/// Failure talking to a remote service (routing, geocoding, POI directory).
#[derive(Debug)]
pub enum OracleError {
    Http(reqwest::Error),
    /// The service answered but reported a non-success code.
    Status(String),
    /// The response body did not have the expected shape.
    Malformed(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::Http(err) => write!(f, "request failed: {}", err),
            OracleError::Status(code) => write!(f, "service returned status {}", code),
            OracleError::Malformed(reason) => write!(f, "malformed response: {}", reason),
        }
    }
}

impl std::error::Error for OracleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OracleError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Http(err)
    }
}

#[derive(Debug)]
pub enum PlannerError {
    /// The stop registry is full.
    CapacityExceeded { max: usize },
    /// No stop lives in the referenced slot.
    NotFound { slot: usize },
    /// A route needs at least two located stops.
    NotEnoughStops { located: usize },
    /// The cost matrix could not be fetched; input order was used instead.
    OptimizationFailed(OracleError),
    /// The route geometry could not be fetched; nothing is drawn.
    RoutingUnavailable(OracleError),
    /// Search or reverse geocoding failed or had no match.
    GeocodingFailed {
        query: String,
        cause: Option<OracleError>,
    },
    /// The point-of-interest directory could not be loaded.
    DirectoryUnavailable(OracleError),
    MarkerNotFound(MarkerId),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::CapacityExceeded { max } => {
                write!(f, "Maximum of {} destinations allowed", max)
            }
            PlannerError::NotFound { slot } => write!(f, "no destination in slot {}", slot),
            PlannerError::NotEnoughStops { .. } => {
                write!(f, "Please add at least 2 valid destinations")
            }
            PlannerError::OptimizationFailed(_) => {
                write!(f, "Error optimizing route. Using original order.")
            }
            PlannerError::RoutingUnavailable(err) => {
                write!(f, "Error calculating route: {}", err)
            }
            PlannerError::GeocodingFailed { query, cause: None } => {
                write!(f, "Could not find location: {}", query)
            }
            PlannerError::GeocodingFailed {
                cause: Some(err), ..
            } => write!(f, "Error geocoding location: {}", err),
            PlannerError::DirectoryUnavailable(err) => {
                write!(f, "Error fetching farm locations: {}", err)
            }
            PlannerError::MarkerNotFound(id) => write!(f, "marker {} no longer exists", id.get()),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::OptimizationFailed(err)
            | PlannerError::RoutingUnavailable(err)
            | PlannerError::DirectoryUnavailable(err) => Some(err),
            PlannerError::GeocodingFailed {
                cause: Some(err), ..
            } => Some(err),
            _ => None,
        }
    }
}
