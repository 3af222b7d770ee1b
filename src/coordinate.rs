//! Geographic coordinates.

use std::fmt;
use std::sync::LazyLock;

use geo::{Bearing, Haversine, InterpolatePoint, Point};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::haversine::haversine_m;

/// Latitude in [-90, 90], comma, longitude in [-180, 180].
static COORDINATE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[-+]?([1-8]?\d(\.\d+)?|90(\.0+)?),\s*[-+]?(180(\.0+)?|((1[0-7]\d)|([1-9]?\d))(\.\d+)?)$",
    )
    .expect("coordinate pair pattern is valid")
});

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Parses free text of the form `"lat, lng"`.
    ///
    /// Returns `None` for anything that is not a plain coordinate pair, so
    /// callers can fall through to a geocoder.
    pub fn parse_pair(text: &str) -> Option<Self> {
        let text = text.trim();
        if !COORDINATE_PAIR.is_match(text) {
            return None;
        }
        let (lat, lng) = text.split_once(',')?;
        Some(Self::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?))
    }

    /// Great-circle distance in meters.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        haversine_m(*self, *other)
    }

    /// Initial bearing towards `other`, in degrees clockwise from north.
    pub fn bearing_deg(&self, other: &Coordinate) -> f64 {
        Haversine
            .bearing(Point::from(*self), Point::from(*other))
            .rem_euclid(360.0)
    }

    /// Point on the great circle towards `other`, `ratio` of the way there.
    pub fn interpolate(&self, other: &Coordinate, ratio: f64) -> Coordinate {
        Haversine
            .point_at_ratio_between(Point::from(*self), Point::from(*other), ratio)
            .into()
    }

    /// `"lat, lng"` with six decimals, the way map clicks are labelled.
    pub fn to_fixed_label(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        Point::new(coordinate.lng, coordinate.lat)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Coordinate::new(point.y(), point.x())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}
