//! Polyline representation for route geometries.
//!
//! This module provides a type for working with polylines as decoded
//! coordinate sequences. Decoding from the compact encoded format happens at
//! the boundary (when receiving from OSRM).

use std::fmt;

use geo::line_measures::LengthMeasurable;
use geo::{Distance, Haversine, InterpolatePoint, LineString, Point};
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
    /// A byte outside the encoding alphabet.
    InvalidByte { position: usize },
    /// The input ended in the middle of a value.
    Truncated,
}

impl fmt::Display for PolylineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolylineError::InvalidByte { position } => {
                write!(f, "invalid polyline byte at {}", position)
            }
            PolylineError::Truncated => write!(f, "polyline ends mid-value"),
        }
    }
}

impl std::error::Error for PolylineError {}

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline with the given precision (5 for the
    /// classic format, 6 for OSRM's `polyline6`).
    pub fn decode(encoded: &str, precision: u32) -> Result<Self, PolylineError> {
        let factor = 10f64.powi(precision as i32);
        let bytes = encoded.as_bytes();
        let mut points = Vec::new();
        let mut position = 0;
        let mut lat = 0i64;
        let mut lng = 0i64;

        while position < bytes.len() {
            lat += decode_value(bytes, &mut position)?;
            lng += decode_value(bytes, &mut position)?;
            points.push(Coordinate::new(lat as f64 / factor, lng as f64 / factor));
        }

        Ok(Self { points })
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The path as a `geo` line string (x = longitude, y = latitude).
    pub fn line_string(&self) -> LineString<f64> {
        self.points.iter().map(|&c| Point::from(c)).collect()
    }

    /// Path length in meters.
    pub fn length_m(&self) -> f64 {
        self.line_string().length(&Haversine)
    }

    /// Positions and headings at `offset_m + k * spacing_m` meters along the
    /// path, walking it once.
    ///
    /// Empty for paths without length or a non-positive spacing.
    pub fn points_every(&self, offset_m: f64, spacing_m: f64) -> Vec<(Coordinate, f64)> {
        if spacing_m <= 0.0 || offset_m < 0.0 {
            return Vec::new();
        }

        let mut placed = Vec::new();
        let mut next = offset_m;
        let mut travelled = 0.0;
        for line in self.line_string().lines() {
            let (start, end) = (line.start_point(), line.end_point());
            let span = Haversine.distance(start, end);
            if span <= 0.0 {
                continue;
            }

            let heading = Coordinate::from(start).bearing_deg(&Coordinate::from(end));
            while next <= travelled + span {
                let at = Haversine.point_at_distance_between(start, end, next - travelled);
                placed.push((at.into(), heading));
                next += spacing_m;
            }
            travelled += span;
        }
        placed
    }

    /// Index of the point closest to `target`, searching from `start`
    /// onwards. Ties keep the earliest index.
    pub fn nearest_index_from(&self, start: usize, target: Coordinate) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, point) in self.points.iter().enumerate().skip(start) {
            let distance = point.distance_m(&target);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}

fn decode_value(bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(*position).ok_or(PolylineError::Truncated)?;
        if !(63..=126).contains(&byte) || shift > 60 {
            return Err(PolylineError::InvalidByte {
                position: *position,
            });
        }
        *position += 1;

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
