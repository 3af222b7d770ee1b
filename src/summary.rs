//! Route summary and shareable map link.

use serde::Serialize;

use crate::coordinate::Coordinate;
use crate::registry::{default_label, Waypoint};

/// Marker colors by position in the visiting order.
pub const PALETTE: [&str; 8] = [
    "#3498db", "#e74c3c", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22", "#34495e",
];

const MAPS_DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/?api=1";

/// One row of the ordered stop list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub position: usize,
    /// `O` for the origin, then `1`, `2`, ...
    pub glyph: String,
    /// `Origin` or `Stop n`.
    pub step_label: String,
    /// The slot's original label, when the optimizer moved it.
    pub original_label: Option<String>,
    pub label: String,
    pub color: &'static str,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub ordered_labels: Vec<String>,
    pub entries: Vec<SummaryEntry>,
    /// Total distance, rounded to 0.1 km.
    pub distance_km: f64,
    pub external_map_url: Option<String>,
}

impl RouteSummary {
    pub fn distance_display(&self) -> String {
        format!("{:.1}", self.distance_km)
    }
}

pub fn marker_glyph(position: usize) -> String {
    if position == 0 {
        "O".to_string()
    } else {
        position.to_string()
    }
}

pub fn step_label(position: usize) -> String {
    if position == 0 {
        "Origin".to_string()
    } else {
        format!("Stop {}", position)
    }
}

pub fn marker_color(position: usize) -> &'static str {
    PALETTE[position % PALETTE.len()]
}

/// Summarises an ordered route. Pure: no network, no animation.
pub fn build_summary(order: &[Waypoint], total_distance_m: f64) -> RouteSummary {
    let entries = order
        .iter()
        .enumerate()
        .map(|(position, waypoint)| SummaryEntry {
            position,
            glyph: marker_glyph(position),
            step_label: step_label(position),
            original_label: (waypoint.original_slot != position)
                .then(|| default_label(waypoint.original_slot)),
            label: waypoint.label.clone(),
            color: marker_color(position),
            coordinate: waypoint.coordinate,
        })
        .collect();

    RouteSummary {
        ordered_labels: order.iter().map(|w| w.label.clone()).collect(),
        entries,
        distance_km: (total_distance_m / 100.0).round() / 10.0,
        external_map_url: external_map_url(order),
    }
}

/// Directions deep link: origin, destination and every waypoint between
/// them, in order. `None` for fewer than two waypoints.
pub fn external_map_url(order: &[Waypoint]) -> Option<String> {
    let (origin, rest) = order.split_first()?;
    let (destination, between) = rest.split_last()?;

    let mut url = format!(
        "{}&origin={}&destination={}",
        MAPS_DIRECTIONS_URL, origin.coordinate, destination.coordinate
    );
    if !between.is_empty() {
        let waypoints = between
            .iter()
            .map(|w| w.coordinate.to_string())
            .collect::<Vec<_>>()
            .join("|");
        url.push_str("&waypoints=");
        url.push_str(&waypoints);
    }
    url.push_str("&travelmode=driving");
    Some(url)
}
