//! The user's stops, identified by stable display slots.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::PlannerError;

/// Maximum number of live stops (origin included).
pub const MAX_STOPS: usize = 8;

/// The fixed location slot 0 defaults to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub coordinate: Coordinate,
    pub name: String,
}

impl Default for HomeLocation {
    fn default() -> Self {
        Self {
            coordinate: Coordinate::new(12.690758005394018, 108.06132029871573),
            name: "enfarm Store/Office Dak Lak".to_string(),
        }
    }
}

/// Label shown for a slot before the user names it.
pub fn default_label(slot: usize) -> String {
    if slot == 0 {
        "Origin".to_string()
    } else {
        format!("Destination {}", slot)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    slot: usize,
    coordinate: Option<Coordinate>,
    label: String,
}

impl Stop {
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn is_origin(&self) -> bool {
        self.slot == 0
    }

    /// `None` while the stop waits for a search or map click to locate it.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Request-scoped view of a located stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub original_slot: usize,
    pub coordinate: Coordinate,
    pub label: String,
}

/// Ordered stops keyed by slot.
///
/// Slots are handed out in increasing order and stay in `0..capacity`.
/// A removed slot is only reused after every slot has been handed out, so a
/// slot keeps identifying the same stop while the user edits others.
#[derive(Debug, Clone)]
pub struct StopRegistry {
    slots: Vec<Option<Stop>>,
    home: HomeLocation,
    capacity: usize,
}

impl Default for StopRegistry {
    fn default() -> Self {
        Self::new(HomeLocation::default(), MAX_STOPS)
    }
}

impl StopRegistry {
    /// A registry holding only the default origin stop.
    pub fn new(home: HomeLocation, capacity: usize) -> Self {
        let mut registry = Self {
            slots: Vec::with_capacity(capacity),
            home,
            capacity,
        };
        registry.clear_all();
        registry
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adds a stop in the next unused slot, or the lowest freed one once
    /// every slot has been handed out.
    ///
    /// Slot 0 without a coordinate becomes the home location; other slots
    /// without a coordinate stay pending until located.
    pub fn add_stop(
        &mut self,
        coordinate: Option<Coordinate>,
        label: Option<String>,
    ) -> Result<usize, PlannerError> {
        if self.len() >= self.capacity {
            return Err(PlannerError::CapacityExceeded { max: self.capacity });
        }
        let slot = if self.slots.len() < self.capacity {
            self.slots.len()
        } else {
            self.slots
                .iter()
                .position(Option::is_none)
                .ok_or(PlannerError::CapacityExceeded { max: self.capacity })?
        };

        let (coordinate, label) = match (slot, coordinate) {
            (0, None) => (
                Some(self.home.coordinate),
                label.unwrap_or_else(|| self.home.name.clone()),
            ),
            (_, coordinate) => (coordinate, label.unwrap_or_else(|| default_label(slot))),
        };

        debug!(slot, ?coordinate, "stop added");
        let stop = Some(Stop {
            slot,
            coordinate,
            label,
        });
        if slot == self.slots.len() {
            self.slots.push(stop);
        } else {
            self.slots[slot] = stop;
        }
        Ok(slot)
    }

    /// Frees a slot. Unoccupied slots are ignored.
    pub fn remove_stop(&mut self, slot: usize) -> Option<Stop> {
        let removed = self.slots.get_mut(slot).and_then(Option::take);
        if removed.is_none() {
            debug!(slot, "remove ignored, slot is empty");
        }
        removed
    }

    /// Drops every stop and re-adds the default origin.
    pub fn clear_all(&mut self) {
        self.slots.clear();
        if self.capacity > 0 {
            // Cannot fail: the registry is empty and has room.
            let _ = self.add_stop(None, None);
        }
    }

    /// Replaces a stop's position and label in place.
    pub fn update_stop_coordinate(
        &mut self,
        slot: usize,
        coordinate: Coordinate,
        label: impl Into<String>,
    ) -> Result<(), PlannerError> {
        let stop = self.stop_mut(slot)?;
        stop.coordinate = Some(coordinate);
        stop.label = label.into();
        Ok(())
    }

    /// Renames a stop without moving it.
    pub fn relabel(&mut self, slot: usize, label: impl Into<String>) -> Result<(), PlannerError> {
        self.stop_mut(slot)?.label = label.into();
        Ok(())
    }

    pub fn get(&self, slot: usize) -> Option<&Stop> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Live stops in slot order.
    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.stops().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Located stops as waypoints, in slot order.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.stops()
            .filter_map(|stop| {
                stop.coordinate.map(|coordinate| Waypoint {
                    original_slot: stop.slot,
                    coordinate,
                    label: stop.label.clone(),
                })
            })
            .collect()
    }

    pub fn can_calculate(&self) -> bool {
        self.waypoints().len() >= 2
    }

    fn stop_mut(&mut self, slot: usize) -> Result<&mut Stop, PlannerError> {
        self.slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or(PlannerError::NotFound { slot })
    }
}
