//! Candidate markers from search results and the POI directory.
//!
//! Each marker gets a stable id when placed; "add as destination" refers to
//! that id instead of looking anything up by position.

use std::collections::BTreeMap;

use crate::coordinate::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

impl MarkerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Geocoded address.
    Location,
    /// Literal coordinates typed by the user.
    Coordinates,
    /// Entry from the POI directory.
    Poi,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMarker {
    pub id: MarkerId,
    pub coordinate: Coordinate,
    pub name: String,
    pub kind: MarkerKind,
}

#[derive(Debug, Default)]
pub struct MarkerRegistry {
    next_id: u64,
    markers: BTreeMap<MarkerId, CandidateMarker>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coordinate: Coordinate, name: impl Into<String>, kind: MarkerKind) -> MarkerId {
        self.next_id += 1;
        let id = MarkerId(self.next_id);
        self.markers.insert(
            id,
            CandidateMarker {
                id,
                coordinate,
                name: name.into(),
                kind,
            },
        );
        id
    }

    pub fn get(&self, id: MarkerId) -> Option<&CandidateMarker> {
        self.markers.get(&id)
    }

    /// Removes and returns a marker, e.g. once it became a stop.
    pub fn take(&mut self, id: MarkerId) -> Option<CandidateMarker> {
        self.markers.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateMarker> {
        self.markers.values()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}
