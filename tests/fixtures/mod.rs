//! Test fixtures for route-planner.
//!
//! Provides:
//! - Real Dak Lak locations around Buon Ma Thuot (from OpenStreetMap)
//! - In-memory oracles standing in for OSRM, Nominatim and the POI API
//! - A dockerised OSRM server for the ignored integration tests

#![allow(dead_code)]

pub mod dak_lak_locations;
pub mod oracles;
pub mod osrm_server;

pub use dak_lak_locations::*;
pub use oracles::*;
