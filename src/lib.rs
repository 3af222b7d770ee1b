//! route-planner core
//!
//! Stop sequencing and progressive route rendering for an interactive
//! multi-stop route planner. Remote services (routing, geocoding, POI
//! directory) sit behind the traits in [`traits`].

pub mod config;
pub mod coordinate;
pub mod decorator;
pub mod error;
pub mod geocode;
pub mod haversine;
pub mod markers;
pub mod optimizer;
pub mod osrm;
pub mod planner;
pub mod poi;
pub mod polyline;
pub mod registry;
pub mod renderer;
pub mod route;
pub mod scheduler;
pub mod summary;
pub mod traits;
