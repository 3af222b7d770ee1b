//! Planner configuration.
//!
//! Every section has a `Default` matching the hosted client, so a config
//! file only needs the keys it changes. `ROUTE_PLANNER_*` environment
//! variables override service URLs on top of that.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geocode::NominatimConfig;
use crate::osrm::OsrmConfig;
use crate::poi::PoiDirectoryConfig;
use crate::registry::{HomeLocation, MAX_STOPS};

/// Pacing of the progressive route reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub tick_ms: u64,
    pub points_per_tick: usize,
    pub segment_delay_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            points_per_tick: 2,
            segment_delay_ms: 500,
        }
    }
}

impl AnimationConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn segment_delay(&self) -> Duration {
        Duration::from_millis(self.segment_delay_ms)
    }
}

/// Marching direction arrows. Distances are meters along the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    pub enabled: bool,
    pub interval_ms: u64,
    pub step_m: f64,
    pub repeat_m: f64,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 50,
            step_m: 1.0,
            repeat_m: 300.0,
        }
    }
}

impl ArrowConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub osrm: OsrmConfig,
    pub nominatim: NominatimConfig,
    pub poi: PoiDirectoryConfig,
    pub animation: AnimationConfig,
    pub arrows: ArrowConfig,
    pub home: HomeLocation,
    pub max_stops: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            osrm: OsrmConfig::default(),
            nominatim: NominatimConfig::default(),
            poi: PoiDirectoryConfig::default(),
            animation: AnimationConfig::default(),
            arrows: ArrowConfig::default(),
            home: HomeLocation::default(),
            max_stops: MAX_STOPS,
        }
    }
}

impl PlannerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `ROUTE_PLANNER_*` overrides looked up through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ROUTE_PLANNER_OSRM_URL") {
            self.osrm.base_url = url;
        }
        if let Some(profile) = lookup("ROUTE_PLANNER_OSRM_PROFILE") {
            self.osrm.profile = profile;
        }
        if let Some(url) = lookup("ROUTE_PLANNER_NOMINATIM_URL") {
            self.nominatim.base_url = url;
        }
        if let Some(url) = lookup("ROUTE_PLANNER_POI_URL") {
            self.poi.url = url;
        }
        if let Some(secs) = lookup("ROUTE_PLANNER_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.osrm.timeout_secs = secs;
            self.nominatim.timeout_secs = secs;
            self.poi.timeout_secs = secs;
        }
        self
    }
}
