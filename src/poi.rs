//! Point-of-interest directory (installed farm locations).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::coordinate::Coordinate;
use crate::error::OracleError;
use crate::traits::PoiDirectory;

/// Most suggestions shown for a name search.
pub const SUGGESTION_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiDirectoryConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for PoiDirectoryConfig {
    fn default() -> Self {
        Self {
            url: "https://api-ma.enfarm.com/api/v1/ma/get-install-locations".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
    pub tree_type: Option<String>,
    pub is_exhibit: bool,
}

#[derive(Debug, Clone)]
pub struct PoiClient {
    config: PoiDirectoryConfig,
    client: reqwest::blocking::Client,
}

impl PoiClient {
    pub fn new(config: PoiDirectoryConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl PoiDirectory for PoiClient {
    fn locations(&self) -> Result<Vec<PointOfInterest>, OracleError> {
        debug!(url = %self.config.url, "fetching POI directory");
        let body = self
            .client
            .get(&self.config.url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<DirectoryResponse>())?;

        let locations = parse_directory(body)?;
        info!(count = locations.len(), "POI directory loaded");
        Ok(locations)
    }
}

/// Name matches for a search box.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiMatches<'a> {
    /// At most `limit` matches, in directory order.
    pub items: Vec<&'a PointOfInterest>,
    /// Matches beyond the shown ones.
    pub more: usize,
}

/// Case-insensitive substring search over names.
pub fn search<'a>(pois: &'a [PointOfInterest], query: &str, limit: usize) -> PoiMatches<'a> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return PoiMatches {
            items: Vec::new(),
            more: 0,
        };
    }

    let all: Vec<&PointOfInterest> = pois
        .iter()
        .filter(|poi| poi.name.to_lowercase().contains(&needle))
        .collect();
    let more = all.len().saturating_sub(limit);
    PoiMatches {
        items: all.into_iter().take(limit).collect(),
        more,
    }
}

/// Exact, case-insensitive name lookup.
pub fn find_by_name<'a>(pois: &'a [PointOfInterest], name: &str) -> Option<&'a PointOfInterest> {
    let name = name.trim().to_lowercase();
    pois.iter().find(|poi| poi.name.to_lowercase() == name)
}

fn parse_directory(body: DirectoryResponse) -> Result<Vec<PointOfInterest>, OracleError> {
    let content = body
        .content
        .ok_or_else(|| OracleError::Malformed("directory response has no content".to_string()))?;

    Ok(content.into_iter().filter_map(FarmRecord::into_poi).collect())
}

#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    content: Option<Vec<FarmRecord>>,
}

#[derive(Debug, Deserialize)]
struct FarmRecord {
    #[serde(default)]
    farmid: serde_json::Value,
    farmname: Option<String>,
    lat: Option<f64>,
    long: Option<f64>,
    tree_type: Option<String>,
    #[serde(default)]
    is_exhibit: Option<bool>,
}

impl FarmRecord {
    /// Records without a position cannot be routed to and are dropped.
    fn into_poi(self) -> Option<PointOfInterest> {
        let id = match self.farmid {
            serde_json::Value::String(id) => id,
            serde_json::Value::Null => return None,
            other => other.to_string(),
        };
        let coordinate = Coordinate::new(self.lat?, self.long?);
        let name = self
            .farmname
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Farm {}", id));

        Some(PointOfInterest {
            id,
            name,
            coordinate,
            tree_type: self.tree_type,
            is_exhibit: self.is_exhibit.unwrap_or(false),
        })
    }
}
