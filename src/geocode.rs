//! Geocoding: Nominatim adapter and text resolution.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::{OracleError, PlannerError};
use crate::traits::Geocoder;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying user agent.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("route-planner/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

/// A resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub coordinate: Coordinate,
    pub display_name: String,
    /// True when the text was a literal coordinate pair.
    pub from_coordinates: bool,
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

impl Geocoder for NominatimClient {
    fn search(&self, query: &str) -> Result<Option<Place>, OracleError> {
        debug!(query, "forward geocoding");
        let results = self
            .client
            .get(self.endpoint("search"))
            .query(&[("format", "json"), ("q", query)])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<Vec<NominatimPlace>>())?;

        results.into_iter().next().map(NominatimPlace::into_place).transpose()
    }

    fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, OracleError> {
        debug!(%coordinate, "reverse geocoding");
        let body = self
            .client
            .get(self.endpoint("reverse"))
            .query(&[
                ("format", "json".to_string()),
                ("lat", coordinate.lat.to_string()),
                ("lon", coordinate.lng.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<NominatimReverse>())?;

        Ok(body.display_name)
    }
}

/// Resolves free text to a place.
///
/// A literal `"lat, lng"` pair resolves without touching the geocoder.
pub fn resolve<G>(geocoder: &G, text: &str) -> Result<Place, PlannerError>
where
    G: Geocoder,
{
    let query = text.trim();
    if let Some(coordinate) = Coordinate::parse_pair(query) {
        return Ok(Place {
            coordinate,
            display_name: format!("{}, {}", coordinate.lat, coordinate.lng),
            from_coordinates: true,
        });
    }

    let failed = |cause| PlannerError::GeocodingFailed {
        query: query.to_string(),
        cause,
    };
    if query.is_empty() {
        return Err(failed(None));
    }

    match geocoder.search(query) {
        Ok(Some(place)) => Ok(place),
        Ok(None) => Err(failed(None)),
        Err(err) => Err(failed(Some(err))),
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimPlace {
    fn into_place(self) -> Result<Place, OracleError> {
        let parse = |value: &str| {
            value
                .parse::<f64>()
                .map_err(|_| OracleError::Malformed(format!("bad coordinate {:?}", value)))
        };
        Ok(Place {
            coordinate: Coordinate::new(parse(&self.lat)?, parse(&self.lon)?),
            display_name: self.display_name,
            from_coordinates: false,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}
