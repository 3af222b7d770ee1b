//! Real locations in and around Buon Ma Thuot, Dak Lak.

use route_planner::coordinate::Coordinate;

#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

pub const ENFARM_OFFICE: Location = Location {
    name: "enfarm Store/Office Dak Lak",
    lat: 12.690758005394018,
    lng: 108.06132029871573,
};

pub const BUON_MA_THUOT_MARKET: Location = Location {
    name: "Cho Buon Ma Thuot",
    lat: 12.6830,
    lng: 108.0441,
};

pub const COFFEE_MUSEUM: Location = Location {
    name: "World Coffee Museum",
    lat: 12.6953,
    lng: 108.0497,
};

pub const AKO_DHONG_VILLAGE: Location = Location {
    name: "Buon Ako Dhong",
    lat: 12.7011,
    lng: 108.0473,
};

pub const DRAY_NUR_FALLS: Location = Location {
    name: "Thac Dray Nur",
    lat: 12.5414,
    lng: 107.8886,
};

pub const LAK_LAKE: Location = Location {
    name: "Ho Lak",
    lat: 12.4139,
    lng: 108.1783,
};

pub const BUON_DON: Location = Location {
    name: "Buon Don",
    lat: 12.8907,
    lng: 107.7882,
};

pub const EA_KAO_LAKE: Location = Location {
    name: "Ho Ea Kao",
    lat: 12.6322,
    lng: 108.0890,
};

pub const CU_MGAR: Location = Location {
    name: "Cu M'gar",
    lat: 12.8164,
    lng: 108.0810,
};

/// Nine distinct places; the first is the default origin.
pub fn all_locations() -> Vec<Location> {
    vec![
        ENFARM_OFFICE,
        BUON_MA_THUOT_MARKET,
        COFFEE_MUSEUM,
        AKO_DHONG_VILLAGE,
        DRAY_NUR_FALLS,
        LAK_LAKE,
        BUON_DON,
        EA_KAO_LAKE,
        CU_MGAR,
    ]
}
