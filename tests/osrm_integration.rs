//! Routing against a local OSRM container with real Dak Lak road data.
//!
//! Needs docker, and network access for the first run. Run with
//! `cargo test -- --ignored`.

mod fixtures;

use std::time::{Duration, Instant};

use route_planner::config::PlannerConfig;
use route_planner::osrm::{OsrmClient, OsrmConfig};
use route_planner::planner::RoutePlanner;
use route_planner::renderer::Phase;
use route_planner::traits::CostMatrixProvider;

use fixtures::{osrm_server, COFFEE_MUSEUM, DRAY_NUR_FALLS, EA_KAO_LAKE, ENFARM_OFFICE};

fn client(base_url: &str) -> OsrmClient {
    OsrmClient::new(OsrmConfig {
        base_url: base_url.to_string(),
        ..OsrmConfig::default()
    })
    .expect("build OSRM client")
}

/// osrm-routed accepts connections before the dataset is loaded.
fn wait_until_ready(client: &OsrmClient) {
    let pair = [ENFARM_OFFICE.coordinate(), COFFEE_MUSEUM.coordinate()];
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(30) {
        if client.matrix_for(&pair).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(500));
    }
    panic!("OSRM did not become ready");
}

#[test]
#[ignore = "requires docker and network access"]
fn osrm_table_returns_square_matrix() {
    let server = osrm_server::start().expect("start OSRM container");
    let client = client(&server.base_url);
    wait_until_ready(&client);

    let locations = [
        ENFARM_OFFICE.coordinate(),
        COFFEE_MUSEUM.coordinate(),
        DRAY_NUR_FALLS.coordinate(),
    ];
    let matrix = client.matrix_for(&locations).expect("table request");
    assert_eq!(matrix.len(), locations.len());
    assert!(matrix.iter().all(|row| row.len() == locations.len()));
    assert!(matrix[0][2] > matrix[0][1], "Dray Nur is farther than the museum");

    drop(server);
}

#[test]
#[ignore = "requires docker and network access"]
fn planner_reveals_a_real_route() {
    let server = osrm_server::start().expect("start OSRM container");
    let client = client(&server.base_url);
    wait_until_ready(&client);

    let mut planner = RoutePlanner::new(PlannerConfig::default());
    for location in [DRAY_NUR_FALLS, COFFEE_MUSEUM, EA_KAO_LAKE] {
        planner
            .add_stop(Some(location.coordinate()), Some(location.name.to_string()))
            .expect("room for stop");
    }

    let outcome = planner.calculate_route(&client).expect("route");
    assert!(!outcome.used_input_order);
    assert_eq!(outcome.summary.ordered_labels.len(), 5);
    assert!(outcome.summary.distance_km > 0.0);

    let geometry = planner.route().expect("route drawn").geometry.clone();
    assert_eq!(geometry.segment_boundaries().len(), 5);
    assert_eq!(
        *geometry.segment_boundaries().last().unwrap(),
        geometry.points().len() - 1
    );

    assert_eq!(planner.run_until_revealed(Duration::from_secs(3600)), Phase::Complete);
    assert_eq!(planner.renderer().revealed_points().len(), geometry.points().len());

    drop(server);
}
