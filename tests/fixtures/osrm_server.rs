//! Local `osrm-routed` over the Vietnam extract, for the ignored container
//! tests.
//!
//! The first start downloads the Geofabrik extract into `OSRM_DATA_DIR`
//! (default `osrm-data/`) and preprocesses it for MLD with the OSRM image.
//! Later starts reuse both the files and the container.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, UNIX_EPOCH};

use testcontainers::core::{IntoContainerPort, Mount};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, ReuseDirective, TestcontainersError};

const IMAGE: &str = "osrm/osrm-backend";
const EXTRACT_URL: &str = "https://download.geofabrik.de/asia/vietnam-latest.osm.pbf";
const STEM: &str = "vietnam-latest";

pub struct OsrmServer {
    pub container: Container<GenericImage>,
    pub base_url: String,
}

pub fn start() -> Result<OsrmServer, TestcontainersError> {
    let data_dir = data_dir().map_err(TestcontainersError::other)?;
    prepare(&data_dir).map_err(TestcontainersError::other)?;

    let osrm_file = data_dir.join(format!("{}.osrm", STEM));
    let stamp = fs::metadata(&osrm_file)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);

    let container = GenericImage::new(IMAGE, "latest")
        .with_exposed_port(5000.tcp())
        .with_mount(Mount::bind_mount(data_dir.to_string_lossy().to_string(), "/data"))
        .with_cmd([
            "osrm-routed".to_string(),
            "--algorithm".to_string(),
            "mld".to_string(),
            format!("/data/{}.osrm", STEM),
        ])
        .with_container_name(format!("route-planner-osrm-{}", stamp))
        .with_startup_timeout(Duration::from_secs(60))
        .with_reuse(ReuseDirective::Always)
        .start()?;
    let port = container.get_host_port_ipv4(5000.tcp())?;

    Ok(OsrmServer {
        container,
        base_url: format!("http://127.0.0.1:{}", port),
    })
}

fn data_dir() -> Result<PathBuf, String> {
    let root = PathBuf::from(env::var("OSRM_DATA_DIR").unwrap_or_else(|_| "osrm-data".to_string()));
    let root = if root.is_absolute() {
        root
    } else {
        env::current_dir().map_err(|err| err.to_string())?.join(root)
    };
    let dir = root.join("vietnam");
    fs::create_dir_all(&dir).map_err(|err| format!("create {}: {}", dir.display(), err))?;
    Ok(dir)
}

/// Runs whichever of download, extract, partition and customize has not
/// produced its output yet.
fn prepare(dir: &Path) -> Result<(), String> {
    let pbf = dir.join(format!("{}.osm.pbf", STEM));
    if !pbf.exists() {
        download(&pbf)?;
    }

    let osrm = format!("/data/{}.osrm", STEM);
    let pbf_in_container = format!("/data/{}.osm.pbf", STEM);
    let steps: [(&str, &str, Vec<&str>); 3] = [
        ("osrm", "osrm-extract", vec!["-p", "/opt/car.lua", pbf_in_container.as_str()]),
        ("osrm.partition", "osrm-partition", vec![osrm.as_str()]),
        ("osrm.mldgr", "osrm-customize", vec![osrm.as_str()]),
    ];
    for (output, tool, args) in steps {
        if dir.join(format!("{}.{}", STEM, output)).exists() {
            continue;
        }
        let status = Command::new("docker")
            .args(["run", "--rm", "-t", "-v"])
            .arg(format!("{}:/data", dir.display()))
            .arg(IMAGE)
            .arg(tool)
            .args(&args)
            .status()
            .map_err(|err| format!("{}: {}", tool, err))?;
        if !status.success() {
            return Err(format!("{} exited with {}", tool, status));
        }
    }
    Ok(())
}

fn download(dest: &Path) -> Result<(), String> {
    let bytes = reqwest::blocking::get(EXTRACT_URL)
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(|err| format!("download {}: {}", EXTRACT_URL, err))?;
    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, &bytes).map_err(|err| err.to_string())?;
    fs::rename(&tmp, dest).map_err(|err| err.to_string())
}
