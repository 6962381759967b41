//! End-to-end daemon ticks against a scratch file layout.

use std::fs;
use std::path::Path;
use std::time::Duration;

use deck_software::navigation::NavState;
use deck_software::paths::PathLayout;
use deck_software::runtime::Runtime;
use helm::HelmConfig;
use tempfile::TempDir;

fn layout(tmp: &TempDir) -> PathLayout {
    PathLayout::new(
        tmp.path().join("sailboat"),
        tmp.path().join("u200"),
        tmp.path().join("log"),
    )
}

/// A healthy instrument stack: boat at 55.605N 13.0E heading east, one
/// knot of way on, wind straight out of the north.
fn seed_sensors(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    for (name, value) in [
        ("Rate", "0.0"),
        ("Heading", "90.0"),
        ("Pitch", "0.0"),
        ("Roll", "0.0"),
        ("Latitude", "55.605"),
        ("Longitude", "13.0"),
        ("COG", "90.0"),
        ("SOG", "1.0"),
        ("Wind_Speed", "5.0"),
        ("Wind_Angle", "0.0"),
    ] {
        fs::write(dir.join(name), value).unwrap();
    }
}

fn runtime(paths: &PathLayout) -> Runtime {
    Runtime::new(
        HelmConfig::default(),
        paths.clone(),
        Duration::from_millis(0),
    )
    .unwrap()
}

fn read(paths: &PathLayout, name: &str) -> String {
    fs::read_to_string(paths.runtime(name)).unwrap()
}

#[test]
fn test_idle_boat_still_logs() {
    let tmp = TempDir::new().unwrap();
    let paths = layout(&tmp);
    seed_sensors(&paths.sensor_dir);
    let mut runtime = runtime(&paths);

    runtime.step().unwrap();

    assert_eq!(runtime.nav_state(), NavState::Idle);
    // No commands were issued.
    assert_eq!(read(&paths, "Navigation_System_Rudder"), "0");

    let pointer = fs::read_to_string(paths.log_dir.join("current_logfile")).unwrap();
    assert!(pointer.starts_with("logfile_0001_"), "pointer: {pointer}");
    let log = fs::read_to_string(paths.log_dir.join(&pointer)).unwrap();
    assert_eq!(log.lines().count(), 2, "header plus one row");
}

#[test]
fn test_sailing_drives_rudder_and_telemetry() {
    let tmp = TempDir::new().unwrap();
    let paths = layout(&tmp);
    seed_sensors(&paths.sensor_dir);
    let mut runtime = runtime(&paths);

    // Crosswind leg due east, commanded from shore.
    fs::write(paths.runtime("Point_End_Lat"), "55.605").unwrap();
    fs::write(paths.runtime("Point_End_Lon"), "13.02").unwrap();
    fs::write(paths.runtime("Navigation_System"), "1").unwrap();

    runtime.step().unwrap();

    assert_eq!(runtime.nav_state(), NavState::Sail);
    // Heading east on an eastward leg: no rudder correction.
    assert_eq!(read(&paths, "Navigation_System_Rudder"), "0");
    assert_eq!(read(&paths, "Guidance_Heading"), "90.0");
    assert_eq!(read(&paths, "mean_wind"), "0");
    // The leg start was re-based onto the boat.
    assert_eq!(read(&paths, "Point_Start_Lat"), "55.605000");
    assert_eq!(read(&paths, "Point_Start_Lon"), "13.000000");
    let boundaries = read(&paths, "boundaries");
    assert_eq!(boundaries.matches(';').count(), 4, "four corner points");

    // After the trim controller's settling hold, the sail gets sheeted
    // for a beam reach and the winch starts moving.
    for _ in 0..24 {
        runtime.step().unwrap();
    }
    let sail: i32 = read(&paths, "Navigation_System_Sail").parse().unwrap();
    assert!(sail > 0, "sail command: {sail}");
    let duty: f64 = read(&paths, "duty").parse().unwrap();
    assert!(duty > 0.0, "duty: {duty}");
}

#[test]
fn test_manual_override_passes_commands_through() {
    let tmp = TempDir::new().unwrap();
    let paths = layout(&tmp);
    seed_sensors(&paths.sensor_dir);
    let mut runtime = runtime(&paths);

    fs::write(paths.runtime("Manual_Control"), "1").unwrap();
    fs::write(paths.runtime("Manual_Control_Rudder"), "15").unwrap();
    fs::write(paths.runtime("Manual_Control_Sail"), "300").unwrap();

    runtime.step().unwrap();

    assert_eq!(read(&paths, "Navigation_System_Rudder"), "15");
    assert_eq!(read(&paths, "Navigation_System_Sail"), "300");
    assert_eq!(runtime.nav_state(), NavState::Idle);
}

#[test]
fn test_route_request_collapses_to_sail() {
    let tmp = TempDir::new().unwrap();
    let paths = layout(&tmp);
    seed_sensors(&paths.sensor_dir);
    let mut runtime = runtime(&paths);

    fs::write(paths.runtime("Navigation_System"), "4").unwrap();

    runtime.step().unwrap();
    assert_eq!(runtime.nav_state(), NavState::Route);
    assert_eq!(read(&paths, "Navigation_System"), "1");

    runtime.step().unwrap();
    assert_eq!(runtime.nav_state(), NavState::Sail);
}

#[test]
fn test_reaching_the_target_switches_to_hold() {
    let tmp = TempDir::new().unwrap();
    let paths = layout(&tmp);
    seed_sensors(&paths.sensor_dir);
    let mut runtime = runtime(&paths);

    // Target about a meter north of the boat, well inside the arrival
    // radius.
    fs::write(paths.runtime("Point_End_Lat"), "55.60501").unwrap();
    fs::write(paths.runtime("Point_End_Lon"), "13.0").unwrap();
    fs::write(paths.runtime("Navigation_System"), "1").unwrap();

    runtime.step().unwrap();
    assert_eq!(read(&paths, "Navigation_System"), "3");

    runtime.step().unwrap();
    assert_eq!(runtime.nav_state(), NavState::Hold);
    // Holding means the target is wherever the boat was.
    assert_eq!(read(&paths, "Point_End_Lat"), "55.605000");
    assert_eq!(read(&paths, "Point_End_Lon"), "13.000000");
    assert_eq!(runtime.pilot().leg().target.lat, 55.605);
}
