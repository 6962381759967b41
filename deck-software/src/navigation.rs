//! Navigation state and manual-override files.

use std::io;

use helm::GeoPoint;

use crate::paths::{read_value, write_value, PathLayout};

/// Top-level mode commanded through the `Navigation_System` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    /// Autopilot off; instruments are still read and logged.
    #[default]
    Idle,
    /// Sail toward the target point.
    Sail,
    /// Hold the current position.
    Hold,
    /// Route request; collapses straight into [`NavState::Sail`].
    Route,
}

impl NavState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(NavState::Idle),
            1 => Some(NavState::Sail),
            3 => Some(NavState::Hold),
            4 => Some(NavState::Route),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            NavState::Idle => 0,
            NavState::Sail => 1,
            NavState::Hold => 3,
            NavState::Route => 4,
        }
    }
}

/// Manual override values, live while the `Manual_Control` flag is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualControl {
    pub active: bool,
    pub rudder_deg: i32,
    pub sail_ticks: i32,
}

/// Watches the navigation files and surfaces state transitions.
///
/// State changes take effect through the `Navigation_System` file no
/// matter who asks for them: shore writes and the daemon's own requests
/// both land there and are picked up on the next poll.
pub struct NavMonitor {
    paths: PathLayout,
    state: NavState,
    handled: NavState,
    manual: ManualControl,
    target: GeoPoint,
}

impl NavMonitor {
    pub fn new(paths: PathLayout) -> Self {
        Self {
            paths,
            state: NavState::Idle,
            handled: NavState::Idle,
            manual: ManualControl::default(),
            target: GeoPoint::default(),
        }
    }

    /// Re-read the navigation and manual-control files. Unknown state
    /// codes and missing files keep the previous values.
    pub fn poll(&mut self) {
        if let Some(code) = read_value::<i32>(&self.paths.runtime("Navigation_System")) {
            if let Some(state) = NavState::from_code(code) {
                self.state = state;
            }
        }
        if let Some(flag) = read_value::<i32>(&self.paths.runtime("Manual_Control")) {
            self.manual.active = flag != 0;
        }
        if self.manual.active {
            if let Some(angle) = read_value(&self.paths.runtime("Manual_Control_Rudder")) {
                self.manual.rudder_deg = angle;
            }
            if let Some(ticks) = read_value(&self.paths.runtime("Manual_Control_Sail")) {
                self.manual.sail_ticks = ticks;
            }
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn manual(&self) -> ManualControl {
        self.manual
    }

    /// The state change since the last call, if any.
    pub fn take_transition(&mut self) -> Option<NavState> {
        if self.state != self.handled {
            self.handled = self.state;
            Some(self.state)
        } else {
            None
        }
    }

    /// Ask for a state change. The request goes through the file like any
    /// shore-side write and is picked up on the next poll.
    pub fn request(&mut self, state: NavState) -> io::Result<()> {
        write_value(&self.paths.runtime("Navigation_System"), state.code())
    }

    /// Read the target point, re-basing the leg start on the boat's
    /// position when the target moved since the last read.
    pub fn read_target_point(&mut self, position: GeoPoint) -> io::Result<GeoPoint> {
        let previous = self.target;
        if let Some(lat) = read_value(&self.paths.runtime("Point_End_Lat")) {
            self.target.lat = lat;
        }
        if let Some(lon) = read_value(&self.paths.runtime("Point_End_Lon")) {
            self.target.lon = lon;
        }
        if self.target.lat != previous.lat || self.target.lon != previous.lon {
            self.write_start(position)?;
        }
        Ok(self.target)
    }

    /// Publish the leg start point.
    pub fn write_start(&self, point: GeoPoint) -> io::Result<()> {
        write_value(
            &self.paths.runtime("Point_Start_Lat"),
            format!("{:.6}", point.lat),
        )?;
        write_value(
            &self.paths.runtime("Point_Start_Lon"),
            format!("{:.6}", point.lon),
        )
    }

    /// Publish the target point and remember it, so the next target read
    /// does not mistake our own write for a shore-side change.
    pub fn write_end(&mut self, point: GeoPoint) -> io::Result<()> {
        self.target = point;
        write_value(
            &self.paths.runtime("Point_End_Lat"),
            format!("{:.6}", point.lat),
        )?;
        write_value(
            &self.paths.runtime("Point_End_Lon"),
            format!("{:.6}", point.lon),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn setup(tmp: &TempDir) -> (PathLayout, NavMonitor) {
        let paths = PathLayout::new(
            tmp.path().join("sailboat"),
            tmp.path().join("u200"),
            tmp.path().join("log"),
        );
        fs::create_dir_all(&paths.runtime_dir).unwrap();
        let monitor = NavMonitor::new(paths.clone());
        (paths, monitor)
    }

    #[test]
    fn test_transition_fires_once_per_change() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut monitor) = setup(&tmp);

        fs::write(paths.runtime("Navigation_System"), "1").unwrap();
        monitor.poll();
        assert_eq!(monitor.take_transition(), Some(NavState::Sail));
        assert_eq!(monitor.take_transition(), None);

        monitor.poll();
        assert_eq!(monitor.take_transition(), None);
    }

    #[test]
    fn test_unknown_code_keeps_previous_state() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut monitor) = setup(&tmp);

        fs::write(paths.runtime("Navigation_System"), "3").unwrap();
        monitor.poll();
        fs::write(paths.runtime("Navigation_System"), "7").unwrap();
        monitor.poll();

        assert_eq!(monitor.state(), NavState::Hold);
    }

    #[test]
    fn test_manual_values_follow_the_flag() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut monitor) = setup(&tmp);

        fs::write(paths.runtime("Manual_Control"), "1").unwrap();
        fs::write(paths.runtime("Manual_Control_Rudder"), "15").unwrap();
        fs::write(paths.runtime("Manual_Control_Sail"), "300").unwrap();
        monitor.poll();

        assert_eq!(
            monitor.manual(),
            ManualControl {
                active: true,
                rudder_deg: 15,
                sail_ticks: 300
            }
        );

        fs::write(paths.runtime("Manual_Control"), "0").unwrap();
        fs::write(paths.runtime("Manual_Control_Rudder"), "-20").unwrap();
        monitor.poll();

        // Values freeze while the override is off.
        assert!(!monitor.manual().active);
        assert_eq!(monitor.manual().rudder_deg, 15);
    }

    #[test]
    fn test_moved_target_rebases_the_start() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut monitor) = setup(&tmp);

        fs::write(paths.runtime("Point_End_Lat"), "55.61").unwrap();
        fs::write(paths.runtime("Point_End_Lon"), "13.02").unwrap();
        let target = monitor
            .read_target_point(GeoPoint::new(55.605, 13.0))
            .unwrap();

        assert_eq!(target, GeoPoint::new(55.61, 13.02));
        assert_eq!(
            fs::read_to_string(paths.runtime("Point_Start_Lat")).unwrap(),
            "55.605000"
        );
        assert_eq!(
            fs::read_to_string(paths.runtime("Point_Start_Lon")).unwrap(),
            "13.000000"
        );
    }

    #[test]
    fn test_unchanged_target_leaves_start_alone() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut monitor) = setup(&tmp);

        fs::write(paths.runtime("Point_End_Lat"), "55.61").unwrap();
        fs::write(paths.runtime("Point_End_Lon"), "13.02").unwrap();
        monitor
            .read_target_point(GeoPoint::new(55.605, 13.0))
            .unwrap();

        fs::remove_file(paths.runtime("Point_Start_Lat")).unwrap();
        monitor
            .read_target_point(GeoPoint::new(55.606, 13.001))
            .unwrap();

        assert!(!paths.runtime("Point_Start_Lat").exists());
    }

    #[test]
    fn test_own_end_write_is_not_a_change() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut monitor) = setup(&tmp);

        monitor.write_end(GeoPoint::new(55.62, 13.05)).unwrap();
        fs::remove_file(paths.runtime("Point_Start_Lat")).ok();

        monitor
            .read_target_point(GeoPoint::new(55.605, 13.0))
            .unwrap();

        assert!(!paths.runtime("Point_Start_Lat").exists());
    }

    #[test]
    fn test_request_goes_through_the_file() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut monitor) = setup(&tmp);

        monitor.request(NavState::Hold).unwrap();
        assert_eq!(
            fs::read_to_string(paths.runtime("Navigation_System")).unwrap(),
            "3"
        );
        // Not applied until the next poll.
        assert_eq!(monitor.state(), NavState::Idle);

        monitor.poll();
        assert_eq!(monitor.state(), NavState::Hold);
    }
}
