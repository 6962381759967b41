//! Shore-adjustable tuning files.
//!
//! Eleven `ext_*` files let the shore side retune the helm while it runs.
//! A value is applied only when its file contents change since the last
//! poll; an unchanged file never overrides the live value, so tuning the
//! helm through other channels survives the polling.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use helm::{Autopilot, HeadingMode, SailMode};
use log::{debug, warn};

use crate::paths::{read_value, PathLayout};

/// Last observed contents of each tuning file.
#[derive(Debug, Clone, Copy)]
struct TuningFiles {
    heading_state: i32,
    sail_state: i32,
    steptime: u32,
    stepsize: f64,
    des_slope: f64,
    v_los: f64,
    dir: i32,
    dir_init: f64,
    des_heading: f64,
    sail_stepsize: f64,
    act_pos: i32,
}

impl Default for TuningFiles {
    fn default() -> Self {
        Self {
            heading_state: 0,
            sail_state: 0,
            steptime: 0,
            // Matches the live default, so a freshly seeded file holding
            // the stock step size is not treated as a change.
            stepsize: 10.0,
            des_slope: 0.0,
            v_los: 0.0,
            dir: 0,
            dir_init: 0.0,
            des_heading: 0.0,
            sail_stepsize: 0.0,
            act_pos: 0,
        }
    }
}

/// Polls the tuning files and applies changed values to the helm.
pub struct ExternalTunables {
    paths: PathLayout,
    last: TuningFiles,
}

impl ExternalTunables {
    pub fn new(paths: PathLayout) -> Self {
        Self {
            paths,
            last: TuningFiles::default(),
        }
    }

    /// Re-read every tuning file and push the changed ones into the helm.
    pub fn poll(&mut self, pilot: &mut Autopilot) {
        if let Some(code) = read_value::<i32>(&self.paths.runtime("ext_heading_state")) {
            if code != self.last.heading_state {
                self.last.heading_state = code;
                match HeadingMode::try_from(code) {
                    Ok(mode) => pilot.set_heading_mode(mode),
                    Err(err) => warn!("ignoring shore request: {err}"),
                }
            }
        }
        if let Some(code) = read_value::<i32>(&self.paths.runtime("ext_sail_state")) {
            if code != self.last.sail_state {
                self.last.sail_state = code;
                match SailMode::try_from(code) {
                    Ok(mode) => pilot.set_sail_mode(mode),
                    Err(err) => warn!("ignoring shore request: {err}"),
                }
            }
        }

        let mut tunables = pilot.tunables();
        apply_changed(
            &self.paths.runtime("ext_steptime"),
            "ext_steptime",
            &mut self.last.steptime,
            &mut tunables.steptime_s,
        );
        apply_changed(
            &self.paths.runtime("ext_stepsize"),
            "ext_stepsize",
            &mut self.last.stepsize,
            &mut tunables.heading_step_deg,
        );
        apply_changed(
            &self.paths.runtime("ext_des_slope"),
            "ext_des_slope",
            &mut self.last.des_slope,
            &mut tunables.target_slope,
        );
        apply_changed(
            &self.paths.runtime("ext_vLOS"),
            "ext_vLOS",
            &mut self.last.v_los,
            &mut tunables.reference_bearing_deg,
        );
        apply_changed(
            &self.paths.runtime("ext_DIR"),
            "ext_DIR",
            &mut self.last.dir,
            &mut tunables.step_direction,
        );
        apply_changed(
            &self.paths.runtime("ext_DIR_init"),
            "ext_DIR_init",
            &mut self.last.dir_init,
            &mut tunables.heading_seed_deg,
        );
        apply_changed(
            &self.paths.runtime("ext_des_heading"),
            "ext_des_heading",
            &mut self.last.des_heading,
            &mut tunables.fixed_bearing_deg,
        );
        apply_changed(
            &self.paths.runtime("ext_sail_stepsize"),
            "ext_sail_stepsize",
            &mut self.last.sail_stepsize,
            &mut tunables.sail_step_deg,
        );
        apply_changed(
            &self.paths.runtime("ext_act_pos"),
            "ext_act_pos",
            &mut self.last.act_pos,
            &mut tunables.sail_position_ticks,
        );
        pilot.apply_tunables(tunables);
    }
}

/// Apply a file's value to a tunable slot, but only when the file changed.
fn apply_changed<T>(path: &Path, name: &str, last: &mut T, slot: &mut T)
where
    T: FromStr + PartialEq + Copy + Display,
{
    if let Some(value) = read_value::<T>(path) {
        if value != *last {
            *last = value;
            *slot = value;
            debug!("shore tuning {name} -> {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use helm::HelmConfig;
    use tempfile::TempDir;

    fn setup(tmp: &TempDir) -> (PathLayout, ExternalTunables, Autopilot) {
        let paths = PathLayout::new(
            tmp.path().join("sailboat"),
            tmp.path().join("u200"),
            tmp.path().join("log"),
        );
        fs::create_dir_all(&paths.runtime_dir).unwrap();
        let external = ExternalTunables::new(paths.clone());
        let pilot = Autopilot::new(HelmConfig::default());
        (paths, external, pilot)
    }

    #[test]
    fn test_missing_files_change_nothing() {
        let tmp = TempDir::new().unwrap();
        let (_paths, mut external, mut pilot) = setup(&tmp);
        let before = pilot.tunables();

        external.poll(&mut pilot);

        assert_eq!(pilot.tunables(), before);
        assert_eq!(pilot.heading_mode(), HeadingMode::Guidance);
    }

    #[test]
    fn test_changed_value_is_applied() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut external, mut pilot) = setup(&tmp);

        fs::write(paths.runtime("ext_stepsize"), "25").unwrap();
        fs::write(paths.runtime("ext_act_pos"), "350").unwrap();
        external.poll(&mut pilot);

        assert_eq!(pilot.tunables().heading_step_deg, 25.0);
        assert_eq!(pilot.tunables().sail_position_ticks, 350);
    }

    #[test]
    fn test_stock_stepsize_is_not_a_change() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut external, mut pilot) = setup(&tmp);

        let mut tunables = pilot.tunables();
        tunables.heading_step_deg = 40.0;
        pilot.apply_tunables(tunables);

        fs::write(paths.runtime("ext_stepsize"), "10").unwrap();
        external.poll(&mut pilot);

        assert_eq!(pilot.tunables().heading_step_deg, 40.0);
    }

    #[test]
    fn test_unchanged_file_does_not_override_live_value() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut external, mut pilot) = setup(&tmp);

        fs::write(paths.runtime("ext_steptime"), "60").unwrap();
        external.poll(&mut pilot);
        assert_eq!(pilot.tunables().steptime_s, 60);

        let mut tunables = pilot.tunables();
        tunables.steptime_s = 45;
        pilot.apply_tunables(tunables);

        external.poll(&mut pilot);
        assert_eq!(pilot.tunables().steptime_s, 45);
    }

    #[test]
    fn test_mode_codes_select_modes() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut external, mut pilot) = setup(&tmp);

        fs::write(paths.runtime("ext_heading_state"), "4").unwrap();
        fs::write(paths.runtime("ext_sail_state"), "2").unwrap();
        external.poll(&mut pilot);

        assert_eq!(pilot.heading_mode(), HeadingMode::StepSequence);
        assert_eq!(pilot.sail_mode(), SailMode::Climb);
    }

    #[test]
    fn test_unknown_mode_code_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let (paths, mut external, mut pilot) = setup(&tmp);

        fs::write(paths.runtime("ext_heading_state"), "9").unwrap();
        external.poll(&mut pilot);

        assert_eq!(pilot.heading_mode(), HeadingMode::Guidance);
    }
}
