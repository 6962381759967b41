//! Filesystem layout of the deck runtime.
//!
//! Everything the daemon exchanges with shore tooling and the instrument
//! drivers goes through small plain-text files, one value per file,
//! rewritten in place. [`PathLayout`] names the directories involved and
//! seeds the control files a fresh boat needs before the first tick.

use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Control files seeded with zero when absent, so shore tooling and the
/// daemon always find something to read.
const SEEDED_RUNTIME_FILES: &[&str] = &[
    "Navigation_System",
    "Navigation_System_Rudder",
    "Navigation_System_Sail",
    "Manual_Control",
    "Manual_Control_Rudder",
    "Manual_Control_Sail",
    "Point_Start_Lat",
    "Point_Start_Lon",
    "Point_End_Lat",
    "Point_End_Lon",
    "Guidance_Heading",
    "Rudder_Feedback",
    "Sail_Feedback",
    "boundaries",
];

/// Where the deck process reads and writes its file-backed interfaces.
#[derive(Debug, Clone)]
pub struct PathLayout {
    /// Control and telemetry files shared with shore tooling.
    pub runtime_dir: PathBuf,
    /// Sensor feed files maintained by the instrument drivers.
    pub sensor_dir: PathBuf,
    /// Voyage log directory.
    pub log_dir: PathBuf,
}

impl Default for PathLayout {
    fn default() -> Self {
        Self {
            runtime_dir: PathBuf::from("/tmp/sailboat"),
            sensor_dir: PathBuf::from("/tmp/u200"),
            log_dir: PathBuf::from("sailboat-log"),
        }
    }
}

impl PathLayout {
    pub fn new(
        runtime_dir: impl Into<PathBuf>,
        sensor_dir: impl Into<PathBuf>,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
            sensor_dir: sensor_dir.into(),
            log_dir: log_dir.into(),
        }
    }

    /// Path of a control or telemetry file under the runtime directory.
    pub fn runtime(&self, name: &str) -> PathBuf {
        self.runtime_dir.join(name)
    }

    /// Path of a sensor feed file.
    pub fn sensor(&self, name: &str) -> PathBuf {
        self.sensor_dir.join(name)
    }

    /// Create the runtime and log directories and seed any missing control
    /// files with zero.
    ///
    /// Existing files keep their contents, so a daemon restart does not
    /// discard what the shore side last commanded. The sensor directory
    /// belongs to the instrument drivers and is left alone.
    pub fn bootstrap(&self) -> io::Result<()> {
        fs::create_dir_all(&self.runtime_dir)?;
        fs::create_dir_all(&self.log_dir)?;
        for name in SEEDED_RUNTIME_FILES {
            let path = self.runtime(name);
            if !path.exists() {
                write_value(&path, 0)?;
            }
        }
        Ok(())
    }
}

/// Read a single whitespace-trimmed value from a file.
///
/// Returns `None` when the file is missing or does not parse; callers keep
/// their previous value in that case.
pub fn read_value<T: FromStr>(path: &Path) -> Option<T> {
    let text = fs::read_to_string(path).ok()?;
    text.trim().parse().ok()
}

/// Replace a file's contents with a single value.
pub fn write_value(path: &Path, value: impl Display) -> io::Result<()> {
    fs::write(path, value.to_string())
}
