//! Voyage log.
//!
//! One CSV row per control tick, across every navigation state, so a
//! voyage can be replayed from the log alone. Files rotate on a row limit
//! and the `current_logfile` pointer always names the file being written,
//! for shore tools that tail the live log.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{Local, Utc};

/// Rows written to one file before rotating to a fresh one.
const MAX_LOG_LINES: u32 = 30_000;

const HEADER: &str = "MCU_timestamp,Navigation_System,Manual_Control,Guidance_Heading,\
Manual_Ctrl_Rudder,Rudder_Desired_Angle,Rudder_Feedback,Manual_Ctrl_Sail,\
Sail_Desired_Pos,Sail_Feedback,Rate,Heading,Pitch,Roll,Latitude,Longitude,\
COG,SOG,Wind_Speed,Wind_Angle,Point_Start_Lat,Point_Start_Lon,Point_End_Lat,Point_End_Lon";

/// One row of the voyage log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRecord {
    pub nav_code: i32,
    pub manual: bool,
    pub guidance_heading_deg: f64,
    pub manual_rudder_deg: i32,
    pub rudder_command_deg: i32,
    pub rudder_feedback_deg: i32,
    pub manual_sail_ticks: i32,
    pub sail_command_ticks: i32,
    pub sail_feedback_ticks: i32,
    pub rate_deg_s: f64,
    pub heading_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub cog_deg: f64,
    pub sog_ms: f64,
    pub wind_speed_ms: f64,
    pub wind_angle_deg: f64,
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
}

/// Appends log rows, rotating files and republishing the pointer.
pub struct Logbook {
    dir: PathBuf,
    current: PathBuf,
    entries: u32,
}

impl Logbook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: PathBuf::new(),
            entries: 0,
        }
    }

    /// Append one row, rotating to a new file first when due.
    pub fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        if self.entries == 0 || self.entries >= MAX_LOG_LINES {
            self.rotate()?;
        }
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.current)?;
        writeln!(file, "{}", format_line(Utc::now().timestamp(), record))?;
        self.entries += 1;
        Ok(())
    }

    /// Start a new log file and point `current_logfile` at it.
    ///
    /// The file number continues from however many files already sit in
    /// the log directory, so restarts never overwrite an older log.
    fn rotate(&mut self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let pointer = self.dir.join("current_logfile");
        // Tailers see "init" while the new name is being chosen.
        fs::write(&pointer, "init")?;

        let count = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .count();
        let stamp = Local::now().format("%Y%m%d_%H%M");
        let name = format!("logfile_{count:04}_{stamp}");
        fs::write(&pointer, &name)?;

        self.current = self.dir.join(&name);
        fs::write(&self.current, format!("{HEADER}\n"))?;
        self.entries = 1;
        Ok(())
    }
}

fn format_line(timestamp: i64, r: &LogRecord) -> String {
    format!(
        "{},{},{},{:.1},{},{},{},{},{},{},{:.4},{:.4},{:.4},{:.4},{:.6},{:.6},{:.1},{:.3},{:.2},{:.2},{:.6},{:.6},{:.6},{:.6}",
        timestamp,
        r.nav_code,
        r.manual as i32,
        r.guidance_heading_deg,
        r.manual_rudder_deg,
        r.rudder_command_deg,
        r.rudder_feedback_deg,
        r.manual_sail_ticks,
        r.sail_command_ticks,
        r.sail_feedback_ticks,
        r.rate_deg_s,
        r.heading_deg,
        r.pitch_deg,
        r.roll_deg,
        r.latitude,
        r.longitude,
        r.cog_deg,
        r.sog_ms,
        r.wind_speed_ms,
        r.wind_angle_deg,
        r.start_lat,
        r.start_lon,
        r.end_lat,
        r.end_lon,
    )
}
