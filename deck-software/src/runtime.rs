//! The deck control loop.
//!
//! One tick every quarter second: poll the shore files, drive the helm or
//! obey the manual override, push the commands out, and append the log
//! row. The loop itself holds no control state beyond what it needs to
//! log; everything control-related lives in the helm.

use std::thread;
use std::time::Duration;

use anyhow::Context;
use helm::{ActuatorSink, Autopilot, HelmConfig, Leg, SensorSource};
use log::info;

use crate::actuators::{FileActuatorSink, TelemetryWriter};
use crate::external::ExternalTunables;
use crate::logbook::{LogRecord, Logbook};
use crate::navigation::{NavMonitor, NavState};
use crate::paths::PathLayout;
use crate::sensors::FileSensorSource;

pub struct Runtime {
    sensors: FileSensorSource,
    actuators: FileActuatorSink,
    telemetry: TelemetryWriter,
    external: ExternalTunables,
    nav: NavMonitor,
    logbook: Logbook,
    pilot: Autopilot,
    tick: Duration,
    rudder_command_deg: i32,
    sail_command_ticks: i32,
    guidance_heading_deg: f64,
}

impl Runtime {
    /// Bootstrap the file layout and take the first snapshot.
    ///
    /// Fails when the instrument stack is not up yet; a daemon that
    /// cannot see its sensors has nothing useful to do.
    pub fn new(config: HelmConfig, paths: PathLayout, tick: Duration) -> anyhow::Result<Self> {
        paths.bootstrap().context("bootstrapping runtime directories")?;
        let mut sensors = FileSensorSource::new(paths.clone());
        sensors.read_snapshot().context("initial sensor read")?;
        Ok(Self {
            actuators: FileActuatorSink::new(paths.clone()),
            telemetry: TelemetryWriter::new(paths.clone()),
            external: ExternalTunables::new(paths.clone()),
            nav: NavMonitor::new(paths.clone()),
            logbook: Logbook::new(paths.log_dir.clone()),
            pilot: Autopilot::new(config),
            sensors,
            tick,
            rudder_command_deg: 0,
            sail_command_ticks: 0,
            guidance_heading_deg: 0.0,
        })
    }

    pub fn nav_state(&self) -> NavState {
        self.nav.state()
    }

    pub fn pilot(&self) -> &Autopilot {
        &self.pilot
    }

    /// Run until killed.
    pub fn run(&mut self) -> anyhow::Result<()> {
        info!("deck control loop running");
        loop {
            self.step()?;
            thread::sleep(self.tick);
        }
    }

    /// One control tick.
    pub fn step(&mut self) -> anyhow::Result<()> {
        self.nav.poll();
        if let Some(state) = self.nav.take_transition() {
            info!("navigation state -> {state:?}");
            self.on_nav_change(state)?;
        }

        let manual = self.nav.manual();
        if manual.active {
            self.actuators.set_rudder(manual.rudder_deg)?;
            self.actuators.set_sail(manual.sail_ticks)?;
            self.rudder_command_deg = manual.rudder_deg;
            self.sail_command_ticks = manual.sail_ticks;
            self.sensors.read_essential();
        } else if matches!(self.nav.state(), NavState::Sail | NavState::Hold) {
            let snapshot = self.sensors.read_snapshot().context("sensor read")?;
            self.external.poll(&mut self.pilot);

            let command = self.pilot.tick(&snapshot);
            self.actuators.set_rudder(command.rudder_deg)?;
            if let Some(ticks) = command.sail_ticks {
                self.actuators.set_sail(ticks)?;
            }
            self.telemetry
                .publish(&command)
                .context("publishing telemetry")?;
            self.rudder_command_deg = command.rudder_deg;
            self.sail_command_ticks = command.sail_target_ticks;
            self.guidance_heading_deg = command.target_bearing_deg;

            if self.nav.state() == NavState::Sail && self.pilot.reached_target(snapshot.position) {
                info!("target reached, holding position");
                self.nav.request(NavState::Hold)?;
            }
        } else {
            self.sensors.read_essential();
        }

        self.logbook
            .append(&self.log_record())
            .context("appending log row")?;
        Ok(())
    }

    /// React to a navigation state change with a fresh fix.
    fn on_nav_change(&mut self, state: NavState) -> anyhow::Result<()> {
        let snapshot = self.sensors.read_snapshot().context("sensor read")?;
        match state {
            NavState::Idle => {}
            NavState::Sail => {
                let target = self.nav.read_target_point(snapshot.position)?;
                self.nav.write_start(snapshot.position)?;
                self.pilot.set_leg(Leg {
                    start: snapshot.position,
                    target,
                });
            }
            NavState::Hold => {
                // Hold means sail to where the boat is right now.
                self.nav.write_end(snapshot.position)?;
                self.pilot.set_leg(Leg {
                    start: self.pilot.leg().start,
                    target: snapshot.position,
                });
            }
            NavState::Route => {
                // Route planning was retired; a route request just sails.
                self.nav.request(NavState::Sail)?;
            }
        }
        Ok(())
    }

    fn log_record(&self) -> LogRecord {
        let snapshot = self.sensors.last();
        let manual = self.nav.manual();
        let leg = self.pilot.leg();
        LogRecord {
            nav_code: self.nav.state().code(),
            manual: manual.active,
            guidance_heading_deg: self.guidance_heading_deg,
            manual_rudder_deg: manual.rudder_deg,
            rudder_command_deg: self.rudder_command_deg,
            rudder_feedback_deg: snapshot.rudder_feedback_deg,
            manual_sail_ticks: manual.sail_ticks,
            sail_command_ticks: self.sail_command_ticks,
            sail_feedback_ticks: snapshot.sail_feedback_ticks,
            rate_deg_s: snapshot.rate_deg_s,
            heading_deg: snapshot.heading_deg,
            pitch_deg: snapshot.pitch_deg,
            roll_deg: snapshot.roll_deg,
            latitude: snapshot.position.lat,
            longitude: snapshot.position.lon,
            cog_deg: snapshot.cog_deg,
            sog_ms: snapshot.sog_ms,
            wind_speed_ms: snapshot.wind_speed_ms,
            wind_angle_deg: snapshot.wind_angle_deg,
            start_lat: leg.start.lat,
            start_lon: leg.start.lon,
            end_lat: leg.target.lat,
            end_lon: leg.target.lon,
        }
    }
}
