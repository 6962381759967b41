//! Deck-side runtime for the autonomous sailboat.
//!
//! The [`helm`] crate makes the control decisions; this crate wires it to
//! the boat. Sensors, actuators, shore tooling, and the GUI all meet in
//! two directories of single-value text files, and the daemon in
//! [`runtime`] walks them once per tick.

pub mod actuators;
pub mod external;
pub mod logbook;
pub mod navigation;
pub mod paths;
pub mod runtime;
pub mod sensors;

pub use actuators::{FileActuatorSink, TelemetryWriter};
pub use external::ExternalTunables;
pub use logbook::{LogRecord, Logbook};
pub use navigation::{ManualControl, NavMonitor, NavState};
pub use paths::PathLayout;
pub use runtime::Runtime;
pub use sensors::FileSensorSource;
