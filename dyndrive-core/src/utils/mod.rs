//! Utility re-exports for the drivetrain core.
//!
//! - `connection`: best-effort telemetry publishing
//! - `controllers`: axis sources, motor handles, the drivetrain controller and
//!   its cycle-driven drive loop
//! - `drive`: topologies, styles, the style resolver and the drivetrain factory
//! - `math`: pure kinematics functions for every supported topology

pub mod connection;
pub mod controllers;
pub mod drive;
pub mod math;

pub use connection::telemetry::{NoTelemetry, Telemetry};
pub use controllers::{
    AxisId, AxisSource, DriveCommand, DriveError, DriveLoop, DrivetrainController, MotorHandle,
    DRIVE_CHANNEL,
};
pub use drive::{
    ConfigurationError, DriveConfig, DriveStyle, DriveStyleResolver, Drivetrain,
    DrivetrainFactory, Topology, UnsupportedCombinationError,
};
pub use embassy_time::Duration;
pub use math::kinematics as kl;
