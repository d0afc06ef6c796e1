//! Drivetrain topologies, driving styles and their runtime binding.
//!
//! - `config`: serde-loadable tuning and binding overrides
//! - `drivetrain`: motor roles, the validated `Drivetrain` and its factory
//! - `resolver`: the (topology, style) → kinematics + axis binding table

pub mod config;
pub mod drivetrain;
pub mod resolver;

use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use config::{AxisOverride, DriveConfig};
pub use drivetrain::{Drivetrain, DrivetrainFactory, MotorRole};
pub use resolver::{AxisBinding, DriveBinding, DriveStyleResolver, Kinematics};

/// Physical wheel/motor arrangement of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Two sides driven independently (skid steer / tank tracks).
    Differential,
    /// Four mecanum wheels.
    Mecanum,
    /// Three omni wheels at 120° offsets.
    Killough,
}

impl Topology {
    pub const ALL: [Topology; 3] = [Topology::Differential, Topology::Mecanum, Topology::Killough];

    /// Motor roles required by this topology, in command-vector order.
    pub const fn roles(self) -> &'static [MotorRole] {
        match self {
            Topology::Differential => &[MotorRole::LEFT, MotorRole::RIGHT],
            Topology::Mecanum => &[
                MotorRole::FRONT_LEFT,
                MotorRole::FRONT_RIGHT,
                MotorRole::REAR_LEFT,
                MotorRole::REAR_RIGHT,
            ],
            Topology::Killough => &[MotorRole::LEFT, MotorRole::RIGHT, MotorRole::BACK],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Topology::Differential => "differential",
            Topology::Mecanum => "mecanum",
            Topology::Killough => "killough",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Topology {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topology::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownName("topology"))
    }
}

/// How operator input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveStyle {
    Arcade,
    Tank,
    Curvature,
    Cartesian,
    Polar,
}

impl DriveStyle {
    pub const ALL: [DriveStyle; 5] = [
        DriveStyle::Arcade,
        DriveStyle::Tank,
        DriveStyle::Curvature,
        DriveStyle::Cartesian,
        DriveStyle::Polar,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DriveStyle::Arcade => "arcade",
            DriveStyle::Tank => "tank",
            DriveStyle::Curvature => "curvature",
            DriveStyle::Cartesian => "cartesian",
            DriveStyle::Polar => "polar",
        }
    }
}

impl fmt::Display for DriveStyle {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DriveStyle {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DriveStyle::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownName("drive style"))
    }
}

/// A topology or style name did not match any known variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownName(pub &'static str);

impl fmt::Display for UnknownName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "unknown {} name", self.0)
    }
}

impl core::error::Error for UnknownName {}

/// Errors that abort drivetrain or resolver construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A motor role required by the topology was not supplied.
    MissingRole { topology: Topology, role: MotorRole },
    /// An axis override has the wrong number of axes for its kinematics.
    InvalidBinding {
        topology: Topology,
        style: DriveStyle,
        expected: usize,
        found: usize,
    },
    /// An axis override names a pair the resolver does not support.
    UnsupportedOverride { topology: Topology, style: DriveStyle },
    /// The control period is zero milliseconds.
    ZeroPeriod,
}

impl fmt::Display for ConfigurationError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConfigurationError::MissingRole { topology, role } => {
                write!(f, "{} drivetrain is missing motor role \"{}\"", topology, role)
            }
            ConfigurationError::InvalidBinding {
                topology,
                style,
                expected,
                found,
            } => write!(
                f,
                "{} {} binding needs {} axes, got {}",
                topology, style, expected, found
            ),
            ConfigurationError::UnsupportedOverride { topology, style } => {
                write!(f, "cannot override {} drive on a {} drivetrain", style, topology)
            }
            ConfigurationError::ZeroPeriod => f.write_str("control period must be at least 1 ms"),
        }
    }
}

impl core::error::Error for ConfigurationError {}

/// The requested style has no kinematics for the drivetrain's topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedCombinationError {
    pub topology: Topology,
    pub style: DriveStyle,
}

impl fmt::Display for UnsupportedCombinationError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} drive is not supported on a {} drivetrain", self.style, self.topology)
    }
}

impl core::error::Error for UnsupportedCombinationError {}
