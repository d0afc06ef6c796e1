//! Drive configuration loaded once at startup.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "quick_turn": true,
//!   "killough_wheels": { "left": 60.0, "right": 300.0, "back": 180.0 },
//!   "max_output": 1.0,
//!   "period_ms": 20,
//!   "axis_overrides": [
//!     { "topology": "mecanum", "style": "polar", "axes": ["left_x", "left_y", "right_x"] }
//!   ]
//! }
//! ```

use alloc::vec::Vec;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use super::{ConfigurationError, DriveStyle, Topology};
use crate::utils::{controllers::AxisId, math::kinematics::KilloughWheels};

/// Replaces the default axis order of one (topology, style) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisOverride {
    pub topology: Topology,
    pub style: DriveStyle,
    pub axes: Vec<AxisId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Curvature drive may turn in place.
    pub quick_turn: bool,
    /// Wheel drive-vector angles of a killough drivetrain.
    pub killough_wheels: KilloughWheels,
    /// Scale applied to every motor command, `[0.0, 1.0]`.
    pub max_output: f32,
    /// Control cycle period in milliseconds.
    pub period_ms: u64,
    pub axis_overrides: Vec<AxisOverride>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            quick_turn: true,
            killough_wheels: KilloughWheels::default(),
            max_output: 1.0,
            period_ms: 20,
            axis_overrides: Vec::new(),
        }
    }
}

impl DriveConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Reject values the drive loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.period_ms == 0 {
            return Err(ConfigurationError::ZeroPeriod);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(DriveConfig::from_json("{}").unwrap(), DriveConfig::default());
    }

    #[test]
    fn parses_overrides() {
        let cfg = DriveConfig::from_json(
            r#"{
                "quick_turn": false,
                "max_output": 0.5,
                "killough_wheels": { "back": 240.0 },
                "axis_overrides": [
                    { "topology": "differential", "style": "tank", "axes": ["left_y", "right_y"] }
                ]
            }"#,
        )
        .unwrap();

        assert!(!cfg.quick_turn);
        assert_eq!(cfg.max_output, 0.5);
        assert_eq!(cfg.period(), Duration::from_millis(20));
        assert_eq!(cfg.killough_wheels.left, 60.0);
        assert_eq!(cfg.killough_wheels.back, 240.0);
        assert_eq!(cfg.axis_overrides.len(), 1);
        assert_eq!(cfg.axis_overrides[0].axes, [AxisId::LeftY, AxisId::RightY]);
    }

    #[test]
    fn zero_period_is_rejected() {
        let cfg = DriveConfig::from_json(r#"{ "period_ms": 0 }"#).unwrap();
        assert_eq!(cfg.validate(), Err(ConfigurationError::ZeroPeriod));
        assert_eq!(DriveConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_unknown_style() {
        assert!(DriveConfig::from_json(
            r#"{ "axis_overrides": [ { "topology": "mecanum", "style": "swerve", "axes": [] } ] }"#
        )
        .is_err());
    }
}
