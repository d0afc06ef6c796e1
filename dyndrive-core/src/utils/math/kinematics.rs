//! Kinematics library for differential, mecanum and killough drivetrains.
//!
//! Every function is pure and total: inputs are expected to be already clamped
//! to `[-1.0, 1.0]` by the axis-read boundary, and outputs are per-motor
//! speeds in the role order of the matching topology.
//!
//! # Example
//! ```rust
//! use dyndrive_core::utils::math::kinematics::{arcade, mecanum_cartesian};
//! let [left, right] = arcade(1.0, 0.0);
//! assert_eq!((left, right), (1.0, 1.0));
//! let wheels = mecanum_cartesian(0.0, 0.0, 0.0);
//! assert_eq!(wheels, [0.0; 4]);
//! ```
use core::f32::consts::PI;

use heapless::Vec;
use libm;
use serde::{Deserialize, Serialize};

/// Largest number of motors any supported topology drives.
pub const MAX_MOTORS: usize = 4;

/// Per-motor speeds in topology role order, produced once per cycle.
pub type MotorCommand = Vec<f32, MAX_MOTORS>;

/// Outputs smaller than this are treated as zero.
const EPSILON: f32 = 1e-6;

/// Clamp an axis reading to `[-1.0, 1.0]`. Non-finite readings become `0.0`.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn clamp_small(v: f32) -> f32 {
    if v.abs() < EPSILON {
        0.0
    } else {
        v
    }
}

/// Scale every speed down by the largest magnitude if it exceeds `1.0`.
///
/// Ratios between motors are preserved; speeds are never clipped one by one.
pub fn normalize(speeds: &mut [f32]) {
    let max = speeds.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if max > 1.0 {
        for s in speeds.iter_mut() {
            *s /= max;
        }
    }
}

/// Convert a polar command to `(y_speed, x_speed)`.
///
/// `angle` is in degrees, 0° = straight ahead, increasing clockwise.
pub fn polar_to_cartesian(
    magnitude: f32,
    angle: f32,
) -> (f32, f32) {
    let a = angle * (PI / 180.0);
    (magnitude * libm::sinf(a), magnitude * libm::cosf(a))
}

/// Arcade drive: one axis sets forward speed, the other rotation.
///
/// Returns `[left, right]`.
pub fn arcade(
    speed: f32,
    rotation: f32,
) -> [f32; 2] {
    [
        (speed + rotation).clamp(-1.0, 1.0),
        (speed - rotation).clamp(-1.0, 1.0),
    ]
}

/// Tank drive: left and right sides are commanded directly.
///
/// Returns `[left, right]`.
pub fn tank(
    left: f32,
    right: f32,
) -> [f32; 2] {
    [left.clamp(-1.0, 1.0), right.clamp(-1.0, 1.0)]
}

/// Curvature ("cheesy") drive.
///
/// Without quick turn the rotation is scaled by `|speed|`, so the robot cannot
/// turn in place. With quick turn the rotation is applied directly.
///
/// Returns `[left, right]`.
pub fn curvature(
    speed: f32,
    rotation: f32,
    quick_turn: bool,
) -> [f32; 2] {
    let angular = if quick_turn {
        rotation
    } else {
        speed.abs() * rotation
    };
    arcade(speed, angular)
}

/// Mecanum drive from independent translation and rotation.
///
/// `y_speed` is strafe (right positive), `x_speed` is forward. Returns
/// `[front_left, front_right, rear_left, rear_right]`, normalized.
pub fn mecanum_cartesian(
    y_speed: f32,
    x_speed: f32,
    z_rotation: f32,
) -> [f32; 4] {
    let mut wheels = [
        y_speed + x_speed + z_rotation,
        -y_speed + x_speed - z_rotation,
        -y_speed + x_speed + z_rotation,
        y_speed + x_speed - z_rotation,
    ];
    normalize(&mut wheels);
    wheels.map(clamp_small)
}

/// Mecanum drive from a polar translation (`angle` in degrees) and rotation.
pub fn mecanum_polar(
    magnitude: f32,
    angle: f32,
    z_rotation: f32,
) -> [f32; 4] {
    let (y, x) = polar_to_cartesian(magnitude, angle);
    mecanum_cartesian(y, x, z_rotation)
}

/// Wheel layout of a three-wheeled killough drivetrain.
///
/// Each angle (degrees) is the direction of the wheel's drive vector in the
/// robot frame, 0° = +Y (strafe right), increasing toward +X (forward). The
/// default wheels sit 120° apart, so a pure translation sums to zero and
/// never yaws the robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KilloughWheels {
    pub left: f32,
    pub right: f32,
    pub back: f32,
}

impl Default for KilloughWheels {
    fn default() -> Self {
        Self {
            left: 60.0,
            right: 300.0,
            back: 180.0,
        }
    }
}

impl KilloughWheels {
    /// Build the matrix J such that `wheels = J * [y, x, z]`.
    pub fn construct_jacobian(&self) -> [[f32; 3]; 3] {
        let mut j = [[0.0; 3]; 3];
        for (i, &t) in [self.left, self.right, self.back].iter().enumerate() {
            let t = t * (PI / 180.0);
            j[i][0] = libm::cosf(t);
            j[i][1] = libm::sinf(t);
            j[i][2] = 1.0;
        }
        j
    }

    /// Killough drive from independent translation and rotation.
    ///
    /// Returns `[left, right, back]`, normalized.
    pub fn cartesian(
        &self,
        y_speed: f32,
        x_speed: f32,
        z_rotation: f32,
    ) -> [f32; 3] {
        let v = [y_speed, x_speed, z_rotation];
        let j = self.construct_jacobian();
        let mut wheels = [0.0; 3];
        for i in 0..3 {
            wheels[i] = j[i][0] * v[0] + j[i][1] * v[1] + j[i][2] * v[2];
        }
        normalize(&mut wheels);
        wheels.map(clamp_small)
    }

    /// Killough drive from a polar translation (`angle` in degrees) and rotation.
    pub fn polar(
        &self,
        magnitude: f32,
        angle: f32,
        z_rotation: f32,
    ) -> [f32; 3] {
        let (y, x) = polar_to_cartesian(magnitude, angle);
        self.cartesian(y, x, z_rotation)
    }
}
