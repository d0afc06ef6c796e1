//! Static dispatch table from (topology, style) to kinematics and axis binding.
//!
//! The table is built once from a [`DriveConfig`] and never changes afterwards,
//! so resolving the same pair always yields an identical binding.

use heapless::Vec;

use super::{ConfigurationError, DriveConfig, DriveStyle, Topology, UnsupportedCombinationError};
use crate::utils::{
    controllers::AxisId,
    math::kinematics::{self as kl, KilloughWheels, MotorCommand},
};

/// Most axes any kinematics function consumes.
pub const MAX_AXES: usize = 3;

/// Number of supported (topology, style) pairs.
const TABLE_SIZE: usize = 7;

/// A normalized polar-angle axis spans this many degrees either side of zero.
pub const POLAR_ANGLE_RANGE_DEG: f32 = 180.0;

/// Ordered axes read from the axis source; slot `i` feeds parameter `i` of the
/// bound kinematics function.
pub type AxisBinding = Vec<AxisId, MAX_AXES>;

/// Identifier of a kinematics function together with its fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kinematics {
    /// Slots: `[rotation, speed]`.
    Arcade,
    /// Slots: `[right, left]`.
    Tank,
    /// Slots: `[rotation, speed]`.
    Curvature { quick_turn: bool },
    /// Slots: `[y_speed, x_speed, z_rotation]`.
    MecanumCartesian,
    /// Slots: `[magnitude, angle, z_rotation]`.
    MecanumPolar,
    /// Slots: `[y_speed, x_speed, z_rotation]`.
    KilloughCartesian(KilloughWheels),
    /// Slots: `[magnitude, angle, z_rotation]`.
    KilloughPolar(KilloughWheels),
}

impl Kinematics {
    /// Number of axis values consumed.
    pub const fn arity(&self) -> usize {
        match self {
            Kinematics::Arcade | Kinematics::Tank | Kinematics::Curvature { .. } => 2,
            _ => 3,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Kinematics::Arcade => "arcade",
            Kinematics::Tank => "tank",
            Kinematics::Curvature { .. } => "curvature",
            Kinematics::MecanumCartesian => "mecanum_cartesian",
            Kinematics::MecanumPolar => "mecanum_polar",
            Kinematics::KilloughCartesian(_) => "killough_cartesian",
            Kinematics::KilloughPolar(_) => "killough_polar",
        }
    }

    /// Evaluate against axis values given in binding order.
    ///
    /// Only called with bindings the resolver validated against
    /// [`arity`](Self::arity).
    pub(crate) fn evaluate(
        &self,
        axes: &[f32],
    ) -> MotorCommand {
        debug_assert_eq!(axes.len(), self.arity());
        let a = |i: usize| axes.get(i).copied().unwrap_or(0.0);
        let angle = |i: usize| a(i) * POLAR_ANGLE_RANGE_DEG;
        match *self {
            Kinematics::Arcade => kl::arcade(a(1), a(0)).into_iter().collect(),
            Kinematics::Tank => kl::tank(a(1), a(0)).into_iter().collect(),
            Kinematics::Curvature { quick_turn } => {
                kl::curvature(a(1), a(0), quick_turn).into_iter().collect()
            }
            Kinematics::MecanumCartesian => {
                kl::mecanum_cartesian(a(0), a(1), a(2)).into_iter().collect()
            }
            Kinematics::MecanumPolar => kl::mecanum_polar(a(0), angle(1), a(2)).into_iter().collect(),
            Kinematics::KilloughCartesian(wheels) => {
                wheels.cartesian(a(0), a(1), a(2)).into_iter().collect()
            }
            Kinematics::KilloughPolar(wheels) => {
                wheels.polar(a(0), angle(1), a(2)).into_iter().collect()
            }
        }
    }
}

/// Everything `drive` needs for one (topology, style) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveBinding {
    pub kinematics: Kinematics,
    pub axes: AxisBinding,
}

/// Default axis order of every supported pair.
const fn default_axes(
    topology: Topology,
    style: DriveStyle,
) -> Option<&'static [AxisId]> {
    use AxisId::*;
    match (topology, style) {
        (Topology::Differential, DriveStyle::Arcade) => Some(&[RightX, LeftY]),
        (Topology::Differential, DriveStyle::Tank) => Some(&[RightY, LeftY]),
        (Topology::Differential, DriveStyle::Curvature) => Some(&[RightX, LeftY]),
        (Topology::Mecanum, DriveStyle::Cartesian) => Some(&[LeftX, LeftY, RightX]),
        (Topology::Mecanum, DriveStyle::Polar) => Some(&[LeftY, LeftX, RightX]),
        (Topology::Killough, DriveStyle::Cartesian) => Some(&[LeftY, LeftX, RightX]),
        (Topology::Killough, DriveStyle::Polar) => Some(&[LeftY, LeftX, RightX]),
        _ => None,
    }
}

fn kinematics_for(
    topology: Topology,
    style: DriveStyle,
    config: &DriveConfig,
) -> Option<Kinematics> {
    let k = match (topology, style) {
        (Topology::Differential, DriveStyle::Arcade) => Kinematics::Arcade,
        (Topology::Differential, DriveStyle::Tank) => Kinematics::Tank,
        (Topology::Differential, DriveStyle::Curvature) => Kinematics::Curvature {
            quick_turn: config.quick_turn,
        },
        (Topology::Mecanum, DriveStyle::Cartesian) => Kinematics::MecanumCartesian,
        (Topology::Mecanum, DriveStyle::Polar) => Kinematics::MecanumPolar,
        (Topology::Killough, DriveStyle::Cartesian) => {
            Kinematics::KilloughCartesian(config.killough_wheels)
        }
        (Topology::Killough, DriveStyle::Polar) => Kinematics::KilloughPolar(config.killough_wheels),
        _ => return None,
    };
    Some(k)
}

/// Immutable lookup table resolving a drive style for a topology.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveStyleResolver {
    table: Vec<(Topology, DriveStyle, DriveBinding), TABLE_SIZE>,
}

impl Default for DriveStyleResolver {
    fn default() -> Self {
        let mut table = Vec::new();
        let config = DriveConfig::default();
        for topology in Topology::ALL {
            for style in DriveStyle::ALL {
                if let (Some(kinematics), Some(axes)) = (
                    kinematics_for(topology, style, &config),
                    default_axes(topology, style),
                ) {
                    let binding = DriveBinding {
                        kinematics,
                        axes: axes.iter().copied().collect(),
                    };
                    // capacity matches the number of supported pairs
                    let _ = table.push((topology, style, binding));
                }
            }
        }
        Self { table }
    }
}

impl DriveStyleResolver {
    /// Build the table, applying quick-turn, wheel layout and axis overrides.
    pub fn from_config(config: &DriveConfig) -> Result<Self, ConfigurationError> {
        let mut resolver = Self::default();

        for (topology, style, binding) in resolver.table.iter_mut() {
            if let Some(k) = kinematics_for(*topology, *style, config) {
                binding.kinematics = k;
            }
        }

        for o in &config.axis_overrides {
            let (topology, style) = (o.topology, o.style);
            let binding = resolver
                .table
                .iter_mut()
                .find(|(t, s, _)| *t == topology && *s == style)
                .map(|(_, _, b)| b)
                .ok_or(ConfigurationError::UnsupportedOverride { topology, style })?;

            let expected = binding.kinematics.arity();
            if o.axes.len() != expected {
                return Err(ConfigurationError::InvalidBinding {
                    topology,
                    style,
                    expected,
                    found: o.axes.len(),
                });
            }
            binding.axes = o.axes.iter().copied().collect();
            tracing::debug!(%topology, %style, axes = ?binding.axes, "axis binding overridden");
        }

        Ok(resolver)
    }

    /// Resolve `style` for `topology`.
    pub fn resolve(
        &self,
        topology: Topology,
        style: DriveStyle,
    ) -> Result<DriveBinding, UnsupportedCombinationError> {
        self.table
            .iter()
            .find(|(t, s, _)| *t == topology && *s == style)
            .map(|(_, _, b)| b.clone())
            .ok_or(UnsupportedCombinationError { topology, style })
    }

    /// Styles usable with `topology`, in table order.
    pub fn supported_styles(
        &self,
        topology: Topology,
    ) -> impl Iterator<Item = DriveStyle> + '_ {
        self.table
            .iter()
            .filter(move |(t, _, _)| *t == topology)
            .map(|(_, s, _)| *s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::drive::AxisOverride;
    use alloc::vec;
    use AxisId::*;

    const TABLE: [(Topology, DriveStyle, &str, &[AxisId]); TABLE_SIZE] = [
        (Topology::Differential, DriveStyle::Arcade, "arcade", &[RightX, LeftY]),
        (Topology::Differential, DriveStyle::Tank, "tank", &[RightY, LeftY]),
        (Topology::Differential, DriveStyle::Curvature, "curvature", &[RightX, LeftY]),
        (Topology::Mecanum, DriveStyle::Cartesian, "mecanum_cartesian", &[LeftX, LeftY, RightX]),
        (Topology::Mecanum, DriveStyle::Polar, "mecanum_polar", &[LeftY, LeftX, RightX]),
        (Topology::Killough, DriveStyle::Cartesian, "killough_cartesian", &[LeftY, LeftX, RightX]),
        (Topology::Killough, DriveStyle::Polar, "killough_polar", &[LeftY, LeftX, RightX]),
    ];

    #[test]
    fn resolves_every_listed_pair() {
        let r = DriveStyleResolver::default();
        for (t, s, name, axes) in TABLE {
            let b = r.resolve(t, s).unwrap();
            assert_eq!(b.kinematics.name(), name);
            assert_eq!(b.axes.as_slice(), axes);
            assert_eq!(b.axes.len(), b.kinematics.arity());
        }
    }

    #[test]
    fn rejects_every_unlisted_pair() {
        let r = DriveStyleResolver::default();
        for t in Topology::ALL {
            for s in DriveStyle::ALL {
                let listed = TABLE.iter().any(|(lt, ls, _, _)| *lt == t && *ls == s);
                match r.resolve(t, s) {
                    Ok(_) => assert!(listed, "{} {} should be unsupported", t, s),
                    Err(e) => {
                        assert!(!listed, "{} {} should resolve", t, s);
                        assert_eq!(e, UnsupportedCombinationError { topology: t, style: s });
                    }
                }
            }
        }
    }

    #[test]
    fn curvature_defaults_to_quick_turn() {
        let b = DriveStyleResolver::default()
            .resolve(Topology::Differential, DriveStyle::Curvature)
            .unwrap();
        assert_eq!(b.kinematics, Kinematics::Curvature { quick_turn: true });
    }

    #[test]
    fn resolve_is_idempotent() {
        let r = DriveStyleResolver::default();
        for (t, s, _, _) in TABLE {
            assert_eq!(r.resolve(t, s), r.resolve(t, s));
        }
    }

    #[test]
    fn config_overrides_axes_and_quick_turn() {
        let config = DriveConfig {
            quick_turn: false,
            axis_overrides: vec![AxisOverride {
                topology: Topology::Mecanum,
                style: DriveStyle::Polar,
                axes: vec![LeftX, LeftY, RightX],
            }],
            ..DriveConfig::default()
        };
        let r = DriveStyleResolver::from_config(&config).unwrap();

        let polar = r.resolve(Topology::Mecanum, DriveStyle::Polar).unwrap();
        assert_eq!(polar.axes.as_slice(), &[LeftX, LeftY, RightX]);
        assert_eq!(polar.kinematics, Kinematics::MecanumPolar);

        let curv = r.resolve(Topology::Differential, DriveStyle::Curvature).unwrap();
        assert_eq!(curv.kinematics, Kinematics::Curvature { quick_turn: false });
    }

    #[test]
    fn config_rejects_bad_overrides() {
        let wrong_len = DriveConfig {
            axis_overrides: vec![AxisOverride {
                topology: Topology::Differential,
                style: DriveStyle::Tank,
                axes: vec![LeftY],
            }],
            ..DriveConfig::default()
        };
        assert_eq!(
            DriveStyleResolver::from_config(&wrong_len),
            Err(ConfigurationError::InvalidBinding {
                topology: Topology::Differential,
                style: DriveStyle::Tank,
                expected: 2,
                found: 1,
            })
        );

        let unsupported = DriveConfig {
            axis_overrides: vec![AxisOverride {
                topology: Topology::Killough,
                style: DriveStyle::Tank,
                axes: vec![LeftY, RightY],
            }],
            ..DriveConfig::default()
        };
        assert_eq!(
            DriveStyleResolver::from_config(&unsupported),
            Err(ConfigurationError::UnsupportedOverride {
                topology: Topology::Killough,
                style: DriveStyle::Tank,
            })
        );
    }

    #[test]
    fn arcade_binding_feeds_speed_from_left_y() {
        let b = DriveStyleResolver::default()
            .resolve(Topology::Differential, DriveStyle::Arcade)
            .unwrap();
        // [RightX, LeftY] = [rotation, speed]
        assert_eq!(b.kinematics.evaluate(&[0.0, 1.0]).as_slice(), &[1.0, 1.0]);
        assert_eq!(b.kinematics.evaluate(&[1.0, 0.0]).as_slice(), &[1.0, -1.0]);
    }

    #[test]
    fn every_binding_drives_each_role_once() {
        let r = DriveStyleResolver::default();
        for (t, s, _, _) in TABLE {
            let b = r.resolve(t, s).unwrap();
            let idle = [0.0; MAX_AXES];
            let command = b.kinematics.evaluate(&idle[..b.axes.len()]);
            assert_eq!(command.len(), t.roles().len(), "{} {}", t, s);
        }
    }

    #[test]
    fn supported_styles_per_topology() {
        let r = DriveStyleResolver::default();
        let diff: Vec<DriveStyle, 5> = r.supported_styles(Topology::Differential).collect();
        assert_eq!(
            diff.as_slice(),
            &[DriveStyle::Arcade, DriveStyle::Tank, DriveStyle::Curvature]
        );
        assert_eq!(r.supported_styles(Topology::Killough).count(), 2);
    }
}
