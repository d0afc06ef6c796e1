//! Validated role→motor mapping and the factory that builds it.

use alloc::{format, string::String, vec::Vec};
use core::{borrow::Borrow, fmt, hash::BuildHasher, hash::Hash};

use hashbrown::HashMap;

use super::{ConfigurationError, Topology};
use crate::utils::{
    connection::telemetry::{self, Telemetry},
    controllers::MotorHandle,
    math::kinematics::MAX_MOTORS,
};

/// Name of a motor slot required by a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotorRole(&'static str);

impl MotorRole {
    pub const LEFT: MotorRole = MotorRole("Left");
    pub const RIGHT: MotorRole = MotorRole("Right");
    pub const BACK: MotorRole = MotorRole("Back");
    pub const FRONT_LEFT: MotorRole = MotorRole("Front Left");
    pub const FRONT_RIGHT: MotorRole = MotorRole("Front Right");
    pub const REAR_LEFT: MotorRole = MotorRole("Rear Left");
    pub const REAR_RIGHT: MotorRole = MotorRole("Rear Right");

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for MotorRole {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Motors of one drivetrain, stored in the topology's role order.
///
/// Only [`DrivetrainFactory`] creates a `Drivetrain`, so every required role
/// is always present.
pub struct Drivetrain<M> {
    topology: Topology,
    motors: heapless::Vec<(MotorRole, M), MAX_MOTORS>,
}

impl<M: MotorHandle> Drivetrain<M> {
    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn roles(&self) -> impl Iterator<Item = MotorRole> + '_ {
        self.motors.iter().map(|(role, _)| *role)
    }

    pub fn motor(
        &self,
        role: &str,
    ) -> Option<&M> {
        self.motors
            .iter()
            .find(|(r, _)| r.as_str() == role)
            .map(|(_, m)| m)
    }

    /// Write a full command vector, one speed per role in role order.
    ///
    /// Every motor is written even if an earlier one fails. On any failure the
    /// whole drivetrain is then zeroed and the first error returned, so the
    /// motors never run a mix of two cycles.
    pub(crate) fn apply(
        &mut self,
        command: &[f32],
    ) -> Result<(), M::Error> {
        debug_assert_eq!(command.len(), self.motors.len());
        let mut first = None;
        for ((role, motor), &speed) in self.motors.iter_mut().zip(command.iter()) {
            tracing::trace!(role = role.as_str(), speed, "motor command");
            if let Err(e) = motor.set_speed(speed) {
                tracing::error!(role = role.as_str(), "motor write failed: {:?}", e);
                first.get_or_insert(e);
            }
        }

        match first {
            None => Ok(()),
            Some(e) => {
                let _ = self.stop();
                Err(e)
            }
        }
    }

    /// Command every motor to zero, attempting all of them and returning the
    /// first failure.
    pub fn stop(&mut self) -> Result<(), M::Error> {
        let mut first = None;
        for (role, motor) in self.motors.iter_mut() {
            if let Err(e) = motor.set_speed(0.0) {
                tracing::error!(role = role.as_str(), "motor stop failed: {:?}", e);
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Give the motor handles back, in role order.
    pub fn into_motors(self) -> impl Iterator<Item = (MotorRole, M)> {
        self.motors.into_iter()
    }

    fn describe(&self) -> Vec<String> {
        self.motors
            .iter()
            .map(|(role, motor)| match motor.label() {
                Some(label) => format!("{}: {}", role, label),
                None => String::from(role.as_str()),
            })
            .collect()
    }
}

/// Builds a [`Drivetrain`] from a named motor map.
pub struct DrivetrainFactory;

impl DrivetrainFactory {
    /// Validate `motors` against the roles of `topology` and take ownership of
    /// the required handles. Keys not used by the topology are dropped.
    #[tracing::instrument(level = "debug", skip(motors), fields(supplied = motors.len()))]
    pub fn construct<K, M, S>(
        topology: Topology,
        mut motors: HashMap<K, M, S>,
    ) -> Result<Drivetrain<M>, ConfigurationError>
    where
        K: Borrow<str> + Hash + Eq,
        M: MotorHandle,
        S: BuildHasher,
    {
        if let Some(&role) = topology
            .roles()
            .iter()
            .find(|role| !motors.contains_key(role.as_str()))
        {
            tracing::error!(%topology, %role, "required motor role missing");
            return Err(ConfigurationError::MissingRole { topology, role });
        }

        let mut slots = heapless::Vec::new();
        for &role in topology.roles() {
            if let Some(motor) = motors.remove(role.as_str()) {
                // roles() never exceeds MAX_MOTORS
                let _ = slots.push((role, motor));
            }
        }

        for key in motors.keys() {
            tracing::debug!(key = <K as Borrow<str>>::borrow(key), "ignoring motor not used by {}", topology);
        }

        tracing::info!(%topology, "drivetrain constructed");
        Ok(Drivetrain {
            topology,
            motors: slots,
        })
    }

    /// As [`construct`](Self::construct), then publish a configuration
    /// snapshot. Telemetry failures are logged and otherwise ignored.
    pub fn construct_with_telemetry<K, M, S, T>(
        topology: Topology,
        motors: HashMap<K, M, S>,
        sink: &mut T,
    ) -> Result<Drivetrain<M>, ConfigurationError>
    where
        K: Borrow<str> + Hash + Eq,
        M: MotorHandle,
        S: BuildHasher,
        T: Telemetry,
    {
        let drivetrain = Self::construct(topology, motors)?;
        telemetry::report(
            telemetry::TOPOLOGY_KEY,
            sink.publish_string(telemetry::TOPOLOGY_KEY, topology.name()),
        );
        telemetry::report(
            telemetry::MOTORS_KEY,
            sink.publish_string_array(telemetry::MOTORS_KEY, &drivetrain.describe()),
        );
        Ok(drivetrain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::connection::telemetry::NoTelemetry;
    use core::convert::Infallible;

    #[derive(Debug, Default)]
    struct Spy(f32);

    impl MotorHandle for Spy {
        type Error = Infallible;

        fn set_speed(
            &mut self,
            speed: f32,
        ) -> Result<(), Self::Error> {
            self.0 = speed;
            Ok(())
        }
    }

    fn motors(names: &[&'static str]) -> HashMap<&'static str, Spy> {
        names.iter().map(|&n| (n, Spy::default())).collect()
    }

    #[test]
    fn every_topology_builds_with_its_roles() {
        for t in Topology::ALL {
            let names: Vec<&'static str> = t.roles().iter().map(|r| r.as_str()).collect();
            let dt = DrivetrainFactory::construct(t, motors(&names)).unwrap();
            assert_eq!(dt.topology(), t);
            assert!(dt.roles().eq(t.roles().iter().copied()));
        }
    }

    #[test]
    fn missing_any_single_role_fails() {
        for t in Topology::ALL {
            for missing in t.roles() {
                let names: Vec<&'static str> = t
                    .roles()
                    .iter()
                    .filter(|r| *r != missing)
                    .map(|r| r.as_str())
                    .collect();
                let result = DrivetrainFactory::construct(t, motors(&names));
                assert!(matches!(
                    result,
                    Err(ConfigurationError::MissingRole { topology, role })
                        if topology == t && role == *missing
                ));
            }
        }
    }

    #[test]
    fn extra_keys_are_ignored() {
        let dt = DrivetrainFactory::construct(
            Topology::Differential,
            motors(&["Left", "Right", "Intake", "Front Left"]),
        )
        .unwrap();
        assert_eq!(dt.roles().count(), 2);
        assert!(dt.motor("Intake").is_none());
        assert!(dt.motor("Left").is_some());
    }

    #[test]
    fn owned_string_keys_work() {
        let map: HashMap<String, Spy> = ["Left", "Right", "Back"]
            .iter()
            .map(|n| (String::from(*n), Spy::default()))
            .collect();
        let mut t = NoTelemetry;
        let dt = DrivetrainFactory::construct_with_telemetry(Topology::Killough, map, &mut t);
        assert!(dt.is_ok());
    }

    #[test]
    fn apply_and_stop_write_in_role_order() {
        let mut dt =
            DrivetrainFactory::construct(Topology::Killough, motors(&["Back", "Left", "Right"]))
                .unwrap();
        dt.apply(&[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(dt.motor("Left").unwrap().0, 0.1);
        assert_eq!(dt.motor("Right").unwrap().0, 0.2);
        assert_eq!(dt.motor("Back").unwrap().0, 0.3);

        dt.stop().unwrap();
        assert!(dt.into_motors().all(|(_, m)| m.0 == 0.0));
    }
}
