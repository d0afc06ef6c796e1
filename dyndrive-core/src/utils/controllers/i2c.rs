//! PCA9685 motor outputs for the drivetrain.
//!
//! Each motor is an H-bridge driven by two PWM channels on a shared PCA9685:
//! a phase channel selecting direction and an enable channel carrying the
//! duty cycle. All motors of a drivetrain borrow the same driver.

use core::{cell::RefCell, fmt::Debug};

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use hashbrown::HashMap;
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use super::MotorHandle;
use crate::utils::{drive::Topology, math::kinematics::clamp_unit};

/// Default I2C address of the PWM motor controller.
pub const PWM_ADDRESS: u8 = 0x55;

/// Full-scale PCA9685 duty value.
pub const MAX_DUTY: u16 = 4095;

/// Phase/enable channel pairs, assigned to a topology's roles in order.
pub const MOTOR_CHANNELS: [(Channel, Channel, &str); 4] = [
    (Channel::C6, Channel::C7, "pwm C6/C7"),
    (Channel::C2, Channel::C3, "pwm C2/C3"),
    (Channel::C4, Channel::C5, "pwm C4/C5"),
    (Channel::C0, Channel::C1, "pwm C0/C1"),
];

/// PCA9685 attached through a shared `RefCell` bus.
pub type PwmDriver<'a, I2C> = Pca9685<RefCellDevice<'a, I2C>>;

/// Create the PWM driver at [`PWM_ADDRESS`] on a shared bus.
pub fn init_pwm<I2C, E>(i2c_bus: &RefCell<I2C>) -> Result<PwmDriver<'_, I2C>, PwmError<E>>
where
    I2C: I2c<Error = E>,
    E: Debug,
{
    Pca9685::new(RefCellDevice::new(i2c_bus), PwmAddress::from(PWM_ADDRESS))
}

/// Enable the PWM motor driver and set its prescale (60Hz).
pub fn configure_pwm<P, E>(pca: &mut Pca9685<P>) -> Result<(), PwmError<E>>
where
    P: I2c<Error = E>,
    E: Debug,
{
    pca.enable()?;
    tracing::info!("PWM enabled");
    pca.set_prescale(100)?;
    tracing::info!("PWM prescale set to 60Hz");
    Ok(())
}

/// One H-bridge motor on a shared PCA9685.
pub struct PwmMotor<'p, P> {
    pwm: &'p RefCell<Pca9685<P>>,
    phase: Channel,
    enable: Channel,
    label: &'static str,
}

impl<'p, P, E> PwmMotor<'p, P>
where
    P: I2c<Error = E>,
    E: Debug,
{
    pub fn new(
        pwm: &'p RefCell<Pca9685<P>>,
        phase: Channel,
        enable: Channel,
        label: &'static str,
    ) -> Self {
        Self {
            pwm,
            phase,
            enable,
            label,
        }
    }

    /// Motors for every role of `topology`, keyed by role name, using
    /// [`MOTOR_CHANNELS`] in role order.
    pub fn bank(
        pwm: &'p RefCell<Pca9685<P>>,
        topology: Topology,
    ) -> HashMap<&'static str, Self> {
        topology
            .roles()
            .iter()
            .zip(MOTOR_CHANNELS.iter())
            .map(|(role, &(phase, enable, label))| {
                (role.as_str(), Self::new(pwm, phase, enable, label))
            })
            .collect()
    }
}

impl<P, E> MotorHandle for PwmMotor<'_, P>
where
    P: I2c<Error = E>,
    E: Debug,
{
    type Error = PwmError<E>;

    fn set_speed(
        &mut self,
        speed: f32,
    ) -> Result<(), Self::Error> {
        let speed = clamp_unit(speed);
        let duty = (speed.abs() * MAX_DUTY as f32) as u16;
        let forward = speed >= 0.0;

        let mut pca = self.pwm.borrow_mut();
        pca.set_channel_on_off(self.phase, 0, if forward { 0 } else { MAX_DUTY })?;
        pca.set_channel_on_off(self.enable, 0, duty)
    }

    fn label(&self) -> Option<&str> {
        Some(self.label)
    }
}
