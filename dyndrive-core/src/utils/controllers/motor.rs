//! Motor output abstraction.

use alloc::boxed::Box;
use core::fmt::Debug;

/// A single speed controller accepting normalized speeds in `[-1.0, 1.0]`.
///
/// Implementations hold their last value until commanded again.
pub trait MotorHandle {
    type Error: Debug;

    fn set_speed(
        &mut self,
        speed: f32,
    ) -> Result<(), Self::Error>;

    /// Human-readable identifier (channel, CAN id) used in telemetry.
    fn label(&self) -> Option<&str> {
        None
    }
}

impl<M: MotorHandle + ?Sized> MotorHandle for Box<M> {
    type Error = M::Error;

    fn set_speed(
        &mut self,
        speed: f32,
    ) -> Result<(), Self::Error> {
        (**self).set_speed(speed)
    }

    fn label(&self) -> Option<&str> {
        (**self).label()
    }
}
