//! Operator input axes.

use core::{convert::Infallible, fmt::Debug};

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::utils::{drive::resolver::MAX_AXES, math::kinematics::clamp_unit};

/// Stick axes of a two-stick gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl AxisId {
    pub const ALL: [AxisId; 4] = [AxisId::LeftX, AxisId::LeftY, AxisId::RightX, AxisId::RightY];

    const fn index(self) -> usize {
        match self {
            AxisId::LeftX => 0,
            AxisId::LeftY => 1,
            AxisId::RightX => 2,
            AxisId::RightY => 3,
        }
    }
}

/// An input device that yields normalized axis values in `[-1.0, 1.0]`.
pub trait AxisSource {
    type Error: Debug;

    fn axis(
        &mut self,
        id: AxisId,
    ) -> Result<f32, Self::Error>;
}

impl<S: AxisSource + ?Sized> AxisSource for &mut S {
    type Error = S::Error;

    fn axis(
        &mut self,
        id: AxisId,
    ) -> Result<f32, Self::Error> {
        (**self).axis(id)
    }
}

/// Latched stick positions, e.g. the last gamepad report received.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AxisSnapshot {
    values: [f32; 4],
}

impl AxisSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        id: AxisId,
        value: f32,
    ) -> Self {
        self.set(id, value);
        self
    }

    pub fn set(
        &mut self,
        id: AxisId,
        value: f32,
    ) {
        self.values[id.index()] = value;
    }
}

impl AxisSource for AxisSnapshot {
    type Error = Infallible;

    fn axis(
        &mut self,
        id: AxisId,
    ) -> Result<f32, Self::Error> {
        Ok(self.values[id.index()])
    }
}

/// Read `binding` in order, clamping each value at the read boundary.
pub fn read_axes<S: AxisSource + ?Sized>(
    source: &mut S,
    binding: &[AxisId],
) -> Result<Vec<f32, MAX_AXES>, S::Error> {
    let mut values = Vec::new();
    for &id in binding.iter().take(MAX_AXES) {
        let _ = values.push(clamp_unit(source.axis(id)?));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_binding_order_and_clamps() {
        let mut pad = AxisSnapshot::new()
            .with(AxisId::LeftY, 2.5)
            .with(AxisId::RightX, -0.3)
            .with(AxisId::LeftX, f32::NAN);
        let v = read_axes(&mut pad, &[AxisId::RightX, AxisId::LeftY, AxisId::LeftX]).unwrap();
        assert_eq!(v.as_slice(), &[-0.3, 1.0, 0.0]);
    }
}
