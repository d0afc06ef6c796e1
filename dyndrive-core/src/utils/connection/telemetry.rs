//! Best-effort telemetry publishing.
//!
//! The drivetrain publishes its topology and motor list once at construction
//! and the active drive style whenever it changes. A failing sink is logged
//! and never affects driving.

use alloc::string::String;
use core::{convert::Infallible, fmt::Debug};

pub const TOPOLOGY_KEY: &str = "Drivetrain/Topology";
pub const MOTORS_KEY: &str = "Drivetrain/Motors";
pub const STYLE_KEY: &str = "Drivetrain/Style";
pub const STYLES_KEY: &str = "Drivetrain/Styles";

/// Key/value sink such as a dashboard or network table.
pub trait Telemetry {
    type Error: Debug;

    fn publish_string(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    fn publish_string_array(
        &mut self,
        key: &str,
        values: &[String],
    ) -> Result<(), Self::Error>;
}

/// Telemetry sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTelemetry;

impl Telemetry for NoTelemetry {
    type Error = Infallible;

    fn publish_string(
        &mut self,
        _key: &str,
        _value: &str,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn publish_string_array(
        &mut self,
        _key: &str,
        _values: &[String],
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: Telemetry + ?Sized> Telemetry for &mut T {
    type Error = T::Error;

    fn publish_string(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), Self::Error> {
        (**self).publish_string(key, value)
    }

    fn publish_string_array(
        &mut self,
        key: &str,
        values: &[String],
    ) -> Result<(), Self::Error> {
        (**self).publish_string_array(key, values)
    }
}

/// Log a failed publish and swallow it.
pub fn report<E: Debug>(
    key: &str,
    result: Result<(), E>,
) {
    if let Err(e) = result {
        tracing::warn!("telemetry publish of {} failed: {:?}", key, e);
    }
}
