//! Module Exports
//!
//! This file exports the runtime side of the drivetrain core.
//!
//! - `axis`: operator input axes and the `AxisSource` capability
//! - `motor`: the `MotorHandle` output capability
//! - `i2c`: PCA9685-backed motor handles
//!
//! It also hosts the `DrivetrainController`, which binds a style to its
//! kinematics every cycle, and the `DriveLoop` that calls it periodically.

pub mod axis;
pub mod i2c;
pub mod motor;

use alloc::{string::String, vec::Vec};
use core::fmt;

use embassy_sync::{
    blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex},
    channel::{Channel, Receiver},
};
use embassy_time::{Duration, Ticker};
use serde::{Deserialize, Serialize};

pub use axis::{AxisId, AxisSnapshot, AxisSource};
pub use motor::MotorHandle;

use crate::utils::{
    connection::telemetry::{self, NoTelemetry, Telemetry},
    drive::{
        ConfigurationError, DriveConfig, DriveStyle, DriveStyleResolver, Drivetrain, Topology,
        UnsupportedCombinationError,
    },
};

/// Channel used to receive drive commands (`DriveCommand` messages).
pub static DRIVE_CHANNEL: Channel<CriticalSectionRawMutex, DriveCommand, 16> = Channel::new();

/// Commands accepted by the drive loop.
///
/// Serialized as JSON with tag `"dc"`, e.g. `{"dc":"style","style":"arcade"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dc", rename_all = "snake_case")] // dc = drive command
pub enum DriveCommand {
    /// Select the drive style used from the next cycle on.
    Style { style: DriveStyle },
    /// Deselect the style and zero every motor.
    Stop,
    /// Scale all motor commands by `value` in `[0.0, 1.0]`.
    MaxOutput { value: f32 },
}

/// Errors raised by a single `drive` call.
#[derive(Debug)]
pub enum DriveError<A, M> {
    Unsupported(UnsupportedCombinationError),
    /// The axis source failed; nothing was written.
    Axis(A),
    /// A motor handle rejected its command.
    Actuation(M),
}

impl<A, M> From<UnsupportedCombinationError> for DriveError<A, M> {
    fn from(e: UnsupportedCombinationError) -> Self {
        DriveError::Unsupported(e)
    }
}

impl<A: fmt::Debug, M: fmt::Debug> fmt::Display for DriveError<A, M> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            DriveError::Unsupported(e) => write!(f, "{}", e),
            DriveError::Axis(e) => write!(f, "axis read failed: {:?}", e),
            DriveError::Actuation(e) => write!(f, "motor write failed: {:?}", e),
        }
    }
}

impl<A: fmt::Debug, M: fmt::Debug> core::error::Error for DriveError<A, M> {}

/// Owns a drivetrain and binds drive styles to it at runtime.
pub struct DrivetrainController<M, T = NoTelemetry> {
    drivetrain: Drivetrain<M>,
    resolver: DriveStyleResolver,
    max_output: f32,
    telemetry: T,
}

impl<M: MotorHandle> DrivetrainController<M, NoTelemetry> {
    pub fn new(
        drivetrain: Drivetrain<M>,
        resolver: DriveStyleResolver,
    ) -> Self {
        Self::with_telemetry(drivetrain, resolver, NoTelemetry)
    }
}

impl<M: MotorHandle, T: Telemetry> DrivetrainController<M, T> {
    pub fn with_telemetry(
        drivetrain: Drivetrain<M>,
        resolver: DriveStyleResolver,
        telemetry: T,
    ) -> Self {
        let mut ctrl = Self {
            drivetrain,
            resolver,
            max_output: 1.0,
            telemetry,
        };
        ctrl.publish_styles();
        ctrl
    }

    /// Build the resolver from `config` and apply its output limit.
    pub fn from_config(
        drivetrain: Drivetrain<M>,
        config: &DriveConfig,
        telemetry: T,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let resolver = DriveStyleResolver::from_config(config)?;
        let mut ctrl = Self::with_telemetry(drivetrain, resolver, telemetry);
        ctrl.set_max_output(config.max_output);
        Ok(ctrl)
    }

    pub fn topology(&self) -> Topology {
        self.drivetrain.topology()
    }

    pub fn drivetrain(&self) -> &Drivetrain<M> {
        &self.drivetrain
    }

    pub fn resolver(&self) -> &DriveStyleResolver {
        &self.resolver
    }

    pub fn max_output(&self) -> f32 {
        self.max_output
    }

    /// Limit every motor command to `value`, clamped to `[0.0, 1.0]`.
    pub fn set_max_output(
        &mut self,
        value: f32,
    ) {
        self.max_output = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Run one control cycle with `style`.
    ///
    /// Resolution and every axis read happen before the first motor write, so
    /// a failure in either leaves all motors on their previous command. A
    /// failed motor write zeroes the whole drivetrain before returning.
    pub fn drive<S: AxisSource + ?Sized>(
        &mut self,
        style: DriveStyle,
        axes: &mut S,
    ) -> Result<(), DriveError<S::Error, M::Error>> {
        let binding = self.resolver.resolve(self.topology(), style)?;
        let values = axis::read_axes(axes, &binding.axes).map_err(DriveError::Axis)?;

        let mut command = binding.kinematics.evaluate(&values);
        for speed in command.iter_mut() {
            *speed *= self.max_output;
        }
        tracing::trace!(%style, ?values, ?command, "drive cycle");

        self.drivetrain
            .apply(&command)
            .map_err(DriveError::Actuation)
    }

    /// Command every motor to zero.
    pub fn stop(&mut self) -> Result<(), M::Error> {
        self.drivetrain.stop()
    }

    /// Publish the active drive style.
    pub fn publish_style(
        &mut self,
        style: DriveStyle,
    ) {
        telemetry::report(
            telemetry::STYLE_KEY,
            self.telemetry.publish_string(telemetry::STYLE_KEY, style.name()),
        );
    }

    fn publish_styles(&mut self) {
        let styles: Vec<String> = self
            .resolver
            .supported_styles(self.drivetrain.topology())
            .map(|s| String::from(s.name()))
            .collect();
        telemetry::report(
            telemetry::STYLES_KEY,
            self.telemetry.publish_string_array(telemetry::STYLES_KEY, &styles),
        );
    }
}

/// Cycle-driven host loop around a [`DrivetrainController`].
///
/// Commands queued on the channel are applied at the start of each cycle; a
/// failed cycle is logged and the next one runs normally.
pub struct DriveLoop<'ch, R: RawMutex, M, S, T, const N: usize> {
    controller: DrivetrainController<M, T>,
    axes: S,
    commands: Receiver<'ch, R, DriveCommand, N>,
    style: Option<DriveStyle>,
    period: Duration,
}

impl<'ch, R, M, S, T, const N: usize> DriveLoop<'ch, R, M, S, T, N>
where
    R: RawMutex,
    M: MotorHandle,
    S: AxisSource,
    T: Telemetry,
{
    pub fn new(
        controller: DrivetrainController<M, T>,
        axes: S,
        commands: Receiver<'ch, R, DriveCommand, N>,
        period: Duration,
    ) -> Self {
        Self {
            controller,
            axes,
            commands,
            style: None,
            period,
        }
    }

    pub fn style(&self) -> Option<DriveStyle> {
        self.style
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn controller(&self) -> &DrivetrainController<M, T> {
        &self.controller
    }

    pub fn axes_mut(&mut self) -> &mut S {
        &mut self.axes
    }

    pub fn apply_command(
        &mut self,
        command: DriveCommand,
    ) {
        tracing::info!("Received drive command: {:?}", command);
        match command {
            DriveCommand::Style { style } => {
                if self.style != Some(style) {
                    self.style = Some(style);
                    self.controller.publish_style(style);
                }
            }
            DriveCommand::Stop => {
                self.style = None;
                if let Err(e) = self.controller.stop() {
                    tracing::error!("stop failed: {:?}", e);
                }
            }
            DriveCommand::MaxOutput { value } => self.controller.set_max_output(value),
        }
    }

    /// Drain pending commands, then drive one cycle with the selected style.
    ///
    /// With no style selected nothing is written and the motors hold.
    pub fn step(&mut self) -> Result<(), DriveError<S::Error, M::Error>> {
        while let Ok(command) = self.commands.try_receive() {
            self.apply_command(command);
        }

        let Some(style) = self.style else {
            return Ok(());
        };

        self.controller
            .drive(style, &mut self.axes)
            .inspect_err(|e| tracing::warn!("drive cycle skipped: {}", e))
    }

    /// Run [`step`](Self::step) once per period, forever.
    pub async fn run(mut self) -> ! {
        let mut ticker = Ticker::every(self.period);
        loop {
            let _ = self.step();
            ticker.next().await;
        }
    }
}
