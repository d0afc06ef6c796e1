//! Module Exports
//!
//! Outward-facing collaborators of the drivetrain core.
//!
//! # Modules
//! - `telemetry`: best-effort publishing of drivetrain configuration and the
//!   active drive style.

pub mod telemetry;
