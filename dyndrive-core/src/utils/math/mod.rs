//! Math utilities for the drivetrain core.
//!
//! This module provides the kinematics functions for differential, mecanum and
//! three-wheeled killough drivetrains.

pub mod kinematics;
