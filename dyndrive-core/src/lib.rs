//! Runtime-selectable drivetrain kinematics for no-std robots.
//!
//! A drivetrain topology (differential, mecanum, killough) and a driving style
//! (arcade, tank, curvature, cartesian, polar) are chosen at runtime; the core
//! resolves the matching kinematics and axis binding and drives the motors
//! once per control cycle.
#![no_std]

extern crate alloc;

pub mod utils;
