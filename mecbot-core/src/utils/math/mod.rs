//! Math utilities for the mecanum robot.
//!
//! This module provides kinematics calculations for four-wheel mecanum drivetrains.

pub mod kinematics;
