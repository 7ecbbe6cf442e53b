//! Kinematics utilities for four-wheel mecanum drivetrains.
//!
//! The `MecanumKinematics` struct maps a desired body motion (forward,
//! strafe, rotation) to the four wheel speeds of a mecanum chassis, with
//! optional heading compensation for field-relative driving.
//!
//! # Example
//! ```rust
//! use mecbot_core::utils::math::kinematics::MecanumKinematics;
//! let kin = MecanumKinematics::new();
//! let wheels = kin.wheel_speeds(1.0, 0.0, 0.0, 0.0);
//! ```
use core::f32::consts::PI;

use libm;

/// Wheel order produced by [`MecanumKinematics::wheel_speeds`]: front left,
/// rear left, front right, rear right.
pub const WHEEL_COUNT: usize = 4;

/// Open-loop mecanum mixer.
///
/// Inputs are unitless in `[-1, 1]`; outputs are unitless wheel speeds in the
/// same range, normalized so no wheel exceeds full scale. Right-side outputs
/// are not mirrored here; the motor layer owns direction conventions.
pub struct MecanumKinematics {
    /// Inputs below this magnitude are treated as zero.
    deadband: f32,
}

impl Default for MecanumKinematics {
    fn default() -> Self {
        Self::new()
    }
}

impl MecanumKinematics {
    /// Instantiate with the stock 2% input deadband.
    pub fn new() -> Self {
        Self::with_deadband(0.02)
    }

    /// Instantiate with a custom input deadband.
    pub fn with_deadband(deadband: f32) -> Self {
        Self { deadband }
    }

    /// Mix a `(forward, strafe, rotation)` command into four wheel speeds.
    ///
    /// `gyro_angle` is the robot heading in degrees; the translation vector
    /// is rotated by its negation so the command stays field-relative. Pass
    /// `0.0` for robot-relative driving.
    ///
    /// Returns `[front_left, rear_left, front_right, rear_right]`.
    pub fn wheel_speeds(
        &self,
        forward: f32,
        strafe: f32,
        rotation: f32,
        gyro_angle: f32,
    ) -> [f32; WHEEL_COUNT] {
        let forward = apply_deadband(forward.clamp(-1.0, 1.0), self.deadband);
        let strafe = apply_deadband(strafe.clamp(-1.0, 1.0), self.deadband);
        let rotation = rotation.clamp(-1.0, 1.0);

        let a = -gyro_angle * (PI / 180.0);
        let (sin, cos) = (libm::sinf(a), libm::cosf(a));
        let x = strafe * cos - forward * sin;
        let y = strafe * sin + forward * cos;

        let mut wheels = [
            y + x + rotation,
            y - x + rotation,
            y - x - rotation,
            y + x - rotation,
        ];
        normalize(&mut wheels);
        wheels
    }
}

/// Zero out inputs smaller than the given band.
fn apply_deadband(value: f32, band: f32) -> f32 {
    if value.abs() < band {
        0.0
    } else {
        value
    }
}

/// Scale all wheel speeds down so the largest magnitude is at most 1.
fn normalize(wheels: &mut [f32; WHEEL_COUNT]) {
    let mut max = 0.0f32;
    for &w in wheels.iter() {
        if w.abs() > max {
            max = w.abs();
        }
    }
    if max > 1.0 {
        for w in wheels.iter_mut() {
            *w /= max;
        }
    }
}
