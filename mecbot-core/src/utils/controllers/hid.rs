//! Input-device seams for the driver station.
//!
//! Joystick hardware lives outside this crate; the controller only needs a
//! read-only view of the axes. Axis 2 is read raw in teleop with no assigned
//! semantic meaning, so the trait exposes indexed access rather than named
//! axes beyond X and Y.

/// Index of the X axis on a stick.
pub const AXIS_X: usize = 0;
/// Index of the Y axis on a stick.
pub const AXIS_Y: usize = 1;

/// Read-only view of a joystick bound to a driver-station channel.
///
/// Axis values are unitless in `[-1, 1]`; unknown axes read as 0.
pub trait Joystick {
    /// Read the axis at the given index.
    fn raw_axis(&self, axis: usize) -> f32;

    /// The stick's X axis.
    fn x(&self) -> f32 {
        self.raw_axis(AXIS_X)
    }

    /// The stick's Y axis.
    fn y(&self) -> f32 {
        self.raw_axis(AXIS_Y)
    }
}

impl<T: Joystick + ?Sized> Joystick for &T {
    fn raw_axis(&self, axis: usize) -> f32 {
        (**self).raw_axis(axis)
    }
}
