//! Mecanum drive backend over a shared I2C bus.
//!
//! This module provides the [`Drivetrain`] seam the robot FSM drives
//! through, and [`PwmMecanumDrive`], the hardware implementation that maps
//! the four motor channels onto a PCA9685 PWM controller. The gyroscope (an
//! ICM-42670 on the same bus) is initialized here as well; the control logic
//! declares it but never consumes its readings.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use icm42670::{
    accelerometer::{Accelerometer, Error as AccelerometerError},
    Address as ImuAddress, Error as ImuError, Icm42670,
};
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use crate::utils::{controllers::RobotConfig, math::kinematics::MecanumKinematics};

/// Errors that can occur when interacting with the drive hardware.
#[derive(Debug)]
pub enum DeviceError<E: core::fmt::Debug> {
    PwmError(PwmError<E>),
    ImuError(ImuError<E>),
    AccelError(AccelerometerError<ImuError<E>>),
    ImuNotInitialized,
    /// A motor channel outside the fixed 1-4 range was configured.
    InvalidChannel(u8),
}

/// Drive abstraction the controller commands through.
///
/// One invocation sets all four outputs; no partial-output state persists
/// between calls.
pub trait Drivetrain {
    type Error: core::fmt::Debug;

    /// Command the chassis with a `(forward, strafe, rotation)` vector.
    ///
    /// `gyro_angle` is the heading in degrees for field-relative driving;
    /// pass `0.0` for robot-relative.
    fn drive_cartesian(
        &mut self,
        forward: f32,
        strafe: f32,
        rotation: f32,
        gyro_angle: f32,
    ) -> Result<(), Self::Error>;
}

/// Four-motor mecanum drive over a PCA9685 PWM controller.
///
/// Each motor output binds to its configured channel at construction and is
/// never reassigned. Wheel order follows the kinematics module: front left,
/// rear left, front right, rear right; the right side is mirrored at this
/// layer to match motor orientation.
pub struct PwmMecanumDrive<'a, I2C: 'static> {
    i2c: &'a RefCell<I2C>,
    pub pwm: Option<Pca9685<RefCellDevice<'a, I2C>>>,
    imu: Option<Icm42670<RefCellDevice<'a, I2C>>>,
    motor_channels: [(Channel, Channel); 4],
    kinematics: MecanumKinematics,
}

impl<'a, I2C, E> PwmMecanumDrive<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    /// Create a new drive bound to the motor channels in `config`.
    ///
    /// Fails if any configured channel falls outside the fixed 1-4 range.
    pub fn new(i2c_bus: &'a RefCell<I2C>, config: &RobotConfig) -> Result<Self, DeviceError<E>> {
        let motor_channels = [
            pwm_channels(config.front_left_channel)?,
            pwm_channels(config.rear_left_channel)?,
            pwm_channels(config.front_right_channel)?,
            pwm_channels(config.rear_right_channel)?,
        ];
        Ok(PwmMecanumDrive {
            i2c: i2c_bus,
            pwm: None,
            imu: None,
            motor_channels,
            kinematics: MecanumKinematics::new(),
        })
    }

    /// Initialize the gyroscope and PWM motor controller on the I2C bus.
    ///
    /// On success, both `self.imu` and `self.pwm` are set.
    pub fn init_devices(&mut self) -> Result<(), DeviceError<E>> {
        let imu = Icm42670::new(RefCellDevice::new(self.i2c), ImuAddress::Primary)
            .map_err(DeviceError::ImuError)?;
        let pwm = Pca9685::new(RefCellDevice::new(self.i2c), PwmAddress::from(0x55))
            .map_err(DeviceError::PwmError)?;

        self.imu = Some(imu);
        self.pwm = Some(pwm);
        Ok(())
    }

    /// Configure and enable the PWM motor driver (prescale to 60Hz).
    pub fn configure_pwm(&mut self) -> Result<(), DeviceError<E>> {
        if let Some(pca) = &mut self.pwm {
            pca.enable().map_err(DeviceError::PwmError)?;
            tracing::info!("PWM enabled");
            pca.set_prescale(100).map_err(DeviceError::PwmError)?;
            tracing::info!("PWM prescale set to 60Hz");
        } else {
            tracing::error!("PWM not initialized");
        }

        Ok(())
    }

    /// Read accelerometer, gyroscope, and temperature data from the IMU.
    ///
    /// # Returns
    ///
    /// `Ok(((ax, ay, az), (gx, gy, gz), temp))` on success.
    pub fn read_imu(&mut self) -> Result<((f32, f32, f32), (f32, f32, f32), f32), DeviceError<E>> {
        let imu = self.imu.as_mut().ok_or(DeviceError::ImuNotInitialized)?;
        let accel = imu.accel_norm().map_err(DeviceError::AccelError)?;
        let gyro = imu.gyro_norm().map_err(DeviceError::ImuError)?;
        let temp = imu.temperature().map_err(DeviceError::ImuError)?;

        Ok(((accel.x, accel.y, accel.z), (gyro.x, gyro.y, gyro.z), temp))
    }

    /// Apply four wheel speeds through the PWM driver, mirroring the right
    /// side.
    pub fn apply_wheel_speeds(&mut self, wheel_speeds: &[f32; 4]) -> Result<(), DeviceError<E>> {
        const MAX_DUTY: u16 = 4095;
        // Right-side motors (indices 2 and 3) are mounted mirrored
        const SIDE_SIGN: [f32; 4] = [1.0, 1.0, -1.0, -1.0];

        for (i, &(phase_channel, enable_channel)) in self.motor_channels.iter().enumerate() {
            let output = wheel_speeds[i] * SIDE_SIGN[i];
            let speed = output.abs().min(1.0);
            let direction = output >= 0.0;

            if let Some(pca) = &mut self.pwm {
                pca.set_channel_on_off(phase_channel, 0, if direction { 0 } else { MAX_DUTY })
                    .map_err(DeviceError::PwmError)?;
                pca.set_channel_on_off(enable_channel, 0, (speed * MAX_DUTY as f32) as u16)
                    .map_err(DeviceError::PwmError)?;
            } else {
                tracing::error!("PWM not initialized");
            }
        }
        Ok(())
    }
}

impl<'a, I2C, E> Drivetrain for PwmMecanumDrive<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    type Error = DeviceError<E>;

    fn drive_cartesian(
        &mut self,
        forward: f32,
        strafe: f32,
        rotation: f32,
        gyro_angle: f32,
    ) -> Result<(), Self::Error> {
        let wheels = self
            .kinematics
            .wheel_speeds(forward, strafe, rotation, gyro_angle);
        self.apply_wheel_speeds(&wheels)
    }
}

/// Map a fixed motor channel (1-4) to its PCA9685 (phase, enable) pair.
fn pwm_channels<E: core::fmt::Debug>(channel: u8) -> Result<(Channel, Channel), DeviceError<E>> {
    match channel {
        1 => Ok((Channel::C0, Channel::C1)),
        2 => Ok((Channel::C2, Channel::C3)),
        3 => Ok((Channel::C4, Channel::C5)),
        4 => Ok((Channel::C6, Channel::C7)),
        other => Err(DeviceError::InvalidChannel(other)),
    }
}
