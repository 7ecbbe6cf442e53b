//! Hardware-path tests for the PWM mecanum drive using `embedded-hal-mock`
//! I2C transaction mocks.

use critical_section as _;

use core::cell::RefCell;

use embedded_hal_bus::i2c::RefCellDevice;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};
use mecbot_core::utils::controllers::{drive::Drivetrain, drive::PwmMecanumDrive, RobotConfig};
use mecbot_core::utils::math::kinematics::MecanumKinematics;
use pwm_pca9685::{Address as PwmAddress, Pca9685};

/// Default I2C address for the PWM motor controller.
pub const PWM_ADDRESS: u8 = 0x55;
/// Default I2C address for the IMU sensor.
pub const IMU_ADDRESS: u8 = 0x68;

/// Create a write transaction for the given I2C address and data payload.
pub fn write(addr: u8, data: Vec<u8>) -> I2cTrans {
    I2cTrans::write(addr, data)
}

/// Create a write_read transaction for the given I2C address/payloads.
pub fn write_read(addr: u8, write: Vec<u8>, read: Vec<u8>) -> I2cTrans {
    I2cTrans::write_read(addr, write, read)
}

#[test]
fn test_init_devices() {
    // Define only the initialization-related transactions (IMU)
    let expectations = [
        write_read(IMU_ADDRESS, vec![0x75], vec![0x67]),
        write_read(IMU_ADDRESS, vec![0x21], vec![0x00]),
        write(IMU_ADDRESS, vec![0x21, 0x00]),
        write_read(IMU_ADDRESS, vec![0x20], vec![0x00]),
        write(IMU_ADDRESS, vec![0x20, 0x00]),
        write_read(IMU_ADDRESS, vec![0x1F], vec![0x0F]),
        write(IMU_ADDRESS, vec![0x1F, 0x0F]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = PwmMecanumDrive::new(&i2c_bus, &RobotConfig::default()).unwrap();
    drive.init_devices().unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_rejects_out_of_range_motor_channel() {
    let mock = I2cMock::new(&[]);
    let i2c_bus = RefCell::new(mock);
    let config = RobotConfig {
        front_left_channel: 9,
        ..RobotConfig::default()
    };
    assert!(PwmMecanumDrive::new(&i2c_bus, &config).is_err());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_configure_pwm() {
    // Expected transactions for enabling PWM and setting prescale (includes sleep handling)
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x01]),
        write(PWM_ADDRESS, vec![0x00, 0x11]),
        write(PWM_ADDRESS, vec![0xFE, 100]),
        write(PWM_ADDRESS, vec![0x00, 0x01]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = PwmMecanumDrive::new(&i2c_bus, &RobotConfig::default()).unwrap();
    let pwm = Pca9685::new(RefCellDevice::new(&i2c_bus), PwmAddress::from(PWM_ADDRESS)).unwrap();
    drive.pwm = Some(pwm);
    drive.configure_pwm().unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_drive_zero_commands_all_channels() {
    // A zero vector issues one auto-increment write and eight channel writes,
    // (phase, enable) per motor in channel order 1-4
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x31]),
        write(PWM_ADDRESS, vec![0x06, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x0A, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x0E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x12, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x16, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x1A, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x1E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x22, 0x00, 0x00, 0x00, 0x00]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = PwmMecanumDrive::new(&i2c_bus, &RobotConfig::default()).unwrap();
    let pwm = Pca9685::new(RefCellDevice::new(&i2c_bus), PwmAddress::from(PWM_ADDRESS)).unwrap();
    drive.pwm = Some(pwm);
    drive.drive_cartesian(0.0, 0.0, 0.0, 0.0).unwrap();
    i2c_bus.borrow_mut().done();
}

/// Smoke test for the mecanum mixer feeding the drive backend.
#[test]
fn wheel_speeds_nonzero_for_forward_command() {
    let kin = MecanumKinematics::new();
    let wheels = kin.wheel_speeds(1.0, 0.0, 0.0, 0.0);
    assert!(wheels.iter().any(|&v| v != 0.0));
}
