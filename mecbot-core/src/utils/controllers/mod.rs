//! Robot control FSM and its hardware seams.
//!
//! - `drive`: the `Drivetrain` abstraction and the PCA9685 mecanum backend.
//! - `hid`: read-only joystick access.
//!
//! [`RobotController`] owns the drive, the two sticks, the dashboard handle,
//! and a monotonic clock. An external scheduler calls [`RobotController::tick`]
//! with the current [`Mode`]; mode transitions are detected internally, so
//! autonomous entry restarts the elapsed timer exactly once per entry.

pub mod drive;
pub mod hid;

extern crate alloc;

use alloc::string::String;
use core::time::Duration;

use drive::Drivetrain;
use embassy_time::Timer;
use hid::Joystick;

use crate::utils::tables::Dashboard;

/// Dashboard key holding the tunable teleop strafe speed.
pub const WHEEL_SPEED_KEY: &str = "wheelSpeed";
/// Dashboard key the latched game message is published under.
pub const GAME_DATA_KEY: &str = "gameData";
/// Name of the table the controller publishes to.
pub const DASHBOARD_TABLE: &str = "SmartDashboard";

/// Autonomous drives open-loop for this long after mode entry, then stops.
const AUTON_DRIVE_WINDOW: Duration = Duration::from_secs(2);
/// Poll interval while the robot is disabled.
const DISABLED_POLL: embassy_time::Duration = embassy_time::Duration::from_millis(10);
/// Control-loop period for the active modes.
const CONTROL_PERIOD: embassy_time::Duration = embassy_time::Duration::from_millis(20);

/// The three scheduler-driven robot modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Disabled,
    Autonomous,
    Teleop,
}

/// Fixed channel assignments, set once at construction.
#[derive(Debug, Clone, Copy)]
pub struct RobotConfig {
    pub front_left_channel: u8,
    pub rear_left_channel: u8,
    pub front_right_channel: u8,
    pub rear_right_channel: u8,
    pub left_stick_channel: u8,
    pub right_stick_channel: u8,
    /// Declared for completeness; never consumed by the control logic.
    pub gyro_channel: u8,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            front_left_channel: 1,
            rear_left_channel: 2,
            front_right_channel: 3,
            rear_right_channel: 4,
            left_stick_channel: 0,
            right_stick_channel: 1,
            gyro_channel: 1,
        }
    }
}

/// Monotonic elapsed-time source, injected so timed behavior is testable.
pub trait Monotonic {
    fn now(&self) -> Duration;
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Monotonic clock backed by the embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Monotonic for WallClock {
    fn now(&self) -> Duration {
        Duration::from_micros(embassy_time::Instant::now().as_micros())
    }
}

/// External source of the current mode and game-specific message.
pub trait DriverStation {
    /// The mode the scheduler should be dispatching.
    fn mode(&self) -> Mode;

    /// Latest game-specific message; empty when none has been issued.
    fn game_specific_message(&self) -> &str;
}

/// The robot's single control component.
///
/// Holds the four motor outputs (through the drive), the two sticks, the
/// dashboard handle, and one mutable desired-speed scalar. All handles are
/// bound at construction and live for the process lifetime.
pub struct RobotController<DRV, L, R, SD, CLK> {
    config: RobotConfig,
    drive: DRV,
    lstick: L,
    rstick: R,
    table: SD,
    clock: CLK,
    last_mode: Option<Mode>,
    auton_start: Duration,
    speed: f64,
    game_data: String,
}

impl<DRV, L, R, SD, CLK> RobotController<DRV, L, R, SD, CLK>
where
    DRV: Drivetrain,
    L: Joystick,
    R: Joystick,
    SD: Dashboard,
    CLK: Monotonic,
{
    /// Bind all handles and publish the initial desired speed (0) under
    /// [`WHEEL_SPEED_KEY`].
    pub fn new(config: RobotConfig, drive: DRV, lstick: L, rstick: R, table: SD, clock: CLK) -> Self {
        tracing::info!(?config, "robot controller initialized");
        let speed = 0.0;
        table.put_number(WHEEL_SPEED_KEY, speed);
        Self {
            config,
            drive,
            lstick,
            rstick,
            table,
            clock,
            last_mode: None,
            auton_start: Duration::ZERO,
            speed,
            game_data: String::new(),
        }
    }

    /// One periodic invocation for the given mode.
    ///
    /// `game_message` is the current game-specific message; only teleop
    /// consumes it. Disabled issues no motor commands.
    pub fn tick(&mut self, mode: Mode, game_message: &str) -> Result<(), DRV::Error> {
        if self.last_mode != Some(mode) {
            self.on_mode_entry(mode);
            self.last_mode = Some(mode);
        }
        match mode {
            Mode::Disabled => Ok(()),
            Mode::Autonomous => self.autonomous_periodic(),
            Mode::Teleop => self.teleop_periodic(game_message),
        }
    }

    fn on_mode_entry(&mut self, mode: Mode) {
        tracing::info!(?mode, "mode entered");
        if mode == Mode::Autonomous {
            self.auton_start = self.clock.now();
        }
    }

    /// Two-state timer policy: drive a fixed vector until the window
    /// elapses, then stop until autonomous is re-entered.
    fn autonomous_periodic(&mut self) -> Result<(), DRV::Error> {
        let elapsed = self.clock.now().saturating_sub(self.auton_start);
        if elapsed < AUTON_DRIVE_WINDOW {
            self.drive.drive_cartesian(0.0, -1.0, 1.0, 0.0)
        } else {
            self.drive.drive_cartesian(0.0, 0.0, 0.0, 0.0)
        }
    }

    fn teleop_periodic(&mut self, game_message: &str) -> Result<(), DRV::Error> {
        // One-way latch: a new non-empty message overwrites, empty never clears
        if !game_message.is_empty() {
            self.game_data.clear();
            self.game_data.push_str(game_message);
            self.table.put_string(GAME_DATA_KEY, &self.game_data);
        }

        let desired = self.table.get_number(WHEEL_SPEED_KEY, self.speed);
        self.speed = desired;

        self.drive.drive_cartesian(
            self.lstick.x(),
            -(desired as f32),
            self.rstick.raw_axis(2),
            0.0,
        )
    }

    /// Cooperative scheduler loop: polls the driver station and dispatches
    /// periodic ticks. Disabled yields every 10ms without commanding motors;
    /// active modes tick every 20ms. Tick errors are logged, never fatal.
    pub async fn run<DS: DriverStation>(&mut self, ds: &DS) -> ! {
        loop {
            let mode = ds.mode();
            if mode == Mode::Disabled {
                if let Err(error) = self.tick(Mode::Disabled, "") {
                    tracing::error!(?error, "disabled tick failed");
                }
                Timer::after(DISABLED_POLL).await;
                continue;
            }

            let message = ds.game_specific_message();
            if let Err(error) = self.tick(mode, message) {
                tracing::error!(?error, "periodic tick failed");
            }
            Timer::after(CONTROL_PERIOD).await;
        }
    }

    /// The last desired speed seen (local fallback for dashboard misses).
    pub fn desired_speed(&self) -> f64 {
        self.speed
    }

    /// The latched game-specific message, empty until one arrives.
    pub fn game_data(&self) -> &str {
        &self.game_data
    }

    /// The channel assignments this controller was built with.
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }
}
