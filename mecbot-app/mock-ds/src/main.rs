//! Host-side mock driver station.
//!
//! Runs the whole control stack without robot hardware: a console drive in
//! place of the PWM backend, sine-wave joysticks, and a time-scripted mode
//! sequence (disabled, autonomous, teleop). The dashboard bridge is served
//! over a TAP interface so WebSocket clients can tune `wheelSpeed` live.

use std::convert::Infallible;

use clap::Parser;
use embassy_executor::{Executor, Spawner};
use embassy_net::{Config, Ipv4Address, Ipv4Cidr, Runner, StackResources};
use embassy_net_tuntap::TunTapDevice;
use embassy_time::Instant;
use heapless::Vec;
use mecbot_core::utils::{
    controllers::{
        drive::Drivetrain, hid::Joystick, DriverStation, Mode, RobotConfig, RobotController,
        WallClock, DASHBOARD_TABLE, WHEEL_SPEED_KEY,
    },
    table_server,
    tables::{NetworkTable, TableCommand, Value},
};
use rand_core::{OsRng, TryRngCore};
use static_cell::StaticCell;
use tracing::info;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// TAP device name
    #[clap(long, default_value = "tap0")]
    tap: String,
    /// use a static IP instead of DHCP
    #[clap(long)]
    static_ip: bool,
    /// dashboard bridge port
    #[clap(long, default_value_t = 8000)]
    port: u16,
    /// seconds to hold disabled before autonomous starts
    #[clap(long, default_value_t = 1.0)]
    disabled_secs: f32,
    /// seconds of autonomous before switching to teleop
    #[clap(long, default_value_t = 3.0)]
    auton_secs: f32,
}

/// Drive replacement that logs commanded vectors instead of touching motors.
struct ConsoleDrive;

impl Drivetrain for ConsoleDrive {
    type Error = Infallible;

    fn drive_cartesian(
        &mut self,
        forward: f32,
        strafe: f32,
        rotation: f32,
        gyro_angle: f32,
    ) -> Result<(), Self::Error> {
        info!(%forward, %strafe, %rotation, %gyro_angle, "drive command");
        Ok(())
    }
}

/// Joystick replacement sweeping each axis with a phase-shifted sine wave.
struct SineStick {
    channel: u8,
}

impl Joystick for SineStick {
    fn raw_axis(&self, axis: usize) -> f32 {
        let t = Instant::now().as_micros() as f32 / 1_000_000.0;
        (t * 0.5 + self.channel as f32 + axis as f32 * 0.7).sin()
    }
}

/// Time-scripted driver station: disabled, then autonomous, then teleop.
struct ScriptedDs {
    boot: Instant,
    disabled_secs: f32,
    auton_secs: f32,
}

impl ScriptedDs {
    fn new(disabled_secs: f32, auton_secs: f32) -> Self {
        Self {
            boot: Instant::now(),
            disabled_secs,
            auton_secs,
        }
    }
}

impl DriverStation for ScriptedDs {
    fn mode(&self) -> Mode {
        let t = self.boot.elapsed().as_millis() as f32 / 1000.0;
        if t < self.disabled_secs {
            Mode::Disabled
        } else if t < self.disabled_secs + self.auton_secs {
            Mode::Autonomous
        } else {
            Mode::Teleop
        }
    }

    fn game_specific_message(&self) -> &str {
        match self.mode() {
            Mode::Teleop => "RLR",
            _ => "",
        }
    }
}

type RigController = RobotController<ConsoleDrive, SineStick, SineStick, NetworkTable, WallClock>;

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, TunTapDevice>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn control_task(mut ctl: RigController, ds: ScriptedDs) -> ! {
    ctl.run(&ds).await
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();

    let config = RobotConfig::default();
    let ctl = RobotController::new(
        config,
        ConsoleDrive,
        SineStick {
            channel: config.left_stick_channel,
        },
        SineStick {
            channel: config.right_stick_channel,
        },
        NetworkTable::named(DASHBOARD_TABLE),
        WallClock,
    );
    let ds = ScriptedDs::new(opts.disabled_secs, opts.auton_secs);
    spawner.spawn(control_task(ctl, ds)).unwrap();

    let example = TableCommand::Put {
        t: DASHBOARD_TABLE.to_string(),
        k: WHEEL_SPEED_KEY.to_string(),
        v: Value::Number(0.5),
    };
    info!(
        example = %serde_json::to_string(&example).unwrap(),
        "tune the strafe speed by sending this over /ws"
    );

    // Parse CLI and initialize network
    let device = TunTapDevice::new(&opts.tap).unwrap();
    let net_config = if opts.static_ip {
        Config::ipv4_static(embassy_net::StaticConfigV4 {
            address: Ipv4Cidr::new(Ipv4Address::new(192, 168, 69, 2), 24),
            dns_servers: Vec::new(),
            gateway: Some(Ipv4Address::new(192, 168, 69, 1)),
        })
    } else {
        Config::dhcpv4(Default::default())
    };
    let mut seed_buf = [0; 8];
    OsRng.try_fill_bytes(&mut seed_buf).unwrap();
    let seed = u64::from_le_bytes(seed_buf);

    let resources = mecbot_core::mk_static!(StackResources<3>, StackResources::new());
    let (stack, runner) = embassy_net::new(device, net_config, resources, seed);
    spawner.spawn(net_task(runner)).unwrap();

    info!("Waiting for network link...");
    stack.wait_config_up().await;

    info!("Starting dashboard bridge on port {}", opts.port);
    table_server(0, opts.port, stack, None).await;
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
