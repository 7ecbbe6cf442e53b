//! Utility re-exports and helper macros for the mecanum robot.
//!
//! This module re-exports the control FSM, kinematics, tables, and the
//! dashboard bridge server:
//!
//! - `connection`: WebSocket bridge for the key-value table store
//! - `controllers`: robot FSM, drive backend, and input-device seams
//! - `math`: mecanum kinematics
//! - `tables`: named key-value tables and the `Dashboard` capability
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod connection;
pub mod controllers;
pub mod math;
pub mod tables;

pub use connection::server::run as table_server;
pub use controllers::{Mode, RobotConfig, RobotController, WallClock};
pub use math::kinematics::MecanumKinematics;
pub use tables::{Dashboard, NetworkTable};

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
