//! Core control logic for a four-wheel mecanum competition robot on no-std
//! embedded platforms.
//!
//! For a runnable host-side rig, see the `mock-ds` crate in this workspace.
#![no_std]

pub mod utils;
