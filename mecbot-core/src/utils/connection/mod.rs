//! Module Exports
//!
//! This file exports the key modules used in the dashboard bridge
//! implementation.
//!
//! # Modules
//! - `server`: Manages the WebSocket bridge, routes, and table commands.

/// Module for managing the WebSocket bridge, including routes and connection
/// handling.
pub mod server;
