//! Named key-value tables shared with the dashboard.
//!
//! The robot publishes telemetry and reads tunable values through the
//! [`Dashboard`] capability. [`NetworkTable`] is the in-process
//! implementation: a handle onto a process-wide store of named tables, also
//! reachable from the WebSocket bridge in `connection::server`. Reads and
//! writes are best-effort and tolerant of staleness; a missing key yields the
//! caller's default.

extern crate alloc;

use alloc::string::{String, ToString};
use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use hashbrown::HashMap;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// A single table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

/// Wire command accepted by the dashboard bridge.
///
/// Serialized as JSON with tag `"tc"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tc", rename_all = "snake_case")]
pub enum TableCommand {
    /// Store `v` under key `k` in table `t`.
    Put { t: String, k: String, v: Value },
    /// Fetch the value under key `k` in table `t`.
    Get { t: String, k: String },
}

/// Injected capability for the robot's dashboard access.
///
/// Implementations use interior mutability; the controller only ever holds a
/// shared handle. All operations are infallible by contract: a failed or
/// missing read falls back to the caller's default.
pub trait Dashboard {
    /// Read a numeric key, returning `default` when absent or non-numeric.
    fn get_number(&self, key: &str, default: f64) -> f64;
    /// Store a numeric value under `key`.
    fn put_number(&self, key: &str, value: f64);
    /// Store a string value under `key`.
    fn put_string(&self, key: &str, value: &str);
}

impl<T: Dashboard + ?Sized> Dashboard for &T {
    fn get_number(&self, key: &str, default: f64) -> f64 {
        (**self).get_number(key, default)
    }

    fn put_number(&self, key: &str, value: f64) {
        (**self).put_number(key, value)
    }

    fn put_string(&self, key: &str, value: &str) {
        (**self).put_string(key, value)
    }
}

type TableMap = HashMap<String, HashMap<String, Value>>;

lazy_static! {
    static ref TABLES: Mutex<CriticalSectionRawMutex, RefCell<TableMap>> =
        Mutex::new(RefCell::new(HashMap::new()));
}

/// Handle to a named table in the process-wide store.
///
/// Handles are cheap to clone and may coexist for the same table; the store
/// itself lives for the whole process.
#[derive(Debug, Clone)]
pub struct NetworkTable {
    name: String,
}

impl NetworkTable {
    /// Obtain a handle to the table with the given name, creating it lazily
    /// on first write.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Fetch the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        TABLES.lock(|tables| {
            tables
                .borrow()
                .get(&self.name)
                .and_then(|table| table.get(key))
                .cloned()
        })
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: &str, value: Value) {
        TABLES.lock(|tables| {
            tables
                .borrow_mut()
                .entry(self.name.clone())
                .or_insert_with(HashMap::new)
                .insert(key.to_string(), value);
        });
    }
}

impl Dashboard for NetworkTable {
    fn get_number(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(Value::Number(n)) => n,
            _ => default,
        }
    }

    fn put_number(&self, key: &str, value: f64) {
        self.put(key, Value::Number(value));
    }

    fn put_string(&self, key: &str, value: &str) {
        self.put(key, Value::Text(value.to_string()));
    }
}
