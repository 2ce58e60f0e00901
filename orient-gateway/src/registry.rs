// ORIENT Gateway - Telemetry ingest pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-device filter state
//!
//! Each device owns a private attitude filter and a private time cursor,
//! created lazily on first telemetry and never shared or aliased between
//! devices. Handles are `Arc<Mutex<_>>` so distinct devices update in
//! parallel while same-device updates stay strictly ordered.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use orient::{AttitudeFilter, FilterOptions};
use tracing::debug;

/// Per-device monotonic time cursor
///
/// Tracks the last device-reported timestamp and produces elapsed-seconds
/// deltas between consecutive samples. The first sample only seeds the
/// cursor: there is no prior sample to difference against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeCursor {
    last_ms: Option<i64>,
}

impl TimeCursor {
    /// A cursor that has seen no samples yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a timestamp and return the elapsed seconds since the previous
    /// one, or `None` for the first sample
    ///
    /// The cursor always advances, even across a non-monotonic timestamp;
    /// the estimator is responsible for refusing to integrate a non-positive
    /// delta.
    pub fn advance(&mut self, timestamp_ms: i64) -> Option<f64> {
        self.last_ms
            .replace(timestamp_ms)
            .map(|prev| (timestamp_ms - prev) as f64 / 1000.0)
    }

    /// The last observed timestamp, if any
    pub fn last(&self) -> Option<i64> {
        self.last_ms
    }
}

/// Filter state exclusively owned by one device
#[derive(Debug)]
pub struct DeviceState {
    /// The device's attitude filter
    pub filter: AttitudeFilter,
    /// The device's time cursor
    pub cursor: TimeCursor,
}

impl DeviceState {
    fn new(options: FilterOptions) -> Self {
        Self {
            filter: AttitudeFilter::new(options),
            cursor: TimeCursor::new(),
        }
    }
}

/// Shared handle to one device's state; lock it to update
pub type DeviceHandle = Arc<Mutex<DeviceState>>;

/// Registry of per-device filter state, keyed by device identity
///
/// No eviction policy: state lives for the process's duration, which is
/// acceptable for small, known device populations. Unbounded device churn
/// needs an explicit capacity policy on top of [`DeviceRegistry::remove`].
pub struct DeviceRegistry {
    devices: RwLock<HashMap<String, DeviceHandle>>,
    options: FilterOptions,
}

impl DeviceRegistry {
    /// Create an empty registry; every device created later uses `options`
    pub fn new(options: FilterOptions) -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
            options,
        }
    }

    /// Return the device's state handle, creating it on first reference
    pub fn get_or_create(&self, device_id: &str) -> DeviceHandle {
        if let Some(handle) = self.read().get(device_id) {
            return Arc::clone(handle);
        }

        let mut devices = self.write();
        // A concurrent caller may have created it between the locks
        Arc::clone(devices.entry(device_id.to_string()).or_insert_with(|| {
            debug!(device_id, "creating filter state");
            Arc::new(Mutex::new(DeviceState::new(self.options)))
        }))
    }

    /// Whether the device has state
    pub fn contains(&self, device_id: &str) -> bool {
        self.read().contains_key(device_id)
    }

    /// Number of devices with state
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Identities of all devices with state
    pub fn device_ids(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Drop a device's state, for explicit session teardown
    pub fn remove(&self, device_id: &str) -> Option<DeviceHandle> {
        self.write().remove(device_id)
    }

    /// The options every created filter uses
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, DeviceHandle>> {
        self.devices.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, DeviceHandle>> {
        self.devices.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("count", &self.count())
            .field("options", &self.options)
            .finish()
    }
}
