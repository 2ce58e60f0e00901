// ORIENT Gateway - Telemetry ingest pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Payload decoding and validation
//!
//! Payloads arrive as UTF-8 JSON. Decoding to a generic value and converting
//! to a per-category record are separate steps so the error taxonomy can tell
//! a malformed payload from a structurally invalid one. Telemetry is valid
//! only with a timestamp; configuration and status only need to be objects.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PipelineError, Result};

/// One gyroscope axis, degrees per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GyroAxis {
    #[serde(rename = "degPerSecond")]
    pub deg_per_second: f64,
}

/// One accelerometer axis, g units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelAxis {
    #[serde(rename = "G")]
    pub g: f64,
}

/// One magnetometer axis, raw sensor units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagAxis {
    pub raw: f64,
}

/// Three labelled axes of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triplet<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

/// A validated telemetry sample
///
/// Fields beyond the IMU schema are preserved verbatim in `rest` so the store
/// receives the complete sample as the device reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Device-reported timestamp in milliseconds; the only mandatory field
    pub timestamp: i64,

    /// Sensor-group label; filled from the topic when the payload omits it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<String>,

    /// Angular rate reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gyro: Option<Triplet<GyroAxis>>,

    /// Acceleration reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accel: Option<Triplet<AccelAxis>>,

    /// Magnetic field reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mag: Option<Triplet<MagAxis>>,

    /// Any additional payload fields, preserved as-is
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl TelemetrySample {
    /// The three IMU vectors, if the sample carries all of them
    ///
    /// Returns `(gyro deg/s, accel g, mag raw)`; fusion requires the full
    /// set, a partial sample is stored without an estimator update.
    pub fn imu_vectors(&self) -> Option<(Vector3<f64>, Vector3<f64>, Vector3<f64>)> {
        let gyro = self.gyro.as_ref()?;
        let accel = self.accel.as_ref()?;
        let mag = self.mag.as_ref()?;

        Some((
            Vector3::new(
                gyro.x.deg_per_second,
                gyro.y.deg_per_second,
                gyro.z.deg_per_second,
            ),
            Vector3::new(accel.x.g, accel.y.g, accel.z.g),
            Vector3::new(mag.x.raw, mag.y.raw, mag.z.raw),
        ))
    }
}

/// Decode a raw payload into a generic JSON value
pub fn decode(payload: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(payload)?)
}

/// Convert a decoded value into a telemetry sample
///
/// Fails with a validation error when the timestamp is missing, null, or of
/// the wrong type, or when a present sensor block has the wrong shape.
pub fn telemetry_from_value(value: Value) -> Result<TelemetrySample> {
    serde_json::from_value(value).map_err(|e| PipelineError::Validation {
        category: "telemetry",
        reason: e.to_string(),
    })
}

/// Require a decoded configuration or status payload to be an object
pub fn require_object(category: &'static str, value: Value) -> Result<Value> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(PipelineError::Validation {
            category,
            reason: format!("expected an object, got {}", type_name(&value)),
        })
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "timestamp": 1552364503180_i64,
            "gyro": {
                "x": {"degPerSecond": 1.5},
                "y": {"degPerSecond": -0.25},
                "z": {"degPerSecond": 12.0}
            },
            "accel": {
                "x": {"G": 0.01},
                "y": {"G": -0.02},
                "z": {"G": 0.99}
            },
            "mag": {
                "x": {"raw": 210.0},
                "y": {"raw": -35.0},
                "z": {"raw": -400.0}
            },
            "battery": 87
        })
    }

    #[test]
    fn test_full_telemetry_decodes() {
        let sample = telemetry_from_value(full_payload()).unwrap();
        assert_eq!(sample.timestamp, 1552364503180);

        let (gyro, accel, mag) = sample.imu_vectors().unwrap();
        assert_eq!(gyro.z, 12.0);
        assert_eq!(accel.z, 0.99);
        assert_eq!(mag.x, 210.0);

        // Unknown fields survive round-trip to the store
        assert_eq!(sample.rest.get("battery"), Some(&json!(87)));
    }

    #[test]
    fn test_missing_timestamp_is_invalid() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("timestamp");

        let err = telemetry_from_value(payload).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Validation {
                category: "telemetry",
                ..
            }
        ));
    }

    #[test]
    fn test_null_timestamp_is_invalid() {
        let mut payload = full_payload();
        payload["timestamp"] = Value::Null;
        assert!(telemetry_from_value(payload).is_err());
    }

    #[test]
    fn test_partial_sample_has_no_imu_vectors() {
        let sample = telemetry_from_value(json!({"timestamp": 1000, "hr": 72})).unwrap();
        assert!(sample.imu_vectors().is_none());
        assert_eq!(sample.rest.get("hr"), Some(&json!(72)));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(matches!(
            decode(b"not json at all"),
            Err(PipelineError::Decode(_))
        ));
    }

    #[test]
    fn test_require_object() {
        assert!(require_object("configuration", json!({"rate": 20})).is_ok());

        let err = require_object("status", json!([1, 2, 3])).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Validation {
                category: "status",
                ..
            }
        ));

        assert!(require_object("status", Value::Null).is_err());
    }
}
