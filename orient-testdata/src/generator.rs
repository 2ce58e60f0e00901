// ORIENT Testdata - Synthetic IMU telemetry generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Motion profiles and wire-format rendering

use serde_json::json;

/// One synthetic IMU reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Angular rate in deg/s
    pub gyro: [f64; 3],
    /// Acceleration in g
    pub accel: [f64; 3],
    /// Magnetic field in raw units
    pub mag: [f64; 3],
}

/// Deterministic device motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionProfile {
    /// Device at rest, level, gravity on +z
    Stationary,
    /// Constant rotation about the vertical axis
    YawRate {
        /// Rotation rate in deg/s
        deg_per_second: f64,
    },
}

impl MotionProfile {
    /// The reading a device following this profile reports
    ///
    /// Profiles are time-invariant in the body frame, so the sample does not
    /// depend on elapsed time.
    pub fn sample(&self) -> ImuSample {
        let gyro = match self {
            MotionProfile::Stationary => [0.0, 0.0, 0.0],
            MotionProfile::YawRate { deg_per_second } => [0.0, 0.0, *deg_per_second],
        };
        ImuSample {
            gyro,
            accel: [0.0, 0.0, 1.0],
            mag: [21.0, 0.0, -42.0],
        }
    }
}

/// Stream of wire-format telemetry messages for one device
#[derive(Debug, Clone)]
pub struct TelemetryStream {
    device_id: String,
    profile: MotionProfile,
    sensor_group: String,
    timestamp_ms: i64,
    sample_interval_ms: i64,
}

impl TelemetryStream {
    /// Create a stream with a 50 ms interval starting at timestamp 0
    pub fn new(device_id: impl Into<String>, profile: MotionProfile) -> Self {
        Self {
            device_id: device_id.into(),
            profile,
            sensor_group: "chest".to_string(),
            timestamp_ms: 0,
            sample_interval_ms: 50,
        }
    }

    /// Set the first device-reported timestamp
    pub fn with_start_time(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Set the interval between samples
    pub fn with_sample_interval_ms(mut self, interval_ms: i64) -> Self {
        self.sample_interval_ms = interval_ms;
        self
    }

    /// Set the sensor-group segment of the topic
    pub fn with_sensor_group(mut self, group: impl Into<String>) -> Self {
        self.sensor_group = group.into();
        self
    }

    /// Produce the next `(topic, payload)` message and advance the clock
    pub fn next_message(&mut self) -> (String, Vec<u8>) {
        let topic = format!("telemetry/{}/{}", self.device_id, self.sensor_group);
        let s = self.profile.sample();

        let payload = json!({
            "timestamp": self.timestamp_ms,
            "gyro": {
                "x": {"degPerSecond": s.gyro[0]},
                "y": {"degPerSecond": s.gyro[1]},
                "z": {"degPerSecond": s.gyro[2]}
            },
            "accel": {
                "x": {"G": s.accel[0]},
                "y": {"G": s.accel[1]},
                "z": {"G": s.accel[2]}
            },
            "mag": {
                "x": {"raw": s.mag[0]},
                "y": {"raw": s.mag[1]},
                "z": {"raw": s.mag[2]}
            }
        });

        self.timestamp_ms += self.sample_interval_ms;
        (topic, serde_json::to_vec(&payload).expect("static payload shape"))
    }

    /// Produce the next `count` messages
    pub fn take_messages(&mut self, count: usize) -> Vec<(String, Vec<u8>)> {
        (0..count).map(|_| self.next_message()).collect()
    }
}
