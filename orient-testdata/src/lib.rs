// ORIENT Testdata - Synthetic IMU telemetry generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # ORIENT Testdata
//!
//! Synthetic IMU telemetry for exercising the ORIENT pipeline in tests and
//! demos: deterministic motion profiles rendered as the wire-format JSON
//! payloads a wearable device would publish.
//!
//! ## Quick Start
//!
//! ```rust
//! use orient_testdata::{MotionProfile, TelemetryStream};
//!
//! let mut stream = TelemetryStream::new("dev1", MotionProfile::YawRate { deg_per_second: 15.0 })
//!     .with_start_time(1552364503000)
//!     .with_sample_interval_ms(50);
//!
//! let (topic, payload) = stream.next_message();
//! assert_eq!(topic, "telemetry/dev1/chest");
//! assert!(payload.starts_with(b"{"));
//! ```

mod generator;

pub use generator::{ImuSample, MotionProfile, TelemetryStream};
