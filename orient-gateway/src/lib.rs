// ORIENT Gateway - Telemetry ingest pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # ORIENT Gateway - Telemetry ingest pipeline
//!
//! Routes inertial-measurement messages from a publish-subscribe transport
//! into per-device attitude filters and republishes the fused orientation.
//!
//! ## Overview
//!
//! Inbound topics follow `telemetry/<deviceId>/<sensorGroup>`,
//! `configuration/<deviceId>`, and `status/<deviceId>`. Telemetry with a full
//! set of gyro/accel/mag vectors advances the device's private
//! [`orient::AttitudeFilter`] by the measured inter-sample delta; estimates
//! go back out on `euler/<deviceId>` and `quat/<deviceId>`. Every validated
//! message is forwarded to the device store.
//!
//! The transport and the store are boundaries, not parts of this crate:
//! implement [`Publisher`] and [`DeviceStore`] over whatever client the host
//! process uses and feed received messages to [`Pipeline::handle`].
//!
//! ## Quick Start
//!
//! ```rust
//! use orient_gateway::{DeviceStore, Pipeline, PipelineConfig, Publisher, TelemetrySample};
//! use serde_json::Value;
//!
//! struct NullPublisher;
//! impl Publisher for NullPublisher {
//!     fn publish(&self, _topic: &str, _payload: &[u8]) -> orient_gateway::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! struct NullStore;
//! impl DeviceStore for NullStore {
//!     fn push_sensor_data(&self, _: &str, _: &TelemetrySample) -> orient_gateway::Result<()> {
//!         Ok(())
//!     }
//!     fn update_config(&self, _: &str, _: &Value) -> orient_gateway::Result<()> {
//!         Ok(())
//!     }
//!     fn update_status(&self, _: &str, _: &Value) -> orient_gateway::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), NullPublisher, NullStore);
//! pipeline.handle("status/dev1", br#"{"battery": 93}"#);
//! ```

// Modules
pub mod config;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod registry;
pub mod topic;

// Re-exports for convenient access
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use payload::{AccelAxis, GyroAxis, MagAxis, TelemetrySample, Triplet};
pub use pipeline::{DeviceStore, Disposition, Pipeline, Publisher};
pub use registry::{DeviceHandle, DeviceRegistry, DeviceState, TimeCursor};
pub use topic::{Category, TopicAddress};
