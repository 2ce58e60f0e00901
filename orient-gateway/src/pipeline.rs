// ORIENT Gateway - Telemetry ingest pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Message pipeline
//!
//! The [`Pipeline`] ties the pieces together: an inbound message is routed by
//! topic, validated per category, and for telemetry carrying a full set of
//! IMU vectors the device's private filter is advanced by the measured time
//! delta and the resulting orientation republished. Validated raw samples,
//! configuration, and status all end up at the device store.
//!
//! The transport and the store are external collaborators behind the
//! [`Publisher`] and [`DeviceStore`] traits; the pipeline owns no connection
//! state and performs no retries. Per-message failures are logged and
//! swallowed by [`Pipeline::handle`]; one message's failure never affects
//! another device or subsequent messages.

use serde_json::Value;
use tracing::{debug, warn};

use orient::{EulerAngles, Vector3Ext};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::payload::{self, TelemetrySample};
use crate::registry::DeviceRegistry;
use crate::topic::{Category, TopicAddress};

/// Outbound boundary: serializes estimates to the pub/sub transport
///
/// Implementations take `&self`; delivery guarantees, retries, and reconnect
/// logic are the transport's concern.
pub trait Publisher: Send + Sync {
    /// Hand a serialized payload to the transport
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<()>;
}

/// Persistent device store boundary, invoked only after validation
pub trait DeviceStore: Send + Sync {
    /// Accept a validated telemetry sample
    fn push_sensor_data(&self, device_id: &str, sample: &TelemetrySample) -> Result<()>;
    /// Accept a validated configuration object
    fn update_config(&self, device_id: &str, config: &Value) -> Result<()>;
    /// Accept a validated status object
    fn update_status(&self, device_id: &str, status: &Value) -> Result<()>;
}

/// What the pipeline did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Telemetry fused into the device's estimate and republished
    Fused,
    /// First telemetry for the device: cursor seeded, no fusion yet
    Bootstrapped,
    /// Telemetry stored without fusion (incomplete IMU vectors)
    StoredRaw,
    /// Configuration stored
    ConfigStored,
    /// Status stored
    StatusStored,
}

/// Telemetry ingest pipeline
///
/// `handle` may be called concurrently for different devices; per-device
/// state is locked so same-device updates stay strictly ordered.
pub struct Pipeline<P, S> {
    registry: DeviceRegistry,
    publisher: P,
    store: S,
}

impl<P: Publisher, S: DeviceStore> Pipeline<P, S> {
    /// Create a pipeline over the given transport and store boundaries
    pub fn new(config: PipelineConfig, publisher: P, store: S) -> Self {
        Self {
            registry: DeviceRegistry::new(config.filter),
            publisher,
            store,
        }
    }

    /// Handle one inbound message, logging and swallowing any failure
    pub fn handle(&self, topic: &str, payload: &[u8]) {
        match self.process(topic, payload) {
            Ok(disposition) => debug!(topic, ?disposition, "message handled"),
            Err(error) => warn!(topic, %error, "message dropped"),
        }
    }

    /// Handle one inbound message, reporting what happened
    pub fn process(&self, topic: &str, payload: &[u8]) -> Result<Disposition> {
        let address = TopicAddress::parse(topic);

        if !address.is_routable() {
            return Err(PipelineError::UnroutableTopic(topic.to_string()));
        }

        let value = payload::decode(payload)?;

        match address.category {
            Category::Telemetry => self.ingest_telemetry(&address, value),
            Category::Configuration => {
                let config = payload::require_object("configuration", value)?;
                self.store.update_config(&address.device_id, &config)?;
                Ok(Disposition::ConfigStored)
            }
            Category::Status => {
                let status = payload::require_object("status", value)?;
                self.store.update_status(&address.device_id, &status)?;
                Ok(Disposition::StatusStored)
            }
            Category::Commands | Category::Unknown(_) => {
                Err(PipelineError::UnhandledCategory(topic.to_string()))
            }
        }
    }

    /// Registry of per-device filter state
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// The transport boundary
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// The store boundary
    pub fn store(&self) -> &S {
        &self.store
    }

    fn ingest_telemetry(&self, address: &TopicAddress, value: Value) -> Result<Disposition> {
        let mut sample = payload::telemetry_from_value(value)?;

        // The sensor-group label travels in the topic, not the payload
        if sample.sensor.is_none() {
            sample.sensor = address.extras.first().cloned();
        }

        let disposition = match sample.imu_vectors() {
            Some((gyro_dps, accel, mag)) => {
                let handle = self.registry.get_or_create(&address.device_id);
                let mut state = handle.lock().unwrap_or_else(|e| e.into_inner());

                match state.cursor.advance(sample.timestamp) {
                    None => Disposition::Bootstrapped,
                    Some(dt) => {
                        state.filter.update(gyro_dps.deg_to_rad(), accel, mag, dt);
                        let euler = state.filter.euler_angles();
                        let quat = state.filter.quaternion_components();
                        // Release the device before touching the transport
                        drop(state);

                        self.publish_estimates(&address.device_id, euler, quat)?;
                        Disposition::Fused
                    }
                }
            }
            None => Disposition::StoredRaw,
        };

        self.store.push_sensor_data(&address.device_id, &sample)?;
        Ok(disposition)
    }

    fn publish_estimates(&self, device_id: &str, euler: EulerAngles, quat: [f64; 4]) -> Result<()> {
        let euler_payload = serde_json::to_vec(&[euler.roll, euler.pitch, euler.yaw])
            .map_err(|e| PipelineError::Publish(e.to_string()))?;
        let quat_payload =
            serde_json::to_vec(&quat).map_err(|e| PipelineError::Publish(e.to_string()))?;

        self.publisher
            .publish(&format!("euler/{device_id}"), &euler_payload)?;
        self.publisher
            .publish(&format!("quat/{device_id}"), &quat_payload)?;
        Ok(())
    }
}

impl<P, S> std::fmt::Debug for Pipeline<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.to_vec()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        samples: Mutex<Vec<(String, TelemetrySample)>>,
        configs: Mutex<Vec<(String, Value)>>,
        statuses: Mutex<Vec<(String, Value)>>,
    }

    impl DeviceStore for RecordingStore {
        fn push_sensor_data(&self, device_id: &str, sample: &TelemetrySample) -> Result<()> {
            self.samples
                .lock()
                .unwrap()
                .push((device_id.to_string(), sample.clone()));
            Ok(())
        }

        fn update_config(&self, device_id: &str, config: &Value) -> Result<()> {
            self.configs
                .lock()
                .unwrap()
                .push((device_id.to_string(), config.clone()));
            Ok(())
        }

        fn update_status(&self, device_id: &str, status: &Value) -> Result<()> {
            self.statuses
                .lock()
                .unwrap()
                .push((device_id.to_string(), status.clone()));
            Ok(())
        }
    }

    fn pipeline() -> Pipeline<RecordingPublisher, RecordingStore> {
        Pipeline::new(
            PipelineConfig::default(),
            RecordingPublisher::default(),
            RecordingStore::default(),
        )
    }

    fn telemetry(timestamp: i64) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "timestamp": timestamp,
            "gyro": {"x": {"degPerSecond": 0.0}, "y": {"degPerSecond": 0.0}, "z": {"degPerSecond": 10.0}},
            "accel": {"x": {"G": 0.0}, "y": {"G": 0.0}, "z": {"G": 1.0}},
            "mag": {"x": {"raw": 20.0}, "y": {"raw": 0.0}, "z": {"raw": -40.0}}
        }))
        .unwrap()
    }

    #[test]
    fn test_first_sample_bootstraps_without_publish() {
        let p = pipeline();
        let disposition = p.process("telemetry/dev1/chest", &telemetry(1000)).unwrap();
        assert_eq!(disposition, Disposition::Bootstrapped);
        assert!(p.publisher.published.lock().unwrap().is_empty());
        assert_eq!(p.store.samples.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_second_sample_fuses_and_publishes() {
        let p = pipeline();
        p.process("telemetry/dev1/chest", &telemetry(1000)).unwrap();
        let disposition = p.process("telemetry/dev1/chest", &telemetry(1050)).unwrap();
        assert_eq!(disposition, Disposition::Fused);

        let published = p.publisher.published.lock().unwrap();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].0, "euler/dev1");
        assert_eq!(published[1].0, "quat/dev1");

        let quat: [f64; 4] = serde_json::from_slice(&published[1].1).unwrap();
        let norm = quat.iter().map(|c| c * c).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sensor_label_comes_from_topic() {
        let p = pipeline();
        p.process("telemetry/dev1/chest", &telemetry(1000)).unwrap();
        let samples = p.store.samples.lock().unwrap();
        assert_eq!(samples[0].1.sensor.as_deref(), Some("chest"));
    }

    #[test]
    fn test_unroutable_topic_never_reaches_store() {
        let p = pipeline();
        let err = p.process("status", b"{}").unwrap_err();
        assert!(matches!(err, PipelineError::UnroutableTopic(_)));
        assert!(p.store.statuses.lock().unwrap().is_empty());
    }

    #[test]
    fn test_commands_topic_is_not_handled() {
        let p = pipeline();
        let err = p.process("commands/dev1", b"{}").unwrap_err();
        assert!(matches!(err, PipelineError::UnhandledCategory(_)));
    }

    #[test]
    fn test_configuration_and_status_bypass_estimator() {
        let p = pipeline();
        p.process("configuration/dev1", br#"{"rate": 50}"#).unwrap();
        p.process("status/dev1", br#"{"battery": 80}"#).unwrap();

        assert_eq!(p.store.configs.lock().unwrap().len(), 1);
        assert_eq!(p.store.statuses.lock().unwrap().len(), 1);
        // No filter state was created
        assert_eq!(p.registry().count(), 0);
    }

    #[test]
    fn test_malformed_payload_does_not_stop_pipeline() {
        let p = pipeline();
        assert!(p.process("telemetry/dev1/chest", b"{oops").is_err());

        // handle() swallows the failure entirely
        p.handle("telemetry/dev1/chest", b"{oops");

        // The next valid message is still processed
        let disposition = p.process("telemetry/dev1/chest", &telemetry(1000)).unwrap();
        assert_eq!(disposition, Disposition::Bootstrapped);
    }

    #[test]
    fn test_telemetry_without_imu_is_stored_raw() {
        let p = pipeline();
        let disposition = p
            .process("telemetry/dev1/chest", br#"{"timestamp": 1000, "hr": 72}"#)
            .unwrap();
        assert_eq!(disposition, Disposition::StoredRaw);
        assert!(p.publisher.published.lock().unwrap().is_empty());
        assert_eq!(p.registry().count(), 0);
    }

    struct FailingStore;

    impl DeviceStore for FailingStore {
        fn push_sensor_data(&self, _: &str, _: &TelemetrySample) -> Result<()> {
            Err(PipelineError::Store("backend unavailable".to_string()))
        }

        fn update_config(&self, _: &str, _: &Value) -> Result<()> {
            Err(PipelineError::Store("backend unavailable".to_string()))
        }

        fn update_status(&self, _: &str, _: &Value) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_store_failure_surfaces_as_store_error() {
        let p = Pipeline::new(
            PipelineConfig::default(),
            RecordingPublisher::default(),
            FailingStore,
        );

        let err = p.process("telemetry/dev1/chest", &telemetry(1000)).unwrap_err();
        assert!(matches!(err, PipelineError::Store(_)));

        let err = p.process("configuration/dev1", br#"{"rate": 50}"#).unwrap_err();
        assert!(matches!(err, PipelineError::Store(_)));

        // A per-message store failure is swallowed by handle() like any other
        p.handle("telemetry/dev1/chest", &telemetry(1050));
        assert_eq!(
            p.process("status/dev1", br#"{"battery": 70}"#).unwrap(),
            Disposition::StatusStored
        );
    }

    #[test]
    fn test_missing_timestamp_rejected_before_estimator_and_store() {
        let p = pipeline();
        let err = p
            .process("telemetry/dev1/chest", br#"{"gyro": null}"#)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
        assert!(p.store.samples.lock().unwrap().is_empty());
        assert_eq!(p.registry().count(), 0);
    }
}
