// ORIENT Gateway - Basic Example
//
// This example feeds synthetic telemetry from two devices through the
// pipeline with an in-memory transport and store, and prints the fused
// orientation estimates.

use std::sync::Mutex;

use orient_gateway::{DeviceStore, Pipeline, PipelineConfig, Publisher, TelemetrySample};
use orient_testdata::{MotionProfile, TelemetryStream};
use serde_json::Value;

struct PrintingPublisher;

impl Publisher for PrintingPublisher {
    fn publish(&self, topic: &str, payload: &[u8]) -> orient_gateway::Result<()> {
        println!("  -> {} {}", topic, String::from_utf8_lossy(payload));
        Ok(())
    }
}

#[derive(Default)]
struct CountingStore {
    samples: Mutex<usize>,
}

impl DeviceStore for CountingStore {
    fn push_sensor_data(&self, _: &str, _: &TelemetrySample) -> orient_gateway::Result<()> {
        *self.samples.lock().unwrap() += 1;
        Ok(())
    }

    fn update_config(&self, _: &str, _: &Value) -> orient_gateway::Result<()> {
        Ok(())
    }

    fn update_status(&self, _: &str, _: &Value) -> orient_gateway::Result<()> {
        Ok(())
    }
}

fn main() {
    println!("=== ORIENT Gateway Basic Example ===\n");

    let pipeline = Pipeline::new(
        PipelineConfig::default(),
        PrintingPublisher,
        CountingStore::default(),
    );

    let mut spinning = TelemetryStream::new("98072d27a984", MotionProfile::YawRate {
        deg_per_second: 30.0,
    })
    .with_start_time(1552364503000);

    let mut still =
        TelemetryStream::new("c4f3a2b1d0e9", MotionProfile::Stationary).with_start_time(1552364503000);

    println!("Feeding 10 interleaved samples per device:");
    for _ in 0..10 {
        let (topic, payload) = spinning.next_message();
        pipeline.handle(&topic, &payload);
        let (topic, payload) = still.next_message();
        pipeline.handle(&topic, &payload);
    }

    println!("\nDevices with filter state: {:?}", pipeline.registry().device_ids());
    println!(
        "Samples forwarded to store: {}",
        pipeline.store().samples.lock().unwrap()
    );

    println!("\nStatus and configuration bypass the estimator:");
    pipeline.handle("status/98072d27a984", br#"{"battery": 77}"#);
    pipeline.handle("configuration/98072d27a984", br#"{"sampleIntervalHz": 20}"#);

    println!("Done.");
}
