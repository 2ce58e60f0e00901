// ORIENT - Attitude estimation for IMU telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # ORIENT - Attitude estimation for IMU telemetry
//!
//! Quaternion-based orientation filters for fusing gyroscope, accelerometer,
//! and magnetometer readings into a continuously updated 3-D attitude
//! estimate.
//!
//! ## Key Features
//!
//! - **Two fusion variants**: gradient-descent (Madgwick) and PI
//!   complementary (Mahony), selected by configuration
//! - **Unit-norm guarantee**: the quaternion is renormalized after every
//!   update
//! - **Degenerate-input guards**: near-zero acceleration or magnetic field
//!   skips the affected correction term instead of dividing by zero
//! - **Pure numeric core**: no I/O, no logging, no allocation in the update
//!   path
//!
//! ## Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use orient::{AttitudeFilter, FilterOptions, Vector3Ext};
//!
//! let mut filter = AttitudeFilter::new(FilterOptions::default());
//!
//! let gyro = Vector3::new(1.2, -0.4, 0.1).deg_to_rad(); // rad/s
//! let accel = Vector3::new(0.0, 0.0, 1.0);              // g
//! let mag = Vector3::new(22.0, 4.0, -38.0);             // raw units
//!
//! filter.update(gyro, accel, mag, 0.05); // 50 ms step
//!
//! let euler = filter.euler_angles();
//! println!("roll={} pitch={} yaw={}", euler.roll, euler.pitch, euler.yaw);
//! ```
//!
//! ## Modules
//!
//! - [`filter`]: the [`AttitudeFilter`] facade over both variants
//! - [`madgwick`]: gradient-descent fusion
//! - [`mahony`]: PI complementary fusion
//! - [`gravity`]: gravity compensation of raw acceleration
//! - [`options`]: filter configuration
//! - [`math`]: vector/quaternion helpers

// Modules
pub mod filter;
pub mod gravity;
pub mod madgwick;
pub mod mahony;
pub mod math;
pub mod options;

// Re-exports for convenient access
pub use filter::{AttitudeFilter, EulerAngles};
pub use gravity::{compensate, expected_gravity};
pub use madgwick::Madgwick;
pub use mahony::Mahony;
pub use math::{Vector3Ext, DEG_TO_RAD, RAD_TO_DEG};
pub use options::{Algorithm, FilterOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Magnitudes below this are treated as degenerate sensor input
pub const DEGENERATE_MAGNITUDE: f64 = 1e-9;

/// Tolerance on the unit-norm invariant of the orientation quaternion
pub const NORM_TOLERANCE: f64 = 1e-6;
