// ORIENT - Attitude estimation for IMU telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Attitude filter facade
//!
//! [`AttitudeFilter`] selects a fusion variant from [`FilterOptions`] and
//! exposes a single update/query surface, so callers never branch on the
//! algorithm themselves.

use nalgebra::{UnitQuaternion, Vector3};

use crate::madgwick::Madgwick;
use crate::mahony::Mahony;
use crate::math::RAD_TO_DEG;
use crate::options::{Algorithm, FilterOptions};

/// Euler angles in degrees
///
/// Derived from the quaternion by the standard conversion; accuracy degrades
/// near pitch = ±90° (gimbal lock), which is a documented limitation of the
/// representation, not of the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    /// Rotation about the x axis, degrees
    pub roll: f64,
    /// Rotation about the y axis, degrees
    pub pitch: f64,
    /// Rotation about the z axis, degrees
    pub yaw: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Variant {
    Madgwick(Madgwick),
    Mahony(Mahony),
}

/// Configured attitude filter for a single device
#[derive(Debug, Clone, PartialEq)]
pub struct AttitudeFilter {
    variant: Variant,
    options: FilterOptions,
}

impl AttitudeFilter {
    /// Create a filter at identity orientation
    pub fn new(options: FilterOptions) -> Self {
        let variant = match options.algorithm {
            Algorithm::Madgwick => Variant::Madgwick(Madgwick::new(options.beta)),
            Algorithm::Mahony => Variant::Mahony(Mahony::new(options.kp, options.ki)),
        };
        Self { variant, options }
    }

    /// Advance the estimate by one sample
    ///
    /// # Arguments
    /// * `gyro` - angular rate in rad/s
    /// * `accel` - acceleration in g
    /// * `mag` - magnetic field in any consistent unit
    /// * `dt` - elapsed seconds since the previous sample
    ///
    /// Degenerate inputs are guarded per variant: a non-positive `dt` leaves
    /// the state untouched, a near-zero acceleration or magnetic field skips
    /// the corresponding correction term.
    pub fn update(&mut self, gyro: Vector3<f64>, accel: Vector3<f64>, mag: Vector3<f64>, dt: f64) {
        match &mut self.variant {
            Variant::Madgwick(f) => f.update(gyro, accel, mag, dt),
            Variant::Mahony(f) => f.update(gyro, accel, mag, dt),
        }
    }

    /// Current orientation estimate (unit norm)
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        match &self.variant {
            Variant::Madgwick(f) => f.quaternion(),
            Variant::Mahony(f) => f.quaternion(),
        }
    }

    /// Orientation as `[w, x, y, z]` components
    pub fn quaternion_components(&self) -> [f64; 4] {
        let q = self.quaternion();
        [q.w, q.i, q.j, q.k]
    }

    /// Orientation as Euler angles in degrees
    pub fn euler_angles(&self) -> EulerAngles {
        let (roll, pitch, yaw) = self.quaternion().euler_angles();
        EulerAngles {
            roll: roll * RAD_TO_DEG,
            pitch: pitch * RAD_TO_DEG,
            yaw: yaw * RAD_TO_DEG,
        }
    }

    /// The options this filter was created with
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Reset to identity orientation, keeping the configuration
    pub fn reset(&mut self) {
        match &mut self.variant {
            Variant::Madgwick(f) => f.reset(),
            Variant::Mahony(f) => f.reset(),
        }
    }
}
