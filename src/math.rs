// ORIENT - Attitude estimation for IMU telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Mathematical helpers shared by the fusion variants

use nalgebra::{Matrix4, Vector3};

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees conversion factor
pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

/// Extension trait for `Vector3<f64>` operations
pub trait Vector3Ext {
    /// Normalize the vector, returning the zero vector if the magnitude is
    /// below the degenerate threshold
    fn safe_normalize(&self) -> Vector3<f64>;

    /// Convert a vector of degrees to radians
    fn deg_to_rad(&self) -> Vector3<f64>;

    /// Convert a vector of radians to degrees
    fn rad_to_deg(&self) -> Vector3<f64>;
}

impl Vector3Ext for Vector3<f64> {
    fn safe_normalize(&self) -> Vector3<f64> {
        let mag = self.norm();
        if mag > crate::DEGENERATE_MAGNITUDE {
            *self / mag
        } else {
            Vector3::zeros()
        }
    }

    fn deg_to_rad(&self) -> Vector3<f64> {
        *self * DEG_TO_RAD
    }

    fn rad_to_deg(&self) -> Vector3<f64> {
        *self * RAD_TO_DEG
    }
}

/// Angular-rate matrix Ω(ω) such that the quaternion time derivative is
/// `dq/dt = 0.5 · Ω(ω) · q` for a quaternion stored as `[w, x, y, z]`.
pub fn omega(w: &Vector3<f64>) -> Matrix4<f64> {
    Matrix4::new(
        0.0, -w.x, -w.y, -w.z, //
        w.x, 0.0, w.z, -w.y, //
        w.y, -w.z, 0.0, w.x, //
        w.z, w.y, -w.x, 0.0,
    )
}
