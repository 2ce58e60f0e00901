// ORIENT - Attitude estimation for IMU telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! PI complementary fusion variant
//!
//! Corrects the gyro-integrated orientation with the cross-product error
//! between the measured gravity/field directions and the directions implied
//! by the current estimate, driven through a proportional-integral
//! controller. With `ki = 0` the integral path is disabled and the filter is
//! a plain complementary filter.

use nalgebra::{Quaternion, UnitQuaternion, Vector3, Vector4};

use crate::math::{omega, Vector3Ext};
use crate::DEGENERATE_MAGNITUDE;

/// PI complementary attitude filter
#[derive(Debug, Clone, PartialEq)]
pub struct Mahony {
    /// Orientation quaternion as `[w, x, y, z]`, kept at unit norm
    q: Vector4<f64>,
    /// Proportional gain
    kp: f64,
    /// Integral gain
    ki: f64,
    /// Accumulated integral feedback
    integral: Vector3<f64>,
}

impl Mahony {
    /// Create a filter at identity orientation
    pub fn new(kp: f64, ki: f64) -> Self {
        Self {
            q: Vector4::new(1.0, 0.0, 0.0, 0.0),
            kp,
            ki,
            integral: Vector3::zeros(),
        }
    }

    /// Current orientation estimate
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::new_unchecked(Quaternion::new(self.q[0], self.q[1], self.q[2], self.q[3]))
    }

    /// Reset the estimate to identity orientation and clear the integral term
    pub fn reset(&mut self) {
        self.q = Vector4::new(1.0, 0.0, 0.0, 0.0);
        self.integral = Vector3::zeros();
    }

    /// Advance the estimate by one sample
    ///
    /// # Arguments
    /// * `gyro` - angular rate in rad/s
    /// * `accel` - acceleration in g
    /// * `mag` - magnetic field in any consistent unit
    /// * `dt` - elapsed seconds since the previous sample
    ///
    /// A non-positive or non-finite `dt` leaves the state untouched.
    pub fn update(&mut self, gyro: Vector3<f64>, accel: Vector3<f64>, mag: Vector3<f64>, dt: f64) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }

        let mut rate = gyro;

        if accel.norm() > DEGENERATE_MAGNITUDE {
            let a = accel.safe_normalize();

            // Error is the cross product between the measured directions and
            // the directions implied by the current estimate
            let mut half_error = a.cross(&self.half_gravity());
            if mag.norm() > DEGENERATE_MAGNITUDE {
                let m = mag.safe_normalize();
                half_error += m.cross(&self.half_field(m));
            }

            if self.ki > 0.0 {
                self.integral += 2.0 * self.ki * half_error * dt;
                rate += self.integral;
            } else {
                self.integral = Vector3::zeros();
            }
            rate += 2.0 * self.kp * half_error;
        }

        let q_dot = 0.5 * omega(&rate) * self.q;
        self.q = (self.q + q_dot * dt).normalize();
    }

    /// Half the gravity direction implied by the current estimate, in the
    /// body frame
    fn half_gravity(&self) -> Vector3<f64> {
        let (qw, qx, qy, qz) = (self.q[0], self.q[1], self.q[2], self.q[3]);
        Vector3::new(
            qx * qz - qw * qy,
            qw * qx + qy * qz,
            qw * qw - 0.5 + qz * qz,
        )
    }

    /// Half the magnetic-field direction implied by the current estimate and
    /// the earth-frame reference derived from the measurement `m`
    fn half_field(&self, m: Vector3<f64>) -> Vector3<f64> {
        let (qw, qx, qy, qz) = (self.q[0], self.q[1], self.q[2], self.q[3]);

        // Reference field keeps only the horizontal magnitude and vertical
        // component of the measurement rotated into the earth frame
        let h = self.quaternion() * m;
        let bx = (h.x * h.x + h.y * h.y).sqrt();
        let bz = h.z;

        Vector3::new(
            bx * (0.5 - qy * qy - qz * qz) + bz * (qx * qz - qw * qy),
            bx * (qx * qy - qw * qz) + bz * (qw * qx + qy * qz),
            bx * (qw * qy + qx * qz) + bz * (0.5 - qx * qx - qy * qy),
        )
    }
}
