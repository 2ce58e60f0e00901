// ORIENT - Attitude estimation for IMU telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Gradient-descent fusion variant
//!
//! Minimizes the error between the measured gravity and magnetic-field
//! directions (rotated into the body frame by the current estimate) and their
//! earth-frame references, stepping the quaternion against the gradient of
//! that objective while integrating the gyro-predicted angular rate. When the
//! magnetometer is degenerate the objective reduces to the gravity term; when
//! the accelerometer is degenerate too, the cycle integrates the gyroscope
//! alone.

use nalgebra::{Matrix3x4, Matrix6x4, Quaternion, UnitQuaternion, Vector3, Vector4, Vector6};

use crate::math::{omega, Vector3Ext};
use crate::DEGENERATE_MAGNITUDE;

/// Gradient-descent attitude filter
#[derive(Debug, Clone, PartialEq)]
pub struct Madgwick {
    /// Orientation quaternion as `[w, x, y, z]`, kept at unit norm
    q: Vector4<f64>,
    /// Convergence-rate gain
    beta: f64,
}

impl Madgwick {
    /// Create a filter at identity orientation
    pub fn new(beta: f64) -> Self {
        Self {
            q: Vector4::new(1.0, 0.0, 0.0, 0.0),
            beta,
        }
    }

    /// Current orientation estimate
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::new_unchecked(Quaternion::new(self.q[0], self.q[1], self.q[2], self.q[3]))
    }

    /// Reset the estimate to identity orientation
    pub fn reset(&mut self) {
        self.q = Vector4::new(1.0, 0.0, 0.0, 0.0);
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

        // Angular rate estimate from the gyroscope alone
        let mut q_dot = 0.5 * omega(&gyro) * self.q;

        // Refine against the measurement gradient where the inputs allow it
        if accel.norm() > DEGENERATE_MAGNITUDE {
            let a = accel.safe_normalize();
            let gradient = if mag.norm() > DEGENERATE_MAGNITUDE {
                self.gradient_marg(a, mag.safe_normalize())
            } else {
                self.gradient_imu(a)
            };
            let norm = gradient.norm();
            if norm > DEGENERATE_MAGNITUDE {
                q_dot -= self.beta * gradient / norm;
            }
        }

        self.q = (self.q + q_dot * dt).normalize();
    }

    /// Gradient of the gravity-only objective (accelerometer, no magnetometer)
    fn gradient_imu(&self, a: Vector3<f64>) -> Vector4<f64> {
        let (qw, qx, qy, qz) = (self.q[0], self.q[1], self.q[2], self.q[3]);

        let f = Vector3::new(
            2.0 * (qx * qz - qw * qy) - a.x,
            2.0 * (qw * qx + qy * qz) - a.y,
            2.0 * (0.5 - qx * qx - qy * qy) - a.z,
        );

        #[rustfmt::skip]
        let jacobian = Matrix3x4::new(
            -2.0 * qy, 2.0 * qz,  -2.0 * qw, 2.0 * qx,
            2.0 * qx,  2.0 * qw,  2.0 * qz,  2.0 * qy,
            0.0,       -4.0 * qx, -4.0 * qy, 0.0,
        );

        jacobian.transpose() * f
    }

    /// Gradient of the combined gravity and magnetic-field objective
    fn gradient_marg(&self, a: Vector3<f64>, m: Vector3<f64>) -> Vector4<f64> {
        let (qw, qx, qy, qz) = (self.q[0], self.q[1], self.q[2], self.q[3]);

        // Earth-frame reference field: rotate the measurement out of the body
        // frame, then keep only its horizontal magnitude and vertical part so
        // the local inclination does not bias the estimate
        let h = self.quaternion() * m;
        let bx = (h.x * h.x + h.y * h.y).sqrt();
        let bz = h.z;

        let f = Vector6::new(
            2.0 * (qx * qz - qw * qy) - a.x,
            2.0 * (qw * qx + qy * qz) - a.y,
            2.0 * (0.5 - qx * qx - qy * qy) - a.z,
            2.0 * bx * (0.5 - qy * qy - qz * qz) + 2.0 * bz * (qx * qz - qw * qy) - m.x,
            2.0 * bx * (qx * qy - qw * qz) + 2.0 * bz * (qw * qx + qy * qz) - m.y,
            2.0 * bx * (qw * qy + qx * qz) + 2.0 * bz * (0.5 - qx * qx - qy * qy) - m.z,
        );

        // Rows 1-3 differentiate the gravity terms, rows 4-6 the field terms
        #[rustfmt::skip]
        let jacobian = Matrix6x4::new(
            -2.0 * qy,                      2.0 * qz,                       -2.0 * qw,                      2.0 * qx,
            2.0 * qx,                       2.0 * qw,                       2.0 * qz,                       2.0 * qy,
            0.0,                            -4.0 * qx,                      -4.0 * qy,                      0.0,
            -2.0 * bz * qy,                 2.0 * bz * qz,                  -4.0 * bx * qy - 2.0 * bz * qw, -4.0 * bx * qz + 2.0 * bz * qx,
            -2.0 * bx * qz + 2.0 * bz * qx, 2.0 * bx * qy + 2.0 * bz * qw,  2.0 * bx * qx + 2.0 * bz * qz,  -2.0 * bx * qw + 2.0 * bz * qy,
            2.0 * bx * qy,                  2.0 * bx * qz - 4.0 * bz * qx,  2.0 * bx * qw - 4.0 * bz * qy,  2.0 * bx * qx,
        );

        jacobian.transpose() * f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(filter: &Madgwick) -> f64 {
        filter.q.norm()
    }

    #[test]
    fn test_starts_at_identity() {
        let filter = Madgwick::new(0.4);
        assert_eq!(filter.quaternion(), UnitQuaternion::identity());
    }

    #[test]
    fn test_unit_norm_after_updates() {
        let mut filter = Madgwick::new(0.4);
        let gyro = Vector3::new(0.5, -0.2, 0.1);
        let accel = Vector3::new(0.02, -0.01, 0.99);
        let mag = Vector3::new(25.0, 3.0, -42.0);

        for _ in 0..500 {
            filter.update(gyro, accel, mag, 0.05);
            assert!((norm(&filter) - 1.0).abs() < crate::NORM_TOLERANCE);
        }
    }

    #[test]
    fn test_non_positive_dt_is_skipped() {
        let mut filter = Madgwick::new(0.4);
        filter.update(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            0.05,
        );
        let before = filter.q;

        filter.update(
            Vector3::new(9.0, 9.0, 9.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            0.0,
        );
        assert_eq!(filter.q, before);

        filter.update(
            Vector3::new(9.0, 9.0, 9.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            -0.5,
        );
        assert_eq!(filter.q, before);

        filter.update(
            Vector3::new(9.0, 9.0, 9.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            f64::NAN,
        );
        assert_eq!(filter.q, before);
    }

    #[test]
    fn test_degenerate_accel_integrates_gyro_only() {
        let mut with_guard = Madgwick::new(0.4);
        let mut reference = Madgwick::new(0.0);

        let gyro = Vector3::new(0.1, 0.2, -0.3);
        for _ in 0..50 {
            with_guard.update(gyro, Vector3::zeros(), Vector3::zeros(), 0.01);
            reference.update(gyro, Vector3::zeros(), Vector3::zeros(), 0.01);
        }

        // With no usable accelerometer the beta step must not fire, so both
        // trajectories are pure gyro integration
        assert_eq!(with_guard.q, reference.q);
        assert!((norm(&with_guard) - 1.0).abs() < crate::NORM_TOLERANCE);
    }

    #[test]
    fn test_degenerate_mag_falls_back_to_imu() {
        let mut filter = Madgwick::new(0.4);
        let accel = Vector3::new(0.0, 0.0, 1.0);

        for _ in 0..200 {
            filter.update(Vector3::zeros(), accel, Vector3::zeros(), 0.05);
        }
        assert!((norm(&filter) - 1.0).abs() < crate::NORM_TOLERANCE);

        // A stationary level device should stay close to identity
        let (roll, pitch, _) = filter.quaternion().euler_angles();
        assert!(roll.abs() < 1e-3);
        assert!(pitch.abs() < 1e-3);
    }

    #[test]
    fn test_converges_toward_measured_gravity() {
        let mut filter = Madgwick::new(0.4);
        // Device rolled 90 degrees: gravity along +y in the body frame
        let accel = Vector3::new(0.0, 1.0, 0.0);

        for _ in 0..2000 {
            filter.update(Vector3::zeros(), accel, Vector3::zeros(), 0.05);
        }

        let (roll, _, _) = filter.quaternion().euler_angles();
        assert!(
            (roll - std::f64::consts::FRAC_PI_2).abs() < 0.05,
            "roll {roll} should approach pi/2"
        );
    }
}
