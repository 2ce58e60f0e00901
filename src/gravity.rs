// ORIENT - Attitude estimation for IMU telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Gravity compensation
//!
//! Removes the orientation-implied gravity component from a raw
//! accelerometer reading, approximating the non-gravitational (linear)
//! acceleration. Pure functions with no state; the ingest pipeline does not
//! consume the result, it is provided as an independent utility.

use nalgebra::{UnitQuaternion, Vector3};

/// Direction of gravity in the body frame implied by the orientation `q`
///
/// `g = [2(q1q3 − q0q2), 2(q0q1 + q2q3), q0² − q1² − q2² + q3²]`
/// for `q = (q0, q1, q2, q3) = (w, x, y, z)`.
pub fn expected_gravity(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);
    Vector3::new(
        2.0 * (q1 * q3 - q0 * q2),
        2.0 * (q0 * q1 + q2 * q3),
        q0 * q0 - q1 * q1 - q2 * q2 + q3 * q3,
    )
}

/// Subtract the expected gravity direction from a measured acceleration
///
/// `accel` is the raw accelerometer reading in g; the result is the linear
/// acceleration in g, also in the body frame.
pub fn compensate(q: &UnitQuaternion<f64>, accel: &Vector3<f64>) -> Vector3<f64> {
    accel - expected_gravity(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_gravity_points_up() {
        let g = expected_gravity(&UnitQuaternion::identity());
        assert_relative_eq!(g, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_stationary_device_compensates_to_zero() {
        let accel = Vector3::new(0.0, 0.0, 1.0);
        let linear = compensate(&UnitQuaternion::identity(), &accel);
        assert_relative_eq!(linear, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_rolled_device_compensates_to_zero() {
        // 90 degree roll: gravity reads along +y in the body frame
        let q = UnitQuaternion::from_euler_angles(std::f64::consts::FRAC_PI_2, 0.0, 0.0);
        let accel = Vector3::new(0.0, 1.0, 0.0);
        let linear = compensate(&q, &accel);
        assert_relative_eq!(linear, Vector3::zeros(), epsilon = 1e-9);
    }

    #[test]
    fn test_residual_acceleration_survives() {
        let accel = Vector3::new(0.2, 0.0, 1.0);
        let linear = compensate(&UnitQuaternion::identity(), &accel);
        assert_relative_eq!(linear, Vector3::new(0.2, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_gravity_is_unit_length_for_any_orientation() {
        let q = UnitQuaternion::from_euler_angles(0.3, -1.1, 2.4);
        assert_relative_eq!(expected_gravity(&q).norm(), 1.0, epsilon = 1e-12);
    }
}
