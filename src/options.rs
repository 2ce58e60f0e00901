// ORIENT - Attitude estimation for IMU telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Filter configuration
//!
//! Configuration is wire-compatible with the JSON accepted by the ingest
//! pipeline: field names are camelCase and the algorithm variants use their
//! published identifiers.

use serde::{Deserialize, Serialize};

/// Fusion algorithm variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Gradient-descent fusion (Madgwick); tuned by `beta`
    #[serde(rename = "gradient-descent-primary")]
    Madgwick,
    /// PI complementary fusion (Mahony); tuned by `kp`/`ki`
    #[serde(rename = "gradient-descent-alternative")]
    Mahony,
}

/// Configuration for an attitude filter instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    /// Expected sample rate in Hz
    ///
    /// A tuning hint carried for wire compatibility; fusion always integrates
    /// the measured inter-sample delta, never this nominal rate.
    pub sample_interval_hz: f64,

    /// Which fusion variant to run
    pub algorithm: Algorithm,

    /// Convergence-rate gain of the gradient-descent variant; smaller values
    /// give smoother estimates at higher latency
    pub beta: f64,

    /// Proportional gain of the PI variant
    pub kp: f64,

    /// Integral gain of the PI variant (0 disables integral feedback)
    pub ki: f64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            sample_interval_hz: 20.0,
            algorithm: Algorithm::Madgwick,
            beta: 0.4,
            kp: 0.5,
            ki: 0.0,
        }
    }
}

impl FilterOptions {
    /// Nominal time step in seconds implied by the sample rate hint
    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_interval_hz
    }
}
