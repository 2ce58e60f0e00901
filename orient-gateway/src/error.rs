// ORIENT Gateway - Telemetry ingest pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the ingest pipeline
//!
//! Every variant represents a per-message failure: the message is dropped and
//! logged, and no failure is ever fatal to the pipeline or visible to other
//! devices.

use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Payload is not well-formed JSON
    #[error("Malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Decoded payload fails the per-category shape checks
    #[error("Invalid {category} payload: {reason}")]
    Validation {
        /// Wire name of the message category
        category: &'static str,
        /// What the check rejected
        reason: String,
    },

    /// Topic carries no device identity
    #[error("Unroutable topic: {0}")]
    UnroutableTopic(String),

    /// Topic category has no inbound handler
    #[error("Unhandled category on topic: {0}")]
    UnhandledCategory(String),

    /// Transport rejected an outbound publish
    #[error("Publish failed: {0}")]
    Publish(String),

    /// Device store rejected a validated update
    ///
    /// Never produced by the pipeline itself; [`crate::DeviceStore`]
    /// implementations return it to report their backend's failures.
    #[error("Store update failed: {0}")]
    Store(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
