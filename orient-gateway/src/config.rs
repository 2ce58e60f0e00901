// ORIENT Gateway - Telemetry ingest pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Pipeline configuration

use orient::FilterOptions;
use serde::{Deserialize, Serialize};

/// Configuration for an ingest pipeline
///
/// Deserializable from the host process's JSON configuration; all fields
/// default to the values the pipeline shipped with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Options applied to every device's attitude filter
    pub filter: FilterOptions,
}

impl PipelineConfig {
    /// Configuration with the given filter options
    pub fn with_filter(filter: FilterOptions) -> Self {
        Self { filter }
    }
}
