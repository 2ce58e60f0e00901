// ORIENT Gateway - Telemetry ingest pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Topic routing
//!
//! Parses hierarchical slash-delimited addresses such as
//! `telemetry/98072d27a984/chest` into a category, a device identity, and any
//! remaining segments. Parsing never fails: a missing device identity yields
//! an empty string, which the pipeline treats as unroutable.

use std::fmt;

/// Message category, taken from the first topic segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// Sensor readings: `telemetry/<deviceId>/<sensorGroup>`
    Telemetry,
    /// Device configuration: `configuration/<deviceId>`
    Configuration,
    /// Device status: `status/<deviceId>`
    Status,
    /// Outbound command channel; not handled inbound
    Commands,
    /// Anything else, kept verbatim
    Unknown(String),
}

impl Category {
    fn from_segment(segment: &str) -> Self {
        match segment {
            "telemetry" => Category::Telemetry,
            "configuration" => Category::Configuration,
            "status" => Category::Status,
            "commands" => Category::Commands,
            other => Category::Unknown(other.to_string()),
        }
    }

    /// Wire name of the category
    pub fn as_str(&self) -> &str {
        match self {
            Category::Telemetry => "telemetry",
            Category::Configuration => "configuration",
            Category::Status => "status",
            Category::Commands => "commands",
            Category::Unknown(other) => other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed topic address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicAddress {
    /// Message category (first segment)
    pub category: Category,
    /// Device identity (second segment, empty if absent)
    pub device_id: String,
    /// Remaining segments, in order
    pub extras: Vec<String>,
}

impl TopicAddress {
    /// Parse a slash-delimited address
    ///
    /// Never errors; malformed input simply produces an empty device identity.
    pub fn parse(address: &str) -> Self {
        let mut segments = address.split('/');

        let category = Category::from_segment(segments.next().unwrap_or(""));
        let device_id = segments.next().unwrap_or("").to_string();
        let extras = segments.map(str::to_string).collect();

        Self {
            category,
            device_id,
            extras,
        }
    }

    /// A topic is routable only when it names a device
    pub fn is_routable(&self) -> bool {
        !self.device_id.is_empty()
    }
}
