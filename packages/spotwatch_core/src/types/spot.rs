//! types/spot.rs
//!
//! Wire types for the spot directory and sensor reading endpoints.
//! These mirror the upstream JSON payloads; no normalization happens
//! here. Timestamps stay untyped until `timestamp::normalize` because
//! upstream does not commit to an encoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An IoT collection point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    pub spot_id: String,
    pub spot_name: String,
}

/// One sensor sample for a spot, newest-first in the data endpoint's
/// response array.
///
/// Numeric fields are optional: a sensor that does not report an axis
/// omits or nulls it, and consumers render a placeholder instead of
/// treating that as an error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Raw timestamp exactly as sent by upstream. Seconds, milliseconds,
    /// ISO strings and wrapper objects all occur in practice.
    #[serde(default)]
    pub timestamp: Value,

    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub acceleration_axial: Option<f64>,
    #[serde(default)]
    pub acceleration_horizontal: Option<f64>,
    #[serde(default)]
    pub acceleration_vertical: Option<f64>,

    #[serde(default)]
    pub velocity_axial: Option<f64>,
    #[serde(default)]
    pub velocity_horizontal: Option<f64>,
    #[serde(default)]
    pub velocity_vertical: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_tolerates_missing_fields() {
        let reading: Reading = serde_json::from_str(r#"{"timestamp": 1700000000}"#).unwrap();
        assert_eq!(reading.timestamp, serde_json::json!(1700000000));
        assert!(reading.temperature.is_none());
        assert!(reading.velocity_vertical.is_none());
    }

    #[test]
    fn test_reading_tolerates_null_and_unknown_fields() {
        let reading: Reading = serde_json::from_str(
            r#"{"timestamp": "2024-11-14T12:00:00Z", "temperature": null, "battery": 97}"#,
        )
        .unwrap();
        assert!(reading.temperature.is_none());
        assert!(reading.timestamp.is_string());
    }

    #[test]
    fn test_reading_without_timestamp_defaults_to_null() {
        let reading: Reading = serde_json::from_str(r#"{"temperature": 21.5}"#).unwrap();
        assert!(reading.timestamp.is_null());
        assert_eq!(reading.temperature, Some(21.5));
    }

    #[test]
    fn test_spot_round_trip() {
        let spot = Spot {
            spot_id: "spot-7".into(),
            spot_name: "Pump house".into(),
        };
        let json = serde_json::to_string(&spot).unwrap();
        let restored: Spot = serde_json::from_str(&json).unwrap();
        assert_eq!(spot, restored);
    }
}
