//! # Pose Observation Interface
//!
//! Observations of the leader vehicle, as seen from the follower.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_nanoseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An observation of the leader's pose relative to the follower.
///
/// Position and heading are expressed in the follower's body frame at the instant the
/// observation was captured: X forwards, Y to the left, heading positive anticlockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehiclePose {
    /// UTC time at which the observation was captured (not when it was sent).
    #[serde(with = "ts_nanoseconds")]
    pub timestamp: DateTime<Utc>,

    /// True if the leader was detected. When false the remaining fields carry no information.
    pub detection: bool,

    /// Angle the follower must turn through to face the leader, this is the bearing of the
    /// leader for detectors which report position only.
    ///
    /// Units: radians
    pub theta_rad: f64,

    /// Forward offset of the leader.
    ///
    /// Units: meters
    pub x_m: f64,

    /// Lateral offset of the leader.
    ///
    /// Units: meters
    pub y_m: f64,

    /// Auxiliary angle reported by some detectors. Not used for control.
    ///
    /// Units: radians
    #[serde(default)]
    pub psi_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VehiclePose {
    /// An observation stating the leader could not be seen at `timestamp`.
    pub fn lost(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            detection: false,
            theta_rad: 0.0,
            x_m: 0.0,
            y_m: 0.0,
            psi_rad: 0.0,
        }
    }

    /// True if the fields used for control are all finite.
    pub fn is_finite(&self) -> bool {
        self.theta_rad.is_finite() && self.x_m.is_finite() && self.y_m.is_finite()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_without_psi() {
        let pose: VehiclePose = serde_json::from_str(
            r#"{
                "timestamp": 1600000000250000000,
                "detection": true,
                "theta_rad": 0.1,
                "x_m": 0.6,
                "y_m": -0.05
            }"#,
        )
        .unwrap();

        assert_eq!(pose.timestamp, Utc.timestamp(1_600_000_000, 250_000_000));
        assert!(pose.detection);
        assert_eq!(pose.x_m, 0.6);
        assert_eq!(pose.psi_rad, 0.0);
        assert!(pose.is_finite());
    }

    #[test]
    fn test_non_finite() {
        let mut pose = VehiclePose::lost(Utc::now());
        assert!(pose.is_finite());

        pose.y_m = std::f64::NAN;
        assert!(!pose.is_finite());
    }
}
