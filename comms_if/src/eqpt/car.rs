//! # Vehicle Command Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_nanoseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A unicycle velocity command for the follower, held until the next command arrives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarCmd {
    /// Timestamp of the observation which triggered this command, or the time of issue for
    /// commands which were not triggered by an observation.
    #[serde(with = "ts_nanoseconds")]
    pub timestamp: DateTime<Utc>,

    /// Linear speed, positive forwards.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Turn rate, positive anticlockwise (right hand rule about Z+ upwards).
    ///
    /// Units: radians/second
    pub turn_rate_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CarCmd {
    /// A command bringing the vehicle to a halt.
    pub fn stop(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            speed_ms: 0.0,
            turn_rate_rads: 0.0,
        }
    }

    /// True if this command demands no motion at all.
    pub fn is_stop(&self) -> bool {
        self.speed_ms == 0.0 && self.turn_rate_rads == 0.0
    }
}
