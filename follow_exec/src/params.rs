//! # Follow Executable Parameters
//!
//! This module provides parameters for the follow executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowExecParams {

    /// Path to the FollowCtrl parameter file, relative to the parameters directory
    pub ctrl_params_file: String,

    /// Period between checks of the FollowCtrl parameter file for changes
    ///
    /// Units: seconds
    pub params_refresh_period_s: f64,

    /// Time to wait after publishing the final stop command before exiting
    ///
    /// Units: seconds
    pub shutdown_drain_s: f64,

    /// Maximum time to wait for an observation on each loop. Negative values wait forever, which
    /// also means telecommands are not handled until an observation arrives.
    ///
    /// Units: milliseconds
    pub pose_recv_timeout_ms: i32,

    /// If true each cycle's FollowCtrl status report is archived in the session
    pub archive: bool
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FollowExecParams {
    /// The parameter refresh period, or `None` if it is not a positive finite number of seconds.
    pub fn params_refresh_period(&self) -> Option<Duration> {
        seconds_to_duration(self.params_refresh_period_s).filter(|d| *d > Duration::from_secs(0))
    }

    /// The shutdown drain time, or `None` if it is not a finite, non-negative number of seconds.
    pub fn shutdown_drain(&self) -> Option<Duration> {
        seconds_to_duration(self.shutdown_drain_s)
    }
}

impl Default for FollowExecParams {
    fn default() -> Self {
        Self {
            ctrl_params_file: "follow_ctrl.toml".into(),
            params_refresh_period_s: 1.0,
            shutdown_drain_s: 0.5,
            pose_recv_timeout_ms: 100,
            archive: true
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert a number of seconds into a `Duration`, or `None` if it is negative, not finite or too
/// large to be represented.
pub fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    if seconds.is_finite() && seconds >= 0.0 && seconds < u64::MAX as f64 {
        Some(Duration::from_secs_f64(seconds))
    }
    else {
        None
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        let params: FollowExecParams = util::params::parse(r#"
            ctrl_params_file = "follow_ctrl.toml"
            params_refresh_period_s = 1.0
            shutdown_drain_s = 0.5
            pose_recv_timeout_ms = 100
            archive = false
        "#).unwrap();

        assert_eq!(params.params_refresh_period(), Some(Duration::from_secs(1)));
        assert_eq!(params.shutdown_drain(), Some(Duration::from_millis(500)));

        let bad = FollowExecParams {
            params_refresh_period_s: 0.0,
            shutdown_drain_s: -1.0,
            ..FollowExecParams::default()
        };
        assert_eq!(bad.params_refresh_period(), None);
        assert_eq!(bad.shutdown_drain(), None);
    }

    #[test]
    fn test_seconds_to_duration() {
        assert_eq!(seconds_to_duration(0.0), Some(Duration::from_secs(0)));
        assert_eq!(seconds_to_duration(2.5), Some(Duration::from_millis(2500)));
        assert_eq!(seconds_to_duration(1e30), None);
        assert_eq!(seconds_to_duration(u64::MAX as f64), None);
        assert_eq!(seconds_to_duration(std::f64::INFINITY), None);
        assert_eq!(seconds_to_duration(std::f64::NAN), None);
        assert_eq!(seconds_to_duration(-0.1), None);
    }
}
