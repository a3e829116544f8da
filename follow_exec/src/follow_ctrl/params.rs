//! Parameters structure for FollowCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Follow control.
///
/// Any key missing from the parameter file takes its default value. No consistency checks are
/// made between the limits and the dead-bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- REFERENCES ----

    /// Target distance to the leader.
    ///
    /// Units: meters
    pub dist_ref: f64,

    /// Target heading of the leader relative to the follower.
    ///
    /// Units: radians
    pub head_ref: f64,

    // ---- GAINS ----

    /// Gain from distance error to speed demand.
    ///
    /// Units: 1/seconds
    pub k_follow: f64,

    /// Gain from heading error to turn rate demand.
    ///
    /// Units: 1/seconds
    pub k_heading: f64,

    /// Heading error threshold. Currently not used by the control law.
    ///
    /// Units: radians
    pub head_thres: f64,

    // ---- LIMITS ----

    /// Maximum magnitude of the speed demand.
    ///
    /// Units: meters/second
    pub max_speed: f64,

    /// Maximum magnitude of the turn rate demand.
    ///
    /// Units: radians/second
    pub max_heading: f64,

    /// Speed demands smaller in magnitude than this are zeroed.
    ///
    /// Units: meters/second
    pub deadspace_speed: f64,

    /// Turn rate demands smaller in magnitude than this are zeroed.
    ///
    /// Units: radians/second
    pub deadspace_heading: f64,

    /// If true only negative speed demands are saturated, positive demands above `max_speed`
    /// are passed through unchanged. Kept to reproduce logs of older deployments.
    pub legacy_speed_saturation: bool,
}

// ---------------------------------------------------------------------------
// MACROS
// ---------------------------------------------------------------------------

/// Build a description of each listed field which differs between two structs.
macro_rules! diff_fields {
    ($old:expr, $new:expr, [$($field:ident),* $(,)?]) => {{
        let mut changes = Vec::new();
        $(
            if $old.$field != $new.$field {
                changes.push(format!(
                    "{}: {:?} -> {:?}",
                    stringify!($field), $old.$field, $new.$field
                ));
            }
        )*
        changes
    }};
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            dist_ref: 0.15,
            head_ref: 0.0,
            k_follow: 1.0,
            k_heading: 1.0,
            head_thres: std::f64::consts::FRAC_PI_4,
            max_speed: 0.4,
            max_heading: 0.2,
            deadspace_speed: 0.05,
            deadspace_heading: 0.2,
            legacy_speed_saturation: false,
        }
    }
}

impl Params {
    /// Describe every field that differs in `new`, one entry per field, as
    /// `"name: old -> new"`.
    pub fn changes(&self, new: &Params) -> Vec<String> {
        diff_fields!(self, new, [
            dist_ref,
            head_ref,
            k_follow,
            k_heading,
            head_thres,
            max_speed,
            max_heading,
            deadspace_speed,
            deadspace_heading,
            legacy_speed_saturation,
        ])
    }

    /// Log every parameter at info level, one per line.
    pub fn log(&self) {
        info!("FollowCtrl parameters:");
        if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(self) {
            for (name, value) in map {
                info!("    {} = {}", name, value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let params: Params = util::params::parse(
            "k_follow = 2.0\nlegacy_speed_saturation = true\n"
        ).unwrap();

        assert_eq!(params.k_follow, 2.0);
        assert!(params.legacy_speed_saturation);
        assert_eq!(params.dist_ref, 0.15);
        assert_eq!(params.max_speed, 0.4);
        assert_eq!(params.head_thres, std::f64::consts::FRAC_PI_4);

        let empty: Params = util::params::parse("").unwrap();
        assert_eq!(empty, Params::default());
    }

    #[test]
    fn test_changes_lists_only_changed_fields() {
        let old = Params::default();
        assert!(old.changes(&old.clone()).is_empty());

        let mut new = old.clone();
        new.max_speed = 0.3;
        new.head_thres = 1.0;

        let changes = old.changes(&new);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], "head_thres: 0.7853981633974483 -> 1.0");
        assert_eq!(changes[1], "max_speed: 0.4 -> 0.3");
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(util::params::parse::<Params>("dist_ref = \"far\"").is_err());
    }
}
