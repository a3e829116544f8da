//! Proportional follow law
//!
//! Both channels share the same shape: a proportional demand, then saturation, then a
//! dead-band which is only applied if the demand was not saturated.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::Params;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which limit, if any, was applied to a channel's raw demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LimitState {
    None,
    Saturated,
    DeadBanded,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The result of evaluating one channel of the law.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ChannelOutput {
    /// Error between the measured value and its reference.
    pub error: f64,

    /// Demand before limiting.
    pub raw: f64,

    /// Demand after limiting.
    pub demand: f64,

    pub limit: LimitState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LimitState {
    fn default() -> Self {
        LimitState::None
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Speed demand for the given (compensated) range to the leader.
///
/// Units: meters/second
pub fn speed_demand(range_m: f64, params: &Params) -> ChannelOutput {
    let error = range_m - params.dist_ref;
    let raw = params.k_follow * error;

    let (demand, limit) = limit(
        raw,
        params.max_speed,
        params.deadspace_speed,
        !params.legacy_speed_saturation
    );

    ChannelOutput { error, raw, demand, limit }
}

/// Turn rate demand for the given (compensated) heading of the leader.
///
/// Units: radians/second
pub fn turn_rate_demand(heading_rad: f64, params: &Params) -> ChannelOutput {
    let error = heading_rad - params.head_ref;
    let raw = params.k_heading * error;

    let (demand, limit) = limit(
        raw,
        params.max_heading,
        params.deadspace_heading,
        true
    );

    ChannelOutput { error, raw, demand, limit }
}

/// Saturate `raw` to `[-max, max]`, or zero it if its magnitude is strictly below `deadspace`.
///
/// If `clamp_positive` is false values above `max` pass through unchanged.
fn limit(raw: f64, max: f64, deadspace: f64, clamp_positive: bool) -> (f64, LimitState) {
    if clamp_positive && raw > max {
        (max, LimitState::Saturated)
    }
    else if raw < -max {
        (-max, LimitState::Saturated)
    }
    else if raw.abs() < deadspace {
        (0.0, LimitState::DeadBanded)
    }
    else {
        (raw, LimitState::None)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_reference_gives_zero_speed() {
        let params = Params::default();
        let out = speed_demand(params.dist_ref, &params);

        assert_eq!(out.error, 0.0);
        assert_eq!(out.demand, 0.0);
        assert_eq!(out.limit, LimitState::DeadBanded);
    }

    #[test]
    fn test_negative_speed_saturates_exactly() {
        for &legacy in &[false, true] {
            let params = Params {
                legacy_speed_saturation: legacy,
                k_follow: 10.0,
                ..Params::default()
            };

            let out = speed_demand(0.0, &params);
            assert!(out.raw < -params.max_speed);
            assert_eq!(out.demand, -params.max_speed);
            assert_eq!(out.limit, LimitState::Saturated);
        }
    }

    #[test]
    fn test_positive_speed_saturation() {
        let params = Params::default();
        let out = speed_demand(1.0, &params);
        assert_eq!(out.demand, 0.4);
        assert_eq!(out.limit, LimitState::Saturated);

        let legacy = Params {
            legacy_speed_saturation: true,
            ..Params::default()
        };
        let out = speed_demand(1.0, &legacy);
        assert_eq!(out.demand, out.raw);
        assert_eq!(out.limit, LimitState::None);
    }

    #[test]
    fn test_small_speed_is_deadbanded() {
        let params = Params::default();

        for &range in &[0.11, 0.14, 0.16, 0.19] {
            let out = speed_demand(range, &params);
            assert!(out.raw.abs() < params.deadspace_speed);
            assert_eq!(out.demand, 0.0);
            assert_eq!(out.limit, LimitState::DeadBanded);
        }

        let out = speed_demand(0.25, &params);
        assert_eq!(out.demand, out.raw);
        assert_eq!(out.limit, LimitState::None);
    }

    #[test]
    fn test_deadband_is_strict() {
        let params = Params {
            dist_ref: 0.0,
            ..Params::default()
        };

        let out = speed_demand(params.deadspace_speed, &params);
        assert_eq!(out.demand, params.deadspace_speed);
        assert_eq!(out.limit, LimitState::None);
    }

    #[test]
    fn test_turn_rate() {
        let params = Params::default();

        // Saturated both ways
        assert_eq!(turn_rate_demand(0.5, &params).demand, 0.2);
        assert_eq!(turn_rate_demand(-0.5, &params).demand, -0.2);

        // The default dead-band equals the limit, so anything unsaturated is zeroed
        let out = turn_rate_demand(0.15, &params);
        assert_eq!(out.demand, 0.0);
        assert_eq!(out.limit, LimitState::DeadBanded);

        let narrow = Params {
            deadspace_heading: 0.05,
            head_ref: 0.1,
            ..Params::default()
        };
        let out = turn_rate_demand(0.25, &narrow);
        assert!((out.error - 0.15).abs() < 1e-12);
        assert_eq!(out.demand, out.raw);
        assert_eq!(out.limit, LimitState::None);

        let out = turn_rate_demand(0.12, &narrow);
        assert_eq!(out.demand, 0.0);
    }
}
