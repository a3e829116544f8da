//! # Kinematics module
//!
//! Forward kinematics for a unicycle driven by a constant command, used to dead-reckon how far
//! the follower has moved while an observation was in transit.
//!
//! With a speed `v` and a turn rate `w` held for `dt` the vehicle travels along an arc of radius
//! `v / w` (the arc model in "Probabilistic Robotics"). Increments are expressed in the frame of
//! the vehicle at the start of the interval: X forwards, Y to the left, heading anticlockwise.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use serde::Serialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Turn rates below this magnitude are integrated as straight lines, avoiding the division by
/// zero in the arc radius.
///
/// Units: radians/second
pub const STRAIGHT_LINE_RATE_EPS_RADS: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A planar pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose2 {
    /// Heading, anticlockwise from the frame's X axis.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Position in the frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,
}

/// A pose increment expressed in the frame of the pose it will be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseDelta {
    /// Change in heading.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Displacement, in the starting pose's frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2 {
    pub fn new(heading_rad: f64, x_m: f64, y_m: f64) -> Self {
        Self {
            heading_rad,
            position_m: Vector2::new(x_m, y_m),
        }
    }

    /// Distance from the frame origin to this pose.
    pub fn range_m(&self) -> f64 {
        self.position_m.norm()
    }

    /// Remove a motion increment from this pose, component by component.
    ///
    /// Used to correct an observation of the leader, made relative to the follower, by the motion
    /// the follower has made since the observation was taken.
    pub fn compensate(&self, delta: &PoseDelta) -> Self {
        Self {
            heading_rad: self.heading_rad - delta.heading_rad,
            position_m: self.position_m - delta.position_m,
        }
    }
}

impl Default for Pose2 {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Motion produced by holding `speed_ms` and `rate_rads` for `dt_s` seconds.
///
/// Total over all finite inputs, including negative `dt_s` which integrates backwards along the
/// same arc.
pub fn integrate(rate_rads: f64, speed_ms: f64, dt_s: f64) -> PoseDelta {
    let heading_rad = rate_rads * dt_s;

    let position_m = if rate_rads.abs() < STRAIGHT_LINE_RATE_EPS_RADS {
        Vector2::new(speed_ms * dt_s, 0.0)
    }
    else {
        let radius_m = speed_ms / rate_rads;
        Vector2::new(
            radius_m * heading_rad.sin(),
            radius_m * (1.0 - heading_rad.cos())
        )
    };

    PoseDelta {
        heading_rad,
        position_m,
    }
}

/// Apply an increment, expressed in the local frame of `pose`, to `pose`.
pub fn propagate(pose: &Pose2, delta: &PoseDelta) -> Pose2 {
    Pose2 {
        heading_rad: pose.heading_rad + delta.heading_rad,
        position_m: pose.position_m + Rotation2::new(pose.heading_rad) * delta.position_m,
    }
}

/// Move `pose` forward by holding a command for `dt_s`.
pub fn integrate_propagate(pose: &Pose2, rate_rads: f64, speed_ms: f64, dt_s: f64) -> Pose2 {
    propagate(pose, &integrate(rate_rads, speed_ms, dt_s))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
