//! Closed loop tests of FollowCtrl against simulated vehicles, without a network.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use nalgebra::Rotation2;

use comms_if::eqpt::pose::VehiclePose;
use follow_lib::{
    follow_ctrl::{FollowCtrl, InputData, Params},
    kin::{self, Pose2},
};
use util::module::State;

const DT_S: f64 = 0.1;

/// Observation of the leader from the follower, theta being the bearing to the leader.
fn observe(leader: &Pose2, follower: &Pose2, timestamp: DateTime<Utc>) -> VehiclePose {
    let rel = Rotation2::new(-follower.heading_rad) * (leader.position_m - follower.position_m);

    VehiclePose {
        timestamp,
        detection: true,
        theta_rad: rel[1].atan2(rel[0]),
        x_m: rel[0],
        y_m: rel[1],
        psi_rad: leader.heading_rad - follower.heading_rad,
    }
}

/// Run the loop for `steps` cycles with a stationary leader, returning the final follower pose.
///
/// Each observation is delivered `latency_steps` cycles after it was captured. The follower holds
/// still until the first observation arrives.
fn run(leader: &Pose2, steps: usize, latency_steps: usize) -> (Pose2, FollowCtrl) {
    let params = Arc::new(Params::default());
    let mut ctrl = FollowCtrl::default();
    let mut follower = Pose2::default();
    let mut in_flight = VecDeque::new();

    let t0 = Utc.timestamp(1_600_000_000, 0);

    for i in 0..steps {
        let now = t0 + Duration::milliseconds(100 * i as i64);

        in_flight.push_back(observe(leader, &follower, now));
        if in_flight.len() <= latency_steps {
            continue;
        }

        let pose = match in_flight.pop_front() {
            Some(p) => p,
            None => continue,
        };
        let input = InputData {
            pose,
            now,
            params: params.clone(),
        };
        let (cmd, _) = ctrl.proc(&input).unwrap();

        follower = kin::integrate_propagate(&follower, cmd.turn_rate_rads, cmd.speed_ms, DT_S);
    }

    (follower, ctrl)
}

#[test]
fn test_approach_stops_inside_deadband() {
    let leader = Pose2::new(0.0, 0.6, 0.0);
    let (follower, ctrl) = run(&leader, 200, 0);

    let range = (leader.position_m - follower.position_m).norm();

    assert!(range > 0.194 && range < 0.2001, "final range {}", range);
    assert_eq!(ctrl.last_cmd().speed_ms, 0.0);
    assert_eq!(ctrl.last_cmd().turn_rate_rads, 0.0);
    assert!(follower.heading_rad.abs() < 1e-12);
}

#[test]
fn test_offset_leader_is_turned_towards() {
    let leader = Pose2::new(0.0, 0.6, 0.3);
    let (follower, ctrl) = run(&leader, 400, 0);

    let obs = observe(&leader, &follower, Utc::now());
    let range = (obs.x_m.powi(2) + obs.y_m.powi(2)).sqrt();

    // Came to rest with the leader close by and roughly ahead
    assert_eq!(ctrl.last_cmd().speed_ms, 0.0);
    assert_eq!(ctrl.last_cmd().turn_rate_rads, 0.0);
    assert!(follower.heading_rad > 0.0);
    assert!(obs.theta_rad.abs() <= 0.2 + 1e-9, "final bearing {}", obs.theta_rad);
    assert!(range <= 0.2 + 1e-9, "final range {}", range);
}

#[test]
fn test_approach_with_latency_stops_inside_deadband() {
    let leader = Pose2::new(0.0, 0.6, 0.0);

    // Observations arrive 100 ms after capture
    let (follower, ctrl) = run(&leader, 200, 1);

    let range = (leader.position_m - follower.position_m).norm();

    assert!(range > 0.194 && range < 0.2001, "final range {}", range);
    assert_eq!(ctrl.last_cmd().speed_ms, 0.0);
    assert_eq!(ctrl.last_cmd().turn_rate_rads, 0.0);
    assert!(follower.heading_rad.abs() < 1e-12);

    // The last observation processed was captured on the second to last step
    let last_capture = Utc.timestamp(1_600_000_000, 0) + Duration::milliseconds(100 * 198);
    assert_eq!(ctrl.last_pose().unwrap().timestamp, last_capture);
}
