//! Implementations for the FollowCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::trace;
use serde::Serialize;
use std::sync::Arc;

// Internal
use super::{speed_demand, turn_rate_demand, FollowCtrlError, LimitState, Params};
use crate::kin::{self, Pose2};
use comms_if::eqpt::{car::CarCmd, pose::VehiclePose};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::{self, Session},
    time,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follow control module state
#[derive(Default)]
pub struct FollowCtrl {
    /// The command issued on the last successful cycle, used to dead-reckon the next
    /// observation.
    last_cmd: Twist,

    /// The last observation which was processed. Kept for diagnostics only.
    last_pose: Option<VehiclePose>,

    report: StatusReport,
    arch_report: Option<Archiver>,
}

/// A unicycle velocity demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Twist {
    /// Units: meters/second
    pub speed_ms: f64,

    /// Units: radians/second
    pub turn_rate_rads: f64,
}

/// Initialisation data for FollowCtrl.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitData {
    /// If true each cycle's status report is archived into the session.
    pub archive: bool,
}

/// Input data to Follow Control.
pub struct InputData {
    /// The observation of the leader to process.
    pub pose: VehiclePose,

    /// The time at which the observation is being processed.
    pub now: DateTime<Utc>,

    /// The parameter snapshot to use for this cycle.
    pub params: Arc<Params>,
}

/// Status report for FollowCtrl processing.
///
/// Flat so that it can be archived as a CSV row.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub time_s: f64,

    /// True if the observation reported the leader as not detected.
    pub target_lost: bool,

    /// Units: seconds
    pub latency_s: f64,

    pub obs_theta_rad: f64,
    pub obs_x_m: f64,
    pub obs_y_m: f64,

    /// Follower motion predicted over the latency.
    pub pred_theta_rad: f64,
    pub pred_x_m: f64,
    pub pred_y_m: f64,

    pub comp_theta_rad: f64,
    pub comp_x_m: f64,
    pub comp_y_m: f64,

    pub range_m: f64,

    pub dist_error_m: f64,
    pub head_error_rad: f64,

    pub speed_raw_ms: f64,
    pub speed_dem_ms: f64,
    pub speed_limit: LimitState,

    pub turn_rate_raw_rads: f64,
    pub turn_rate_dem_rads: f64,
    pub turn_rate_limit: LimitState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FollowCtrl {
    /// The command issued on the last successful cycle with the leader detected.
    pub fn last_cmd(&self) -> Twist {
        self.last_cmd
    }

    /// The last observation accepted by the module.
    pub fn last_pose(&self) -> Option<&VehiclePose> {
        self.last_pose.as_ref()
    }
}

impl State for FollowCtrl {
    type InitData = InitData;
    type InitError = ArchiveError;

    type InputData = InputData;
    type OutputData = CarCmd;
    type StatusReport = StatusReport;
    type ProcError = FollowCtrlError;

    /// Initialise the FollowCtrl module.
    ///
    /// The held command starts at rest.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        *self = Self::default();

        if init_data.archive {
            self.arch_report = Some(Archiver::from_path(
                session, "follow_ctrl/status_report.csv"
            )?);
        }

        Ok(())
    }

    /// Process one observation of the leader.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let pose = input_data.pose;
        let params = &input_data.params;

        // Clear the status report
        self.report = StatusReport {
            time_s: session::get_elapsed_seconds(),
            ..StatusReport::default()
        };

        // Stop while the leader can't be seen, without forgetting the held command
        if !pose.detection {
            self.report.target_lost = true;
            self.last_pose = Some(pose);

            trace!("FollowCtrl: target lost, stopping");

            return Ok((CarCmd::stop(pose.timestamp), self.report));
        }

        if !pose.is_finite() {
            return Err(FollowCtrlError::NonFiniteObservation(pose));
        }

        let latency_s = time::seconds_between(pose.timestamp, input_data.now)
            .ok_or(FollowCtrlError::LatencyOverflow)?;

        // Remove the motion made since the observation was captured
        let observed = Pose2::new(pose.theta_rad, pose.x_m, pose.y_m);
        let predicted = kin::integrate(
            self.last_cmd.turn_rate_rads,
            self.last_cmd.speed_ms,
            latency_s
        );
        let compensated = observed.compensate(&predicted);
        let range_m = compensated.range_m();

        let speed = speed_demand(range_m, params);
        let turn_rate = turn_rate_demand(compensated.heading_rad, params);

        self.last_cmd = Twist {
            speed_ms: speed.demand,
            turn_rate_rads: turn_rate.demand,
        };
        self.last_pose = Some(pose);

        self.report.latency_s = latency_s;
        self.report.obs_theta_rad = observed.heading_rad;
        self.report.obs_x_m = observed.position_m[0];
        self.report.obs_y_m = observed.position_m[1];
        self.report.pred_theta_rad = predicted.heading_rad;
        self.report.pred_x_m = predicted.position_m[0];
        self.report.pred_y_m = predicted.position_m[1];
        self.report.comp_theta_rad = compensated.heading_rad;
        self.report.comp_x_m = compensated.position_m[0];
        self.report.comp_y_m = compensated.position_m[1];
        self.report.range_m = range_m;
        self.report.dist_error_m = speed.error;
        self.report.head_error_rad = turn_rate.error;
        self.report.speed_raw_ms = speed.raw;
        self.report.speed_dem_ms = speed.demand;
        self.report.speed_limit = speed.limit;
        self.report.turn_rate_raw_rads = turn_rate.raw;
        self.report.turn_rate_dem_rads = turn_rate.demand;
        self.report.turn_rate_limit = turn_rate.limit;

        trace!(
            "FollowCtrl output: v = {:.4} m/s ({:?}), w = {:.4} rad/s ({:?}), range {:.3} m, \
            latency {:.3} s",
            speed.demand, speed.limit, turn_rate.demand, turn_rate.limit, range_m, latency_s
        );

        let output = CarCmd {
            timestamp: pose.timestamp,
            speed_ms: speed.demand,
            turn_rate_rads: turn_rate.demand,
        };

        Ok((output, self.report))
    }
}

impl Archived for FollowCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.arch_report {
            Some(ref mut a) => a.serialise(self.report),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.timestamp(1_600_000_000, 0)
    }

    fn seen(x_m: f64, y_m: f64, theta_rad: f64) -> VehiclePose {
        VehiclePose {
            timestamp: t0(),
            detection: true,
            theta_rad,
            x_m,
            y_m,
            psi_rad: 0.0,
        }
    }

    fn input(pose: VehiclePose, latency: Duration, params: &Params) -> InputData {
        InputData {
            pose,
            now: pose.timestamp + latency,
            params: Arc::new(params.clone()),
        }
    }

    #[test]
    fn test_just_outside_deadband_passes() {
        let mut ctrl = FollowCtrl::default();
        let params = Params::default();

        let (cmd, report) = ctrl
            .proc(&input(seen(0.20, 0.0, 0.0), Duration::zero(), &params))
            .unwrap();

        // 0.20 - 0.15 is a hair above 0.05 in f64
        assert!(cmd.speed_ms > 0.0);
        assert!((cmd.speed_ms - 0.05).abs() < 1e-12);
        assert_eq!(cmd.turn_rate_rads, 0.0);
        assert_eq!(cmd.timestamp, t0());
        assert_eq!(report.speed_limit, LimitState::None);
        assert_eq!(ctrl.last_cmd().speed_ms, cmd.speed_ms);
    }

    #[test]
    fn test_far_leader_saturates() {
        let mut ctrl = FollowCtrl::default();
        let (cmd, _) = ctrl
            .proc(&input(seen(0.60, 0.0, 0.0), Duration::zero(), &Params::default()))
            .unwrap();
        assert_eq!(cmd.speed_ms, 0.4);

        let legacy = Params {
            legacy_speed_saturation: true,
            ..Params::default()
        };
        let mut ctrl = FollowCtrl::default();
        let (cmd, report) = ctrl
            .proc(&input(seen(0.60, 0.0, 0.0), Duration::zero(), &legacy))
            .unwrap();
        assert!((cmd.speed_ms - 0.45).abs() < 1e-12);
        assert_eq!(report.speed_limit, LimitState::None);
    }

    #[test]
    fn test_lost_target_stops_and_keeps_command() {
        let mut ctrl = FollowCtrl::default();
        let params = Params::default();

        ctrl.proc(&input(seen(0.60, 0.0, 0.0), Duration::zero(), &params)).unwrap();
        let held = ctrl.last_cmd();
        assert_eq!(held.speed_ms, 0.4);

        let (cmd, report) = ctrl
            .proc(&input(VehiclePose::lost(t0()), Duration::milliseconds(100), &params))
            .unwrap();

        assert!(cmd.is_stop());
        assert!(report.target_lost);
        assert_eq!(ctrl.last_cmd(), held);
        assert!(!ctrl.last_pose().unwrap().detection);
    }

    #[test]
    fn test_latency_compensation() {
        let mut ctrl = FollowCtrl::default();
        let params = Params::default();

        // Drive at full speed in a straight line
        ctrl.proc(&input(seen(0.60, 0.0, 0.0), Duration::zero(), &params)).unwrap();

        // The same observation a quarter of a second old is 0.1 m closer
        let (cmd, report) = ctrl
            .proc(&input(seen(0.60, 0.0, 0.0), Duration::milliseconds(250), &params))
            .unwrap();

        assert_eq!(report.latency_s, 0.25);
        assert!((report.pred_x_m - 0.1).abs() < 1e-12);
        assert!((report.comp_x_m - 0.5).abs() < 1e-12);
        assert!((report.range_m - 0.5).abs() < 1e-12);
        assert!((cmd.speed_ms - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_latency_compensation_on_arc() {
        const TOL: f64 = 1e-12;
        let params = Params::default();

        // Hold (0.4 m/s, 0.2 rad/s), both saturated, so the follower drives an arc of radius 2 m
        let held = |ctrl: &mut FollowCtrl| {
            let (cmd, _) = ctrl
                .proc(&input(seen(0.60, 0.0, 0.5), Duration::zero(), &params))
                .unwrap();
            assert_eq!((cmd.speed_ms, cmd.turn_rate_rads), (0.4, 0.2));
        };

        let mut ctrl = FollowCtrl::default();
        held(&mut ctrl);

        let (cmd, report) = ctrl
            .proc(&input(seen(0.60, 0.0, 0.5), Duration::milliseconds(250), &params))
            .unwrap();

        assert!((report.pred_theta_rad - 0.05).abs() < TOL);
        assert!((report.pred_x_m - 2.0 * 0.05f64.sin()).abs() < TOL);
        assert!((report.pred_y_m - 2.0 * (1.0 - 0.05f64.cos())).abs() < TOL);
        assert!((report.comp_theta_rad - 0.45).abs() < TOL);
        assert!((report.comp_x_m - (0.60 - report.pred_x_m)).abs() < TOL);
        assert!((report.comp_y_m + report.pred_y_m).abs() < TOL);
        assert_eq!(cmd.turn_rate_rads, 0.2);
        assert_eq!(report.turn_rate_limit, LimitState::Saturated);

        // An observation from the future integrates backwards along the same arc
        let mut ctrl = FollowCtrl::default();
        held(&mut ctrl);

        let (_, report) = ctrl
            .proc(&input(seen(0.60, 0.0, 0.5), Duration::milliseconds(-300), &params))
            .unwrap();

        assert!((report.latency_s + 0.3).abs() < TOL);
        assert!((report.pred_theta_rad + 0.06).abs() < TOL);
        assert!((report.pred_x_m - 2.0 * (-0.06f64).sin()).abs() < TOL);
        assert!((report.pred_x_m + 0.1199).abs() < 1e-4);
        assert!((report.pred_y_m - 2.0 * (1.0 - 0.06f64.cos())).abs() < TOL);
        assert!((report.pred_y_m - 0.0036).abs() < 1e-4);
        assert!((report.comp_theta_rad - 0.56).abs() < TOL);
    }

    #[test]
    fn test_heading_channel() {
        let mut ctrl = FollowCtrl::default();
        let params = Params::default();

        let (cmd, report) = ctrl
            .proc(&input(seen(0.15, 0.0, -0.5), Duration::zero(), &params))
            .unwrap();

        assert_eq!(cmd.speed_ms, 0.0);
        assert_eq!(cmd.turn_rate_rads, -0.2);
        assert_eq!(report.turn_rate_limit, LimitState::Saturated);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut ctrl = FollowCtrl::default();
        let params = Params::default();

        ctrl.proc(&input(seen(0.60, 0.0, 0.0), Duration::zero(), &params)).unwrap();
        let held = ctrl.last_cmd();

        let res = ctrl.proc(&input(seen(f64::NAN, 0.0, 0.0), Duration::zero(), &params));
        assert!(matches!(res, Err(FollowCtrlError::NonFiniteObservation(_))));
        assert_eq!(ctrl.last_cmd(), held);
        assert_eq!(ctrl.last_pose().unwrap().x_m, 0.60);
    }

    #[test]
    fn test_write_without_archive_is_noop() {
        let mut ctrl = FollowCtrl::default();
        assert!(ctrl.write().is_ok());
    }
}
