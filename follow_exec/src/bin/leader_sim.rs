//! # Leader Simulator
//!
//! This binary closes the loop around the follow executable without any vehicles. It simulates a
//! leader driving a constant arc and a follower driven by the published commands, and publishes
//! observations of the leader relative to the follower in the same way the perception system
//! would, including the delay between capture and publication.
//!
//! The leader is reported as lost whenever it is out of the configured detection range or field
//! of view.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    collections::VecDeque,
    thread,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use comms_if::{
    eqpt::{car::CarCmd, pose::VehiclePose},
    net::{zmq, MonitoredSocket, NetParams, SocketOptions},
};
use log::{debug, info, warn};
use nalgebra::Rotation2;
use serde::Deserialize;

use follow_lib::{
    kin::{self, Pose2},
    params::seconds_to_duration,
};
use util::{
    logger::{logger_init, LevelFilter},
    maths::{norm, wrap_to_pi},
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Period between status prints.
const STATUS_PERIOD_S: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LeaderSimParams {
    /// Simulation step
    ///
    /// Units: seconds
    cycle_period_s: f64,

    /// Delay between capturing an observation and publishing it
    ///
    /// Units: seconds
    latency_s: f64,

    /// Units: meters/second
    leader_speed_ms: f64,

    /// Units: radians/second
    leader_turn_rate_rads: f64,

    /// Initial distance of the leader directly ahead of the follower
    ///
    /// Units: meters
    initial_offset_m: f64,

    /// Units: meters
    detection_range_m: f64,

    /// Half angle of the follower's field of view
    ///
    /// Units: radians
    detection_half_fov_rad: f64,

    /// Length of the simulation, or 0 to run forever
    ///
    /// Units: seconds
    duration_s: f64,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let session = Session::new("leader_sim", "sessions")
        .wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Leader Simulator\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams = util::params::load("net.toml")
        .wrap_err("Could not load net params")?;

    let params: LeaderSimParams = util::params::load("leader_sim.toml")
        .wrap_err("Could not load leader_sim params")?;

    debug!("Simulation parameters: {:#?}", params);

    let cycle_period = seconds_to_duration(params.cycle_period_s)
        .filter(|d| *d > Duration::from_secs(0))
        .ok_or_else(|| eyre!("Invalid cycle period: {} s", params.cycle_period_s))?;
    let latency = chrono::Duration::nanoseconds(
        (params.latency_s.max(0.0) * 1e9) as i64
    );

    // ---- INITIALISE NETWORK ----

    let zmq_ctx = zmq::Context::new();

    let pose_server = MonitoredSocket::new(
        &zmq_ctx,
        zmq::PUB,
        SocketOptions {
            bind: true,
            block_on_first_connect: false,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        },
        &net_params.pose_endpoint
    ).wrap_err("Failed to initialise the pose publisher")?;

    let cmd_client = MonitoredSocket::new(
        &zmq_ctx,
        zmq::SUB,
        SocketOptions {
            block_on_first_connect: false,
            conflate: true,
            linger: 1,
            recv_timeout: 0,
            ..Default::default()
        },
        &net_params.cmd_endpoint
    ).wrap_err("Failed to initialise the command subscriber")?;
    cmd_client.set_subscribe(b"")
        .wrap_err("Failed to subscribe to commands")?;

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    let mut leader = Pose2::new(0.0, params.initial_offset_m, 0.0);
    let mut follower = Pose2::default();
    let mut cmd = CarCmd::stop(Utc::now());

    let mut in_flight: VecDeque<VehiclePose> = VecDeque::new();
    let mut last_status_s = 0.0;

    info!("Begining simulation\n");

    loop {
        let cycle_start = Instant::now();
        let now = Utc::now();
        let sim_time_s = session::get_elapsed_seconds();

        if params.duration_s > 0.0 && sim_time_s > params.duration_s {
            info!("Simulation duration reached");
            break;
        }

        // Latest command, if any has arrived
        match cmd_client.recv_string(0) {
            Ok(Ok(s)) => match serde_json::from_str::<CarCmd>(&s) {
                Ok(c) => cmd = c,
                Err(e) => warn!("Could not parse command: {}", e),
            },
            Ok(Err(_)) => warn!("Recieved a non UTF-8 command"),
            Err(zmq::Error::EAGAIN) => (),
            Err(e) => warn!("Could not recieve command: {}", e),
        }

        // Move both vehicles
        leader = kin::integrate_propagate(
            &leader,
            params.leader_turn_rate_rads,
            params.leader_speed_ms,
            params.cycle_period_s
        );
        follower = kin::integrate_propagate(
            &follower,
            cmd.turn_rate_rads,
            cmd.speed_ms,
            params.cycle_period_s
        );

        // Observe, then hold the observation back for the latency
        let obs = observe(&leader, &follower, &params, now);
        in_flight.push_back(obs);

        while let Some(front) = in_flight.front() {
            if now.signed_duration_since(front.timestamp) < latency {
                break;
            }

            if let Some(obs) = in_flight.pop_front() {
                match serde_json::to_string(&obs) {
                    Ok(s) => if let Err(e) = pose_server.send(&s, 0) {
                        warn!("Could not publish observation: {}", e);
                    },
                    Err(e) => warn!("Could not serialize observation: {}", e),
                }
            }
        }

        if sim_time_s - last_status_s >= STATUS_PERIOD_S {
            last_status_s = sim_time_s;
            info!(
                "t = {:6.2} s: range {:.3} m, bearing {:+.3} rad, detected {}, cmd ({:+.3} m/s, \
                {:+.3} rad/s)",
                sim_time_s,
                norm(&[leader.position_m[0], leader.position_m[1]],
                     &[follower.position_m[0], follower.position_m[1]]).unwrap_or(std::f64::NAN),
                obs.theta_rad,
                obs.detection,
                cmd.speed_ms,
                cmd.turn_rate_rads
            );
        }

        // Wait for the end of the cycle
        if let Some(remaining) = cycle_period.checked_sub(cycle_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    session.exit();

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the observation of the leader the follower would make at `timestamp`.
///
/// `theta_rad` is the bearing of the leader in the follower's frame, `psi_rad` is the heading of
/// the leader relative to the follower.
fn observe(
    leader: &Pose2,
    follower: &Pose2,
    params: &LeaderSimParams,
    timestamp: DateTime<Utc>
) -> VehiclePose {
    let rel_pos = Rotation2::new(-follower.heading_rad)
        * (leader.position_m - follower.position_m);

    let range_m = rel_pos.norm();
    let bearing_rad = rel_pos[1].atan2(rel_pos[0]);

    if range_m > params.detection_range_m || bearing_rad.abs() > params.detection_half_fov_rad {
        return VehiclePose::lost(timestamp);
    }

    VehiclePose {
        timestamp,
        detection: true,
        theta_rad: bearing_rad,
        x_m: rel_pos[0],
        y_m: rel_pos[1],
        psi_rad: wrap_to_pi(leader.heading_rad - follower.heading_rad),
    }
}
