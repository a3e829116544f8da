//! Main follow executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise FollowCtrl and start the parameter watcher
//!     - Initialise the network
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Wait for an observation of the leader
//!         - Follow control processing
//!         - Command publication and archiving
//!     - Shutdown: publish a stop command and let it drain
//!
//! Observations are processed strictly in the order they arrive. If they stop arriving no
//! commands are published, the drive system is responsible for stopping on a stale command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{debug, info, trace, warn};

// Internal
use comms_if::{
    eqpt::car::CarCmd,
    net::{zmq, NetParams},
    tc::{FollowTc, TcResponse},
};
use follow_lib::{
    cmd_server::CmdServer,
    follow_ctrl::{self, FollowCtrl},
    params::FollowExecParams,
    params_watcher::{ParamsWatcher, TomlFileSource},
    pose_client::PoseClient,
    shutdown::shutdown,
    tc_server::{TcServer, TcServerError},
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "follow_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Vehicle Follow Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams = util::params::load("net.toml")
        .wrap_err("Could not load net params")?;

    let exec_params: FollowExecParams = util::params::load("follow_exec.toml")
        .wrap_err("Could not load exec params")?;

    let refresh_period = exec_params.params_refresh_period()
        .ok_or_else(|| eyre!(
            "Invalid parameter refresh period: {} s", exec_params.params_refresh_period_s
        ))?;
    let shutdown_drain = exec_params.shutdown_drain()
        .ok_or_else(|| eyre!(
            "Invalid shutdown drain time: {} s", exec_params.shutdown_drain_s
        ))?;

    let ctrl_params: follow_ctrl::Params = util::params::load(&exec_params.ctrl_params_file)
        .wrap_err("Could not load FollowCtrl params")?;

    ctrl_params.log();
    session.save("params/follow_ctrl.json", ctrl_params.clone());

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut follow_ctrl = FollowCtrl::default();
    follow_ctrl.init(
        follow_ctrl::InitData { archive: exec_params.archive },
        &session
    ).wrap_err("Failed to initialise FollowCtrl")?;
    info!("FollowCtrl init complete");

    let source = TomlFileSource::new(&exec_params.ctrl_params_file)
        .wrap_err("Could not locate the FollowCtrl parameter file")?;
    let mut params_watcher = ParamsWatcher::spawn(source, ctrl_params, refresh_period);
    let params_handle = params_watcher.handle();
    info!("ParamsWatcher started, refreshing every {:?}", refresh_period);

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = zmq::Context::new();

    let pose_client = {
        let c = PoseClient::new(&zmq_ctx, &net_params, exec_params.pose_recv_timeout_ms)
            .wrap_err("Failed to initialise PoseClient")?;
        info!("PoseClient initialised");
        c
    };

    let cmd_server = {
        let s = CmdServer::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise CmdServer")?;
        info!("CmdServer initialised");
        s
    };

    let tc_server = {
        let s = TcServer::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise TcServer")?;
        info!("TcServer initialised");
        s
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut pose_connected = false;

    'main: loop {

        // ---- TELECOMMAND PROCESSING ----

        // Get commands until none remain
        loop {
            match tc_server.receive_tc() {
                Ok(Some(tc)) => {
                    debug!("Recieved TC: {:?}", tc);

                    if let Err(e) = tc_server.send_response(TcResponse::Ok) {
                        warn!("Could not respond to TC: {}", e);
                    }

                    match tc {
                        FollowTc::Heartbeat => (),
                        FollowTc::Shutdown => {
                            info!("Shutdown TC recieved");
                            break 'main;
                        }
                    }
                },
                Ok(None) => break,
                Err(TcServerError::TcParseError(e)) => {
                    warn!("Could not parse recieved TC: {}", e);
                    break;
                },
                Err(e) => {
                    warn!("Error while recieving TCs: {}", e);
                    break;
                }
            }
        }

        // ---- DATA INPUT ----

        if pose_client.is_connected() != pose_connected {
            pose_connected = !pose_connected;
            match pose_connected {
                true => info!("Connected to the pose publisher"),
                false => warn!("Connection to the pose publisher lost")
            }
        }

        let pose = match pose_client.receive_pose() {
            Ok(Some(p)) => p,
            Ok(None) => continue,
            Err(e) => {
                warn!("Could not recieve pose: {}", e);
                continue;
            }
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        let input = follow_ctrl::InputData {
            pose,
            now: Utc::now(),
            params: params_handle.snapshot(),
        };

        let cmd = match follow_ctrl.proc(&input) {
            Ok((cmd, report)) => {
                trace!("FollowCtrl status: {:?}", report);

                if let Err(e) = follow_ctrl.write() {
                    warn!("Could not archive FollowCtrl status: {}", e);
                }

                cmd
            },
            Err(e) => {
                warn!("Error during FollowCtrl processing, stopping the vehicle: {}", e);
                CarCmd::stop(pose.timestamp)
            }
        };

        // ---- OUTPUT ----

        if let Err(e) = cmd_server.send(&cmd) {
            warn!("Could not publish command: {}", e);
        }
    }

    // ---- SHUTDOWN ----

    shutdown(&mut params_watcher, &cmd_server, shutdown_drain)
        .wrap_err("Could not publish the final stop command")?;

    session.exit();

    Ok(())
}
