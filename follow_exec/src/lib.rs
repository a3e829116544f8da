//! # Follow library.
//!
//! This library allows other crates in the workspace, as well as the simulator and the tests, to
//! access items defined inside the follow crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Kinematics - dead reckoning of the follower under a constant command
pub mod kin;

/// Follow control module - converts observations of the leader into speed and turn rate commands
pub mod follow_ctrl;

/// Executable parameters
pub mod params;

/// Parameter watcher - reloads the follow control parameters while running
pub mod params_watcher;

/// Pose client - recieves observations of the leader
pub mod pose_client;

/// Command server - publishes commands to the follower's drive system
pub mod cmd_server;

/// Telecommand server - recieves telecommands from operator tools
pub mod tc_server;

/// Shutdown sequence - stops the vehicle before exiting
pub mod shutdown;
