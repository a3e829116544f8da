//! # Follow control module
//!
//! Follow control keeps the follower at a set distance and relative heading behind the leader.
//! Each observation of the leader is first corrected for the motion the follower has made since
//! it was captured (see `crate::kin`), then fed through a proportional law with saturation and a
//! dead-band on each channel.
//!
//! The command issued on one cycle is held by the module and used to dead-reckon the next
//! observation, which makes the module a one-slot feedback loop.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod law;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use law::*;
pub use params::*;
pub use state::*;

use comms_if::eqpt::pose::VehiclePose;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during FollowCtrl operation.
///
/// In both cases the module's held command and observation are left as they were.
#[derive(Debug, thiserror::Error)]
pub enum FollowCtrlError {
    #[error("Observation contains a non-finite value: {0:?}")]
    NonFiniteObservation(VehiclePose),

    #[error("The observation latency cannot be represented in seconds")]
    LatencyOverflow,
}
