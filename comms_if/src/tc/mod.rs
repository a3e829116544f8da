//! # Telecommand module
//!
//! This module provides the telecommands which an operator can send to the follow executable,
//! and the responses the executable replies with.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use structopt::StructOpt;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the follow executable by an operator.
///
/// Derives `StructOpt` so that command line tools can parse telecommands directly from user
/// input.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, StructOpt, Eq, PartialEq)]
pub enum FollowTc {
    /// Check that the executable is alive and responding.
    #[structopt(name = "ping")]
    Heartbeat,

    /// Stop the vehicle and shut the executable down.
    #[structopt(name = "shutdown")]
    Shutdown,
}

/// Response to a telecommand.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum TcResponse {
    /// The telecommand was accepted and will be executed.
    Ok,

    /// The telecommand could not be parsed.
    Invalid,
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_words() {
        let tc = FollowTc::from_iter_safe(vec!["follow", "shutdown"]).unwrap();
        assert_eq!(tc, FollowTc::Shutdown);

        let tc = FollowTc::from_iter_safe(vec!["follow", "ping"]).unwrap();
        assert_eq!(tc, FollowTc::Heartbeat);

        assert!(FollowTc::from_iter_safe(vec!["follow", "launch"]).is_err());
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&FollowTc::Shutdown).unwrap(), "\"Shutdown\"");
        assert_eq!(
            serde_json::from_str::<TcResponse>("\"Invalid\"").unwrap(),
            TcResponse::Invalid
        );
        assert!(serde_json::from_str::<TcResponse>("\"CannotExecute\"").is_err());
    }
}
