//! # Command Server
//!
//! Publishes the commands for the follower's drive system.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::shutdown::CmdSink;
use comms_if::{
    eqpt::car::CarCmd,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Vehicle command server
pub struct CmdServer {
    socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the command: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the command: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdServer {
    /// Create a new instance of the command server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, CmdServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.cmd_endpoint
        ).map_err(CmdServerError::SocketError)?;

        Ok(Self {
            socket
        })
    }

    /// Publish a command.
    pub fn send(&self, cmd: &CarCmd) -> Result<(), CmdServerError> {
        let cmd_str = serde_json::to_string(cmd)
            .map_err(CmdServerError::SerializationError)?;

        self.socket.send(&cmd_str, 0)
            .map_err(CmdServerError::SendError)
    }
}

impl CmdSink for CmdServer {
    type Error = CmdServerError;

    fn publish(&self, cmd: &CarCmd) -> Result<(), Self::Error> {
        self.send(cmd)
    }
}
