//! # Telecommand Server
//!
//! Accepts telecommands from operator tools such as `follow_cli`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    tc::{FollowTc, TcResponse},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telecommand server
pub struct TcServer {
    socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TcServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the response: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a telecommand: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the response: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not parse the recieved telecommand: {0}")]
    TcParseError(serde_json::Error),

    #[error("The client sent a message which was not valid UTF-8")]
    NonUtf8Message
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TcServer {
    /// Create a new instance of the TC server.
    ///
    /// Receiving never blocks, so the server can be polled once per cycle.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TcServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 0,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::REP,
            socket_options,
            &params.tc_endpoint
        ).map_err(TcServerError::SocketError)?;

        Ok(Self {
            socket
        })
    }

    /// Recieve a single TC.
    ///
    /// Call in a loop until `Ok(None)` is returned, meaning there are no more pending TCs.
    ///
    /// After recieving a valid TC a response must be sent using `.send_response()` before
    /// attempting to recieve another. If the TC cannot be read the `Invalid` response is sent by
    /// this function.
    pub fn receive_tc(&self) -> Result<Option<FollowTc>, TcServerError> {
        let tc_str = match self.socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                self.send_response(TcResponse::Invalid)?;
                return Err(TcServerError::NonUtf8Message)
            },
            Err(zmq::Error::EAGAIN) => return Ok(None),
            // No response is sent if we could not recieve
            Err(e) => return Err(TcServerError::RecvError(e))
        };

        match serde_json::from_str(&tc_str) {
            Ok(tc) => Ok(Some(tc)),
            Err(e) => {
                self.send_response(TcResponse::Invalid)?;
                Err(TcServerError::TcParseError(e))
            }
        }
    }

    /// Send the given response back to the client.
    pub fn send_response(&self, response: TcResponse) -> Result<(), TcServerError> {
        let response_str = serde_json::to_string(&response)
            .map_err(TcServerError::SerializationError)?;

        self.socket.send(&response_str, 0)
            .map_err(TcServerError::SendError)
    }
}
