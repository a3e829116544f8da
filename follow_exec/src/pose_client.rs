//! # Pose Client
//!
//! Subscribes to the observations of the leader published by the perception system.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::pose::VehiclePose,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pose observation client
pub struct PoseClient {
    socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoseClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not subscribe to the pose stream: {0}")]
    SubscribeError(zmq::Error),

    #[error("Could not recieve a pose: {0}")]
    RecvError(zmq::Error),

    #[error("The publisher sent a message which was not valid UTF-8")]
    NonUtf8Message,

    #[error("Could not parse the recieved pose: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseClient {
    /// Create a new instance of the pose client.
    ///
    /// Only the most recent observation is kept by the socket, any older ones which were not
    /// received in time are discarded. This function will not block until the publisher
    /// connects.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        recv_timeout_ms: i32
    ) -> Result<Self, PoseClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            conflate: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: recv_timeout_ms,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            &params.pose_endpoint
        ).map_err(PoseClientError::SocketError)?;

        socket.set_subscribe(b"").map_err(PoseClientError::SubscribeError)?;

        Ok(Self {
            socket
        })
    }

    /// Check if the client is connected to the publisher
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Wait up to the receive timeout for an observation.
    ///
    /// Returns `Ok(None)` if nothing arrived in time.
    pub fn receive_pose(&self) -> Result<Option<VehiclePose>, PoseClientError> {
        let pose_str = match self.socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(PoseClientError::NonUtf8Message),
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(PoseClientError::RecvError(e))
        };

        serde_json::from_str(&pose_str)
            .map(Some)
            .map_err(PoseClientError::DeserializeError)
    }
}
