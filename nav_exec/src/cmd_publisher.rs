//! # Command Publisher
//!
//! Publishes velocity commands and target announcements to the robot's drive layer.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;

use comms_if::{
    eqpt::{
        drive::{TargetPose, VelCmd},
        TopicMessage,
    },
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

use crate::waypoint_ctrl::OutputData;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command publisher
pub struct CmdPublisher {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdPublisherError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send message: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the message: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdPublisher {
    /// Create a new instance of the publisher, bound to the command endpoint.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, CmdPublisherError> {
        let socket_options = SocketOptions {
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.cmd_endpoint)
            .map_err(CmdPublisherError::SocketError)?;

        Ok(Self { socket })
    }

    pub fn send_vel_cmd(&mut self, cmd: &VelCmd) -> Result<(), CmdPublisherError> {
        self.send(cmd)
    }

    pub fn send_target_pose(&mut self, target: &TargetPose) -> Result<(), CmdPublisherError> {
        debug!(
            "Announcing target ({:.3}, {:.3}) m in frame {}",
            target.position_m[0], target.position_m[1], target.frame_id
        );
        self.send(target)
    }

    /// Publish everything the controller produced this cycle.
    ///
    /// The target is announced before the command so subscribers see the new target before
    /// the robot starts moving towards it.
    pub fn send_output(&mut self, output: &OutputData) -> Result<(), CmdPublisherError> {
        if let Some(ref target) = output.target_pose {
            self.send_target_pose(target)?;
        }
        if let Some(ref cmd) = output.vel_cmd {
            self.send_vel_cmd(cmd)?;
        }
        Ok(())
    }

    fn send<M: TopicMessage>(&mut self, msg: &M) -> Result<(), CmdPublisherError> {
        let msg_string = msg
            .to_wire()
            .map_err(CmdPublisherError::SerializationError)?;

        self.socket
            .send(&msg_string, 0)
            .map_err(CmdPublisherError::SendError)
    }
}
