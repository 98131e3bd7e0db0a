//! # Pose Client
//!
//! The PoseClient receives pose estimates from the localisation source and writes them into a
//! [`PoseTracker`]. Estimates are published by the source as frequently as it can, so the client
//! runs in a background thread and the control loop reads whatever the latest estimate is.
//!
//! The background thread is the only writer of the tracker it is given.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use chrono::Utc;
use log::{error, trace, warn};

use crate::loc::{Pose, PoseTracker};
use comms_if::{
    eqpt::{loc::PoseEstimate, TopicMessage},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct PoseClient {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoseClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseClient {
    /// Create a new instance of the PoseClient, writing received poses into `tracker`.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        tracker: PoseTracker,
    ) -> Result<Self, PoseClientError> {
        let socket_options = SocketOptions {
            subscriptions: vec![PoseEstimate::TOPIC.into()],
            conflate: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.pose_endpoint)
            .map_err(PoseClientError::SocketError)?;

        let bg_run = Arc::new(AtomicBool::new(true));
        let connected = Arc::new(AtomicBool::new(false));

        let bg_run_clone = bg_run.clone();
        let connected_clone = connected.clone();

        let bg_jh = Some(thread::spawn(move || {
            bg_thread(socket, bg_run_clone, connected_clone, tracker)
        }));

        Ok(Self {
            bg_jh,
            bg_run,
            connected,
        })
    }

    /// Returns true if the socket to the localisation source is connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Drop for PoseClient {
    fn drop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        // The thread wakes up at least every receive timeout, so this won't block for long
        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                error!("PoseClient background thread panicked");
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a message from the localisation source into a pose.
///
/// Returns `None` (after logging why) if the message isn't a valid pose estimate.
pub fn parse_pose_msg(msg: &str) -> Option<Pose> {
    match PoseEstimate::from_wire(msg) {
        Ok(Some(estimate)) => {
            if let Some(ts) = estimate.timestamp {
                trace!(
                    "Pose estimate is {} ms old",
                    Utc::now().signed_duration_since(ts).num_milliseconds()
                );
            }
            Some(Pose::from_estimate(&estimate))
        }
        Ok(None) => {
            warn!("Message on unexpected topic from the pose source");
            None
        }
        Err(e) => {
            warn!("Error deserialising pose estimate: {}", e);
            None
        }
    }
}

/// Background thread, updates the tracker when the source publishes a new estimate.
fn bg_thread(
    socket: MonitoredSocket,
    run: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    tracker: PoseTracker,
) {
    while run.load(Ordering::Relaxed) {
        connected.store(socket.connected(), Ordering::Relaxed);

        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Non UTF-8 message from the pose source");
                continue;
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                error!("Error receiving message from the pose source: {:?}", e);
                break;
            }
        };

        if let Some(pose) = parse_pose_msg(&msg) {
            trace!(
                "New pose ({:.3}, {:.3}) m, {:.4} rad",
                pose.position_m[0],
                pose.position_m[1],
                pose.heading_rad
            );
            tracker.update(pose);
        }
    }
}
