//! Waypoint control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for waypoint control
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {
    /// Heading controller proportional gain
    pub head_k_p: f64,

    /// Maximum magnitude of the turn rate demand
    pub max_turn_rate_rads: f64,

    /// The threshold under which a turn will be considered complete. The comparison is strict.
    pub head_threshold_rad: f64,

    /// If true the heading error is wrapped into (-pi, pi] so the robot always takes the short way
    /// round. If false the raw difference of the two headings is used, which can turn the long
    /// way (or the wrong way) when the target and current heading straddle +-pi.
    pub wrap_head_error: bool,

    /// Translation controller proportional gain
    pub drive_k_p: f64,

    /// Maximum magnitude of the speed demand. `None` leaves the speed demand unlimited.
    pub max_speed_ms: Option<f64>,

    /// The threshold under which the along-track error will be considered complete. The
    /// comparison is strict.
    pub drive_threshold_m: f64,

    /// Distance from the robot within which a waypoint is considered to coincide with it, at
    /// which point no direction towards it can be computed.
    pub degenerate_epsilon_m: f64,

    /// What to do when a waypoint coincides with the robot's position.
    pub degenerate_policy: DegeneratePolicy,

    /// Frame ID placed in the target pose announcements.
    pub target_frame_id: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Handling of waypoints which coincide with the robot's position when they are resolved.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DegeneratePolicy {
    /// The waypoint is treated as already reached and the next one is resolved immediately. If it
    /// was the last waypoint the mission is complete.
    SkipLeg,

    /// The waypoint becomes the target but the previous heading and direction are kept. For the
    /// first waypoint the robot's current heading is used.
    KeepDirection,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            head_k_p: 0.3,
            max_turn_rate_rads: 0.3,
            head_threshold_rad: 0.03,
            wrap_head_error: false,
            drive_k_p: 0.2,
            max_speed_ms: None,
            drive_threshold_m: 0.03,
            degenerate_epsilon_m: 1e-6,
            degenerate_policy: DegeneratePolicy::SkipLeg,
            target_frame_id: String::from("map"),
        }
    }
}
