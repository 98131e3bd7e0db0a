//! # Localisation equipment messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds_option, DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TopicMessage;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pose estimate published by the localisation source.
///
/// Values are passed through as received, no check is made that the orientation is actually a
/// unit quaternion.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PoseEstimate {
    /// UTC timestamp at which the estimate was made, if the source provides one
    #[serde(default, with = "ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Position of the robot in the map frame, in meters
    pub position_m: [f64; 3],

    /// Orientation of the robot in the map frame as a quaternion, in `[x, y, z, w]` order
    pub orientation_q: [f64; 4],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TopicMessage for PoseEstimate {
    const TOPIC: &'static str = "pose_estimate";
}
