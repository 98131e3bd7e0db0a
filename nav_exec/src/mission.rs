//! # Mission parameters
//!
//! A mission is the list of waypoints to visit along with the scheduling of the control loop
//! which visits them. Missions are loaded from `mission.toml` unless another file is given on the
//! command line.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::waypoint_ctrl::{WaypointPlan, WaypointPlanError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing a mission
#[derive(Debug, Clone, Deserialize)]
pub struct MissionParams {
    /// Waypoints to visit, in order, as `[x, y]` pairs in meters
    pub waypoints_m: Vec<[f64; 2]>,

    /// Target period of one control cycle
    #[serde(default = "default_cycle_period_s")]
    pub cycle_period_s: f64,

    /// Maximum time to wait for the first pose estimate before aborting the mission
    #[serde(default = "default_max_pose_wait_s")]
    pub max_pose_wait_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MissionError {
    #[error("Invalid waypoint plan: {0}")]
    InvalidPlan(WaypointPlanError),

    #[error("The cycle period must be positive, found {0} s")]
    InvalidCyclePeriod(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MissionParams {
    /// Check the mission can be run and build its waypoint plan.
    pub fn plan(&self) -> Result<WaypointPlan, MissionError> {
        if !(self.cycle_period_s > 0.0) {
            return Err(MissionError::InvalidCyclePeriod(self.cycle_period_s));
        }

        WaypointPlan::from_pairs(&self.waypoints_m).map_err(MissionError::InvalidPlan)
    }
}

fn default_cycle_period_s() -> f64 {
    0.05
}

fn default_max_pose_wait_s() -> f64 {
    10.0
}
