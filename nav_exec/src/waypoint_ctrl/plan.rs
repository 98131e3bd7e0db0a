//! # Waypoint plan
//!
//! The ordered sequence of points the robot visits. The plan is fixed once built, progress
//! through it is tracked by the cursor held in [`super::WaypointCtrl`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered, non-empty sequence of waypoints in the map frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaypointPlan {
    points_m: Vec<Vector2<f64>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WaypointPlanError {
    #[error("Attempted to create a waypoint plan from an empty sequence")]
    EmptySequence,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WaypointPlan {
    /// Create a new plan from the given points.
    pub fn new(points_m: Vec<Vector2<f64>>) -> Result<Self, WaypointPlanError> {
        if points_m.is_empty() {
            return Err(WaypointPlanError::EmptySequence);
        }

        Ok(Self { points_m })
    }

    /// Create a new plan from `[x, y]` pairs, as they appear in parameter files.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Result<Self, WaypointPlanError> {
        Self::new(pairs.iter().map(|p| Vector2::new(p[0], p[1])).collect())
    }

    /// Get the waypoint at the given index.
    pub fn get(&self, index: usize) -> Option<&Vector2<f64>> {
        self.points_m.get(index)
    }

    /// Number of waypoints in the plan, always at least one.
    pub fn len(&self) -> usize {
        self.points_m.len()
    }

    /// Returns true if `index` is the final waypoint.
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.points_m.len()
    }

    pub fn points(&self) -> &[Vector2<f64>] {
        &self.points_m
    }
}
