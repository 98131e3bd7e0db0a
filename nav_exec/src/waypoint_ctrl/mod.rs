//! # Waypoint control module
//!
//! Waypoint control drives the robot through an ordered list of waypoints. Each waypoint is
//! reached by a leg made of two phases:
//!
//! 1. Turning: the robot rotates on the spot until it faces the waypoint, using a proportional
//!    controller on the heading error. The turn rate demand is saturated.
//! 2. Driving: the robot drives straight forward, using a proportional controller on the
//!    along-track error, i.e. the position error projected onto the direction of the leg.
//!
//! The heading and direction of a leg are fixed when the leg starts, from the robot's position at
//! that moment. Each phase ends when the magnitude of its error drops below a threshold. Once
//! the last leg's driving phase ends a single stop command is issued and the mission is
//! complete.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod plan;
pub mod state;
pub mod target;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::{DegeneratePolicy, Params};
pub use plan::*;
pub use state::*;
pub use target::*;
