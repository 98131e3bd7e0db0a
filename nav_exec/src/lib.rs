//! # Navigation library.
//!
//! This library allows the executables and benchmarks in the workspace to access items defined
//! inside the navigation crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command publisher - sends velocity commands and target announcements to the drive layer
pub mod cmd_publisher;

/// Localisation module - holds the robot's latest pose estimate
pub mod loc;

/// Mission parameters - the waypoints to visit and loop scheduling
pub mod mission;

/// Pose client - receives pose estimates from the localisation source
pub mod pose_client;

/// Kinematic simulation of the robot, for running missions offline
pub mod sim;

/// Waypoint control module - turns and drives the robot through a list of waypoints
pub mod waypoint_ctrl;
