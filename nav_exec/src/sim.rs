//! # Kinematic simulation
//!
//! A unicycle model of the robot, used to run missions without the robot or middleware. The
//! model integrates the commanded body velocities perfectly, there is no slip, lag or noise.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::Utc;
use comms_if::eqpt::{drive::VelCmd, loc::PoseEstimate};
use nalgebra::UnitQuaternion;
use util::maths::wrap_pi;

use crate::loc::Pose;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Unicycle kinematic model.
#[derive(Debug, Clone)]
pub struct UnicycleSim {
    pose: Pose,

    /// Integration step in seconds
    dt_s: f64,

    /// Total simulated time in seconds
    time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl UnicycleSim {
    pub fn new(initial_pose: Pose, dt_s: f64) -> Self {
        Self {
            pose: initial_pose,
            dt_s,
            time_s: 0.0,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Apply the command for one step and return the new pose.
    pub fn step(&mut self, cmd: &VelCmd) -> Pose {
        // Move along the current heading, then rotate
        let forward = self.pose.forward();
        self.pose.position_m += forward * cmd.linear_x_ms * self.dt_s;
        self.pose.heading_rad = wrap_pi(self.pose.heading_rad + cmd.angular_z_rads * self.dt_s);

        self.time_s += self.dt_s;

        self.pose
    }

    /// The current pose as the localisation source would publish it.
    pub fn estimate(&self) -> PoseEstimate {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, self.pose.heading_rad);

        PoseEstimate {
            timestamp: Some(Utc::now()),
            position_m: [self.pose.position_m[0], self.pose.position_m[1], 0.0],
            orientation_q: [q.i, q.j, q.k, q.w],
        }
    }
}
