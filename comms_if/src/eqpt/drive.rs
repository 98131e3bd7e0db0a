//! # Drive base equipment messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::TopicMessage;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A velocity command in the robot body frame.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct VelCmd {
    /// Forward speed in meters/second.
    ///
    /// Positive speeds are "forwards", negative speeds are "backwards"
    pub linear_x_ms: f64,

    /// Turn rate about the body Z+ (upwards) axis in radians/second.
    ///
    /// Follows the right hand rule, so that a positive turn rate rotates the robot to the left.
    pub angular_z_rads: f64,
}

/// Announcement of a newly resolved navigation target, for visualisation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetPose {
    /// Frame the target is expressed in
    pub frame_id: String,

    /// Target position, in meters
    pub position_m: [f64; 3],

    /// Target orientation as a quaternion, in `[x, y, z, w]` order
    pub orientation_q: [f64; 4],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VelCmd {
    /// A command which stops the robot.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A pure rotation command, with the linear speed held at zero.
    pub fn turn(angular_z_rads: f64) -> Self {
        Self {
            linear_x_ms: 0.0,
            angular_z_rads,
        }
    }

    /// A pure forward command, with the turn rate held at zero.
    pub fn drive(linear_x_ms: f64) -> Self {
        Self {
            linear_x_ms,
            angular_z_rads: 0.0,
        }
    }

    /// Returns true if this command stops the robot.
    pub fn is_zero(&self) -> bool {
        self.linear_x_ms == 0.0 && self.angular_z_rads == 0.0
    }
}

impl TopicMessage for VelCmd {
    const TOPIC: &'static str = "cmd_vel";
}

impl TopicMessage for TargetPose {
    const TOPIC: &'static str = "pose_target";
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_vel_cmd_wire() {
        let wire = VelCmd::turn(0.3).to_wire().unwrap();
        assert_eq!(wire, "cmd_vel {\"linear_x_ms\":0.0,\"angular_z_rads\":0.3}");

        assert_eq!(VelCmd::from_wire(&wire).unwrap(), Some(VelCmd::turn(0.3)));
        assert!(VelCmd::zero().is_zero());
        assert!(!VelCmd::drive(0.01).is_zero());
    }

    #[test]
    fn test_target_pose_topic() {
        let target = TargetPose {
            frame_id: "map".into(),
            position_m: [0.3, 0.3, 0.0],
            orientation_q: [0.0, 0.0, 0.3826834323650898, 0.9238795325112867],
        };

        let wire = target.to_wire().unwrap();
        assert!(wire.starts_with("pose_target {\"frame_id\":\"map\""));
        assert_eq!(VelCmd::from_wire(&wire).unwrap(), None);
        // Floats read back bit-exact, including the last digit of the quaternion
        assert_eq!(TargetPose::from_wire(&wire).unwrap(), Some(target));
    }
}
