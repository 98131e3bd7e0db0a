//! # Target resolution
//!
//! When the robot starts towards a new waypoint the heading and direction of the leg are fixed
//! from the robot's position at that moment. They are not updated as the robot moves, heading
//! corrections only happen in the turning phase at the start of each leg.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::drive::TargetPose;
use nalgebra::{UnitQuaternion, Vector2};
use serde::Serialize;

use crate::loc::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The target of the current leg.
#[derive(Debug, Copy, Clone, Serialize, PartialEq)]
pub struct Target {
    /// The waypoint being driven to
    pub point_m: Vector2<f64>,

    /// Heading of the leg, in (-pi, pi]
    pub heading_rad: f64,

    /// Unit vector pointing along the leg
    pub direction: Vector2<f64>,
}

/// Computes targets from the robot's pose and a waypoint.
#[derive(Debug, Copy, Clone)]
pub struct TargetResolver {
    /// Waypoints closer than this to the robot are degenerate.
    epsilon_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, Copy, Clone, PartialEq)]
pub enum TargetError {
    #[error(
        "The waypoint is {distance_m} m from the robot, too close to compute a direction towards"
    )]
    Degenerate { distance_m: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Target {
    /// Build a target which reuses the heading and direction of `previous` for a new point.
    pub fn keeping_direction(point_m: Vector2<f64>, previous: &Target) -> Self {
        Self {
            point_m,
            heading_rad: previous.heading_rad,
            direction: previous.direction,
        }
    }

    /// Build a target at `point_m` along the robot's current heading.
    pub fn along_heading(point_m: Vector2<f64>, pose: &Pose) -> Self {
        Self {
            point_m,
            heading_rad: pose.heading_rad,
            direction: pose.forward(),
        }
    }

    /// Convert into the announcement published for visualisation.
    pub fn to_target_pose(&self, frame_id: &str) -> TargetPose {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, self.heading_rad);

        TargetPose {
            frame_id: frame_id.into(),
            position_m: [self.point_m[0], self.point_m[1], 0.0],
            orientation_q: [q.i, q.j, q.k, q.w],
        }
    }
}

impl TargetResolver {
    pub fn new(epsilon_m: f64) -> Self {
        Self { epsilon_m }
    }

    /// Resolve the target for driving from `pose` to `waypoint_m`.
    ///
    /// Returns `TargetError::Degenerate` if the waypoint is within the resolver's epsilon of the
    /// robot, since the direction to it is undefined.
    pub fn resolve(&self, pose: &Pose, waypoint_m: &Vector2<f64>) -> Result<Target, TargetError> {
        let delta = waypoint_m - pose.position_m;
        let distance_m = delta.norm();

        // The negated comparison also catches NaN positions
        if !(distance_m >= self.epsilon_m) {
            return Err(TargetError::Degenerate { distance_m });
        }

        Ok(Target {
            point_m: *waypoint_m,
            heading_rad: delta[1].atan2(delta[0]),
            direction: delta / distance_m,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn resolver() -> TargetResolver {
        TargetResolver::new(1e-6)
    }

    #[test]
    fn test_resolve() {
        let target = resolver()
            .resolve(&Pose::default(), &Vector2::new(0.3, 0.3))
            .unwrap();

        assert_eq!(target.point_m, Vector2::new(0.3, 0.3));
        assert!((target.heading_rad - FRAC_PI_4).abs() < 1e-12);
        assert!((target.direction - Vector2::new(0.5f64.sqrt(), 0.5f64.sqrt())).norm() < 1e-12);
        assert!((target.direction.norm() - 1.0).abs() < 1e-12);

        // The robot's own heading has no influence on the target
        let pose = Pose::new(Vector2::new(0.3, 0.3), 1.0);
        let target = resolver().resolve(&pose, &Vector2::new(0.3, 0.0)).unwrap();
        assert!((target.heading_rad + FRAC_PI_2).abs() < 1e-12);
        assert!((target.direction - Vector2::new(0.0, -1.0)).norm() < 1e-12);

        // Directly behind along -x gives the top of the range
        let target = resolver()
            .resolve(&Pose::default(), &Vector2::new(-1.0, 0.0))
            .unwrap();
        assert_eq!(target.heading_rad, PI);
    }

    #[test]
    fn test_resolve_is_pure() {
        let pose = Pose::new(Vector2::new(0.1, -0.2), 0.4);
        let waypoint = Vector2::new(-0.7, 1.3);

        let first = resolver().resolve(&pose, &waypoint);
        let second = resolver().resolve(&pose, &waypoint);
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_degenerate() {
        let pose = Pose::new(Vector2::new(0.3, 0.3), 0.0);

        assert_eq!(
            resolver().resolve(&pose, &Vector2::new(0.3, 0.3)),
            Err(TargetError::Degenerate { distance_m: 0.0 })
        );

        // Within epsilon is also degenerate
        let res = TargetResolver::new(0.01).resolve(&pose, &Vector2::new(0.305, 0.3));
        assert!(matches!(res, Err(TargetError::Degenerate { .. })));

        // NaN positions can't produce a direction either
        let pose = Pose::new(Vector2::new(std::f64::NAN, 0.0), 0.0);
        assert!(resolver().resolve(&pose, &Vector2::new(1.0, 0.0)).is_err());
    }

    #[test]
    fn test_to_target_pose() {
        let target = Target {
            point_m: Vector2::new(0.3, 0.3),
            heading_rad: FRAC_PI_2,
            direction: Vector2::new(0.0, 1.0),
        };

        let msg = target.to_target_pose("map");
        assert_eq!(msg.frame_id, "map");
        assert_eq!(msg.position_m, [0.3, 0.3, 0.0]);

        let half = 0.5f64.sqrt();
        let expected = [0.0, 0.0, half, half];
        for (a, b) in msg.orientation_q.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_keeping_direction() {
        let previous = resolver()
            .resolve(&Pose::default(), &Vector2::new(1.0, 0.0))
            .unwrap();

        let target = Target::keeping_direction(Vector2::new(2.0, 1.0), &previous);
        assert_eq!(target.point_m, Vector2::new(2.0, 1.0));
        assert_eq!(target.heading_rad, previous.heading_rad);
        assert_eq!(target.direction, previous.direction);

        let pose = Pose::new(Vector2::new(0.0, 0.0), FRAC_PI_2);
        let target = Target::along_heading(Vector2::new(0.0, 0.0), &pose);
        assert_eq!(target.heading_rad, FRAC_PI_2);
        assert!((target.direction - Vector2::new(0.0, 1.0)).norm() < 1e-12);
    }
}
