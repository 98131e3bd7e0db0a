//! # Localisation module
//!
//! The robot's pose is estimated by an external localisation source. This module holds the most
//! recent estimate so the control loop can read it at its own rate. Estimates are never buffered
//! or interpolated: each new one simply replaces the last.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use comms_if::eqpt::loc::PoseEstimate;
use nalgebra::{Quaternion, UnitQuaternion, Vector2};
use serde::Serialize;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading in the map frame) of the robot.
#[derive(Debug, Copy, Clone, Serialize, Default, PartialEq)]
pub struct Pose {
    /// The position in the map frame
    pub position_m: Vector2<f64>,

    /// The heading (angle to the positive map X axis) in the range (-pi, pi]
    pub heading_rad: f64,
}

/// Holds the latest pose estimate, shared between the thread which receives estimates and the
/// control loop.
///
/// Cloning the tracker gives another handle to the same pose.
#[derive(Debug, Clone, Default)]
pub struct PoseTracker {
    pose: Arc<Mutex<Option<Pose>>>,

    num_updates: Arc<AtomicU64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(position_m: Vector2<f64>, heading_rad: f64) -> Self {
        Self {
            position_m,
            heading_rad,
        }
    }

    /// Build a pose from an estimate published by the localisation source.
    ///
    /// The heading is the yaw of the estimate's orientation. The orientation is used as received,
    /// without normalisation, so a malformed quaternion produces a meaningless heading rather than
    /// an error.
    pub fn from_estimate(estimate: &PoseEstimate) -> Self {
        let [x, y, z, w] = estimate.orientation_q;
        let attitude = UnitQuaternion::new_unchecked(Quaternion::new(w, x, y, z));

        Self {
            position_m: Vector2::new(estimate.position_m[0], estimate.position_m[1]),
            heading_rad: wrap_pi(attitude.euler_angles().2),
        }
    }

    /// Unit vector pointing in the direction of the heading.
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }
}

impl PoseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored pose.
    pub fn update(&self, pose: Pose) {
        // The pose is replaced in a single assignment, so a poisoned lock can't hold a partially
        // written value and is safe to recover.
        let mut guard = self.pose.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(pose);

        self.num_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the latest pose, or the default pose (origin, zero heading) if no estimate has been
    /// received yet.
    ///
    /// Commands computed before the first estimate arrives are based on this default, so callers
    /// should check `has_estimate` before starting any motion.
    pub fn current(&self) -> Pose {
        self.latest().unwrap_or_default()
    }

    /// Get the latest pose if an estimate has been received.
    pub fn latest(&self) -> Option<Pose> {
        *self.pose.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns true once at least one estimate has been received.
    pub fn has_estimate(&self) -> bool {
        self.latest().is_some()
    }

    /// Total number of estimates received.
    pub fn num_updates(&self) -> u64 {
        self.num_updates.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::thread;

    fn estimate(x: f64, y: f64, yaw: f64) -> PoseEstimate {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, yaw);
        PoseEstimate {
            timestamp: None,
            position_m: [x, y, 0.0],
            orientation_q: [q.i, q.j, q.k, q.w],
        }
    }

    #[test]
    fn test_from_estimate() {
        let pose = Pose::from_estimate(&estimate(0.3, -0.2, FRAC_PI_2));
        assert_eq!(pose.position_m, Vector2::new(0.3, -0.2));
        assert!((pose.heading_rad - FRAC_PI_2).abs() < 1e-12);

        // Facing backwards is reported at the top of the range
        let pose = Pose::from_estimate(&estimate(0.0, 0.0, PI));
        assert!(pose.heading_rad > -PI && pose.heading_rad <= PI);
        assert!((pose.heading_rad - PI).abs() < 1e-9);

        // A yaw of exactly -pi is folded onto +pi
        let pose = Pose::from_estimate(&PoseEstimate {
            timestamp: None,
            position_m: [0.0, 0.0, 0.0],
            orientation_q: [0.0, 0.0, -1.0, 0.0],
        });
        assert!(pose.heading_rad > -PI && pose.heading_rad <= PI);
        assert!((pose.heading_rad - PI).abs() < 1e-9);

        // Identity orientation
        let pose = Pose::from_estimate(&PoseEstimate {
            timestamp: None,
            position_m: [1.0, 2.0, 3.0],
            orientation_q: [0.0, 0.0, 0.0, 1.0],
        });
        assert_eq!(pose, Pose::new(Vector2::new(1.0, 2.0), 0.0));
    }

    #[test]
    fn test_tracker_default_before_estimate() {
        let tracker = PoseTracker::new();

        assert!(!tracker.has_estimate());
        assert_eq!(tracker.latest(), None);
        assert_eq!(tracker.current(), Pose::default());
        assert_eq!(tracker.num_updates(), 0);
    }

    #[test]
    fn test_tracker_last_write_wins() {
        let tracker = PoseTracker::new();
        let handle = tracker.clone();

        handle.update(Pose::new(Vector2::new(1.0, 0.0), 0.1));
        handle.update(Pose::new(Vector2::new(2.0, 0.0), 0.2));

        assert!(tracker.has_estimate());
        assert_eq!(tracker.current(), Pose::new(Vector2::new(2.0, 0.0), 0.2));
        assert_eq!(tracker.num_updates(), 2);
    }

    #[test]
    fn test_tracker_snapshots_are_never_torn() {
        let tracker = PoseTracker::new();
        let writer = tracker.clone();

        // Every written pose has x == y == heading, so any torn read would break that
        let jh = thread::spawn(move || {
            for i in 0..10_000 {
                let v = i as f64;
                writer.update(Pose::new(Vector2::new(v, v), v));
            }
        });

        for _ in 0..10_000 {
            let pose = tracker.current();
            assert_eq!(pose.position_m[0], pose.position_m[1]);
            assert_eq!(pose.position_m[0], pose.heading_rad);
        }

        jh.join().unwrap();
        assert_eq!(tracker.num_updates(), 10_000);
        assert_eq!(tracker.current().heading_rad, 9_999.0);
    }
}
