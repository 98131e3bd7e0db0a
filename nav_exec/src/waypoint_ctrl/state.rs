//! Waypoint control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::drive::{TargetPose, VelCmd};
use log::{debug, info, warn};
use serde::Serialize;
use std::convert::Infallible;

// Internal
use super::*;
use crate::loc::Pose;
use util::{module::State, session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The waypoint following state machine.
pub struct WaypointCtrl {
    params: Params,

    /// Executing mode
    mode: Mode,

    /// The waypoints to visit
    plan: WaypointPlan,

    /// Index of the waypoint currently being driven to
    cursor: usize,

    /// Target of the current leg
    target: Target,

    /// Announcement of the current target, waiting to be output
    pending_target_pose: Option<TargetPose>,

    /// Set when the mission completes before any cycle has run, so the stop command is issued by
    /// the first call to `proc`
    stop_pending: bool,

    resolver: TargetResolver,

    head_ctrl: HeadingController,

    drive_ctrl: TranslationController,

    output_data: OutputData,
    report: StatusReport,
}

/// Input data to the module
#[derive(Debug, Default, Copy, Clone)]
pub struct InputData {
    /// Pose snapshot for this cycle
    pub pose: Pose,
}

/// Output data from the module
#[derive(Debug, Default, Clone, Serialize)]
pub struct OutputData {
    /// The velocity command for this cycle. `None` once the mission is complete and the stop
    /// command has been issued.
    pub vel_cmd: Option<VelCmd>,

    /// Set on the cycle in which a new target is resolved (including the first waypoint).
    pub target_pose: Option<TargetPose>,
}

/// The status report containing the monitoring quantities of this cycle.
///
/// Every field is a scalar so the report can be archived as a CSV row.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Session time of the cycle
    pub time_s: f64,

    /// Mode at the end of the cycle
    pub mode: Mode,

    /// Waypoint cursor at the end of the cycle
    pub cursor: usize,

    pub pose_x_m: f64,
    pub pose_y_m: f64,
    pub pose_heading_rad: f64,

    /// Heading error, only set in Turning
    pub head_error_rad: f64,

    /// Along-track error, only set in Driving
    pub long_error_m: f64,

    /// Turn rate demand
    pub turn_rate_dem_rads: f64,

    /// Speed demand
    pub speed_dem_ms: f64,

    /// True once the mission is complete
    pub mission_complete: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of execution of WaypointCtrl. Each mode is handled by a `mode_xyz`
/// function.
#[derive(Debug, Copy, Clone, Serialize, PartialEq, Eq)]
pub enum Mode {
    /// Rotating on the spot to face the target
    Turning,

    /// Driving straight towards the target
    Driving,

    /// All waypoints visited
    Done,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Mode {
    fn default() -> Self {
        Mode::Turning
    }
}

impl State for WaypointCtrl {
    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Process waypoint control.
    ///
    /// The pose in the input data is the only pose used for the whole cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let pose = input_data.pose;

        // Setup cycle data
        self.output_data = OutputData::default();
        self.report = StatusReport {
            time_s: session::get_elapsed_seconds(),
            pose_x_m: pose.position_m[0],
            pose_y_m: pose.position_m[1],
            pose_heading_rad: pose.heading_rad,
            ..Default::default()
        };

        match self.mode {
            Mode::Turning => self.mode_turning(&pose),
            Mode::Driving => self.mode_driving(&pose),
            Mode::Done => self.mode_done(),
        }

        // Announce any target resolved during this cycle, or at construction
        self.output_data.target_pose = self.pending_target_pose.take();

        self.report.mode = self.mode;
        self.report.cursor = self.cursor;
        self.report.mission_complete = self.mode == Mode::Done;

        Ok((self.output_data.clone(), self.report))
    }
}

impl WaypointCtrl {
    /// Create a new instance of waypoint control.
    ///
    /// The target for the first waypoint is resolved immediately from `pose`, which should
    /// therefore be a real estimate rather than the tracker's default. The first call to `proc`
    /// will be in Turning mode, and will output the announcement of the first target.
    pub fn new(params: Params, plan: WaypointPlan, pose: &Pose) -> Self {
        // Placeholder target, only used as the "previous" direction if the first waypoint is
        // degenerate and the policy is to keep the direction.
        let target = Target::along_heading(plan.points()[0], pose);

        let mut ctrl = Self {
            resolver: TargetResolver::new(params.degenerate_epsilon_m),
            head_ctrl: HeadingController::from_params(&params),
            drive_ctrl: TranslationController::from_params(&params),
            params,
            mode: Mode::Turning,
            plan,
            cursor: 0,
            target,
            pending_target_pose: None,
            stop_pending: false,
            output_data: OutputData::default(),
            report: StatusReport::default(),
        };

        info!(
            "WaypointCtrl initialised with {} waypoints",
            ctrl.plan.len()
        );

        if !ctrl.start_leg(pose) {
            info!("Every waypoint coincides with the start position, mission complete");
            ctrl.mode = Mode::Done;
            ctrl.stop_pending = true;
        }

        ctrl
    }

    /// Current execution mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Index of the waypoint currently being driven to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Target of the current leg.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Returns true once the mission is complete and the driver can stop calling `proc`.
    pub fn is_done(&self) -> bool {
        self.mode == Mode::Done
    }

    /// Mode turning.
    ///
    /// Turn on the spot towards the target heading, switching to driving once the heading error
    /// is under the threshold.
    fn mode_turning(&mut self, pose: &Pose) {
        let (turn_rate_rads, head_err_rad) =
            self.head_ctrl.step(self.target.heading_rad, pose.heading_rad);

        self.output_data.vel_cmd = Some(VelCmd::turn(turn_rate_rads));
        self.report.head_error_rad = head_err_rad;
        self.report.turn_rate_dem_rads = turn_rate_rads;

        debug!(
            "Turning to waypoint {}: error {:.4} rad, turn rate {:.4} rad/s",
            self.cursor, head_err_rad, turn_rate_rads
        );

        if head_err_rad.abs() < self.params.head_threshold_rad {
            info!(
                "Heading to waypoint {} reached (error {:.4} rad), switching to Driving",
                self.cursor, head_err_rad
            );
            self.mode = Mode::Driving;
        }
    }

    /// Mode driving.
    ///
    /// Drive straight along the leg, and once the along-track error is under the threshold move
    /// onto the next waypoint, or finish the mission if this was the last one.
    fn mode_driving(&mut self, pose: &Pose) {
        let (speed_ms, long_err_m) = self.drive_ctrl.step(
            &self.target.point_m,
            &pose.position_m,
            &self.target.direction,
        );

        self.output_data.vel_cmd = Some(VelCmd::drive(speed_ms));
        self.report.long_error_m = long_err_m;
        self.report.speed_dem_ms = speed_ms;

        debug!(
            "Driving to waypoint {}: error {:.4} m, speed {:.4} m/s",
            self.cursor, long_err_m, speed_ms
        );

        // A NaN error compares false, so it never counts as reached
        let reached = long_err_m.abs() < self.params.drive_threshold_m;
        if !reached {
            return;
        }

        info!(
            "Waypoint {} reached (error {:.4} m)",
            self.cursor, long_err_m
        );

        if self.plan.is_last(self.cursor) {
            self.finish();
            return;
        }

        self.cursor += 1;
        if !self.start_leg(pose) {
            self.finish();
        }
    }

    /// Mode done.
    ///
    /// Nothing is commanded, other than the stop command if the mission completed during
    /// initialisation.
    fn mode_done(&mut self) {
        if self.stop_pending {
            self.output_data.vel_cmd = Some(VelCmd::zero());
            self.stop_pending = false;
        }
    }

    /// Issue the stop command and switch into Done.
    ///
    /// The stop command replaces any other command for this cycle.
    fn finish(&mut self) {
        self.output_data.vel_cmd = Some(VelCmd::zero());
        self.report.turn_rate_dem_rads = 0.0;
        self.report.speed_dem_ms = 0.0;
        self.mode = Mode::Done;

        info!("All {} waypoints visited, mission complete", self.plan.len());
    }

    /// Start the leg to the waypoint at the cursor, resolving its target and switching into
    /// Turning.
    ///
    /// Degenerate waypoints are handled by the configured policy. Returns `false` if skipping
    /// degenerate waypoints ran past the end of the plan, in which case there is no leg to start.
    fn start_leg(&mut self, pose: &Pose) -> bool {
        loop {
            let waypoint_m = self.plan.points()[self.cursor];

            let target = match self.resolver.resolve(pose, &waypoint_m) {
                Ok(t) => t,
                Err(e) => match self.params.degenerate_policy {
                    DegeneratePolicy::SkipLeg => {
                        warn!("Skipping waypoint {}: {}", self.cursor, e);

                        if self.plan.is_last(self.cursor) {
                            return false;
                        }

                        self.cursor += 1;
                        continue;
                    }
                    DegeneratePolicy::KeepDirection => {
                        warn!(
                            "Waypoint {}: {}, keeping the previous heading",
                            self.cursor, e
                        );
                        Target::keeping_direction(waypoint_m, &self.target)
                    }
                },
            };

            info!(
                "New target: waypoint {} of {} at ({:.3}, {:.3}) m, heading {:.4} rad",
                self.cursor + 1,
                self.plan.len(),
                target.point_m[0],
                target.point_m[1],
                target.heading_rad
            );

            self.target = target;
            self.pending_target_pose =
                Some(target.to_target_pose(&self.params.target_frame_id));
            self.mode = Mode::Turning;

            return true;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::UnicycleSim;
    use nalgebra::Vector2;
    use std::f64::consts::FRAC_PI_4;

    fn square_plan() -> WaypointPlan {
        WaypointPlan::from_pairs(&[[0.0, 0.0], [0.3, 0.3], [0.3, 0.0], [0.0, 0.0]]).unwrap()
    }

    fn input(x: f64, y: f64, heading_rad: f64) -> InputData {
        InputData {
            pose: Pose::new(Vector2::new(x, y), heading_rad),
        }
    }

    /// A controller whose single leg runs along +x from the origin, so the target heading is
    /// exactly zero.
    fn straight_ctrl(points: &[[f64; 2]]) -> WaypointCtrl {
        WaypointCtrl::new(
            Params::default(),
            WaypointPlan::from_pairs(points).unwrap(),
            &Pose::default(),
        )
    }

    #[test]
    fn test_first_target() {
        let mut ctrl = WaypointCtrl::new(Params::default(), square_plan(), &Pose::default());

        // The first waypoint is where the robot starts, so it is skipped
        assert_eq!(ctrl.mode(), Mode::Turning);
        assert_eq!(ctrl.cursor(), 1);
        assert_eq!(ctrl.target().point_m, Vector2::new(0.3, 0.3));
        assert!((ctrl.target().heading_rad - FRAC_PI_4).abs() < 1e-12);
        let half = 0.5f64.sqrt();
        assert!((ctrl.target().direction - Vector2::new(half, half)).norm() < 1e-12);

        let (output, report) = ctrl.proc(&input(0.0, 0.0, 0.0)).unwrap();

        // Proportional turn to the left, under the rate limit, no forward speed
        let cmd = output.vel_cmd.unwrap();
        assert_eq!(cmd.linear_x_ms, 0.0);
        assert!((cmd.angular_z_rads - 0.3 * FRAC_PI_4).abs() < 1e-12);
        assert!(cmd.angular_z_rads < 0.3);
        assert!((report.head_error_rad - FRAC_PI_4).abs() < 1e-12);
        assert_eq!(report.mode, Mode::Turning);

        // The first target is announced on the first cycle only
        let target_pose = output.target_pose.unwrap();
        assert_eq!(target_pose.position_m, [0.3, 0.3, 0.0]);
        assert_eq!(target_pose.frame_id, "map");

        let (output, _) = ctrl.proc(&input(0.0, 0.0, 0.1)).unwrap();
        assert!(output.target_pose.is_none());
    }

    #[test]
    fn test_turning_threshold_is_strict() {
        let mut ctrl = straight_ctrl(&[[1.0, 0.0]]);
        assert_eq!(ctrl.target().heading_rad, 0.0);

        // Far away, stays turning as long as needed
        for _ in 0..100 {
            ctrl.proc(&input(0.0, 0.0, 1.0)).unwrap();
            assert_eq!(ctrl.mode(), Mode::Turning);
        }

        // Exactly on the threshold is not converged
        let (output, report) = ctrl.proc(&input(0.0, 0.0, -0.03)).unwrap();
        assert_eq!(report.head_error_rad, 0.03);
        assert_eq!(ctrl.mode(), Mode::Turning);
        assert_eq!(output.vel_cmd.unwrap().linear_x_ms, 0.0);

        // Just under it is
        let (output, report) = ctrl.proc(&input(0.0, 0.0, -0.0299)).unwrap();
        assert_eq!(report.mode, Mode::Driving);
        assert_eq!(ctrl.mode(), Mode::Driving);

        // The converging cycle still outputs the turn command
        assert!((output.vel_cmd.unwrap().angular_z_rads - 0.3 * 0.0299).abs() < 1e-12);
    }

    #[test]
    fn test_driving_advances_cursor() {
        let mut ctrl = straight_ctrl(&[[1.0, 0.0], [1.0, 1.0]]);
        ctrl.proc(&input(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(ctrl.mode(), Mode::Driving);

        // Driving forwards, no turn
        let (output, report) = ctrl.proc(&input(0.5, 0.0, 0.0)).unwrap();
        assert_eq!(output.vel_cmd, Some(VelCmd::drive(0.2 * 0.5)));
        assert_eq!(report.long_error_m, 0.5);
        assert_eq!(ctrl.cursor(), 0);

        // Lateral offset is ignored, along-track error is under the threshold
        let (output, report) = ctrl.proc(&input(0.98, 0.2, 0.0)).unwrap();
        assert_eq!(report.mode, Mode::Turning);
        assert_eq!(report.cursor, 1);
        assert_eq!(ctrl.cursor(), 1);

        // New target is resolved from the pose of the converging cycle
        let target_pose = output.target_pose.unwrap();
        assert_eq!(target_pose.position_m, [1.0, 1.0, 0.0]);
        let expected_heading = (0.8f64).atan2(0.02);
        assert!((ctrl.target().heading_rad - expected_heading).abs() < 1e-12);
    }

    #[test]
    fn test_driving_threshold_is_strict() {
        let mut ctrl = straight_ctrl(&[[0.03, 0.0], [1.0, 0.0]]);
        ctrl.proc(&input(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(ctrl.mode(), Mode::Driving);

        // Exactly on the threshold is not reached
        let (_, report) = ctrl.proc(&input(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(report.long_error_m, 0.03);
        assert_eq!(ctrl.mode(), Mode::Driving);
        assert_eq!(ctrl.cursor(), 0);

        // Just under it is
        let (_, report) = ctrl.proc(&input(0.0001, 0.0, 0.0)).unwrap();
        assert!(report.long_error_m < 0.03);
        assert_eq!(ctrl.mode(), Mode::Turning);
        assert_eq!(ctrl.cursor(), 1);
    }

    #[test]
    fn test_driving_nan_pose_is_not_reached() {
        let mut ctrl = straight_ctrl(&[[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]);
        ctrl.proc(&input(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(ctrl.mode(), Mode::Driving);

        let (_, report) = ctrl.proc(&input(f64::NAN, 0.0, 0.0)).unwrap();
        assert!(report.long_error_m.is_nan());
        assert!(!report.mission_complete);
        assert_eq!(ctrl.mode(), Mode::Driving);
        assert_eq!(ctrl.cursor(), 0);
        assert!(!ctrl.is_done());

        // A valid pose afterwards carries on as normal
        ctrl.proc(&input(0.99, 0.0, 0.0)).unwrap();
        assert_eq!(ctrl.mode(), Mode::Turning);
        assert_eq!(ctrl.cursor(), 1);
    }

    #[test]
    fn test_done_is_terminal() {
        let mut ctrl = straight_ctrl(&[[1.0, 0.0]]);
        ctrl.proc(&input(0.0, 0.0, 0.0)).unwrap();

        let (output, report) = ctrl.proc(&input(0.99, 0.0, 0.0)).unwrap();
        assert_eq!(output.vel_cmd, Some(VelCmd::zero()));
        assert!(report.mission_complete);
        assert!(ctrl.is_done());

        for _ in 0..10 {
            let (output, report) = ctrl.proc(&input(5.0, 5.0, 1.0)).unwrap();
            assert!(output.vel_cmd.is_none());
            assert!(output.target_pose.is_none());
            assert_eq!(report.mode, Mode::Done);
            assert_eq!(ctrl.cursor(), 0);
        }
    }

    #[test]
    fn test_skip_degenerate_last_waypoint() {
        // A single waypoint on top of the robot completes the mission straight away
        let mut ctrl = straight_ctrl(&[[0.0, 0.0]]);
        assert!(ctrl.is_done());

        let (output, report) = ctrl.proc(&input(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(output.vel_cmd, Some(VelCmd::zero()));
        assert!(output.target_pose.is_none());
        assert!(report.mission_complete);

        let (output, _) = ctrl.proc(&input(0.0, 0.0, 0.0)).unwrap();
        assert!(output.vel_cmd.is_none());
    }

    #[test]
    fn test_skip_degenerate_after_advance() {
        // Second and third waypoints repeat the first
        let mut ctrl = straight_ctrl(&[[1.0, 0.0], [1.0, 0.0], [1.0, 0.0]]);
        ctrl.proc(&input(0.0, 0.0, 0.0)).unwrap();

        let (output, report) = ctrl.proc(&input(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(output.vel_cmd, Some(VelCmd::zero()));
        assert!(output.target_pose.is_none());
        assert_eq!(report.cursor, 2);
        assert!(ctrl.is_done());
    }

    #[test]
    fn test_keep_direction_policy() {
        let params = Params {
            degenerate_policy: DegeneratePolicy::KeepDirection,
            ..Default::default()
        };
        let plan = WaypointPlan::from_pairs(&[[0.0, 0.0], [1.0, 0.0]]).unwrap();

        // First waypoint degenerate, the robot's own heading is kept
        let mut ctrl = WaypointCtrl::new(params, plan, &Pose::new(Vector2::zeros(), 0.5));
        assert_eq!(ctrl.cursor(), 0);
        assert_eq!(ctrl.target().heading_rad, 0.5);
        assert_eq!(ctrl.target().point_m, Vector2::zeros());

        // Already facing it, and already there
        let (output, _) = ctrl.proc(&input(0.0, 0.0, 0.5)).unwrap();
        assert!(output.target_pose.is_some());
        assert_eq!(ctrl.mode(), Mode::Driving);

        ctrl.proc(&input(0.0, 0.0, 0.5)).unwrap();
        assert_eq!(ctrl.cursor(), 1);
        assert_eq!(ctrl.target().heading_rad, 0.0);
        assert_eq!(ctrl.mode(), Mode::Turning);
    }

    #[test]
    fn test_square_mission() {
        let mut ctrl = WaypointCtrl::new(Params::default(), square_plan(), &Pose::default());
        let mut sim = UnicycleSim::new(Pose::default(), 0.05);

        let mut prev_cursor = ctrl.cursor();
        let mut num_announcements = 0;
        let mut num_stops = 0;
        let mut num_cycles = 0;

        while num_cycles < 10_000 {
            let (output, report) = ctrl.proc(&InputData { pose: sim.pose() }).unwrap();
            num_cycles += 1;

            // The cursor never goes back and never jumps
            assert!(report.cursor == prev_cursor || report.cursor == prev_cursor + 1);
            prev_cursor = report.cursor;

            if output.target_pose.is_some() {
                num_announcements += 1;
            }

            match output.vel_cmd {
                Some(cmd) => {
                    // Only one of the axes is ever commanded
                    assert!(cmd.linear_x_ms == 0.0 || cmd.angular_z_rads == 0.0);
                    if cmd.is_zero() && ctrl.is_done() {
                        num_stops += 1;
                    }
                    sim.step(&cmd);
                }
                None => break,
            }
        }

        assert!(ctrl.is_done());
        assert_eq!(ctrl.cursor(), 3);
        assert_eq!(num_announcements, 3);
        assert_eq!(num_stops, 1);

        // Finished within the threshold of the last waypoint along the final leg
        assert!(sim.pose().position_m.norm() < 0.05);
    }
}
