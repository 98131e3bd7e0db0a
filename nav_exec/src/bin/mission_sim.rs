//! # Mission Simulation
//!
//! This binary runs a mission against a kinematic model of the robot rather than the middleware,
//! allowing waypoint control to be tuned without the robot or localisation source. Simulated time
//! advances by one cycle period per cycle, so missions run as fast as the machine allows.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info};
use nalgebra::Vector2;
use structopt::StructOpt;

use nav_lib::{
    loc::Pose,
    mission::MissionParams,
    sim::UnicycleSim,
    waypoint_ctrl::{self, InputData, Mode, WaypointCtrl},
};
use util::{
    archive::Archiver,
    logger::{logger_init, parse_level},
    module::State,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CLI
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "mission_sim", about = "Run a mission against a simulated robot")]
struct Opt {
    /// Mission file to run instead of `params/mission.toml`
    #[structopt(parse(from_os_str))]
    mission: Option<PathBuf>,

    /// Starting position and heading of the robot, as `x y heading` in meters and radians
    #[structopt(long, number_of_values = 3, allow_hyphen_values = true)]
    start: Option<Vec<f64>>,

    /// Simulated time after which the mission is abandoned
    #[structopt(long, default_value = "600")]
    max_time_s: f64,

    /// Minimum level of messages to log (trace, debug or info)
    #[structopt(short, long, default_value = "info")]
    log_level: String,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("mission_sim", "sessions").wrap_err("Failed to create the session")?;

    let min_level = parse_level(&opt.log_level).wrap_err("Invalid log level")?;
    logger_init(min_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Mission Simulation\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let ctrl_params: waypoint_ctrl::Params = util::params::load("waypoint_ctrl.toml")
        .wrap_err("Could not load waypoint control params")?;

    let mission: MissionParams = match opt.mission {
        Some(ref path) => util::params::load_from_path::<MissionParams, _>(path),
        None => util::params::load::<MissionParams>("mission.toml"),
    }
    .wrap_err("Could not load the mission")?;

    let plan = mission.plan().wrap_err("Invalid mission")?;

    let start_pose = match opt.start {
        Some(ref s) if s.len() == 3 => Pose::new(Vector2::new(s[0], s[1]), s[2]),
        Some(ref s) => return Err(eyre!("Expected 3 values for the start pose, found {}", s.len())),
        None => Pose::default(),
    };

    // ---- MODULE INIT ----

    let mut sim = UnicycleSim::new(start_pose, mission.cycle_period_s);

    // Go through the estimate so the orientation conversion is exercised as it would be live
    let first_pose = Pose::from_estimate(&sim.estimate());
    let mut waypoint_ctrl = WaypointCtrl::new(ctrl_params, plan, &first_pose);

    let mut archiver = Archiver::from_path(&session, "waypoint_ctrl.csv")
        .wrap_err("Failed to create the status archive")?;

    // ---- MAIN LOOP ----

    info!("Beginning simulation\n");

    let mut last_mode = waypoint_ctrl.mode();
    let mut num_cycles: u64 = 0;

    loop {
        let input = InputData {
            pose: Pose::from_estimate(&sim.estimate()),
        };

        let (output, mut report) = match waypoint_ctrl.proc(&input) {
            Ok(o) => o,
            Err(e) => match e {},
        };

        // Archive against simulated rather than wall-clock time
        report.time_s = sim.time_s();
        archiver
            .serialise(&report)
            .wrap_err("Could not archive WaypointCtrl status")?;

        if let Some(ref target) = output.target_pose {
            info!(
                "[{:.2} s] Target ({:.3}, {:.3}) m",
                sim.time_s(),
                target.position_m[0],
                target.position_m[1]
            );
        }

        if report.mode != last_mode {
            info!(
                "[{:.2} s] {:?} -> {:?} at ({:.3}, {:.3}) m, {:.4} rad",
                sim.time_s(),
                last_mode,
                report.mode,
                report.pose_x_m,
                report.pose_y_m,
                report.pose_heading_rad
            );
            last_mode = report.mode;
        }

        if let Some(ref cmd) = output.vel_cmd {
            sim.step(cmd);
        }

        num_cycles += 1;

        if report.mode == Mode::Done {
            break;
        }

        if sim.time_s() > opt.max_time_s {
            return Err(eyre!(
                "Mission not complete after {:.1} s of simulated time, stuck at waypoint {}",
                sim.time_s(),
                waypoint_ctrl.cursor()
            ));
        }
    }

    // ---- SHUTDOWN ----

    let final_pose = sim.pose();
    info!(
        "Mission complete after {} cycles ({:.2} s), final pose ({:.3}, {:.3}) m, {:.4} rad",
        num_cycles,
        sim.time_s(),
        final_pose.position_m[0],
        final_pose.position_m[1],
        final_pose.heading_rad
    );

    Ok(())
}
