//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise parameters, network and the pose client
//!     - Wait for the first pose estimate
//!     - Main loop:
//!         - Read the latest pose estimate
//!         - Waypoint control processing
//!         - Publish the target announcement and velocity command
//!         - Archive the status report
//!     - Stop once the final waypoint is reached

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::net::{zmq, NetParams};
use nav_lib::{
    cmd_publisher::CmdPublisher,
    loc::{Pose, PoseTracker},
    mission::MissionParams,
    pose_client::PoseClient,
    waypoint_ctrl::{self, InputData, WaypointCtrl},
};
use util::{
    archive::Archiver,
    logger::{logger_init, parse_level},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period between checks for the first pose estimate.
const POSE_WAIT_POLL_PERIOD_S: f64 = 0.05;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec", about = "Drive the robot through a list of waypoints")]
struct Opt {
    /// Mission file to run instead of `params/mission.toml`
    #[structopt(parse(from_os_str))]
    mission: Option<PathBuf>,

    /// Minimum level of messages to log (trace, debug or info)
    #[structopt(short, long, default_value = "debug")]
    log_level: String,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let min_level = parse_level(&opt.log_level).wrap_err("Invalid log level")?;
    logger_init(min_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Waypoint Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let ctrl_params: waypoint_ctrl::Params = util::params::load("waypoint_ctrl.toml")
        .wrap_err("Could not load waypoint control params")?;

    let mission: MissionParams = match opt.mission {
        Some(ref path) => {
            info!("Loading mission from {:?}", path);
            util::params::load_from_path::<MissionParams, _>(path)
        }
        None => util::params::load::<MissionParams>("mission.toml"),
    }
    .wrap_err("Could not load the mission")?;

    let plan = mission.plan().wrap_err("Invalid mission")?;

    info!(
        "Mission loaded: {} waypoints, cycle period {:.3} s",
        plan.len(),
        mission.cycle_period_s
    );

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = zmq::Context::new();

    let tracker = PoseTracker::new();
    let pose_client = PoseClient::new(&zmq_ctx, &net_params, tracker.clone())
        .wrap_err("Failed to initialise the PoseClient")?;
    info!("PoseClient initialised");

    let mut cmd_publisher =
        CmdPublisher::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise CmdPublisher")?;
    info!("CmdPublisher initialised");

    // ---- WAIT FOR FIRST POSE ----

    let first_pose = wait_first_pose(&tracker, mission.max_pose_wait_s)?;

    debug!("Pose source connected: {}", pose_client.is_connected());

    info!(
        "First pose estimate: ({:.3}, {:.3}) m, {:.4} rad",
        first_pose.position_m[0], first_pose.position_m[1], first_pose.heading_rad
    );

    // ---- INITIALISE MODULES ----

    let mut waypoint_ctrl = WaypointCtrl::new(ctrl_params, plan, &first_pose);

    let mut archiver = Archiver::from_path(&session, "waypoint_ctrl.csv")
        .wrap_err("Failed to create the status archive")?;

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let cycle_period = Duration::from_secs_f64(mission.cycle_period_s);

    loop {
        let cycle_start_instant = Instant::now();

        // Exactly one read of the pose per cycle
        let input = InputData {
            pose: tracker.current(),
        };

        let (output, report) = match waypoint_ctrl.proc(&input) {
            Ok(o) => o,
            Err(e) => match e {},
        };

        if let Err(e) = cmd_publisher.send_output(&output) {
            warn!("CmdPublisher error: {}", e);
        }

        if let Err(e) = archiver.serialise(&report) {
            warn!("Could not archive WaypointCtrl status: {}", e);
        }

        if waypoint_ctrl.is_done() {
            info!("Final waypoint reached");
            break;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    // Let the stop command leave the socket before it's closed
    thread::sleep(cycle_period);

    info!("End of execution");

    Ok(())
}

/// Wait until the tracker holds a pose estimate, or abort after `max_wait_s`.
fn wait_first_pose(tracker: &PoseTracker, max_wait_s: f64) -> Result<Pose> {
    info!("Waiting for first pose estimate");

    let start = Instant::now();

    loop {
        if let Some(pose) = tracker.latest() {
            return Ok(pose);
        }

        let waited_s = start.elapsed().as_secs_f64();
        if waited_s > max_wait_s {
            return Err(eyre!(
                "No pose estimate received after {:.1} s, aborting",
                waited_s
            ));
        }

        thread::sleep(Duration::from_secs_f64(POSE_WAIT_POLL_PERIOD_S));
    }
}
