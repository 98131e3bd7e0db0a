//! # Waypoint controllers module
//!
//! This module provides the two proportional controllers used by waypoint control, including
//! their error calculations. Neither controller holds any state between cycles.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use util::maths::wrap_pi;

use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Turns the robot on the spot to face the target heading.
#[derive(Debug, Serialize, Clone)]
pub struct HeadingController {
    /// Proportional gain
    k_p: f64,

    /// Turn rate demand limit
    max_turn_rate_rads: f64,

    /// If true the error is wrapped into (-pi, pi]
    wrap_error: bool,
}

/// Drives the robot straight along the leg towards the target point.
#[derive(Debug, Serialize, Clone)]
pub struct TranslationController {
    /// Proportional gain
    k_p: f64,

    /// Speed demand limit, unlimited if `None`
    max_speed_ms: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingController {
    /// Create a new controller with the given gain and limit.
    pub fn new(k_p: f64, max_turn_rate_rads: f64, wrap_error: bool) -> Self {
        Self {
            k_p,
            max_turn_rate_rads,
            wrap_error,
        }
    }

    pub fn from_params(params: &Params) -> Self {
        Self::new(
            params.head_k_p,
            params.max_turn_rate_rads,
            params.wrap_head_error,
        )
    }

    /// Get the turn rate demand and heading error for the given headings.
    ///
    /// The error is `target - current`, so a positive error is corrected by a positive (left)
    /// turn. Unless wrapping is enabled the error is not reduced into (-pi, pi], matching the
    /// behaviour of the reference controller.
    pub fn step(&self, target_heading_rad: f64, current_heading_rad: f64) -> (f64, f64) {
        let mut error_rad = target_heading_rad - current_heading_rad;
        if self.wrap_error {
            error_rad = wrap_pi(error_rad);
        }

        let turn_rate_rads =
            (self.k_p * error_rad).clamp(-self.max_turn_rate_rads, self.max_turn_rate_rads);

        trace!(
            "Heading target {:.4} rad, current {:.4} rad, error {:.4} rad, demand {:.4} rad/s",
            target_heading_rad,
            current_heading_rad,
            error_rad,
            turn_rate_rads
        );

        (turn_rate_rads, error_rad)
    }
}

impl TranslationController {
    /// Create a new controller with the given gain and optional limit.
    pub fn new(k_p: f64, max_speed_ms: Option<f64>) -> Self {
        Self { k_p, max_speed_ms }
    }

    pub fn from_params(params: &Params) -> Self {
        Self::new(params.drive_k_p, params.max_speed_ms)
    }

    /// Get the speed demand and along-track error for the given positions.
    ///
    /// The along-track error is the position error projected onto the leg's direction. Positive
    /// errors indicate that the robot hasn't reached the target yet, negative that it has
    /// overshot. Lateral error is not corrected.
    pub fn step(
        &self,
        target_m: &Vector2<f64>,
        current_m: &Vector2<f64>,
        direction: &Vector2<f64>,
    ) -> (f64, f64) {
        let long_error_m = (target_m - current_m).dot(direction);

        let mut speed_ms = self.k_p * long_error_m;
        if let Some(max) = self.max_speed_ms {
            speed_ms = speed_ms.clamp(-max, max);
        }

        trace!(
            "Along-track error {:.4} m, demand {:.4} m/s",
            long_error_m,
            speed_ms
        );

        (speed_ms, long_error_m)
    }
}
