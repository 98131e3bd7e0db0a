//! # Communications interface crate.
//!
//! Provides the messages exchanged between the navigation executable and the robot middleware,
//! along with the networking used to carry them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for equipment (pose source and drive base)
pub mod eqpt;

/// Network module
pub mod net;
