//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the equipment around the
//! navigation executable: the localisation source which publishes pose estimates, and the drive
//! base which accepts velocity commands.
//!
//! Every message is published on its own topic. The wire format is the topic name, a single
//! space, and then the JSON encoding of the message, for example
//! `cmd_vel {"linear_x_ms":0.0,"angular_z_rads":0.3}`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive base messages (velocity commands and target announcements)
pub mod drive;

/// Localisation messages (pose estimates)
pub mod loc;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{de::DeserializeOwned, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A message which is published on a fixed topic.
pub trait TopicMessage: Serialize + DeserializeOwned {
    /// The topic this message is published on.
    const TOPIC: &'static str;

    /// Encode the message into its wire format.
    fn to_wire(&self) -> Result<String, serde_json::Error> {
        Ok(format!("{} {}", Self::TOPIC, serde_json::to_string(self)?))
    }

    /// Decode the message from its wire format.
    ///
    /// Returns `Ok(None)` if the message was published on another topic.
    fn from_wire(msg: &str) -> Result<Option<Self>, serde_json::Error> {
        match msg.split_once(' ') {
            Some((topic, body)) if topic == Self::TOPIC => serde_json::from_str(body).map(Some),
            _ => Ok(None),
        }
    }
}
