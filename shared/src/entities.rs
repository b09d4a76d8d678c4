//! Shared entity definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::{RoomId, DEFAULT_NPC_PERIOD_SECS};

/// A one-way connection out of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    /// Direction label shown to players ("north", "up", "through the gate")
    pub direction: String,
    /// Room this exit leads to
    #[serde(rename = "to")]
    pub destination: RoomId,
}

impl Exit {
    pub fn new(direction: impl Into<String>, destination: RoomId) -> Self {
        Self {
            direction: direction.into(),
            destination,
        }
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }

    pub fn destination(&self) -> RoomId {
        self.destination
    }
}

/// Category of a catchable spirit.
///
/// Opaque to the NPC core; interpreted only by capture gameplay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpiritKind(String);

impl SpiritKind {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpiritKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time view of an NPC, safe to hand to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcSnapshot {
    pub name: String,
    pub current_room_id: RoomId,
    pub past_room_id: RoomId,
    pub last_action_time: u64,
    pub action_period_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spirit_kind: Option<SpiritKind>,
}

/// NPC spawn entry as it appears in a map file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcSpawn {
    pub name: String,
    pub room: RoomId,
    #[serde(default = "default_period")]
    pub period_secs: i64,
    /// Present only for spirits
    #[serde(default)]
    pub spirit_kind: Option<SpiritKind>,
}

fn default_period() -> i64 {
    DEFAULT_NPC_PERIOD_SECS
}
