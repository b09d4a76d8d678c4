//! Spirits: roaming NPCs that players can catch.

use std::fmt;
use std::sync::Arc;

use mud_shared::{NpcSnapshot, RoomId, SpiritKind};

use crate::clock::Clock;
use crate::error::Result;
use crate::world::WorldContext;

use super::behavior::Behavior;
use super::npc::Npc;
use super::Roamer;

/// A catchable roaming NPC.
///
/// Moves exactly like any other NPC; `kind` only matters to capture gameplay.
#[derive(Debug)]
pub struct Spirit {
    npc: Npc,
    kind: SpiritKind,
}

impl Spirit {
    pub fn new(
        world: Arc<dyn WorldContext>,
        clock: Arc<dyn Clock>,
        name: impl Into<String>,
        room_id: RoomId,
        action_period_secs: i64,
        kind: SpiritKind,
    ) -> Result<Self> {
        let npc = Npc::new(world, clock, name, room_id, action_period_secs)?;
        Ok(Self { npc, kind })
    }

    /// Spirit with its own behavior instead of the random walk
    pub fn with_behavior(
        world: Arc<dyn WorldContext>,
        clock: Arc<dyn Clock>,
        name: impl Into<String>,
        room_id: RoomId,
        action_period_secs: i64,
        kind: SpiritKind,
        behavior: Box<dyn Behavior>,
    ) -> Result<Self> {
        let npc = Npc::with_behavior(world, clock, name, room_id, action_period_secs, behavior)?;
        Ok(Self { npc, kind })
    }

    pub fn kind(&self) -> &SpiritKind {
        &self.kind
    }
}

impl Roamer for Spirit {
    fn npc(&self) -> &Npc {
        &self.npc
    }

    fn snapshot(&self) -> NpcSnapshot {
        NpcSnapshot {
            spirit_kind: Some(self.kind.clone()),
            ..self.npc.snapshot()
        }
    }
}

impl fmt::Display for Spirit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.npc, f)
    }
}
