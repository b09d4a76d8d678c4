//! Server-side entity definitions.

mod behavior;
mod npc;
mod spirit;

use std::fmt;

use mud_shared::NpcSnapshot;

use crate::error::Result;

pub use behavior::{Behavior, RandomWalk};
pub use npc::{Cycle, Npc, NpcState};
pub use spirit::Spirit;

/// Anything the driver can tick: a plain NPC or one of its variants
pub trait Roamer: Send + Sync + fmt::Display {
    fn npc(&self) -> &Npc;

    /// Attempt one behavior cycle
    fn tick(&self) -> Result<bool> {
        self.npc().tick()
    }

    fn snapshot(&self) -> NpcSnapshot {
        self.npc().snapshot()
    }
}

impl Roamer for Npc {
    fn npc(&self) -> &Npc {
        self
    }
}
