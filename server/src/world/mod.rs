//! Game world management.

mod map;

pub use map::{GameMap, MapRoom};

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{error, info};
use rayon::prelude::*;

use mud_shared::{NpcSnapshot, RoomId};

use crate::clock::Clock;
use crate::entities::{Npc, Roamer, Spirit};
use crate::error::{Result, WorldError};

/// Room lookup the NPC core depends on
pub trait WorldContext: Send + Sync {
    fn find_room(&self, id: RoomId) -> Option<&dyn Room>;
}

/// A single room as seen by NPCs
pub trait Room: Send + Sync {
    fn id(&self) -> RoomId;

    /// Uniformly random exit whose destination is not `exclude`, if any
    fn random_valid_exit(&self, exclude: RoomId) -> Option<mud_shared::Exit>;

    /// Deliver narration to everyone observing this room
    fn broadcast(&self, message: &str) -> std::result::Result<(), WorldError>;
}

/// Outcome of ticking the whole population once
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub acted: usize,
    pub idle: usize,
    pub failed: usize,
}

/// The map together with every NPC roaming it
pub struct GameWorld {
    map: Arc<GameMap>,
    clock: Arc<dyn Clock>,
    roamers: Vec<Arc<dyn Roamer>>,
}

impl GameWorld {
    pub fn new(map: Arc<GameMap>, clock: Arc<dyn Clock>) -> Self {
        Self {
            map,
            clock,
            roamers: Vec::new(),
        }
    }

    pub fn map(&self) -> &Arc<GameMap> {
        &self.map
    }

    pub fn spawn_npc(&mut self, name: &str, room_id: RoomId, period_secs: i64) -> Result<Arc<Npc>> {
        let npc = Arc::new(Npc::new(self.map.clone(), self.clock.clone(), name, room_id, period_secs)?);
        self.roamers.push(npc.clone());
        Ok(npc)
    }

    pub fn spawn_spirit(
        &mut self,
        name: &str,
        room_id: RoomId,
        period_secs: i64,
        kind: mud_shared::SpiritKind,
    ) -> Result<Arc<Spirit>> {
        let spirit = Arc::new(Spirit::new(
            self.map.clone(),
            self.clock.clone(),
            name,
            room_id,
            period_secs,
            kind,
        )?);
        self.roamers.push(spirit.clone());
        Ok(spirit)
    }

    /// Add an already-built roamer, e.g. one with a custom behavior
    pub fn add_roamer(&mut self, roamer: Arc<dyn Roamer>) {
        self.roamers.push(roamer);
    }

    /// Create every NPC listed in the map's spawn table
    pub fn spawn_from_map(&mut self) -> Result<usize> {
        let spawns = self.map.spawns().to_vec();
        for spawn in &spawns {
            match &spawn.spirit_kind {
                Some(kind) => {
                    self.spawn_spirit(&spawn.name, spawn.room, spawn.period_secs, kind.clone())?;
                }
                None => {
                    self.spawn_npc(&spawn.name, spawn.room, spawn.period_secs)?;
                }
            }
        }
        info!("Spawned {} NPCs from the map", spawns.len());
        Ok(spawns.len())
    }

    pub fn roamers(&self) -> &[Arc<dyn Roamer>] {
        &self.roamers
    }

    pub fn len(&self) -> usize {
        self.roamers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roamers.is_empty()
    }

    pub fn snapshots(&self) -> Vec<NpcSnapshot> {
        self.roamers.iter().map(|r| r.snapshot()).collect()
    }

    /// Tick every NPC once on the rayon pool.
    ///
    /// A failing or panicking NPC is logged and counted; the rest of the pass continues.
    pub fn tick_all(&self) -> TickSummary {
        self.roamers
            .par_iter()
            .map(|roamer| tick_one(roamer.as_ref()))
            .reduce(TickSummary::default, TickSummary::merge)
    }
}

impl TickSummary {
    fn merge(self, other: Self) -> Self {
        Self {
            acted: self.acted + other.acted,
            idle: self.idle + other.idle,
            failed: self.failed + other.failed,
        }
    }
}

fn tick_one(roamer: &dyn Roamer) -> TickSummary {
    let mut summary = TickSummary::default();
    // A panicking hook never commits, so the NPC's state is still whole afterwards
    match panic::catch_unwind(AssertUnwindSafe(|| roamer.tick())) {
        Ok(Ok(true)) => summary.acted = 1,
        Ok(Ok(false)) => summary.idle = 1,
        Ok(Err(e)) => {
            error!("NPC {} failed to act: {}", roamer, e);
            summary.failed = 1;
        }
        Err(_) => {
            error!("NPC {} panicked while acting", roamer);
            summary.failed = 1;
        }
    }
    summary
}
