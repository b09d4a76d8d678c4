//! In-memory room graph.
//!
//! Map file format:
//!
//! ```json
//! {
//!   "rooms": [
//!     { "id": 1, "name": "Campus Walk", "exits": [{ "direction": "north", "to": 2 }] }
//!   ],
//!   "npcs": [
//!     { "name": "Groundskeeper", "room": 1, "period_secs": 20 },
//!     { "name": "Ember", "room": 2, "period_secs": 15, "spirit_kind": "fire" }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use serde::Deserialize;
use tokio::sync::broadcast;

use mud_shared::{Exit, NpcSpawn, RoomId, RoomMessage, SpiritKind, NO_ROOM};

use crate::error::WorldError;

use super::{Room, WorldContext};

/// Messages buffered per room for slow observers
const ROOM_CHANNEL_CAPACITY: usize = 64;

/// A room in the map together with its observer channel
pub struct MapRoom {
    pub id: RoomId,
    pub name: String,
    exits: Vec<Exit>,
    sender: broadcast::Sender<RoomMessage>,
}

impl std::fmt::Debug for MapRoom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapRoom")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("exits", &self.exits)
            .field("observers", &self.sender.receiver_count())
            .finish()
    }
}

impl MapRoom {
    fn new(id: RoomId, name: String) -> Self {
        let (sender, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        Self {
            id,
            name,
            exits: Vec::new(),
            sender,
        }
    }

    pub fn exits(&self) -> &[Exit] {
        &self.exits
    }
}

impl Room for MapRoom {
    fn id(&self) -> RoomId {
        self.id
    }

    fn random_valid_exit(&self, exclude: RoomId) -> Option<Exit> {
        let candidates: Vec<&Exit> = self
            .exits
            .iter()
            .filter(|exit| exit.destination != exclude)
            .collect();
        candidates
            .choose(&mut rand::thread_rng())
            .map(|exit| (*exit).clone())
    }

    fn broadcast(&self, message: &str) -> Result<(), WorldError> {
        match self.sender.send(RoomMessage::new(self.id, message)) {
            Ok(_) => {}
            // Nobody watching
            Err(broadcast::error::SendError(_)) => {
                debug!("No observers in room {}, dropped: {}", self.id, message)
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct MapFile {
    rooms: Vec<RoomDef>,
    #[serde(default)]
    npcs: Vec<NpcSpawn>,
}

#[derive(Debug, Deserialize)]
struct RoomDef {
    id: RoomId,
    name: String,
    #[serde(default)]
    exits: Vec<Exit>,
}

/// Room graph keyed by room id, plus the NPCs it should be populated with
#[derive(Debug, Default)]
pub struct GameMap {
    rooms: HashMap<RoomId, MapRoom>,
    spawns: Vec<NpcSpawn>,
}

impl GameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_room(&mut self, id: RoomId, name: impl Into<String>) -> Result<(), WorldError> {
        if id == NO_ROOM {
            return Err(WorldError::ReservedRoomId(id));
        }
        if self.rooms.contains_key(&id) {
            return Err(WorldError::DuplicateRoom(id));
        }
        self.rooms.insert(id, MapRoom::new(id, name.into()));
        Ok(())
    }

    /// Add a one-way exit. The destination is checked by `validate`.
    pub fn add_exit(&mut self, from: RoomId, direction: impl Into<String>, to: RoomId) -> Result<(), WorldError> {
        let room = self.rooms.get_mut(&from).ok_or(WorldError::RoomNotFound(from))?;
        room.exits.push(Exit::new(direction, to));
        Ok(())
    }

    pub fn add_spawn(&mut self, spawn: NpcSpawn) {
        self.spawns.push(spawn);
    }

    pub fn room(&self, id: RoomId) -> Option<&MapRoom> {
        self.rooms.get(&id)
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn spawns(&self) -> &[NpcSpawn] {
        &self.spawns
    }

    /// Start observing a room's narration
    pub fn subscribe(&self, id: RoomId) -> Option<broadcast::Receiver<RoomMessage>> {
        self.rooms.get(&id).map(|room| room.sender.subscribe())
    }

    /// Check that every exit and spawn refers to a room in the map
    pub fn validate(&self) -> Result<(), WorldError> {
        for room in self.rooms.values() {
            for exit in &room.exits {
                if !self.rooms.contains_key(&exit.destination) {
                    return Err(WorldError::UnknownExitTarget {
                        from: room.id,
                        to: exit.destination,
                    });
                }
            }
        }
        for spawn in &self.spawns {
            if !self.rooms.contains_key(&spawn.room) {
                return Err(WorldError::RoomNotFound(spawn.room));
            }
        }

        let dead_ends = self.rooms.values().filter(|r| r.exits.len() <= 1).count();
        if dead_ends > 0 {
            warn!("Map has {} rooms with at most one exit; NPCs entering them will bounce back", dead_ends);
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, WorldError> {
        let file: MapFile = serde_json::from_str(json)?;

        let mut map = Self::new();
        for def in &file.rooms {
            map.add_room(def.id, def.name.clone())?;
        }
        for def in file.rooms {
            for exit in def.exits {
                map.add_exit(def.id, exit.direction, exit.destination)?;
            }
        }
        for spawn in file.npcs {
            map.add_spawn(spawn);
        }

        map.validate()?;
        Ok(map)
    }

    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let map = Self::from_json_str(&content)?;
        info!(
            "Loaded {} rooms and {} NPC spawns from {:?}",
            map.len(),
            map.spawns.len(),
            path
        );
        Ok(map)
    }

    /// Small built-in campus used when no map file is configured
    pub fn with_defaults() -> Self {
        let rooms: BTreeMap<RoomId, (&str, Vec<(&str, RoomId)>)> = BTreeMap::from([
            (1, ("Campus Walk", vec![("north", 2), ("east", 3), ("west", 4)])),
            (2, ("Library", vec![("south", 1), ("east", 5)])),
            (3, ("Dining Hall", vec![("west", 1), ("up", 9)])),
            (4, ("Chapel", vec![("east", 1), ("north", 5)])),
            (5, ("Fountain Court", vec![("west", 2), ("south", 4)])),
            (9, ("Bell Tower", vec![("down", 3)])),
        ]);

        let mut map = Self::new();
        for (&id, (name, _)) in &rooms {
            map.rooms.insert(id, MapRoom::new(id, name.to_string()));
        }
        for (&id, (_, exits)) in &rooms {
            if let Some(room) = map.rooms.get_mut(&id) {
                room.exits = exits.iter().map(|(dir, to)| Exit::new(*dir, *to)).collect();
            }
        }

        map.spawns = vec![
            NpcSpawn {
                name: "Groundskeeper".to_string(),
                room: 1,
                period_secs: 20,
                spirit_kind: None,
            },
            NpcSpawn {
                name: "Ember".to_string(),
                room: 3,
                period_secs: 12,
                spirit_kind: Some(SpiritKind::new("fire")),
            },
            NpcSpawn {
                name: "Drizzle".to_string(),
                room: 5,
                period_secs: 15,
                spirit_kind: Some(SpiritKind::new("water")),
            },
        ];

        info!("Initialized built-in map with {} rooms", map.rooms.len());
        map
    }
}

impl WorldContext for GameMap {
    fn find_room(&self, id: RoomId) -> Option<&dyn Room> {
        self.rooms.get(&id).map(|room| room as &dyn Room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;

    fn room_with_exits(exits: &[(&str, RoomId)]) -> MapRoom {
        let mut room = MapRoom::new(10, "Test".to_string());
        room.exits = exits.iter().map(|(d, to)| Exit::new(*d, *to)).collect();
        room
    }

    #[test]
    fn test_random_valid_exit_never_picks_excluded_room() {
        let room = room_with_exits(&[("north", 1), ("south", 2), ("east", 1), ("west", 3)]);

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let exit = room.random_valid_exit(1).unwrap();
            assert_ne!(exit.destination, 1);
            seen.insert(exit.destination);
        }
        // Both remaining rooms show up
        assert_eq!(seen, HashSet::from([2, 3]));
    }

    #[test]
    fn test_random_valid_exit_none_when_only_backtrack() {
        assert_eq!(room_with_exits(&[("down", 3)]).random_valid_exit(3), None);
        assert_eq!(room_with_exits(&[("down", 3), ("jump", 3)]).random_valid_exit(3), None);
        assert_eq!(room_with_exits(&[]).random_valid_exit(NO_ROOM), None);
        assert_eq!(
            room_with_exits(&[("down", 3)]).random_valid_exit(NO_ROOM),
            Some(Exit::new("down", 3))
        );
    }

    #[test]
    fn test_broadcast_reaches_subscribers_only() {
        let mut map = GameMap::new();
        map.add_room(1, "A").unwrap();
        map.add_room(2, "B").unwrap();

        let mut rx1 = map.subscribe(1).unwrap();
        let mut rx2 = map.subscribe(2).unwrap();
        assert!(map.subscribe(3).is_none());

        map.find_room(1).unwrap().broadcast("hello").unwrap();
        assert_eq!(rx1.try_recv().unwrap(), RoomMessage::new(1, "hello"));
        assert!(rx2.try_recv().is_err());

        // No one listening in room 2 after the receiver goes away
        drop(rx2);
        assert!(map.find_room(2).unwrap().broadcast("anyone?").is_ok());
    }

    #[test]
    fn test_add_room_rejects_sentinel_and_duplicates() {
        let mut map = GameMap::new();
        assert!(matches!(map.add_room(NO_ROOM, "Void"), Err(WorldError::ReservedRoomId(0))));
        map.add_room(1, "A").unwrap();
        assert!(matches!(map.add_room(1, "A again"), Err(WorldError::DuplicateRoom(1))));
        assert!(matches!(map.add_exit(7, "north", 1), Err(WorldError::RoomNotFound(7))));
    }

    #[test]
    fn test_validate_catches_dangling_exit() {
        let mut map = GameMap::new();
        map.add_room(1, "A").unwrap();
        map.add_exit(1, "north", 2).unwrap();
        assert!(matches!(
            map.validate(),
            Err(WorldError::UnknownExitTarget { from: 1, to: 2 })
        ));
    }

    #[test]
    fn test_defaults_are_valid() {
        let map = GameMap::with_defaults();
        map.validate().unwrap();
        assert_eq!(map.room_ids(), vec![1, 2, 3, 4, 5, 9]);
        assert_eq!(map.spawns().len(), 3);
        assert_eq!(map.room(9).unwrap().exits(), &[Exit::new("down", 3)]);
    }

    #[test]
    fn test_load_from_json_file() {
        let json = r#"{
            "rooms": [
                { "id": 3, "name": "Cellar", "exits": [{ "direction": "up", "to": 9 }] },
                { "id": 9, "name": "Tower", "exits": [{ "direction": "down", "to": 3 }] }
            ],
            "npcs": [
                { "name": "Bat", "room": 9 },
                { "name": "Ember", "room": 3, "period_secs": 4, "spirit_kind": "fire" }
            ]
        }"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let map = GameMap::load_from_json(file.path()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.room(3).unwrap().name, "Cellar");
        assert_eq!(map.spawns()[0].period_secs, mud_shared::DEFAULT_NPC_PERIOD_SECS);
        assert_eq!(map.spawns()[1].spirit_kind, Some(SpiritKind::new("fire")));
    }

    #[test]
    fn test_json_with_unknown_spawn_room_is_rejected() {
        let json = r#"{ "rooms": [{ "id": 1, "name": "A" }], "npcs": [{ "name": "Bat", "room": 2 }] }"#;
        assert!(matches!(GameMap::from_json_str(json), Err(WorldError::RoomNotFound(2))));
        assert!(matches!(GameMap::from_json_str("not json"), Err(WorldError::Json(_))));
    }
}
