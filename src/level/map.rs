//! Level map files
//!
//! A map is a JSON document describing everything about a level except its
//! pixels: size, music, start points, blocked tiles, doors and the people
//! standing around. The tile art itself is drawn by the front-end from the
//! map's name.
//!
//! ```text
//! {
//!   "width": 25, "height": 19, "music": "town_theme", "battles": false,
//!   "start_points": [{ "tile": [12, 17], "from": "overworld", "direction": "up" }],
//!   "blockers": [[0, 0], [1, 0]],
//!   "portals": [{ "tile": [5, 7], "destination": "inn" }],
//!   "sprites": [{ "kind": "oldman", "tile": [9, 9], "dialogue": ["Hello."] }]
//! }
//! ```

use crate::animation::Direction;
use crate::collision::{Portal, Rect};
use crate::error::GameError;
use crate::game::ModeId;
use crate::grid::TILE_SIZE;
use crate::item::ItemGrant;
use crate::progress::TREASURE_CHESTS;
use serde::Deserialize;

/// Who a sprite entry spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteKind {
    Oldman,
    Bluedressgirl,
    Femalewarrior,
    Devil,
    Oldmanbrother,
    Soldier,
    King,
    Evilwizard,
    Treasurechest,
}

impl SpriteKind {
    /// Sprite-sheet key.
    pub fn sheet(self) -> &'static str {
        match self {
            SpriteKind::Oldman => "oldman",
            SpriteKind::Bluedressgirl => "femalevillager",
            SpriteKind::Femalewarrior => "femvillager2",
            SpriteKind::Devil => "devil",
            SpriteKind::Oldmanbrother => "oldmanbrother",
            SpriteKind::Soldier => "soldier",
            SpriteKind::King => "king",
            SpriteKind::Evilwizard => "evilwizard",
            SpriteKind::Treasurechest => "treasurechest",
        }
    }

    /// Kinds that wander on their own unless the map says otherwise.
    pub fn wanders(self) -> bool {
        matches!(self, SpriteKind::Femalewarrior | SpriteKind::Devil)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartPoint {
    pub tile: (i32, i32),
    /// Mode the player must be coming from; `None` marks the default
    #[serde(default)]
    pub from: Option<ModeId>,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortalData {
    pub tile: (i32, i32),
    pub destination: ModeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpriteData {
    pub kind: SpriteKind,
    pub tile: (i32, i32),
    #[serde(default)]
    pub direction: Direction,
    /// Initial behaviour, e.g. `"autoresting"`
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub item: Option<ItemGrant>,
    /// Treasure chest id, `1..=5`
    #[serde(default)]
    pub chest: Option<u32>,
    /// Battle trigger id
    #[serde(default)]
    pub battle: Option<String>,
    #[serde(default)]
    pub dialogue: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapData {
    /// Size in tiles
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub music: Option<String>,
    /// Random encounters and battle triggers are live on this map
    #[serde(default)]
    pub battles: bool,
    /// The last tile row is decoration and never scrolled into view
    #[serde(default)]
    pub cut_off_bottom: bool,
    pub start_points: Vec<StartPoint>,
    #[serde(default)]
    pub blockers: Vec<(i32, i32)>,
    #[serde(default)]
    pub portals: Vec<PortalData>,
    #[serde(default)]
    pub sprites: Vec<SpriteData>,
}

impl MapData {
    /// Parses and validates a map. Anything wrong is a configuration error.
    pub fn parse(name: &str, json: &str) -> Result<Self, GameError> {
        let malformed = |reason: String| GameError::MalformedMap {
            name: name.to_string(),
            reason,
        };

        let map: MapData = serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;

        if map.width <= 0 || map.height <= 0 {
            return Err(malformed(format!("bad size {}x{}", map.width, map.height)));
        }
        if map.start_points.is_empty() {
            return Err(malformed("no start point".to_string()));
        }

        let inside = |(x, y): (i32, i32)| x >= 0 && y >= 0 && x < map.width && y < map.height;
        if let Some(start) = map.start_points.iter().find(|start| !inside(start.tile)) {
            return Err(malformed(format!("start point {:?} outside the map", start.tile)));
        }

        for sprite in &map.sprites {
            if sprite.kind == SpriteKind::Treasurechest {
                match sprite.chest {
                    Some(id) if (1..=TREASURE_CHESTS as u32).contains(&id) => {}
                    other => {
                        return Err(malformed(format!(
                            "treasure chest at {:?} has bad id {:?}",
                            sprite.tile, other
                        )));
                    }
                }
            }
        }

        Ok(map)
    }

    /// Entry point for a player arriving from `previous`: the start point
    /// tagged with that mode, else the untagged default, else the first.
    pub fn start_for(&self, previous: Option<ModeId>) -> &StartPoint {
        let tagged = previous.and_then(|previous| {
            self.start_points
                .iter()
                .find(|start| start.from == Some(previous))
        });

        tagged
            .or_else(|| self.start_points.iter().find(|start| start.from.is_none()))
            .unwrap_or(&self.start_points[0])
    }

    /// Scrollable area in pixels.
    pub fn pixel_bounds(&self) -> Rect {
        let rows = if self.cut_off_bottom { self.height - 1 } else { self.height };
        Rect::new(0, 0, self.width * TILE_SIZE, rows * TILE_SIZE)
    }

    pub fn blocker_rects(&self) -> Vec<Rect> {
        self.blockers.iter().map(|&(x, y)| Rect::tile(x, y)).collect()
    }

    pub fn portals(&self) -> Vec<Portal> {
        self.portals
            .iter()
            .map(|portal| Portal {
                rect: Rect::tile(portal.tile.0, portal.tile.1),
                destination: portal.destination,
            })
            .collect()
    }
}
