use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sector::{Plane, SectorId};

/// Identifier of an actor standing in the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor {}", self.0)
    }
}

/// A thing occupying space inside a sector.
///
/// Actors rest on the floor of their sector, or hang from its ceiling when
/// `anchor` is [`Plane::Ceiling`]. Their vertical position is derived from the
/// anchor plane, so only horizontal position is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identifier.
    pub id: ActorId,
    /// The sector the actor is in.
    pub sector: SectorId,
    /// Horizontal position.
    #[serde(default)]
    pub x: f64,
    /// Horizontal position.
    #[serde(default)]
    pub y: f64,
    /// Height of the actor's bounding box.
    pub height: f64,
    /// Remaining health; zero or less means a corpse.
    pub health: i32,
    /// Plane the actor rests on or hangs from.
    #[serde(default = "default_anchor")]
    pub anchor: Plane,
    /// Whether the actor is solid (blocks planes).
    #[serde(default = "default_solid")]
    pub solid: bool,
    /// Whether the actor is a player (players may close doors).
    #[serde(default)]
    pub player: bool,
}

fn default_anchor() -> Plane {
    Plane::Floor
}

fn default_solid() -> bool {
    true
}

impl Actor {
    /// Create a solid monster of the given height resting on the floor.
    pub fn new(id: u32, sector: SectorId, height: f64, health: i32) -> Self {
        Self {
            id: ActorId(id),
            sector,
            x: 0.0,
            y: 0.0,
            height,
            health,
            anchor: Plane::Floor,
            solid: true,
            player: false,
        }
    }

    /// Mark the actor as a player.
    pub fn as_player(mut self) -> Self {
        self.player = true;
        self
    }

    /// Hang the actor from the ceiling instead of resting it on the floor.
    pub fn hanging(mut self) -> Self {
        self.anchor = Plane::Ceiling;
        self
    }

    /// Return `true` if the actor is dead.
    pub fn is_corpse(&self) -> bool {
        self.health <= 0
    }
}
