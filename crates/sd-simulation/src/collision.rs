use std::any::Any;
use std::fmt;

use sd_core::{Actor, Geometry, Plane, SectorId};

/// Outcome of one fit check, consumed by the mover that moved the plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrushRecord {
    /// At least one solid actor no longer fits.
    pub blocked: bool,
    /// Number of actors that took damage.
    pub damaged: usize,
    /// The plane reached its destination on this move.
    pub at_limit: bool,
}

/// The level's actor-collision facility.
///
/// Movers never inspect actors directly: after moving a plane they ask the
/// facility whether everything in the sector still fits, optionally damaging
/// whatever is in the way.
pub trait Collision: fmt::Debug {
    /// Check every actor in `sector` against the sector's current gap,
    /// applying `damage` to each obstruction when given.
    fn check_fit(&mut self, geometry: &Geometry, sector: SectorId, damage: Option<i32>)
    -> CrushRecord;

    /// Return `true` if any solid actor is inside `sector`.
    fn is_occupied(&self, sector: SectorId) -> bool;

    /// Push actors resting on (or hanging from) `plane` of `sector`.
    fn carry(&mut self, sector: SectorId, plane: Plane, dx: f64, dy: f64);

    /// Upcast for downcasting to the concrete facility.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete facility.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A plain list of actors used as the default collision facility.
///
/// Corpses that no longer fit are reduced to gibs (height 0, non-solid)
/// instead of blocking the plane.
#[derive(Debug, Clone, Default)]
pub struct ActorField {
    actors: Vec<Actor>,
}

impl ActorField {
    /// Create a field holding `actors`.
    pub fn new(actors: Vec<Actor>) -> Self {
        Self { actors }
    }

    /// All actors.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Add an actor.
    pub fn push(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    /// Find an actor by id.
    pub fn get(&self, id: sd_core::ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    /// Remove every actor from `sector`.
    pub fn clear_sector(&mut self, sector: SectorId) {
        self.actors.retain(|a| a.sector != sector);
    }
}

impl Collision for ActorField {
    fn check_fit(
        &mut self,
        geometry: &Geometry,
        sector: SectorId,
        damage: Option<i32>,
    ) -> CrushRecord {
        let mut record = CrushRecord::default();
        let Some(gap) = geometry.sector(sector).map(|s| s.gap()) else {
            return record;
        };
        for actor in self
            .actors
            .iter_mut()
            .filter(|a| a.sector == sector && a.solid)
        {
            if actor.height <= gap {
                continue;
            }
            if actor.is_corpse() {
                log::debug!("{} gibbed in sector {sector}", actor.id);
                actor.height = 0.0;
                actor.solid = false;
                continue;
            }
            record.blocked = true;
            if let Some(damage) = damage.filter(|d| *d > 0) {
                actor.health -= damage;
                record.damaged += 1;
            }
        }
        record
    }

    fn is_occupied(&self, sector: SectorId) -> bool {
        self.actors.iter().any(|a| a.sector == sector && a.solid)
    }

    fn carry(&mut self, sector: SectorId, plane: Plane, dx: f64, dy: f64) {
        for actor in self
            .actors
            .iter_mut()
            .filter(|a| a.sector == sector && a.anchor == plane)
        {
            actor.x += dx;
            actor.y += dy;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
