use std::fmt;

use log::debug;
use sd_core::{Actor, Geometry, LevelData, Plane, SectorId};

use crate::clock::LevelClock;
use crate::collision::{ActorField, Collision};
use crate::config::SimConfig;
use crate::context::TickContext;
use crate::error::SimResult;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::mover::{Behavior, Mover, MoverId, Thinker, TickOutcome};
use crate::ownership::PlaneOwners;
use crate::scroller::Scroller;

/// A running level: geometry plus every live mover and scroller.
///
/// Owns the clock, event log, collision facility, and the plane ownership
/// map. Movers are ticked in creation order, which is preserved across
/// snapshots.
pub struct Level {
    pub(crate) geometry: Geometry,
    pub(crate) collision: Box<dyn Collision>,
    pub(crate) clock: LevelClock,
    pub(crate) config: SimConfig,
    pub(crate) events: EventLog,
    pub(crate) movers: Vec<Mover>,
    pub(crate) scrollers: Vec<Scroller>,
    pub(crate) owners: PlaneOwners,
    pub(crate) next_id: u32,
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("tic", &self.clock.tic())
            .field("sectors", &self.geometry.sector_count())
            .field("movers", &self.movers.len())
            .field("scrollers", &self.scrollers.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Level {
    /// Create a level with default configuration and no actors.
    pub fn new(geometry: Geometry) -> Self {
        Self::with_config(geometry, SimConfig::default())
    }

    /// Create a level with the given configuration and no actors.
    pub fn with_config(geometry: Geometry, config: SimConfig) -> Self {
        Self::with_collision(geometry, Box::new(ActorField::new(Vec::new())), config)
    }

    /// Create a level backed by a custom collision facility.
    pub fn with_collision(geometry: Geometry, collision: Box<dyn Collision>, config: SimConfig) -> Self {
        let events = EventLog::new(config.max_events);
        Self {
            geometry,
            collision,
            clock: LevelClock::new(),
            config,
            events,
            movers: Vec::new(),
            scrollers: Vec::new(),
            owners: PlaneOwners::new(),
            next_id: 1,
        }
    }

    /// Build a level from loader output; its actors populate the built-in
    /// collision facility.
    pub fn from_data(mut data: LevelData, config: SimConfig) -> SimResult<Self> {
        let actors: Vec<Actor> = std::mem::take(&mut data.actors);
        let geometry = Geometry::from_data(data)?;
        Ok(Self::with_collision(geometry, Box::new(ActorField::new(actors)), config))
    }

    /// Parse a level from JSON.
    pub fn from_json(json: &str, config: SimConfig) -> SimResult<Self> {
        let (geometry, actors) = Geometry::from_json(json)?;
        Ok(Self::with_collision(geometry, Box::new(ActorField::new(actors)), config))
    }

    /// The level geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Mutable access to the level geometry.
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Live movers in tick order.
    pub fn movers(&self) -> &[Mover] {
        &self.movers
    }

    /// Look up a live mover.
    pub fn mover(&self, id: MoverId) -> Option<&Mover> {
        self.movers.iter().find(|m| m.id() == id)
    }

    /// The mover owning `plane` of `sector`, if any.
    pub fn owner(&self, sector: SectorId, plane: Plane) -> Option<&Mover> {
        self.owners.owner(sector, plane).and_then(|id| self.mover(id))
    }

    /// Live scrollers in tick order.
    pub fn scrollers(&self) -> &[Scroller] {
        &self.scrollers
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Mutable access to the event log, e.g. to drain it.
    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// The level clock.
    pub fn clock(&self) -> &LevelClock {
        &self.clock
    }

    /// The level configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The collision facility.
    pub fn collision(&self) -> &dyn Collision {
        self.collision.as_ref()
    }

    /// Actors of the built-in collision facility, if that is in use.
    pub fn actors(&self) -> Option<&[Actor]> {
        self.collision
            .as_any()
            .downcast_ref::<ActorField>()
            .map(ActorField::actors)
    }

    /// Mutable access to the built-in collision facility, if that is in use.
    pub fn actors_mut(&mut self) -> Option<&mut ActorField> {
        self.collision.as_any_mut().downcast_mut::<ActorField>()
    }

    /// Height of `plane` of `sector` between the previous and current tic,
    /// for renderers. Falls back to the current height when nothing moves it.
    pub fn interpolated_height(&self, sector: SectorId, plane: Plane, frac: f64) -> Option<f64> {
        if let Some(height) = self
            .owner(sector, plane)
            .and_then(|m| m.interpolated_height(&self.geometry, plane, frac))
        {
            return Some(height);
        }
        self.geometry.sector(sector).map(|s| s.height(plane))
    }

    /// Advance the level by one tic.
    ///
    /// Scrollers run first, then every mover not in stasis in creation
    /// order. Movers that finished are removed after the pass.
    pub fn tick(&mut self) {
        self.clock.advance();

        let mut finished = Vec::new();
        {
            let Self {
                geometry,
                collision,
                clock,
                config,
                events,
                movers,
                scrollers,
                ..
            } = self;
            let mut ctx = TickContext {
                geometry,
                collision: collision.as_mut(),
                clock,
                events,
                config,
            };
            for scroller in scrollers.iter_mut() {
                scroller.tick(&mut ctx);
            }
            for mover in movers.iter_mut() {
                if mover.in_stasis() {
                    continue;
                }
                if mover.tick(&mut ctx) == TickOutcome::Finished {
                    finished.push(mover.id());
                }
            }
        }

        for id in finished {
            self.finish(id);
        }
    }

    /// Advance the level by `n` tics.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub(crate) fn emit(&mut self, kind: SimEventKind) {
        self.events.push(SimEvent::new(self.clock.tic(), kind));
    }

    /// Borrow the tick context together with the mover list.
    pub(crate) fn split(&mut self) -> (&mut Vec<Mover>, TickContext<'_>) {
        let Self {
            geometry,
            collision,
            clock,
            config,
            events,
            movers,
            ..
        } = self;
        let ctx = TickContext {
            geometry,
            collision: collision.as_mut(),
            clock,
            events,
            config,
        };
        (movers, ctx)
    }

    /// Claim the planes `behavior` needs on `sector` and start it.
    ///
    /// Returns `None` when any of those planes is already owned.
    pub(crate) fn install(&mut self, sector: SectorId, behavior: Behavior) -> Option<MoverId> {
        let id = MoverId(self.next_id);
        if !self.owners.claim(sector, behavior.planes(), id) {
            return None;
        }
        self.next_id += 1;
        let family = behavior.family();
        let cue = behavior.start_cue();
        self.movers.push(Mover::new(id, sector, behavior, &self.geometry));
        debug!("{family} {id} started on sector {sector}");
        self.emit(SimEventKind::MoverStarted { mover: id, sector, family });
        if let Some(cue) = cue {
            self.emit(SimEventKind::SoundStarted { sector, cue });
        }
        Some(id)
    }

    /// Remove a mover and release its planes.
    pub(crate) fn finish(&mut self, id: MoverId) {
        let Some(index) = self.movers.iter().position(|m| m.id() == id) else {
            return;
        };
        let mover = self.movers.remove(index);
        self.owners.release(id);
        debug!("{} {} finished on sector {}", mover.family(), id, mover.sector());
        self.emit(SimEventKind::MoverFinished {
            mover: id,
            sector: mover.sector(),
            family: mover.family(),
        });
    }

    /// Ids of live movers under `tag` matching `filter`, in tick order.
    pub(crate) fn tagged(&self, tag: i32, filter: impl Fn(&Mover) -> bool) -> Vec<MoverId> {
        self.movers
            .iter()
            .filter(|m| m.behavior().tag() == Some(tag) && filter(m))
            .map(Mover::id)
            .collect()
    }

    pub(crate) fn mover_mut(&mut self, id: MoverId) -> Option<&mut Mover> {
        self.movers.iter_mut().find(|m| m.id() == id)
    }
}
