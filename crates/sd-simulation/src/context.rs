use sd_core::{Geometry, SectorId};

use crate::clock::LevelClock;
use crate::collision::Collision;
use crate::config::SimConfig;
use crate::event::{EventLog, SimEvent, SimEventKind, SoundCue};

/// Mutable context passed to each mover and scroller during a tic.
pub struct TickContext<'a> {
    /// The level geometry.
    pub geometry: &'a mut Geometry,
    /// The collision facility.
    pub collision: &'a mut dyn Collision,
    /// The level clock.
    pub clock: &'a LevelClock,
    /// The event log.
    pub events: &'a mut EventLog,
    /// Level configuration.
    pub config: &'a SimConfig,
}

impl TickContext<'_> {
    /// Emit an event at the current tic.
    pub fn emit(&mut self, kind: SimEventKind) {
        self.events.push(SimEvent::new(self.clock.tic(), kind));
    }

    /// Start a sound sequence on a sector.
    pub fn sound(&mut self, sector: SectorId, cue: SoundCue) {
        self.emit(SimEventKind::SoundStarted { sector, cue });
    }

    /// Stop the sound sequence on a sector.
    pub fn stop_sound(&mut self, sector: SectorId) {
        self.emit(SimEventKind::SoundStopped { sector });
    }

    /// The current tic.
    pub fn tic(&self) -> u64 {
        self.clock.tic()
    }
}
