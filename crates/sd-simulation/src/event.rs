use std::fmt;

use sd_core::{LineId, Plane, SectorId};
use serde::{Deserialize, Serialize};

use crate::mover::{Family, MoverId};

/// Sound sequence cues raised by movers. Playback belongs to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// A door starts opening.
    DoorOpen,
    /// A door starts closing.
    DoorClose,
    /// A platform starts moving.
    PlatStart,
    /// A platform reaches a stop.
    PlatStop,
    /// A ceiling starts moving.
    Ceiling,
    /// A floor starts moving.
    Floor,
    /// A named sequence, such as an animated door's own sound.
    Named(String),
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoorOpen => f.write_str("door-open"),
            Self::DoorClose => f.write_str("door-close"),
            Self::PlatStart => f.write_str("plat-start"),
            Self::PlatStop => f.write_str("plat-stop"),
            Self::Ceiling => f.write_str("ceiling"),
            Self::Floor => f.write_str("floor"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    // Lifecycle
    /// A mover was attached to a sector.
    MoverStarted {
        /// The new mover.
        mover: MoverId,
        /// The sector it moves.
        sector: SectorId,
        /// Its behavior family.
        family: Family,
    },
    /// A mover completed and released its planes.
    MoverFinished {
        /// The finished mover.
        mover: MoverId,
        /// The sector it moved.
        sector: SectorId,
        /// Its behavior family.
        family: Family,
    },
    /// A mover entered stasis.
    MoverStopped {
        /// The suspended mover.
        mover: MoverId,
    },
    /// A mover left stasis.
    MoverResumed {
        /// The resumed mover.
        mover: MoverId,
    },

    // Sound
    /// A sound sequence started on a sector.
    SoundStarted {
        /// The sector emitting the sound.
        sector: SectorId,
        /// The sequence requested.
        cue: SoundCue,
    },
    /// The sound sequence on a sector stopped.
    SoundStopped {
        /// The sector whose sound stopped.
        sector: SectorId,
    },

    // Side effects on the level
    /// Sectors tagged `tag` should be lit partway.
    LightPartway {
        /// The light tag.
        tag: i32,
        /// Fraction of full brightness, in `[0, 1]`.
        fraction: f64,
    },
    /// A plane texture was replaced.
    TextureChanged {
        /// The affected sector.
        sector: SectorId,
        /// The affected plane.
        plane: Plane,
        /// The new texture.
        texture: String,
    },
    /// A sector special was replaced.
    SpecialChanged {
        /// The affected sector.
        sector: SectorId,
    },
    /// A line's middle texture was swapped to a new frame.
    LineTextureChanged {
        /// The affected line.
        line: LineId,
        /// The new texture.
        texture: String,
    },
    /// A line's blocking flag changed.
    LineBlocking {
        /// The affected line.
        line: LineId,
        /// The new flag value.
        blocking: bool,
    },
    /// Actors took crush damage.
    ActorsCrushed {
        /// The sector doing the crushing.
        sector: SectorId,
        /// Number of actors damaged.
        count: usize,
    },
}

impl SimEventKind {
    /// Check whether a given sector is involved in this event.
    pub fn involves(&self, id: SectorId) -> bool {
        match self {
            Self::MoverStarted { sector, .. }
            | Self::MoverFinished { sector, .. }
            | Self::SoundStarted { sector, .. }
            | Self::SoundStopped { sector }
            | Self::TextureChanged { sector, .. }
            | Self::SpecialChanged { sector }
            | Self::ActorsCrushed { sector, .. } => *sector == id,
            Self::MoverStopped { .. }
            | Self::MoverResumed { .. }
            | Self::LightPartway { .. }
            | Self::LineTextureChanged { .. }
            | Self::LineBlocking { .. } => false,
        }
    }
}

impl fmt::Display for SimEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoverStarted {
                mover,
                sector,
                family,
            } => write!(f, "{family} {mover} started on sector {sector}"),
            Self::MoverFinished {
                mover,
                sector,
                family,
            } => write!(f, "{family} {mover} finished on sector {sector}"),
            Self::MoverStopped { mover } => write!(f, "{mover} entered stasis"),
            Self::MoverResumed { mover } => write!(f, "{mover} resumed"),
            Self::SoundStarted { sector, cue } => write!(f, "sound {cue} on sector {sector}"),
            Self::SoundStopped { sector } => write!(f, "sound stopped on sector {sector}"),
            Self::LightPartway { tag, fraction } => {
                write!(f, "light tag {tag} at {:.0}%", fraction * 100.0)
            }
            Self::TextureChanged {
                sector,
                plane,
                texture,
            } => write!(f, "sector {sector} {plane} texture -> {texture}"),
            Self::SpecialChanged { sector } => write!(f, "sector {sector} special replaced"),
            Self::LineTextureChanged { line, texture } => {
                write!(f, "line {line} texture -> {texture}")
            }
            Self::LineBlocking { line, blocking } => {
                let state = if *blocking { "blocking" } else { "passable" };
                write!(f, "line {line} is {state}")
            }
            Self::ActorsCrushed { sector, count } => {
                write!(f, "{count} actor(s) crushed in sector {sector}")
            }
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    /// The tic when this event occurred.
    pub tic: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
}

impl SimEvent {
    /// Create a new event at the given tic.
    pub fn new(tic: u64, kind: SimEventKind) -> Self {
        Self { tic, kind }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>5}] {}", self.tic, self.kind)
    }
}

/// Accumulates events during a level run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        log::trace!("{event}");
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tic.
    pub fn events_at_tic(&self, tic: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tic == tic).collect()
    }

    /// Return all events involving the given sector.
    pub fn events_for_sector(&self, id: SectorId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Remove and return all recorded events.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(tic: u64, sector: usize) -> SimEvent {
        SimEvent::new(
            tic,
            SimEventKind::SoundStopped {
                sector: SectorId(sector),
            },
        )
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        log.push(sound(1, 0));
        log.push(sound(1, 1));
        log.push(sound(2, 0));

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_at_tic(1).len(), 2);
        assert_eq!(log.events_at_tic(3).len(), 0);
        assert_eq!(log.events_for_sector(SectorId(0)).len(), 2);
        assert_eq!(log.events_for_sector(SectorId(1)).len(), 1);
    }

    #[test]
    fn event_log_max_capacity() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.push(sound(i, 0));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.events()[0].tic, 2);
        assert_eq!(log.events()[2].tic, 4);
    }

    #[test]
    fn event_log_unlimited_capacity() {
        let mut log = EventLog::new(0);
        for i in 0..1000 {
            log.push(sound(i, 0));
        }
        assert_eq!(log.len(), 1000);
    }

    #[test]
    fn event_log_clear_and_drain() {
        let mut log = EventLog::new(0);
        log.push(sound(1, 0));
        log.push(sound(2, 0));
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
        log.push(sound(3, 0));
        log.clear();
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn light_and_line_events_involve_no_sector() {
        let light = SimEventKind::LightPartway {
            tag: 3,
            fraction: 0.5,
        };
        let line = SimEventKind::LineBlocking {
            line: LineId(0),
            blocking: true,
        };
        assert!(!light.involves(SectorId(0)));
        assert!(!line.involves(SectorId(0)));
    }

    #[test]
    fn event_display_is_readable() {
        let event = SimEvent::new(
            12,
            SimEventKind::SoundStarted {
                sector: SectorId(4),
                cue: SoundCue::DoorOpen,
            },
        );
        assert_eq!(event.to_string(), "[   12] sound door-open on sector #4");
    }
}
