use sd_core::{Geometry, LineId, Plane, SectorId};
use serde::{Deserialize, Serialize};

use super::{Family, Thinker, TickOutcome, all_finite, require_finite, require_speed, valid_direction};
use crate::context::TickContext;
use crate::crush::CrushPolicy;
use crate::error::SimResult;
use crate::event::SoundCue;
use crate::movement::{MoveResult, move_ceiling, move_floor};

/// Elevator behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevatorKind {
    /// To the next higher neighbouring floor.
    Up,
    /// To the next lower neighbouring floor.
    Down,
    /// To the floor of the activating line's front sector.
    Current,
    /// Up by a distance.
    Raise,
    /// Down by a distance.
    Lower,
}

raw_kinds!(ElevatorKind, "elevator", [Up, Down, Current, Raise, Lower]);

/// Parameters of an elevator activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevatorRequest {
    /// The elevator behavior.
    pub kind: ElevatorKind,
    /// Target tag; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Units per tic.
    pub speed: f64,
    /// Distance for the raise and lower kinds.
    #[serde(default)]
    pub height: f64,
}

impl ElevatorRequest {
    /// A request with no distance.
    pub fn new(kind: ElevatorKind, tag: i32, speed: f64) -> Self {
        Self {
            kind,
            tag,
            line: None,
            speed,
            height: 0.0,
        }
    }

    /// Set the activating line.
    pub fn with_line(mut self, line: LineId) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the distance.
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        require_speed("elevator speed", self.speed)?;
        require_finite("elevator height", self.height)
    }
}

/// Floor and ceiling moving together by the same amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elevator {
    kind: ElevatorKind,
    direction: i8,
    floor_dest: f64,
    ceiling_dest: f64,
    speed: f64,
}

impl Elevator {
    /// Pin targets. [`ElevatorKind::Current`] needs an activating line.
    pub fn new(geometry: &Geometry, sector: SectorId, request: &ElevatorRequest) -> Option<Self> {
        let s = geometry.sector(sector)?;
        let floor = s.floor_height;
        let floor_dest = match request.kind {
            ElevatorKind::Up => geometry.find_next_highest_floor(sector),
            ElevatorKind::Down => geometry.find_next_lowest_floor(sector),
            ElevatorKind::Current => {
                let line = geometry.line(request.line?)?;
                geometry.sector(line.front)?.floor_height
            }
            ElevatorKind::Raise => floor + request.height,
            ElevatorKind::Lower => floor - request.height,
        };
        Some(Self {
            kind: request.kind,
            direction: if floor_dest > floor { 1 } else { -1 },
            floor_dest,
            ceiling_dest: floor_dest + s.gap(),
            speed: request.speed,
        })
    }

    /// The elevator behavior.
    pub fn kind(&self) -> ElevatorKind {
        self.kind
    }

    /// Final floor height.
    pub fn floor_dest(&self) -> f64 {
        self.floor_dest
    }

    /// Final ceiling height.
    pub fn ceiling_dest(&self) -> f64 {
        self.ceiling_dest
    }
}

impl Thinker for Elevator {
    fn family(&self) -> Family {
        Family::Elevator
    }

    fn planes(&self) -> &'static [Plane] {
        &Plane::BOTH
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        let Some(before) = ctx.geometry.sector(sector).map(|s| (s.floor_height, s.ceiling_height)) else {
            return TickOutcome::Finished;
        };
        let mut none = CrushPolicy::none();
        let (lead, trail) = if self.direction < 0 {
            let lead = move_floor(ctx, sector, self.speed, self.floor_dest, false, &mut none);
            let trail = move_ceiling(ctx, sector, self.speed, self.ceiling_dest, false, &mut none);
            (lead, trail)
        } else {
            let lead = move_ceiling(ctx, sector, self.speed, self.ceiling_dest, true, &mut none);
            let trail = move_floor(ctx, sector, self.speed, self.floor_dest, true, &mut none);
            (lead, trail)
        };
        if trail == MoveResult::Crushed {
            if let Some(s) = ctx.geometry.sector_mut(sector) {
                s.floor_height = before.0;
                s.ceiling_height = before.1;
            }
            return TickOutcome::Continue;
        }
        if lead == MoveResult::PastDest && trail == MoveResult::PastDest {
            ctx.stop_sound(sector);
            return TickOutcome::Finished;
        }
        TickOutcome::Continue
    }

    fn start_cue(&self) -> Option<SoundCue> {
        Some(SoundCue::Floor)
    }

    fn is_valid(&self) -> bool {
        all_finite(&[self.floor_dest, self.ceiling_dest, self.speed])
            && self.speed > 0.0
            && valid_direction(self.direction)
            && self.direction != 0
    }
}

#[cfg(test)]
mod tests {
    use sd_core::{Actor, Line, Sector};

    use super::*;
    use crate::level::Level;

    /// Elevator shaft (sector 1, tag 5) between landings at 0 and 128.
    fn level() -> Level {
        let geometry = Geometry::new(
            vec![
                Sector::new(0.0, 128.0),
                Sector::new(0.0, 96.0).with_tag(5),
                Sector::new(128.0, 256.0),
            ],
            vec![
                Line::two_sided(SectorId(0), SectorId(1)),
                Line::two_sided(SectorId(2), SectorId(1)),
            ],
        )
        .unwrap();
        Level::new(geometry)
    }

    fn planes(level: &Level) -> (f64, f64) {
        let s = level.geometry().sector(SectorId(1)).unwrap();
        (s.floor_height, s.ceiling_height)
    }

    #[test]
    fn up_keeps_the_gap() {
        let mut level = level();
        assert!(level.do_elevator(&ElevatorRequest::new(ElevatorKind::Up, 5, 16.0)));
        level.run(4);
        assert_eq!(planes(&level), (64.0, 160.0));
        level.run(4);
        assert_eq!(planes(&level), (128.0, 224.0));
        assert!(level.movers().is_empty());
    }

    #[test]
    fn current_follows_line_front_sector() {
        let mut level = level();
        let request = ElevatorRequest::new(ElevatorKind::Current, 5, 64.0).with_line(LineId(1));
        assert!(level.do_elevator(&request));
        level.run(2);
        assert_eq!(planes(&level), (128.0, 224.0));
    }

    #[test]
    fn current_without_line_is_rejected() {
        let mut level = level();
        assert!(!level.do_elevator(&ElevatorRequest::new(ElevatorKind::Current, 5, 64.0)));
    }

    #[test]
    fn blocked_trailing_plane_reverts_the_lead() {
        let mut level = level();
        level.actors_mut().unwrap().push(Actor::new(1, SectorId(1), 90.0, 100));
        level.geometry_mut().sector_mut(SectorId(1)).unwrap().floor_height = 8.0;
        let request = ElevatorRequest::new(ElevatorKind::Lower, 5, 16.0).with_height(8.0);
        assert!(level.do_elevator(&request));
        level.tick();
        assert_eq!(planes(&level), (8.0, 96.0));
        assert_eq!(level.movers().len(), 1);
    }

    #[test]
    fn elevator_needs_both_planes_free() {
        let mut level = level();
        assert!(level.do_ceiling(&crate::mover::ceiling::CeilingRequest::new(
            crate::mover::ceiling::CeilingKind::RaiseByValue,
            5,
            1.0,
        )
        .with_height(8.0)));
        assert!(!level.do_elevator(&ElevatorRequest::new(ElevatorKind::Up, 5, 16.0)));
    }
}
