use sd_core::{Geometry, LineId, Plane, SectorId};
use serde::{Deserialize, Serialize};

use super::{Family, Thinker, TickOutcome, all_finite, require_finite, require_speed};
use crate::context::TickContext;
use crate::crush::{CrushMode, CrushPolicy};
use crate::error::SimResult;
use crate::event::SoundCue;
use crate::movement::{MoveResult, move_ceiling, move_floor};

/// Pillar behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillarKind {
    /// Close the sector: floor up and ceiling down to a shared height.
    Build,
    /// Open a closed sector: floor down and ceiling up.
    Open,
}

raw_kinds!(PillarKind, "pillar", [Build, Open]);

/// Parameters of a pillar activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarRequest {
    /// The pillar behavior.
    pub kind: PillarKind,
    /// Target tag; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Speed of the plane with the farther to go.
    pub speed: f64,
    /// Build: meeting height above the floor (0 = midpoint). Open: floor
    /// drop (0 = lowest surrounding floor).
    #[serde(default)]
    pub height: f64,
    /// Open: ceiling rise (0 = highest surrounding ceiling).
    #[serde(default)]
    pub height2: f64,
    /// Crush damage; `None` never crushes.
    #[serde(default)]
    pub crush: Option<i32>,
    /// Crush mode; `None` uses the level default.
    #[serde(default)]
    pub crush_mode: Option<CrushMode>,
}

impl PillarRequest {
    /// A request using the default targets.
    pub fn new(kind: PillarKind, tag: i32, speed: f64) -> Self {
        Self {
            kind,
            tag,
            line: None,
            speed,
            height: 0.0,
            height2: 0.0,
            crush: None,
            crush_mode: None,
        }
    }

    /// Set the two distances.
    pub fn with_heights(mut self, height: f64, height2: f64) -> Self {
        self.height = height;
        self.height2 = height2;
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        require_speed("pillar speed", self.speed)?;
        require_finite("pillar height", self.height)?;
        require_finite("pillar height2", self.height2)
    }
}

/// Both planes of a sector moving toward (or away from) each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    kind: PillarKind,
    floor_speed: f64,
    ceiling_speed: f64,
    floor_target: f64,
    ceiling_target: f64,
    crush: CrushPolicy,
}

impl Pillar {
    /// Pin targets. Building needs an open sector and opening a closed one.
    pub fn new(geometry: &Geometry, sector: SectorId, request: &PillarRequest, crush: CrushPolicy) -> Option<Self> {
        let s = geometry.sector(sector)?;
        let floor = s.floor_height;
        let ceiling = s.ceiling_height;
        let (floor_target, ceiling_target) = match request.kind {
            PillarKind::Build => {
                if floor == ceiling {
                    return None;
                }
                let target = if request.height == 0.0 {
                    (floor + ceiling) / 2.0
                } else {
                    floor + request.height
                };
                (target, target)
            }
            PillarKind::Open => {
                if floor != ceiling {
                    return None;
                }
                let floor_target = if request.height == 0.0 {
                    geometry.find_lowest_floor_surrounding(sector)
                } else {
                    floor - request.height
                };
                let ceiling_target = if request.height2 == 0.0 {
                    geometry.find_highest_ceiling_surrounding(sector)
                } else {
                    ceiling + request.height2
                };
                (floor_target, ceiling_target)
            }
        };

        let floor_dist = (floor_target - floor).abs();
        let ceiling_dist = (ceiling_target - ceiling).abs();
        let (floor_speed, ceiling_speed) = if floor_dist > ceiling_dist {
            (request.speed, request.speed * ceiling_dist / floor_dist)
        } else if ceiling_dist > 0.0 {
            (request.speed * floor_dist / ceiling_dist, request.speed)
        } else {
            (request.speed, request.speed)
        };

        Some(Self {
            kind: request.kind,
            floor_speed,
            ceiling_speed,
            floor_target,
            ceiling_target,
            crush,
        })
    }

    /// The pillar behavior.
    pub fn kind(&self) -> PillarKind {
        self.kind
    }

    /// Floor speed per tic.
    pub fn floor_speed(&self) -> f64 {
        self.floor_speed
    }

    /// Ceiling speed per tic.
    pub fn ceiling_speed(&self) -> f64 {
        self.ceiling_speed
    }

    /// Final floor height.
    pub fn floor_target(&self) -> f64 {
        self.floor_target
    }

    /// Final ceiling height.
    pub fn ceiling_target(&self) -> f64 {
        self.ceiling_target
    }
}

impl Thinker for Pillar {
    fn family(&self) -> Family {
        Family::Pillar
    }

    fn planes(&self) -> &'static [Plane] {
        &Plane::BOTH
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        let closing = self.kind == PillarKind::Build;
        let floor = move_floor(ctx, sector, self.floor_speed, self.floor_target, closing, &mut self.crush);
        let ceiling = move_ceiling(ctx, sector, self.ceiling_speed, self.ceiling_target, !closing, &mut self.crush);
        if floor == MoveResult::PastDest && ceiling == MoveResult::PastDest {
            ctx.stop_sound(sector);
            return TickOutcome::Finished;
        }
        TickOutcome::Continue
    }

    fn start_cue(&self) -> Option<SoundCue> {
        Some(SoundCue::Floor)
    }

    fn is_valid(&self) -> bool {
        all_finite(&[self.floor_speed, self.ceiling_speed, self.floor_target, self.ceiling_target])
            && self.floor_speed >= 0.0
            && self.ceiling_speed >= 0.0
            && self.crush.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use sd_core::{Line, Sector};

    use super::*;
    use crate::level::Level;

    fn level(floor: f64, ceiling: f64) -> Level {
        let geometry = Geometry::new(
            vec![
                Sector::new(-32.0, 160.0),
                Sector::new(floor, ceiling).with_tag(8),
            ],
            vec![Line::two_sided(SectorId(0), SectorId(1))],
        )
        .unwrap();
        Level::new(geometry)
    }

    fn planes(level: &Level) -> (f64, f64) {
        let s = level.geometry().sector(SectorId(1)).unwrap();
        (s.floor_height, s.ceiling_height)
    }

    #[test]
    fn build_meets_at_midpoint() {
        let mut level = level(0.0, 128.0);
        assert!(level.do_pillar(&PillarRequest::new(PillarKind::Build, 8, 8.0)));
        level.run(8);
        assert_eq!(planes(&level), (64.0, 64.0));
        assert!(level.movers().is_empty());
    }

    #[test]
    fn build_scales_the_nearer_plane() {
        let level = level(0.0, 128.0);
        let request = PillarRequest::new(PillarKind::Build, 8, 12.0).with_heights(32.0, 0.0);
        let pillar = Pillar::new(level.geometry(), SectorId(1), &request, CrushPolicy::none()).unwrap();
        assert_eq!(pillar.ceiling_speed(), 12.0);
        assert_eq!(pillar.floor_speed(), 4.0);
    }

    #[test]
    fn open_uses_surrounding_extremes() {
        let mut level = level(64.0, 64.0);
        assert!(level.do_pillar(&PillarRequest::new(PillarKind::Open, 8, 8.0)));
        level.run(20);
        assert_eq!(planes(&level), (-32.0, 160.0));
    }

    #[test]
    fn build_rejects_closed_sector_and_open_rejects_open_sector() {
        let mut closed = level(64.0, 64.0);
        assert!(!closed.do_pillar(&PillarRequest::new(PillarKind::Build, 8, 8.0)));
        let mut open = level(0.0, 128.0);
        assert!(!open.do_pillar(&PillarRequest::new(PillarKind::Open, 8, 8.0)));
    }
}
