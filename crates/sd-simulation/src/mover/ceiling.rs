use sd_core::{Geometry, LineId, Plane, SectorId};
use serde::{Deserialize, Serialize};

use super::change::Transfer;
use super::{Family, Thinker, TickOutcome, all_finite, require_finite, require_speed, valid_direction};
use crate::context::TickContext;
use crate::crush::{CrushMode, CrushPolicy};
use crate::error::SimResult;
use crate::event::SoundCue;
use crate::movement::{MoveResult, move_ceiling};

/// Speed a crushing ceiling drops to in [`CrushMode::Slowdown`].
pub const CEILING_SLOWDOWN_SPEED: f64 = 1.0 / 8.0;

/// Ceiling behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingKind {
    /// Down by a distance.
    LowerByValue,
    /// Up by a distance.
    RaiseByValue,
    /// To an absolute height.
    MoveToValue,
    /// Down to the highest neighbouring floor.
    LowerToHighestFloor,
    /// Down by a distance in one tic.
    LowerInstant,
    /// Up by a distance in one tic.
    RaiseInstant,
    /// Crush down, rise back, repeat forever.
    CrushAndRaise,
    /// Crush down to just above the floor and stop.
    LowerAndCrush,
    /// Crush down, rise back, stop.
    CrushRaiseAndStay,
    /// Up to the next higher neighbouring ceiling.
    RaiseToNearest,
    /// Down to the lowest neighbouring ceiling.
    LowerToLowest,
    /// Down to the floor (plus a distance).
    LowerToFloor,
    /// Up to the highest neighbouring ceiling.
    RaiseToHighest,
    /// Down to the highest neighbouring ceiling.
    LowerToHighest,
    /// Up to the lowest neighbouring ceiling.
    RaiseToLowest,
    /// Down to the next lower neighbouring ceiling.
    LowerToNearest,
    /// Up to the highest neighbouring floor.
    RaiseToHighestFloor,
    /// Up to the floor plus a distance.
    RaiseToFloor,
    /// Up by the shortest surrounding upper texture.
    RaiseByTexture,
    /// Down by the shortest surrounding upper texture.
    LowerByTexture,
}

raw_kinds!(
    CeilingKind,
    "ceiling",
    [
        LowerByValue,
        RaiseByValue,
        MoveToValue,
        LowerToHighestFloor,
        LowerInstant,
        RaiseInstant,
        CrushAndRaise,
        LowerAndCrush,
        CrushRaiseAndStay,
        RaiseToNearest,
        LowerToLowest,
        LowerToFloor,
        RaiseToHighest,
        LowerToHighest,
        RaiseToLowest,
        LowerToNearest,
        RaiseToHighestFloor,
        RaiseToFloor,
        RaiseByTexture,
        LowerByTexture,
    ]
);

impl CeilingKind {
    /// Return `true` for the kinds that cycle down and back up.
    pub fn is_crusher(self) -> bool {
        matches!(self, Self::CrushAndRaise | Self::CrushRaiseAndStay)
    }

    /// Return `true` for the kinds a ceiling crush stop affects.
    pub fn crushes(self) -> bool {
        matches!(self, Self::CrushAndRaise | Self::CrushRaiseAndStay | Self::LowerAndCrush)
    }
}

/// Parameters of a ceiling activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeilingRequest {
    /// The ceiling behavior.
    pub kind: CeilingKind,
    /// Target tag; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Units per tic (downward speed for crushers).
    pub speed: f64,
    /// Upward speed for crushers; defaults to `speed`.
    #[serde(default)]
    pub speed2: Option<f64>,
    /// Distance or absolute height, depending on the kind.
    #[serde(default)]
    pub height: f64,
    /// Crush damage; `None` never crushes.
    #[serde(default)]
    pub crush: Option<i32>,
    /// Crush mode; `None` uses the level default.
    #[serde(default)]
    pub crush_mode: Option<CrushMode>,
    /// Suppress sound cues.
    #[serde(default)]
    pub silent: bool,
    /// Packed change code (see [`Transfer::from_code`]).
    #[serde(default)]
    pub change: i32,
}

impl CeilingRequest {
    /// A request with no crush, change or second speed.
    pub fn new(kind: CeilingKind, tag: i32, speed: f64) -> Self {
        Self {
            kind,
            tag,
            line: None,
            speed,
            speed2: None,
            height: 0.0,
            crush: None,
            crush_mode: None,
            silent: false,
            change: 0,
        }
    }

    /// Set the activating line.
    pub fn with_line(mut self, line: LineId) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the distance or absolute height.
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Set the upward crusher speed.
    pub fn with_speed2(mut self, speed: f64) -> Self {
        self.speed2 = Some(speed);
        self
    }

    /// Crush with `damage` in `mode`.
    pub fn with_crush(mut self, damage: i32, mode: CrushMode) -> Self {
        self.crush = Some(damage);
        self.crush_mode = Some(mode);
        self
    }

    /// Set the change code.
    pub fn with_change(mut self, change: i32) -> Self {
        self.change = change;
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        require_speed("ceiling speed", self.speed)?;
        if let Some(speed2) = self.speed2 {
            require_speed("ceiling speed2", speed2)?;
        }
        require_finite("ceiling height", self.height)
    }
}

/// A ceiling mover or crusher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ceiling {
    kind: CeilingKind,
    bottom: f64,
    top: f64,
    speed: f64,
    speed1: f64,
    speed2: f64,
    crush: CrushPolicy,
    silent: bool,
    direction: i8,
    old_direction: i8,
    tag: i32,
    change: Option<Transfer>,
}

impl Ceiling {
    /// Pin targets for a ceiling mover on `sector`.
    pub fn new(geometry: &Geometry, sector: SectorId, request: &CeilingRequest, crush: CrushPolicy) -> Option<Self> {
        let s = geometry.sector(sector)?;
        let ceiling = s.ceiling_height;
        let floor = s.floor_height;
        let height = request.height;
        let mut speed = request.speed;
        let mut top = ceiling;
        let mut bottom = ceiling;
        let direction: i8 = match request.kind {
            CeilingKind::CrushAndRaise | CeilingKind::CrushRaiseAndStay | CeilingKind::LowerAndCrush => {
                bottom = floor + height;
                -1
            }
            CeilingKind::RaiseToNearest => {
                top = geometry.find_next_highest_ceiling(sector);
                1
            }
            CeilingKind::LowerToNearest => {
                bottom = geometry.find_next_lowest_ceiling(sector);
                -1
            }
            CeilingKind::LowerToHighestFloor => {
                bottom = geometry.find_highest_floor_surrounding(sector);
                -1
            }
            CeilingKind::LowerToLowest => {
                bottom = geometry.find_lowest_ceiling_surrounding(sector);
                -1
            }
            CeilingKind::LowerToHighest => {
                bottom = geometry.find_highest_ceiling_surrounding(sector);
                -1
            }
            CeilingKind::LowerToFloor => {
                bottom = floor + height;
                -1
            }
            CeilingKind::RaiseToHighest => {
                top = geometry.find_highest_ceiling_surrounding(sector);
                1
            }
            CeilingKind::RaiseToLowest => {
                top = geometry.find_lowest_ceiling_surrounding(sector);
                1
            }
            CeilingKind::RaiseToHighestFloor => {
                top = geometry.find_highest_floor_surrounding(sector);
                1
            }
            CeilingKind::RaiseToFloor => {
                top = floor + height;
                1
            }
            CeilingKind::LowerByValue => {
                bottom = ceiling - height;
                -1
            }
            CeilingKind::RaiseByValue => {
                top = ceiling + height;
                1
            }
            CeilingKind::MoveToValue => {
                if height < ceiling {
                    bottom = height;
                    -1
                } else {
                    top = height;
                    1
                }
            }
            CeilingKind::LowerInstant => {
                bottom = ceiling - height;
                speed = height.abs().max(request.speed);
                -1
            }
            CeilingKind::RaiseInstant => {
                top = ceiling + height;
                speed = height.abs().max(request.speed);
                1
            }
            CeilingKind::LowerByTexture => {
                bottom = ceiling - geometry.shortest_upper_texture(sector);
                -1
            }
            CeilingKind::RaiseByTexture => {
                top = ceiling + geometry.shortest_upper_texture(sector);
                1
            }
        };
        let target = if direction > 0 { top } else { bottom };
        let change = Transfer::from_code(geometry, sector, Plane::Ceiling, request.change, request.line, target);
        Some(Self {
            kind: request.kind,
            bottom,
            top,
            speed,
            speed1: speed,
            speed2: request.speed2.unwrap_or(speed),
            crush,
            silent: request.silent,
            direction,
            old_direction: direction,
            tag: request.tag,
            change,
        })
    }

    /// The ceiling behavior.
    pub fn kind(&self) -> CeilingKind {
        self.kind
    }

    /// Current direction: -1 down, 0 in stasis, 1 up.
    pub fn direction(&self) -> i8 {
        self.direction
    }

    /// Direction to resume from stasis.
    pub fn old_direction(&self) -> i8 {
        self.old_direction
    }

    /// Current speed.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Lowest target.
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Highest target.
    pub fn top(&self) -> f64 {
        self.top
    }

    fn cue(&self, ctx: &mut TickContext<'_>, sector: SectorId) {
        if !self.silent {
            ctx.sound(sector, SoundCue::Ceiling);
        }
    }

    fn finish(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        if let Some(change) = self.change.take() {
            change.apply(ctx, sector, Plane::Ceiling);
        }
        if !self.silent {
            ctx.stop_sound(sector);
        }
        TickOutcome::Finished
    }
}

impl Thinker for Ceiling {
    fn family(&self) -> Family {
        Family::Ceiling
    }

    fn planes(&self) -> &'static [Plane] {
        &[Plane::Ceiling]
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        match self.direction {
            0 => {}
            1 => {
                let result = move_ceiling(ctx, sector, self.speed, self.top, true, &mut self.crush);
                if result == MoveResult::PastDest {
                    if self.kind != CeilingKind::CrushAndRaise {
                        return self.finish(ctx, sector);
                    }
                    self.direction = -1;
                    self.speed = self.speed1;
                    self.cue(ctx, sector);
                }
            }
            -1 => {
                let result = move_ceiling(ctx, sector, self.speed, self.bottom, false, &mut self.crush);
                match result {
                    MoveResult::PastDest if self.kind.is_crusher() => {
                        self.direction = 1;
                        self.speed = self.speed2;
                        self.cue(ctx, sector);
                    }
                    MoveResult::PastDest => return self.finish(ctx, sector),
                    MoveResult::Crushed
                        if self.crush.mode == CrushMode::Slowdown
                            && self.crush.crushes()
                            && self.kind.crushes() =>
                    {
                        self.speed = CEILING_SLOWDOWN_SPEED;
                    }
                    MoveResult::Crushed | MoveResult::Ok => {}
                }
            }
            _ => return TickOutcome::Finished,
        }
        TickOutcome::Continue
    }

    fn stop(&mut self) -> bool {
        if self.direction == 0 {
            return false;
        }
        self.old_direction = self.direction;
        self.direction = 0;
        true
    }

    fn reactivate(&mut self) -> bool {
        if self.direction != 0 {
            return false;
        }
        self.direction = self.old_direction;
        true
    }

    fn in_stasis(&self) -> bool {
        self.direction == 0
    }

    fn tag(&self) -> Option<i32> {
        Some(self.tag)
    }

    fn start_cue(&self) -> Option<SoundCue> {
        (!self.silent).then_some(SoundCue::Ceiling)
    }

    fn is_valid(&self) -> bool {
        all_finite(&[self.bottom, self.top, self.speed, self.speed1, self.speed2])
            && self.speed > 0.0
            && valid_direction(self.direction)
            && valid_direction(self.old_direction)
            && self.old_direction != 0
            && self.crush.is_valid()
    }
}
