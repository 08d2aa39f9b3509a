use sd_core::{Geometry, LineId, Plane, SectorId, SectorSpecial};
use serde::{Deserialize, Serialize};

use super::change::Transfer;
use super::{Family, Thinker, TickOutcome, all_finite, require_finite, require_speed, require_tics, valid_direction};
use crate::context::TickContext;
use crate::crush::{CrushMode, CrushPolicy};
use crate::error::SimResult;
use crate::event::SoundCue;
use crate::movement::{MoveResult, move_floor};

/// Gap left under the ceiling by the raise-and-crush kinds.
pub const CRUSH_GAP: f64 = 8.0;

/// Crush damage of stairs built with the crush option.
pub const STAIR_CRUSH_DAMAGE: i32 = 10;

/// Floor behaviors. The last four are only created internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorKind {
    /// Down to the lowest surrounding floor.
    LowerToLowest,
    /// Down to the next lower neighbouring floor.
    LowerToNearest,
    /// Down to the highest neighbouring floor.
    LowerToHighest,
    /// Down by a distance.
    LowerByValue,
    /// Up by a distance.
    RaiseByValue,
    /// Up to the highest neighbouring floor.
    RaiseToHighest,
    /// Up to the next higher neighbouring floor.
    RaiseToNearest,
    /// Up to just under the ceiling, crushing.
    RaiseAndCrush,
    /// Up to just under the lowest surrounding ceiling, crushing.
    RaiseAndCrushDoom,
    /// Marker used to stop crushing floors; never started.
    CrushStop,
    /// Down by a distance in one tic.
    LowerInstant,
    /// Up by a distance in one tic.
    RaiseInstant,
    /// To an absolute height.
    MoveToValue,
    /// Up to the lowest surrounding ceiling.
    RaiseToLowestCeiling,
    /// Up by the shortest surrounding lower texture.
    RaiseByTexture,
    /// Down to the lowest surrounding floor, taking the model's texture and
    /// special on arrival.
    LowerAndChange,
    /// Up by a distance, taking the line's front texture and special at once.
    RaiseAndChange,
    /// Up to the lowest surrounding floor.
    RaiseToLowest,
    /// Up to the ceiling, less a distance.
    RaiseToCeiling,
    /// Down to the lowest surrounding ceiling.
    LowerToLowestCeiling,
    /// Down by the shortest surrounding lower texture.
    LowerByTexture,
    /// Down to the ceiling, less a distance.
    LowerToCeiling,
    /// Donut ring rising to the outer floor.
    DonutRaise,
    /// Stair step in motion.
    BuildStair,
    /// Stair step at rest, waiting for a reset.
    WaitStair,
    /// Stair step returning to its original height.
    ResetStair,
}

raw_kinds!(
    FloorKind,
    "floor",
    [
        LowerToLowest,
        LowerToNearest,
        LowerToHighest,
        LowerByValue,
        RaiseByValue,
        RaiseToHighest,
        RaiseToNearest,
        RaiseAndCrush,
        RaiseAndCrushDoom,
        CrushStop,
        LowerInstant,
        RaiseInstant,
        MoveToValue,
        RaiseToLowestCeiling,
        RaiseByTexture,
        LowerAndChange,
        RaiseAndChange,
        RaiseToLowest,
        RaiseToCeiling,
        LowerToLowestCeiling,
        LowerByTexture,
        LowerToCeiling,
        DonutRaise,
        BuildStair,
        WaitStair,
        ResetStair,
    ]
);

impl FloorKind {
    /// Return `true` for kinds only the stair and donut builders create.
    pub fn is_internal(self) -> bool {
        matches!(
            self,
            Self::CrushStop | Self::DonutRaise | Self::BuildStair | Self::WaitStair | Self::ResetStair
        )
    }

    /// Return `true` for the kinds a floor crush stop removes.
    pub fn is_crusher(self) -> bool {
        matches!(self, Self::RaiseAndCrush | Self::RaiseAndCrushDoom)
    }
}

/// Parameters of a floor activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorRequest {
    /// The floor behavior.
    pub kind: FloorKind,
    /// Target tag; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Units per tic.
    pub speed: f64,
    /// Distance or absolute height, depending on the kind.
    #[serde(default)]
    pub height: f64,
    /// Crush damage; `None` never crushes.
    #[serde(default)]
    pub crush: Option<i32>,
    /// Crush mode; `None` uses the level default.
    #[serde(default)]
    pub crush_mode: Option<CrushMode>,
    /// Packed change code (see [`Transfer::from_code`]).
    #[serde(default)]
    pub change: i32,
}

impl FloorRequest {
    /// A request with no crush or change.
    pub fn new(kind: FloorKind, tag: i32, speed: f64) -> Self {
        Self {
            kind,
            tag,
            line: None,
            speed,
            height: 0.0,
            crush: None,
            crush_mode: None,
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
        require_speed("floor speed", self.speed)?;
        require_finite("floor height", self.height)
    }
}

/// Stair build direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StairDirection {
    /// Each step higher than the last.
    Up,
    /// Each step lower than the last.
    Down,
}

/// Parameters of a stair build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StairRequest {
    /// Build direction.
    pub direction: StairDirection,
    /// Tag of the first step; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Height difference between consecutive steps.
    pub step_size: f64,
    /// Units per tic.
    pub speed: f64,
    /// Tics each step pauses between moves.
    #[serde(default)]
    pub delay: i32,
    /// Tics before the steps return to their original heights; 0 never.
    #[serde(default)]
    pub reset: i32,
    /// Chain into neighbours regardless of floor texture.
    #[serde(default)]
    pub ignore_texture: bool,
    /// Chain through sectors carrying alternating stair specials.
    #[serde(default)]
    pub use_specials: bool,
    /// Scale each step's speed so all steps arrive together.
    #[serde(default)]
    pub sync: bool,
    /// Crush obstructions.
    #[serde(default)]
    pub crush: bool,
}

impl StairRequest {
    /// A plain texture-chained stair.
    pub fn new(direction: StairDirection, tag: i32, step_size: f64, speed: f64) -> Self {
        Self {
            direction,
            tag,
            line: None,
            step_size,
            speed,
            delay: 0,
            reset: 0,
            ignore_texture: false,
            use_specials: false,
            sync: false,
            crush: false,
        }
    }

    /// Set the activating line.
    pub fn with_line(mut self, line: LineId) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the per-step pause.
    pub fn with_delay(mut self, delay: i32) -> Self {
        self.delay = delay;
        self
    }

    /// Set the reset countdown.
    pub fn with_reset(mut self, reset: i32) -> Self {
        self.reset = reset;
        self
    }

    /// Chain through alternating stair specials.
    pub fn with_specials(mut self) -> Self {
        self.use_specials = true;
        self
    }

    /// Scale step speeds to arrive together.
    pub fn synced(mut self) -> Self {
        self.sync = true;
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        require_speed("stair speed", self.speed)?;
        require_speed("stair step size", self.step_size)?;
        require_tics("stair delay", self.delay)?;
        require_tics("stair reset", self.reset)
    }
}

/// Parameters of a donut activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutRequest {
    /// Tag of the pillar sectors; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Lowering speed of the pillar.
    pub pillar_speed: f64,
    /// Rising speed of the ring.
    pub slime_speed: f64,
}

impl DonutRequest {
    /// A donut at `tag`.
    pub fn new(tag: i32, pillar_speed: f64, slime_speed: f64) -> Self {
        Self {
            tag,
            line: None,
            pillar_speed,
            slime_speed,
        }
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        require_speed("donut pillar speed", self.pillar_speed)?;
        require_speed("donut slime speed", self.slime_speed)
    }
}

/// Timing of a stair step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StairTiming {
    /// Pause between step bursts.
    pub delay: i32,
    /// Tics moved per burst.
    pub per_step_time: i32,
    /// Tics until the steps reset; 0 never.
    pub reset: i32,
}

/// A floor mover, stair step, or donut ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    kind: FloorKind,
    crush: CrushPolicy,
    direction: i8,
    speed: f64,
    dest: f64,
    change: Option<Transfer>,
    org_height: f64,
    delay: i32,
    pause_time: i32,
    step_time: i32,
    per_step_time: i32,
    reset_count: i32,
}

impl Floor {
    fn with_target(kind: FloorKind, direction: i8, speed: f64, dest: f64, org_height: f64) -> Self {
        Self {
            kind,
            crush: CrushPolicy::none(),
            direction,
            speed,
            dest,
            change: None,
            org_height,
            delay: 0,
            pause_time: 0,
            step_time: 0,
            per_step_time: 0,
            reset_count: 0,
        }
    }

    /// Pin targets for a floor mover on `sector`. Internal kinds yield `None`.
    pub fn new(geometry: &Geometry, sector: SectorId, request: &FloorRequest, crush: CrushPolicy) -> Option<Self> {
        if request.kind.is_internal() {
            return None;
        }
        let s = geometry.sector(sector)?;
        let floor = s.floor_height;
        let ceiling = s.ceiling_height;
        let height = request.height;
        let mut speed = request.speed;
        let (direction, dest): (i8, f64) = match request.kind {
            FloorKind::LowerToLowest | FloorKind::LowerAndChange => {
                (-1, geometry.find_lowest_floor_surrounding(sector) + height)
            }
            FloorKind::LowerToNearest => (-1, geometry.find_next_lowest_floor(sector) + height),
            FloorKind::LowerToHighest => (-1, geometry.find_highest_floor_surrounding(sector) + height),
            FloorKind::LowerByValue => (-1, floor - height),
            FloorKind::LowerInstant => {
                speed = height.abs().max(request.speed);
                (-1, floor - height)
            }
            FloorKind::RaiseByValue | FloorKind::RaiseAndChange => (1, floor + height),
            FloorKind::RaiseInstant => {
                speed = height.abs().max(request.speed);
                (1, floor + height)
            }
            FloorKind::MoveToValue => (if height > floor { 1 } else { -1 }, height),
            FloorKind::RaiseAndCrushDoom => {
                (1, geometry.find_lowest_ceiling_surrounding(sector).min(ceiling) - CRUSH_GAP)
            }
            FloorKind::RaiseAndCrush => (1, ceiling - CRUSH_GAP),
            FloorKind::RaiseToLowestCeiling => {
                (1, geometry.find_lowest_ceiling_surrounding(sector).min(ceiling))
            }
            FloorKind::RaiseToHighest => (1, geometry.find_highest_floor_surrounding(sector) + height),
            FloorKind::RaiseToNearest => (1, geometry.find_next_highest_floor(sector) + height),
            FloorKind::RaiseToLowest => (1, geometry.find_lowest_floor_surrounding(sector) + height),
            FloorKind::RaiseToCeiling => (1, ceiling - height),
            FloorKind::RaiseByTexture => (1, floor + geometry.shortest_lower_texture(sector)),
            FloorKind::LowerByTexture => (-1, floor - geometry.shortest_lower_texture(sector)),
            FloorKind::LowerToLowestCeiling => {
                (-1, geometry.find_lowest_ceiling_surrounding(sector) + height)
            }
            FloorKind::LowerToCeiling => (-1, ceiling - height),
            FloorKind::CrushStop
            | FloorKind::DonutRaise
            | FloorKind::BuildStair
            | FloorKind::WaitStair
            | FloorKind::ResetStair => return None,
        };
        // A "raise" never lowers and a "lower" never raises.
        let dest = if direction > 0 { dest.max(floor) } else { dest.min(floor) };

        let change = match request.kind {
            FloorKind::LowerAndChange => geometry
                .find_model_floor_sector(sector, dest)
                .and_then(|model| Transfer::copy_of(geometry, model, Plane::Floor)),
            FloorKind::RaiseAndChange => None,
            _ => Transfer::from_code(geometry, sector, Plane::Floor, request.change, request.line, dest),
        };

        let mut mover = Self::with_target(request.kind, direction, speed, dest, floor);
        mover.crush = crush;
        mover.change = change;
        Some(mover)
    }

    /// A stair step moving to `dest`.
    pub fn stair(org_height: f64, dest: f64, speed: f64, timing: StairTiming, crush: CrushPolicy) -> Self {
        let direction = if dest >= org_height { 1 } else { -1 };
        let mut step = Self::with_target(FloorKind::BuildStair, direction, speed, dest, org_height);
        step.crush = crush;
        step.delay = timing.delay;
        step.per_step_time = timing.per_step_time;
        step.step_time = timing.per_step_time;
        step.reset_count = timing.reset;
        step
    }

    /// The rising donut ring: takes `texture` and loses its special on arrival.
    pub fn donut_ring(org_height: f64, dest: f64, speed: f64, texture: String) -> Self {
        let mut ring = Self::with_target(FloorKind::DonutRaise, 1, speed, dest, org_height);
        ring.change = Some(Transfer {
            texture,
            special: Some(SectorSpecial::default()),
        });
        ring
    }

    /// The lowering donut pillar.
    pub fn donut_pillar(org_height: f64, dest: f64, speed: f64) -> Self {
        Self::with_target(FloorKind::LowerToNearest, -1, speed, dest, org_height)
    }

    /// The floor behavior.
    pub fn kind(&self) -> FloorKind {
        self.kind
    }

    /// Current direction: -1 down, 1 up.
    pub fn direction(&self) -> i8 {
        self.direction
    }

    /// Destination height.
    pub fn dest(&self) -> f64 {
        self.dest
    }

    /// Current speed.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Tics until a stair resets.
    pub fn reset_count(&self) -> i32 {
        self.reset_count
    }

    fn is_stepping(&self) -> bool {
        matches!(self.kind, FloorKind::BuildStair | FloorKind::WaitStair)
    }
}

impl Thinker for Floor {
    fn family(&self) -> Family {
        Family::Floor
    }

    fn planes(&self) -> &'static [Plane] {
        &[Plane::Floor]
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        if self.is_stepping() {
            if self.reset_count > 0 {
                self.reset_count -= 1;
                if self.reset_count == 0 {
                    self.kind = FloorKind::ResetStair;
                    self.direction = -self.direction;
                    self.dest = self.org_height;
                }
            }
            if self.pause_time > 0 {
                self.pause_time -= 1;
                return TickOutcome::Continue;
            } else if self.step_time > 0 {
                self.step_time -= 1;
                if self.step_time == 0 {
                    self.pause_time = self.delay;
                    self.step_time = self.per_step_time;
                }
            }
        }
        if self.kind == FloorKind::WaitStair {
            return TickOutcome::Continue;
        }

        let result = move_floor(ctx, sector, self.speed, self.dest, self.direction > 0, &mut self.crush);
        if result != MoveResult::PastDest {
            return TickOutcome::Continue;
        }
        ctx.stop_sound(sector);
        if self.kind == FloorKind::BuildStair {
            self.kind = FloorKind::WaitStair;
        }
        if self.kind == FloorKind::WaitStair && self.reset_count > 0 {
            return TickOutcome::Continue;
        }
        if let Some(change) = self.change.take() {
            change.apply(ctx, sector, Plane::Floor);
        }
        TickOutcome::Finished
    }

    fn start_cue(&self) -> Option<SoundCue> {
        Some(SoundCue::Floor)
    }

    fn is_valid(&self) -> bool {
        all_finite(&[self.speed, self.dest, self.org_height])
            && self.speed > 0.0
            && valid_direction(self.direction)
            && self.direction != 0
            && self.delay >= 0
            && self.pause_time >= 0
            && self.step_time >= 0
            && self.per_step_time >= 0
            && self.reset_count >= 0
            && self.crush.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use sd_core::{Actor, Line, Sector};

    use super::*;
    use crate::level::Level;

    fn floor_of(level: &Level, sector: usize) -> f64 {
        level.geometry().sector(SectorId(sector)).unwrap().floor_height
    }

    /// Sector 1 (tag 6) between a pit at -64 and a ledge at 24.
    fn pit_level() -> Level {
        let geometry = Geometry::new(
            vec![
                Sector::new(-64.0, 128.0).with_floor_texture("PIT"),
                Sector::new(0.0, 128.0).with_tag(6).with_floor_texture("OWN"),
                Sector::new(24.0, 100.0).with_floor_texture("LEDGE"),
            ],
            vec![
                Line::two_sided(SectorId(0), SectorId(1)),
                Line::two_sided(SectorId(2), SectorId(1)),
            ],
        )
        .unwrap();
        Level::new(geometry)
    }

    /// Three texture-matched steps in a row, sector 0 tagged 1.
    fn stair_level() -> Level {
        let geometry = Geometry::new(
            vec![
                Sector::new(0.0, 256.0).with_tag(1).with_floor_texture("STEP"),
                Sector::new(0.0, 256.0).with_floor_texture("STEP"),
                Sector::new(0.0, 256.0).with_floor_texture("STEP"),
                Sector::new(0.0, 256.0).with_floor_texture("OTHER"),
            ],
            vec![
                Line::two_sided(SectorId(0), SectorId(1)),
                Line::two_sided(SectorId(1), SectorId(2)),
                Line::two_sided(SectorId(2), SectorId(3)),
            ],
        )
        .unwrap();
        Level::new(geometry)
    }

    #[test]
    fn lower_to_lowest_reaches_pit() {
        let mut level = pit_level();
        assert!(level.do_floor(&FloorRequest::new(FloorKind::LowerToLowest, 6, 16.0)));
        level.run(4);
        assert_eq!(floor_of(&level, 1), -64.0);
        assert!(level.movers().is_empty());
    }

    #[test]
    fn raise_and_crush_doom_stops_under_lowest_ceiling() {
        let level = pit_level();
        let request = FloorRequest::new(FloorKind::RaiseAndCrushDoom, 6, 8.0);
        let floor = Floor::new(level.geometry(), SectorId(1), &request, CrushPolicy::none()).unwrap();
        assert_eq!(floor.dest(), 92.0);
    }

    #[test]
    fn raise_and_crush_keeps_pressing_in_doom_mode() {
        let mut level = pit_level();
        level.actors_mut().unwrap().push(Actor::new(1, SectorId(1), 100.0, 100));
        let request = FloorRequest::new(FloorKind::RaiseAndCrush, 6, 16.0).with_crush(10, CrushMode::Doom);
        assert!(level.do_floor(&request));
        level.run(3);
        assert_eq!(floor_of(&level, 1), 48.0);
        assert_eq!(level.actors().unwrap()[0].health, 80);
    }

    #[test]
    fn floor_crush_stop_removes_crushers() {
        let mut level = pit_level();
        let request = FloorRequest::new(FloorKind::RaiseAndCrush, 6, 1.0).with_crush(10, CrushMode::Doom);
        assert!(level.do_floor(&request));
        assert!(level.floor_crush_stop(6));
        assert!(level.movers().is_empty());
        assert!(!level.floor_crush_stop(6));
    }

    #[test]
    fn lower_and_change_takes_model_texture() {
        let mut level = pit_level();
        assert!(level.do_floor(&FloorRequest::new(FloorKind::LowerAndChange, 6, 64.0)));
        level.tick();
        let sector = level.geometry().sector(SectorId(1)).unwrap();
        assert_eq!(sector.floor_height, -64.0);
        assert_eq!(sector.floor_texture, "PIT");
    }

    #[test]
    fn raise_and_change_copies_line_front_at_start() {
        let mut level = pit_level();
        let request = FloorRequest::new(FloorKind::RaiseAndChange, 6, 1.0)
            .with_height(8.0)
            .with_line(LineId(1));
        assert!(level.do_floor(&request));
        assert_eq!(level.geometry().sector(SectorId(1)).unwrap().floor_texture, "LEDGE");
    }

    #[test]
    fn internal_kinds_are_rejected() {
        let mut level = pit_level();
        assert!(!level.do_floor(&FloorRequest::new(FloorKind::BuildStair, 6, 8.0)));
        assert!(!level.do_floor(&FloorRequest::new(FloorKind::CrushStop, 6, 8.0)));
        assert!(level.movers().is_empty());
    }

    #[test]
    fn stairs_chain_through_matching_textures() {
        let mut level = stair_level();
        assert!(level.build_stairs(&StairRequest::new(StairDirection::Up, 1, 8.0, 8.0)));
        assert_eq!(level.movers().len(), 3);
        let dests: Vec<f64> = level
            .movers()
            .iter()
            .map(|m| m.behavior().as_floor().unwrap().dest())
            .collect();
        assert_eq!(dests, vec![8.0, 16.0, 24.0]);
        level.run(3);
        assert_eq!(floor_of(&level, 0), 8.0);
        assert_eq!(floor_of(&level, 1), 16.0);
        assert_eq!(floor_of(&level, 2), 24.0);
        assert_eq!(floor_of(&level, 3), 0.0);
        assert!(level.movers().is_empty());
    }

    #[test]
    fn stair_steps_pause_between_bursts() {
        let mut level = stair_level();
        let request = StairRequest::new(StairDirection::Up, 1, 8.0, 4.0).with_delay(3);
        assert!(level.build_stairs(&request));
        level.run(2);
        assert_eq!(floor_of(&level, 0), 8.0);
        assert_eq!(floor_of(&level, 1), 8.0);
        level.run(3);
        assert_eq!(floor_of(&level, 1), 8.0);
        level.run(2);
        assert_eq!(floor_of(&level, 1), 16.0);
    }

    #[test]
    fn stairs_reset_to_original_height() {
        let mut level = stair_level();
        let request = StairRequest::new(StairDirection::Up, 1, 8.0, 8.0).with_reset(10);
        assert!(level.build_stairs(&request));
        level.run(9);
        assert_eq!(floor_of(&level, 0), 8.0);
        let step = level.movers()[0].behavior().as_floor().unwrap();
        assert_eq!(step.kind(), FloorKind::WaitStair);
        level.tick();
        assert_eq!(floor_of(&level, 0), 0.0);
        assert_eq!(level.movers().len(), 2);
    }

    #[test]
    fn synced_stairs_arrive_together() {
        let mut level = stair_level();
        let request = StairRequest::new(StairDirection::Up, 1, 8.0, 2.0).synced();
        assert!(level.build_stairs(&request));
        level.run(4);
        assert_eq!(floor_of(&level, 0), 8.0);
        assert_eq!(floor_of(&level, 1), 16.0);
        assert_eq!(floor_of(&level, 2), 24.0);
    }

    #[test]
    fn donut_raises_ring_and_lowers_pillar() {
        let special = SectorSpecial {
            special: 5,
            damage: 10,
            flags: 0,
        };
        let geometry = Geometry::new(
            vec![
                Sector::new(0.0, 128.0).with_tag(3),
                Sector::new(-16.0, 128.0).with_special(special),
                Sector::new(-8.0, 128.0).with_floor_texture("SLIME"),
            ],
            vec![
                Line::two_sided(SectorId(1), SectorId(0)),
                Line::two_sided(SectorId(1), SectorId(2)),
            ],
        )
        .unwrap();
        let mut level = Level::new(geometry);
        assert!(level.do_donut(&DonutRequest::new(3, 2.0, 1.0)));
        assert_eq!(level.movers().len(), 2);
        level.run(8);
        assert_eq!(floor_of(&level, 0), -8.0);
        assert_eq!(floor_of(&level, 1), -8.0);
        let ring = level.geometry().sector(SectorId(1)).unwrap();
        assert_eq!(ring.floor_texture, "SLIME");
        assert!(ring.special.is_cleared());
        assert!(!level.do_donut(&DonutRequest::new(9, 2.0, 1.0)));
    }
}
