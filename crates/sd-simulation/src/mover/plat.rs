use sd_core::{Geometry, LineId, Plane, SectorId};
use serde::{Deserialize, Serialize};

use super::{Family, Thinker, TickOutcome, all_finite, require_finite, require_speed, require_tics};
use crate::context::TickContext;
use crate::crush::CrushPolicy;
use crate::error::SimResult;
use crate::event::SoundCue;
use crate::movement::{MoveResult, move_floor};

/// Tics a platform waits at either end when the activation does not say.
pub const DEFAULT_PLAT_WAIT: i32 = 105;

/// Crush damage of toggling platforms.
pub const TOGGLE_CRUSH_DAMAGE: i32 = 10;

/// Platform behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatKind {
    /// Cycle between the lowest and highest neighbouring floors forever.
    PerpetualRaise,
    /// Lift: down to the lowest neighbouring floor, wait, back up.
    DownWaitUpStay,
    /// Lift with the stone sound sequence.
    DownWaitUpStayStone,
    /// Up to the highest neighbouring floor, wait, back down.
    UpWaitDownStay,
    /// Up to the next higher floor, wait, back down.
    UpNearestWaitDownStay,
    /// Down by a distance, wait, back up.
    DownByValue,
    /// Up by a distance, wait, back down.
    UpByValue,
    /// Up by a distance and stay.
    UpByValueStay,
    /// Up to the next higher floor and stay.
    RaiseAndStay,
    /// Flip the floor between its height and the ceiling on each use.
    Toggle,
    /// Down to the next lower floor, wait, back up.
    DownToNearestFloor,
    /// Down to the lowest neighbouring ceiling, wait, back up.
    DownToLowestCeiling,
    /// Up to the next higher floor and lock there.
    RaiseAndStayLockout,
}

raw_kinds!(
    PlatKind,
    "plat",
    [
        PerpetualRaise,
        DownWaitUpStay,
        DownWaitUpStayStone,
        UpWaitDownStay,
        UpNearestWaitDownStay,
        DownByValue,
        UpByValue,
        UpByValueStay,
        RaiseAndStay,
        Toggle,
        DownToNearestFloor,
        DownToLowestCeiling,
        RaiseAndStayLockout,
    ]
);

/// Platform status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatStatus {
    /// Rising toward `high`.
    Up,
    /// Lowering toward `low`.
    Down,
    /// Waiting at one end.
    Waiting,
    /// Suspended.
    InStasis,
}

/// Parameters of a platform activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatRequest {
    /// The platform behavior.
    pub kind: PlatKind,
    /// Target tag; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Units per tic.
    pub speed: f64,
    /// Tics to wait at either end.
    #[serde(default = "default_wait")]
    pub delay: i32,
    /// Distance for the by-value kinds. Lifts descend exactly this far
    /// when it is non-zero.
    #[serde(default)]
    pub height: f64,
    /// Offset added to the low target of lifts.
    #[serde(default)]
    pub lip: f64,
    /// Copy the floor texture from the line's front sector and clear the
    /// special when the platform starts.
    #[serde(default)]
    pub change: bool,
}

fn default_wait() -> i32 {
    DEFAULT_PLAT_WAIT
}

impl PlatRequest {
    /// A request with the default wait, no height and no lip.
    pub fn new(kind: PlatKind, tag: i32, speed: f64) -> Self {
        Self {
            kind,
            tag,
            line: None,
            speed,
            delay: DEFAULT_PLAT_WAIT,
            height: 0.0,
            lip: 0.0,
            change: false,
        }
    }

    /// Set the activating line.
    pub fn with_line(mut self, line: LineId) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the wait at either end.
    pub fn with_delay(mut self, delay: i32) -> Self {
        self.delay = delay;
        self
    }

    /// Set the by-value distance.
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Set the lift lip.
    pub fn with_lip(mut self, lip: f64) -> Self {
        self.lip = lip;
        self
    }

    /// Request the texture change on start.
    pub fn with_change(mut self) -> Self {
        self.change = true;
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        require_speed("plat speed", self.speed)?;
        require_tics("plat delay", self.delay)?;
        require_finite("plat height", self.height)?;
        require_finite("plat lip", self.lip)
    }
}

/// A platform moving its sector's floor between `low` and `high`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plat {
    kind: PlatKind,
    status: PlatStatus,
    old_status: PlatStatus,
    speed: f64,
    low: f64,
    high: f64,
    wait: i32,
    count: i32,
    crush: CrushPolicy,
    tag: i32,
}

impl Plat {
    /// Pin targets for a platform on `sector`. `up_first` picks the
    /// starting direction of perpetual platforms.
    pub fn new(geometry: &Geometry, sector: SectorId, request: &PlatRequest, up_first: bool, crush: CrushPolicy) -> Option<Self> {
        let s = geometry.sector(sector)?;
        let floor = s.floor_height;
        let lowest_plus_lip = (geometry.find_lowest_floor_surrounding(sector) + request.lip).min(floor);
        let (status, low, high, crush) = match request.kind {
            PlatKind::RaiseAndStay | PlatKind::RaiseAndStayLockout | PlatKind::UpNearestWaitDownStay => {
                (PlatStatus::Up, floor, geometry.find_next_highest_floor(sector), CrushPolicy::none())
            }
            PlatKind::UpByValue | PlatKind::UpByValueStay => {
                (PlatStatus::Up, floor, floor + request.height, CrushPolicy::none())
            }
            PlatKind::UpWaitDownStay => (
                PlatStatus::Up,
                floor,
                geometry.find_highest_floor_surrounding(sector).max(floor),
                CrushPolicy::none(),
            ),
            PlatKind::DownByValue => (PlatStatus::Down, floor - request.height, floor, CrushPolicy::none()),
            PlatKind::DownWaitUpStay | PlatKind::DownWaitUpStayStone => {
                // An explicit height overrides the surrounding-floor target.
                let low = if request.height != 0.0 { floor - request.height } else { lowest_plus_lip };
                (PlatStatus::Down, low, floor, CrushPolicy::none())
            }
            PlatKind::DownToNearestFloor => (
                PlatStatus::Down,
                geometry.find_next_lowest_floor(sector) + request.lip,
                floor,
                CrushPolicy::none(),
            ),
            PlatKind::DownToLowestCeiling => (
                PlatStatus::Down,
                geometry.find_lowest_ceiling_surrounding(sector).min(floor),
                floor,
                CrushPolicy::none(),
            ),
            PlatKind::PerpetualRaise => {
                let status = if up_first { PlatStatus::Up } else { PlatStatus::Down };
                let high = geometry.find_highest_floor_surrounding(sector).max(floor);
                (status, lowest_plus_lip, high, CrushPolicy::none())
            }
            PlatKind::Toggle => (PlatStatus::Down, s.ceiling_height, floor, crush),
        };
        Some(Self {
            kind: request.kind,
            status,
            old_status: status,
            speed: request.speed,
            low,
            high,
            wait: if request.kind == PlatKind::RaiseAndStayLockout {
                0
            } else {
                request.delay
            },
            count: 0,
            crush,
            tag: request.tag,
        })
    }

    /// The platform behavior.
    pub fn kind(&self) -> PlatKind {
        self.kind
    }

    /// Current status.
    pub fn status(&self) -> PlatStatus {
        self.status
    }

    /// Status to resume from stasis.
    pub fn old_status(&self) -> PlatStatus {
        self.old_status
    }

    /// Low target.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// High target.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Tics left in the current wait.
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Return `true` for the lift kinds.
    pub fn is_lift(&self) -> bool {
        matches!(self.kind, PlatKind::DownWaitUpStay | PlatKind::DownWaitUpStayStone)
    }

    fn terminal_at_high(&self) -> bool {
        matches!(
            self.kind,
            PlatKind::DownWaitUpStay
                | PlatKind::DownWaitUpStayStone
                | PlatKind::UpByValueStay
                | PlatKind::RaiseAndStay
                | PlatKind::DownByValue
                | PlatKind::DownToNearestFloor
                | PlatKind::DownToLowestCeiling
        )
    }

    fn terminal_at_low(&self) -> bool {
        matches!(
            self.kind,
            PlatKind::UpWaitDownStay | PlatKind::UpNearestWaitDownStay | PlatKind::UpByValue
        )
    }

    fn step(&mut self, ctx: &mut TickContext<'_>, sector: SectorId, target: f64, crushing: bool) -> MoveResult {
        let floor = ctx.geometry.sector(sector).map_or(target, |s| s.floor_height);
        let mut none = CrushPolicy::none();
        let crush = if crushing { &mut self.crush } else { &mut none };
        move_floor(ctx, sector, self.speed, target, target > floor, crush)
    }

    fn arrive(&mut self, ctx: &mut TickContext<'_>, sector: SectorId, from: PlatStatus) -> TickOutcome {
        ctx.sound(sector, SoundCue::PlatStop);
        if self.kind == PlatKind::Toggle {
            self.old_status = from;
            self.status = PlatStatus::InStasis;
            return TickOutcome::Continue;
        }
        let terminal = match from {
            PlatStatus::Up => self.terminal_at_high(),
            _ => self.terminal_at_low(),
        };
        if terminal {
            return TickOutcome::Finished;
        }
        self.count = self.wait;
        self.status = PlatStatus::Waiting;
        TickOutcome::Continue
    }
}

impl Thinker for Plat {
    fn family(&self) -> Family {
        Family::Plat
    }

    fn planes(&self) -> &'static [Plane] {
        &[Plane::Floor]
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        match self.status {
            PlatStatus::Up => {
                let result = self.step(ctx, sector, self.high, true);
                if result == MoveResult::Crushed && !self.crush.crushes() {
                    self.count = self.wait;
                    self.status = PlatStatus::Down;
                    ctx.sound(sector, SoundCue::PlatStart);
                } else if result == MoveResult::PastDest {
                    return self.arrive(ctx, sector, PlatStatus::Up);
                }
            }
            PlatStatus::Down => {
                let toggle = self.kind == PlatKind::Toggle;
                let result = self.step(ctx, sector, self.low, toggle);
                if result == MoveResult::PastDest {
                    return self.arrive(ctx, sector, PlatStatus::Down);
                }
            }
            PlatStatus::Waiting => {
                if self.count > 0 {
                    self.count -= 1;
                    if self.count == 0 {
                        let floor = ctx.geometry.sector(sector).map_or(self.low, |s| s.floor_height);
                        self.status = if floor == self.low { PlatStatus::Up } else { PlatStatus::Down };
                        ctx.sound(sector, SoundCue::PlatStart);
                    }
                }
            }
            PlatStatus::InStasis => {}
        }
        TickOutcome::Continue
    }

    fn stop(&mut self) -> bool {
        if self.status == PlatStatus::InStasis {
            return false;
        }
        self.old_status = self.status;
        self.status = PlatStatus::InStasis;
        true
    }

    fn reactivate(&mut self) -> bool {
        if self.status != PlatStatus::InStasis {
            return false;
        }
        self.status = match (self.kind, self.old_status) {
            (PlatKind::Toggle, PlatStatus::Up) => PlatStatus::Down,
            (PlatKind::Toggle, PlatStatus::Down) => PlatStatus::Up,
            (_, old) => old,
        };
        true
    }

    fn in_stasis(&self) -> bool {
        self.status == PlatStatus::InStasis
    }

    fn tag(&self) -> Option<i32> {
        Some(self.tag)
    }

    fn start_cue(&self) -> Option<SoundCue> {
        match self.kind {
            PlatKind::DownWaitUpStayStone => Some(SoundCue::Named("plat-stone".into())),
            _ => Some(SoundCue::PlatStart),
        }
    }

    fn is_valid(&self) -> bool {
        all_finite(&[self.speed, self.low, self.high])
            && self.speed > 0.0
            && self.wait >= 0
            && self.count >= 0
            && self.crush.is_valid()
            && self.old_status != PlatStatus::InStasis
    }
}
