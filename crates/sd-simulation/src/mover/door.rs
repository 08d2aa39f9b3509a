use sd_core::{Geometry, LineId, Plane, SectorId};
use serde::{Deserialize, Serialize};

use super::{Family, Thinker, TickOutcome, all_finite, require_speed, require_tics};
use crate::context::TickContext;
use crate::crush::CrushPolicy;
use crate::error::SimResult;
use crate::event::{SimEventKind, SoundCue};
use crate::movement::{MoveResult, move_ceiling};

/// Distance a raised door stops below the lowest neighbouring ceiling.
pub const DOOR_TOP_GAP: f64 = 4.0;

/// Tics a raised door waits when the activation does not say.
pub const DEFAULT_DOOR_DELAY: i32 = 150;

/// Door behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorKind {
    /// Close and stay closed.
    Close,
    /// Open and stay open.
    Open,
    /// Open, wait, close.
    Raise,
    /// Wait, then behave as [`DoorKind::Raise`].
    WaitRaise,
    /// Close, wait, reopen.
    CloseWaitOpen,
    /// Wait open, then close.
    WaitClose,
}

raw_kinds!(DoorKind, "door", [Close, Open, Raise, WaitRaise, CloseWaitOpen, WaitClose]);

/// Where a door is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    /// Closed, counting down before opening.
    Closed,
    /// Moving up.
    Opening,
    /// Fully open, counting down before closing.
    OpenWaiting,
    /// Moving down.
    Closing,
    /// Closed, counting down before reopening.
    ClosedWaitingReopen,
}

/// Parameters of a door activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorRequest {
    /// The door behavior.
    pub kind: DoorKind,
    /// Target tag; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Units per tic.
    pub speed: f64,
    /// Tics to wait at the far end.
    #[serde(default = "default_delay")]
    pub delay: i32,
    /// Tag of sectors lit in step with the door; 0 for none.
    #[serde(default)]
    pub light_tag: i32,
    /// Initial wait for the waiting kinds.
    #[serde(default)]
    pub top_countdown: i32,
    /// Whether a player (rather than a monster) activated the door.
    #[serde(default)]
    pub by_player: bool,
}

fn default_delay() -> i32 {
    DEFAULT_DOOR_DELAY
}

impl DoorRequest {
    /// A request with the default delay and no light tag.
    pub fn new(kind: DoorKind, tag: i32, speed: f64) -> Self {
        Self {
            kind,
            tag,
            line: None,
            speed,
            delay: DEFAULT_DOOR_DELAY,
            light_tag: 0,
            top_countdown: 0,
            by_player: false,
        }
    }

    /// Set the activating line.
    pub fn with_line(mut self, line: LineId) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the wait at the far end.
    pub fn with_delay(mut self, delay: i32) -> Self {
        self.delay = delay;
        self
    }

    /// Set the light tag.
    pub fn with_light_tag(mut self, tag: i32) -> Self {
        self.light_tag = tag;
        self
    }

    /// Set the initial wait for the waiting kinds.
    pub fn with_top_countdown(mut self, tics: i32) -> Self {
        self.top_countdown = tics;
        self
    }

    /// Mark the activation as coming from a player.
    pub fn by_player(mut self) -> Self {
        self.by_player = true;
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        require_speed("door speed", self.speed)?;
        require_tics("door delay", self.delay)?;
        require_tics("door top countdown", self.top_countdown)
    }
}

/// A vertical door moving its sector's ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    kind: DoorKind,
    state: DoorState,
    top: f64,
    bottom: f64,
    speed: f64,
    delay: i32,
    countdown: i32,
    light_tag: i32,
}

impl Door {
    /// Pin targets for a door on `sector`.
    pub fn new(geometry: &Geometry, sector: SectorId, request: &DoorRequest) -> Option<Self> {
        let s = geometry.sector(sector)?;
        let bottom = s.floor_height;
        let raised = (geometry.find_lowest_ceiling_surrounding(sector) - DOOR_TOP_GAP).max(bottom);
        let (state, top, countdown) = match request.kind {
            DoorKind::Close => (DoorState::Closing, raised, 0),
            DoorKind::Open | DoorKind::Raise => (DoorState::Opening, raised, 0),
            DoorKind::WaitRaise => (DoorState::Closed, raised, request.top_countdown),
            DoorKind::CloseWaitOpen => (DoorState::Closing, s.ceiling_height, 0),
            DoorKind::WaitClose => (DoorState::OpenWaiting, s.ceiling_height, request.top_countdown),
        };
        Some(Self {
            kind: request.kind,
            state,
            top,
            bottom,
            speed: request.speed,
            delay: request.delay,
            countdown,
            light_tag: request.light_tag,
        })
    }

    /// The door behavior.
    pub fn kind(&self) -> DoorKind {
        self.kind
    }

    /// Current state.
    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Fully open ceiling height.
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Closed ceiling height.
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Tics left in the current wait.
    pub fn countdown(&self) -> i32 {
        self.countdown
    }

    /// Manual re-use of a busy raise door.
    ///
    /// A closing door goes back up. Any other raise door is sent down, but
    /// only by a player. Doors of other kinds ignore the request.
    pub(crate) fn retrigger(&mut self, ctx: &mut TickContext<'_>, sector: SectorId, by_player: bool) -> bool {
        if self.kind != DoorKind::Raise {
            return false;
        }
        match self.state {
            DoorState::Closing => {
                self.state = DoorState::Opening;
                ctx.sound(sector, SoundCue::DoorOpen);
                true
            }
            DoorState::Opening | DoorState::OpenWaiting | DoorState::Closed if by_player => {
                self.state = DoorState::Closing;
                ctx.sound(sector, SoundCue::DoorClose);
                true
            }
            _ => false,
        }
    }

    fn count_down(&mut self) -> bool {
        if self.countdown > 0 {
            self.countdown -= 1;
            self.countdown == 0
        } else {
            false
        }
    }

    fn light(&self, ctx: &mut TickContext<'_>, sector: SectorId) {
        if self.light_tag == 0 {
            return;
        }
        let Some(s) = ctx.geometry.sector(sector) else {
            return;
        };
        let span = self.top - s.floor_height;
        let fraction = if span > 0.0 {
            ((s.ceiling_height - s.floor_height) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        ctx.emit(SimEventKind::LightPartway {
            tag: self.light_tag,
            fraction,
        });
    }
}

impl Thinker for Door {
    fn family(&self) -> Family {
        Family::Door
    }

    fn planes(&self) -> &'static [Plane] {
        &[Plane::Ceiling]
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        match self.state {
            DoorState::Closed => {
                if self.count_down() {
                    self.state = DoorState::Opening;
                    self.kind = DoorKind::Raise;
                    ctx.sound(sector, SoundCue::DoorOpen);
                }
            }
            DoorState::OpenWaiting => {
                if self.count_down() {
                    self.state = DoorState::Closing;
                    ctx.sound(sector, SoundCue::DoorClose);
                }
            }
            DoorState::ClosedWaitingReopen => {
                if self.count_down() {
                    self.state = DoorState::Opening;
                    ctx.sound(sector, SoundCue::DoorOpen);
                }
            }
            DoorState::Opening => {
                let result = move_ceiling(ctx, sector, self.speed, self.top, true, &mut CrushPolicy::none());
                self.light(ctx, sector);
                if result == MoveResult::PastDest {
                    if self.kind == DoorKind::Raise {
                        self.state = DoorState::OpenWaiting;
                        self.countdown = self.delay;
                    } else {
                        ctx.stop_sound(sector);
                        return TickOutcome::Finished;
                    }
                }
            }
            DoorState::Closing => {
                let result = move_ceiling(ctx, sector, self.speed, self.bottom, false, &mut CrushPolicy::none());
                self.light(ctx, sector);
                match result {
                    MoveResult::PastDest if self.kind == DoorKind::CloseWaitOpen => {
                        self.state = DoorState::ClosedWaitingReopen;
                        self.countdown = self.delay;
                    }
                    MoveResult::PastDest => {
                        ctx.stop_sound(sector);
                        return TickOutcome::Finished;
                    }
                    MoveResult::Crushed if !matches!(self.kind, DoorKind::Close | DoorKind::WaitClose) => {
                        self.state = DoorState::Opening;
                        ctx.sound(sector, SoundCue::DoorOpen);
                    }
                    MoveResult::Crushed | MoveResult::Ok => {}
                }
            }
        }
        TickOutcome::Continue
    }

    fn start_cue(&self) -> Option<SoundCue> {
        match self.state {
            DoorState::Opening => Some(SoundCue::DoorOpen),
            DoorState::Closing => Some(SoundCue::DoorClose),
            _ => None,
        }
    }

    fn is_valid(&self) -> bool {
        all_finite(&[self.top, self.bottom, self.speed])
            && self.speed > 0.0
            && self.delay >= 0
            && self.countdown >= 0
    }
}

#[cfg(test)]
mod tests {
    use sd_core::{Actor, Line, Sector};

    use super::*;
    use crate::level::Level;

    /// A closed door (sector 1) between two rooms with 128-high ceilings.
    fn level() -> Level {
        let geometry = Geometry::new(
            vec![
                Sector::new(0.0, 128.0),
                Sector::new(0.0, 0.0).with_tag(3),
                Sector::new(0.0, 128.0),
            ],
            vec![
                Line::two_sided(SectorId(0), SectorId(1)),
                Line::two_sided(SectorId(2), SectorId(1)),
            ],
        )
        .unwrap();
        Level::new(geometry)
    }

    fn ceiling(level: &Level) -> f64 {
        level.geometry().sector(SectorId(1)).unwrap().ceiling_height
    }

    fn door(level: &Level) -> &Door {
        level.movers()[0].behavior().as_door().unwrap()
    }

    #[test]
    fn top_is_lowest_neighbour_ceiling_minus_gap() {
        let level = level();
        let door = Door::new(level.geometry(), SectorId(1), &DoorRequest::new(DoorKind::Open, 3, 8.0)).unwrap();
        assert_eq!(door.top(), 124.0);
        assert_eq!(door.bottom(), 0.0);
        assert_eq!(door.state(), DoorState::Opening);
    }

    #[test]
    fn raise_opens_waits_and_closes() {
        let mut level = level();
        assert!(level.do_door(&DoorRequest::new(DoorKind::Raise, 3, 4.0).with_delay(10)));
        level.run(31);
        assert_eq!(ceiling(&level), 124.0);
        assert_eq!(door(&level).state(), DoorState::OpenWaiting);
        level.run(10);
        assert_eq!(door(&level).state(), DoorState::Closing);
        level.run(31);
        assert_eq!(ceiling(&level), 0.0);
        assert!(level.movers().is_empty());
    }

    #[test]
    fn open_is_terminal_at_top() {
        let mut level = level();
        assert!(level.do_door(&DoorRequest::new(DoorKind::Open, 3, 64.0)));
        level.run(2);
        assert_eq!(ceiling(&level), 124.0);
        assert!(level.movers().is_empty());
    }

    #[test]
    fn blocked_raise_door_reverses() {
        let mut level = level();
        level.geometry_mut().sector_mut(SectorId(1)).unwrap().ceiling_height = 124.0;
        level.actors_mut().unwrap().push(Actor::new(1, SectorId(1), 56.0, 100));
        let request = DoorRequest::new(DoorKind::Raise, 3, 32.0).with_delay(1);
        assert!(level.do_door(&request));
        level.run(1);
        assert_eq!(door(&level).state(), DoorState::OpenWaiting);
        level.run(1);
        assert_eq!(door(&level).state(), DoorState::Closing);
        level.run(2);
        assert_eq!(ceiling(&level), 60.0);
        level.run(1);
        assert_eq!(door(&level).state(), DoorState::Opening);
        assert_eq!(ceiling(&level), 60.0);
    }

    #[test]
    fn blocked_close_door_stalls() {
        let mut level = level();
        level.geometry_mut().sector_mut(SectorId(1)).unwrap().ceiling_height = 124.0;
        level.actors_mut().unwrap().push(Actor::new(1, SectorId(1), 56.0, 100));
        assert!(level.do_door(&DoorRequest::new(DoorKind::Close, 3, 32.0)));
        level.run(5);
        assert_eq!(door(&level).state(), DoorState::Closing);
        assert_eq!(ceiling(&level), 60.0);
    }

    #[test]
    fn close_wait_open_returns_to_original_ceiling() {
        let mut level = level();
        level.geometry_mut().sector_mut(SectorId(1)).unwrap().ceiling_height = 64.0;
        let request = DoorRequest::new(DoorKind::CloseWaitOpen, 3, 32.0).with_delay(5);
        assert!(level.do_door(&request));
        level.run(2);
        assert_eq!(ceiling(&level), 0.0);
        assert_eq!(door(&level).state(), DoorState::ClosedWaitingReopen);
        level.run(5);
        assert_eq!(door(&level).state(), DoorState::Opening);
        level.run(2);
        assert_eq!(ceiling(&level), 64.0);
        assert!(level.movers().is_empty());
    }

    #[test]
    fn wait_raise_opens_after_countdown() {
        let mut level = level();
        let request = DoorRequest::new(DoorKind::WaitRaise, 3, 64.0).with_top_countdown(3);
        assert!(level.do_door(&request));
        level.run(2);
        assert_eq!(door(&level).state(), DoorState::Closed);
        level.run(1);
        assert_eq!(door(&level).state(), DoorState::Opening);
        assert_eq!(door(&level).kind(), DoorKind::Raise);
    }

    #[test]
    fn light_fraction_follows_opening() {
        let mut level = level();
        let request = DoorRequest::new(DoorKind::Open, 3, 31.0).with_light_tag(9);
        assert!(level.do_door(&request));
        level.tick();
        let fractions: Vec<f64> = level
            .events()
            .events()
            .iter()
            .filter_map(|e| match e.kind {
                SimEventKind::LightPartway { tag: 9, fraction } => Some(fraction),
                _ => None,
            })
            .collect();
        assert_eq!(fractions, vec![0.25]);
    }

    #[test]
    fn invalid_speed_is_rejected() {
        assert!(DoorRequest::new(DoorKind::Raise, 3, -1.0).validate().is_err());
        assert!(DoorRequest::new(DoorKind::Raise, 3, f64::NAN).validate().is_err());
        assert!(DoorRequest::new(DoorKind::Raise, 3, 1.0).validate().is_ok());
    }
}
