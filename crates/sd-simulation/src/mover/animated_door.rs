use sd_core::{Geometry, LineId, Plane, SectorId};
use serde::{Deserialize, Serialize};

use super::{Family, Thinker, TickOutcome, all_finite, require_tics};
use crate::context::TickContext;
use crate::error::{SimError, SimResult};
use crate::event::{SimEventKind, SoundCue};

/// Animated door behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimatedDoorKind {
    /// Open, wait, close.
    OpenClose,
    /// Start waiting, then close.
    Close,
}

raw_kinds!(AnimatedDoorKind, "animated door", [OpenClose, Close]);

/// Animated door phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimatedDoorState {
    /// Stepping frames forward.
    Opening,
    /// Fully open.
    Waiting,
    /// Stepping frames back.
    Closing,
    /// Finished.
    Dead,
}

/// Parameters of a sliding door activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidingDoorRequest {
    /// The door behavior.
    pub kind: AnimatedDoorKind,
    /// Target tag; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Tics per frame.
    pub speed: i32,
    /// Tics to stay open; 0 stays open for good.
    #[serde(default)]
    pub delay: i32,
}

impl SlidingDoorRequest {
    /// A request for `tag`.
    pub fn new(kind: AnimatedDoorKind, tag: i32, speed: i32, delay: i32) -> Self {
        Self {
            kind,
            tag,
            line: None,
            speed,
            delay,
        }
    }

    /// Set the activating line.
    pub fn with_line(mut self, line: LineId) -> Self {
        self.line = Some(line);
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        if self.speed <= 0 {
            return Err(SimError::InvalidParameter(format!(
                "sliding door speed must be positive, got {}",
                self.speed
            )));
        }
        require_tics("sliding door delay", self.delay)
    }
}

/// A door that swaps a line's middle texture through animation frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatedDoor {
    kind: AnimatedDoorKind,
    state: AnimatedDoorState,
    line: LineId,
    base: String,
    frames: Vec<String>,
    frame: i32,
    timer: i32,
    speed: i32,
    delay: i32,
    top: f64,
    bottom: f64,
    was_blocking: bool,
    #[serde(default)]
    open_sound: Option<String>,
    #[serde(default)]
    close_sound: Option<String>,
}

impl AnimatedDoor {
    /// Bind a door to `line`, whose front middle texture must name an animation.
    pub fn new(geometry: &Geometry, sector: SectorId, line: LineId, request: &SlidingDoorRequest) -> Option<Self> {
        let s = geometry.sector(sector)?;
        let l = geometry.line(line)?;
        let animation = geometry.door_animation(&l.front_side.mid_texture)?;
        if animation.frames.is_empty() {
            return None;
        }
        Some(Self {
            kind: request.kind,
            state: match request.kind {
                AnimatedDoorKind::OpenClose => AnimatedDoorState::Opening,
                AnimatedDoorKind::Close => AnimatedDoorState::Waiting,
            },
            line,
            base: animation.base.clone(),
            frames: animation.frames.clone(),
            frame: 0,
            timer: request.speed,
            speed: request.speed,
            delay: request.delay,
            top: geometry.find_lowest_ceiling_surrounding(sector),
            bottom: s.ceiling_height,
            was_blocking: l.blocking,
            open_sound: animation.open_sound.clone(),
            close_sound: animation.close_sound.clone(),
        })
    }

    /// The door behavior.
    pub fn kind(&self) -> AnimatedDoorKind {
        self.kind
    }

    /// Current phase.
    pub fn state(&self) -> AnimatedDoorState {
        self.state
    }

    /// Current frame index.
    pub fn frame(&self) -> i32 {
        self.frame
    }

    /// The animated line.
    pub fn line(&self) -> LineId {
        self.line
    }

    /// Raise the ceiling out of the way, block the line and show the first
    /// frame. Runs once when the door is created.
    pub(crate) fn begin(&self, ctx: &mut TickContext<'_>, sector: SectorId) {
        if let Some(s) = ctx.geometry.sector_mut(sector) {
            s.ceiling_height = self.top;
        }
        self.set_blocking(ctx, true);
        self.show_frame(ctx);
        if let Some(sound) = &self.open_sound {
            ctx.sound(sector, SoundCue::Named(sound.clone()));
        }
    }

    /// Try to start closing. Fails while anything stands in the doorway.
    pub(crate) fn start_closing(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> bool {
        if ctx.collision.is_occupied(sector) {
            return false;
        }
        let Some(open_height) = ctx.geometry.sector(sector).map(|s| s.ceiling_height) else {
            return false;
        };
        if let Some(s) = ctx.geometry.sector_mut(sector) {
            s.ceiling_height = self.bottom;
        }
        let record = ctx.collision.check_fit(ctx.geometry, sector, None);
        if let Some(s) = ctx.geometry.sector_mut(sector) {
            s.ceiling_height = open_height;
        }
        if record.blocked {
            return false;
        }

        self.set_blocking(ctx, true);
        self.frame = self.last_frame();
        self.timer = self.speed;
        self.state = AnimatedDoorState::Closing;
        self.show_frame(ctx);
        let cue = self
            .close_sound
            .clone()
            .map_or(SoundCue::DoorClose, SoundCue::Named);
        ctx.sound(sector, cue);
        true
    }

    fn last_frame(&self) -> i32 {
        i32::try_from(self.frames.len()).unwrap_or(i32::MAX) - 1
    }

    fn expired(&mut self) -> bool {
        if self.timer <= 0 {
            return true;
        }
        self.timer -= 1;
        false
    }

    fn set_blocking(&self, ctx: &mut TickContext<'_>, blocking: bool) {
        if let Some(line) = ctx.geometry.line_mut(self.line) {
            if line.blocking == blocking {
                return;
            }
            line.blocking = blocking;
        }
        ctx.emit(SimEventKind::LineBlocking {
            line: self.line,
            blocking,
        });
    }

    fn show_texture(&self, ctx: &mut TickContext<'_>, texture: String) {
        if let Some(line) = ctx.geometry.line_mut(self.line) {
            line.front_side.mid_texture = texture.clone();
            if let Some(back) = &mut line.back_side {
                back.mid_texture = texture.clone();
            }
        }
        ctx.emit(SimEventKind::LineTextureChanged {
            line: self.line,
            texture,
        });
    }

    fn show_frame(&self, ctx: &mut TickContext<'_>) {
        let texture = usize::try_from(self.frame)
            .ok()
            .and_then(|i| self.frames.get(i))
            .cloned();
        if let Some(texture) = texture {
            self.show_texture(ctx, texture);
        }
    }
}

impl Thinker for AnimatedDoor {
    fn family(&self) -> Family {
        Family::AnimatedDoor
    }

    fn planes(&self) -> &'static [Plane] {
        &[Plane::Ceiling]
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        match self.state {
            AnimatedDoorState::Opening => {
                if self.expired() {
                    self.frame += 1;
                    if self.frame > self.last_frame() {
                        self.set_blocking(ctx, false);
                        if self.delay == 0 {
                            self.state = AnimatedDoorState::Dead;
                            return TickOutcome::Finished;
                        }
                        self.timer = self.delay;
                        self.state = AnimatedDoorState::Waiting;
                    } else {
                        self.timer = self.speed;
                        self.show_frame(ctx);
                    }
                }
            }
            AnimatedDoorState::Waiting => {
                if self.expired() && !self.start_closing(ctx, sector) {
                    self.timer = self.delay;
                }
            }
            AnimatedDoorState::Closing => {
                if self.expired() {
                    self.frame -= 1;
                    if self.frame < 0 {
                        if let Some(s) = ctx.geometry.sector_mut(sector) {
                            s.ceiling_height = self.bottom;
                        }
                        self.show_texture(ctx, self.base.clone());
                        self.set_blocking(ctx, self.was_blocking);
                        self.state = AnimatedDoorState::Dead;
                        return TickOutcome::Finished;
                    }
                    self.timer = self.speed;
                    self.show_frame(ctx);
                }
            }
            AnimatedDoorState::Dead => return TickOutcome::Finished,
        }
        TickOutcome::Continue
    }

    fn is_valid(&self) -> bool {
        all_finite(&[self.top, self.bottom])
            && !self.frames.is_empty()
            && self.speed > 0
            && self.delay >= 0
            && self.timer >= 0
            && (-1..=self.last_frame() + 1).contains(&self.frame)
    }
}
