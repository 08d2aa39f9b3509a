use std::f64::consts::PI;

use sd_core::{Geometry, LineId, Plane, SectorId};
use serde::{Deserialize, Serialize};

use super::{Family, Thinker, TickOutcome, all_finite, require_finite, require_speed, require_tics};
use crate::clock::TICRATE;
use crate::context::TickContext;
use crate::error::SimResult;

/// Peak displacement of a waggle at full scale.
pub const WAGGLE_AMPLITUDE: f64 = 8.0;

/// Waggle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaggleState {
    /// Ramping the scale up.
    Expand,
    /// Holding full scale.
    Stable,
    /// Ramping the scale down.
    Reduce,
}

/// Parameters of a waggle activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaggleRequest {
    /// Target tag; 0 uses the activating line's back sector.
    #[serde(default)]
    pub tag: i32,
    /// The activating line.
    #[serde(default)]
    pub line: Option<LineId>,
    /// The plane to oscillate.
    pub plane: Plane,
    /// Amplitude in 1/64ths of full scale.
    pub height: f64,
    /// Phase advance in 1/64ths of a period per tic.
    pub speed: f64,
    /// Starting phase.
    #[serde(default)]
    pub offset: f64,
    /// Seconds at full scale; 0 waggles forever.
    #[serde(default)]
    pub timer: i32,
}

impl WaggleRequest {
    /// A waggle that runs forever.
    pub fn new(plane: Plane, tag: i32, height: f64, speed: f64) -> Self {
        Self {
            tag,
            line: None,
            plane,
            height,
            speed,
            offset: 0.0,
            timer: 0,
        }
    }

    /// Set the starting phase.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the time at full scale, in seconds.
    pub fn with_timer(mut self, seconds: i32) -> Self {
        self.timer = seconds;
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        require_speed("waggle height", self.height)?;
        require_finite("waggle speed", self.speed)?;
        require_finite("waggle offset", self.offset)?;
        require_tics("waggle timer", self.timer)
    }
}

/// Sinusoidal oscillation of one plane around its original height.
///
/// The plane is written directly every tic; actors are never checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waggle {
    plane: Plane,
    state: WaggleState,
    original_height: f64,
    accumulator: f64,
    acc_delta: f64,
    target_scale: f64,
    scale: f64,
    scale_delta: f64,
    ticker: i32,
}

impl Waggle {
    /// Start a waggle on `sector`.
    pub fn new(geometry: &Geometry, sector: SectorId, request: &WaggleRequest) -> Option<Self> {
        let original_height = geometry.sector(sector)?.height(request.plane);
        let target_scale = request.height / 64.0;
        let ramp_tics = TICRATE as f64 + 3.0 * TICRATE as f64 * request.height / 255.0;
        Some(Self {
            plane: request.plane,
            state: WaggleState::Expand,
            original_height,
            accumulator: request.offset,
            acc_delta: request.speed / 64.0,
            target_scale,
            scale: 0.0,
            scale_delta: target_scale / ramp_tics,
            ticker: if request.timer > 0 {
                request.timer.saturating_mul(TICRATE as i32)
            } else {
                -1
            },
        })
    }

    /// The oscillating plane.
    pub fn plane(&self) -> Plane {
        self.plane
    }

    /// Current phase.
    pub fn state(&self) -> WaggleState {
        self.state
    }

    /// Current scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Height the plane returns to.
    pub fn original_height(&self) -> f64 {
        self.original_height
    }

    fn set_height(&self, ctx: &mut TickContext<'_>, sector: SectorId, height: f64) {
        if let Some(s) = ctx.geometry.sector_mut(sector) {
            s.set_height(self.plane, height);
        }
    }
}

impl Thinker for Waggle {
    fn family(&self) -> Family {
        Family::Waggle
    }

    fn planes(&self) -> &'static [Plane] {
        match self.plane {
            Plane::Floor => &[Plane::Floor],
            Plane::Ceiling => &[Plane::Ceiling],
        }
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        match self.state {
            WaggleState::Expand => {
                self.scale += self.scale_delta;
                if self.scale >= self.target_scale {
                    self.scale = self.target_scale;
                    self.state = WaggleState::Stable;
                }
            }
            WaggleState::Stable => {
                if self.ticker != -1 {
                    self.ticker -= 1;
                    if self.ticker <= 0 {
                        self.state = WaggleState::Reduce;
                    }
                }
            }
            WaggleState::Reduce => {
                self.scale -= self.scale_delta;
                if self.scale <= 0.0 {
                    self.set_height(ctx, sector, self.original_height);
                    return TickOutcome::Finished;
                }
            }
        }
        self.accumulator = (self.accumulator + self.acc_delta).rem_euclid(64.0);
        let offset = WAGGLE_AMPLITUDE * (self.accumulator * PI / 32.0).sin() * self.scale;
        self.set_height(ctx, sector, self.original_height + offset);
        TickOutcome::Continue
    }

    fn is_valid(&self) -> bool {
        all_finite(&[
            self.original_height,
            self.accumulator,
            self.acc_delta,
            self.target_scale,
            self.scale,
            self.scale_delta,
        ]) && self.ticker >= -1
    }
}
