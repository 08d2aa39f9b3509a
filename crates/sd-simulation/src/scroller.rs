//! Per-tic texture and actor displacement.
//!
//! Scrollers never terminate. Each tic they shift the texture offsets of
//! their affectee by `(dx, dy)`, or carry the actors resting on (or hanging
//! from) a plane by a fraction of that amount.

use sd_core::{Geometry, LineId, Plane, SectorId, SidePart};
use serde::{Deserialize, Serialize};

use crate::context::TickContext;
use crate::error::{SimError, SimResult};
use crate::mover::{all_finite, require_finite};

/// How far carried actors move per unit of scroll.
pub const CARRYFACTOR: f64 = 3.0 / 32.0;

/// What a scroller displaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollKind {
    /// Texture offsets of one side of a line.
    Side,
    /// Floor texture offset. Actors standing on the floor are moved by a
    /// separate `Carry` scroller.
    Floor,
    /// Ceiling texture offset.
    Ceiling,
    /// Actors resting on the floor.
    Carry,
    /// Actors hanging from the ceiling.
    CarryCeiling,
}

impl ScrollKind {
    fn is_sector_kind(self) -> bool {
        !matches!(self, Self::Side)
    }
}

/// Selection of sidedef tiers, as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrollParts(pub u8);

impl ScrollParts {
    /// Upper tier.
    pub const TOP: Self = Self(1);
    /// Middle tier.
    pub const MID: Self = Self(2);
    /// Lower tier.
    pub const BOTTOM: Self = Self(4);
    /// Every tier.
    pub const ALL: Self = Self(7);

    /// Return `true` if `part` is selected.
    pub fn contains(self, part: SidePart) -> bool {
        let bit = match part {
            SidePart::Top => Self::TOP.0,
            SidePart::Mid => Self::MID.0,
            SidePart::Bottom => Self::BOTTOM.0,
        };
        self.0 & bit != 0
    }

    fn is_valid(self) -> bool {
        self.0 != 0 && self.0 & !Self::ALL.0 == 0
    }
}

impl Default for ScrollParts {
    fn default() -> Self {
        Self::ALL
    }
}

/// The surface a scroller acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "on", rename_all = "snake_case")]
pub enum Affectee {
    /// One side of a line.
    Side {
        /// The line.
        line: LineId,
        /// Use the back side instead of the front.
        back: bool,
    },
    /// A sector's plane or the actors in it.
    Sector {
        /// The sector.
        sector: SectorId,
    },
}

/// Parameters of a scroller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollerRequest {
    /// What to displace.
    pub kind: ScrollKind,
    /// Horizontal displacement per tic.
    pub dx: f64,
    /// Vertical displacement per tic.
    #[serde(default)]
    pub dy: f64,
    /// Sector tag; ignored by side scrollers.
    #[serde(default)]
    pub tag: i32,
    /// The line whose side scrolls, or the activating line for tag 0.
    #[serde(default)]
    pub line: Option<LineId>,
    /// Scroll the back side of `line`.
    #[serde(default)]
    pub back: bool,
    /// Scale displacement by height changes of this sector.
    #[serde(default)]
    pub control: Option<SectorId>,
    /// Accumulate displacement as velocity.
    #[serde(default)]
    pub accel: bool,
    /// Tiers affected by side scrollers.
    #[serde(default)]
    pub parts: ScrollParts,
}

impl ScrollerRequest {
    /// A sector scroller for every sector tagged `tag`.
    pub fn sectors(kind: ScrollKind, tag: i32, dx: f64, dy: f64) -> Self {
        Self {
            kind,
            dx,
            dy,
            tag,
            line: None,
            back: false,
            control: None,
            accel: false,
            parts: ScrollParts::ALL,
        }
    }

    /// A side scroller on the front of `line`.
    pub fn side(line: LineId, dx: f64, dy: f64) -> Self {
        Self {
            line: Some(line),
            ..Self::sectors(ScrollKind::Side, 0, dx, dy)
        }
    }

    /// Scroll only the given tiers.
    pub fn with_parts(mut self, parts: ScrollParts) -> Self {
        self.parts = parts;
        self
    }

    /// Drive displacement from a control sector.
    pub fn with_control(mut self, control: SectorId, accel: bool) -> Self {
        self.control = Some(control);
        self.accel = accel;
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        require_finite("scroll dx", self.dx)?;
        require_finite("scroll dy", self.dy)?;
        if !self.parts.is_valid() {
            return Err(SimError::InvalidParameter(format!(
                "scroll parts mask {} outside 1..=7",
                self.parts.0
            )));
        }
        if self.kind == ScrollKind::Side && self.line.is_none() {
            return Err(SimError::InvalidParameter("side scroller needs a line".into()));
        }
        Ok(())
    }
}

/// A running scroller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scroller {
    kind: ScrollKind,
    affectee: Affectee,
    dx: f64,
    dy: f64,
    parts: ScrollParts,
    control: Option<SectorId>,
    last_height: f64,
    accel: bool,
    vdx: f64,
    vdy: f64,
}

impl Scroller {
    pub(crate) fn new(geometry: &Geometry, request: &ScrollerRequest, affectee: Affectee) -> Self {
        let last_height = request
            .control
            .and_then(|c| geometry.sector(c))
            .map_or(0.0, |s| s.height_sum());
        Self {
            kind: request.kind,
            affectee,
            dx: request.dx,
            dy: request.dy,
            parts: request.parts,
            control: request.control,
            last_height,
            accel: request.accel,
            vdx: 0.0,
            vdy: 0.0,
        }
    }

    /// What this scroller displaces.
    pub fn kind(&self) -> ScrollKind {
        self.kind
    }

    /// The surface it acts on.
    pub fn affectee(&self) -> Affectee {
        self.affectee
    }

    /// Base displacement per tic.
    pub fn delta(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    pub(crate) fn tick(&mut self, ctx: &mut TickContext<'_>) {
        let (mut dx, mut dy) = (self.dx, self.dy);

        if let Some(control) = self.control {
            let height = ctx.geometry.sector(control).map_or(self.last_height, |s| s.height_sum());
            let delta = height - self.last_height;
            self.last_height = height;
            dx *= delta;
            dy *= delta;
        }

        if self.accel {
            dx += self.vdx;
            dy += self.vdy;
            self.vdx = dx;
            self.vdy = dy;
        }

        if dx == 0.0 && dy == 0.0 {
            return;
        }

        match (self.kind, self.affectee) {
            (ScrollKind::Side, Affectee::Side { line, back }) => {
                let side = ctx.geometry.line_mut(line).and_then(|l| l.side_mut(back));
                if let Some(side) = side {
                    for part in [SidePart::Top, SidePart::Mid, SidePart::Bottom] {
                        if self.parts.contains(part) {
                            side.offset_mut(part).add(dx, dy);
                        }
                    }
                }
            }
            (ScrollKind::Floor, Affectee::Sector { sector }) => {
                if let Some(s) = ctx.geometry.sector_mut(sector) {
                    s.offset_mut(Plane::Floor).add(dx, dy);
                }
            }
            (ScrollKind::Ceiling, Affectee::Sector { sector }) => {
                if let Some(s) = ctx.geometry.sector_mut(sector) {
                    s.offset_mut(Plane::Ceiling).add(dx, dy);
                }
            }
            (ScrollKind::Carry, Affectee::Sector { sector }) => {
                ctx.collision
                    .carry(sector, Plane::Floor, dx * CARRYFACTOR, dy * CARRYFACTOR);
            }
            (ScrollKind::CarryCeiling, Affectee::Sector { sector }) => {
                ctx.collision
                    .carry(sector, Plane::Ceiling, dx * CARRYFACTOR, dy * CARRYFACTOR);
            }
            _ => {}
        }
    }

    /// Return `true` if the scroller refers to existing geometry and holds
    /// finite state.
    pub(crate) fn is_valid(&self, geometry: &Geometry) -> bool {
        let target = match self.affectee {
            Affectee::Side { line, back } => {
                self.kind == ScrollKind::Side
                    && geometry.line(line).is_some_and(|l| l.side(back).is_some())
            }
            Affectee::Sector { sector } => {
                self.kind.is_sector_kind() && geometry.sector(sector).is_some()
            }
        };
        target
            && self.parts.is_valid()
            && self.control.is_none_or(|c| geometry.sector(c).is_some())
            && all_finite(&[self.dx, self.dy, self.last_height, self.vdx, self.vdy])
    }
}
