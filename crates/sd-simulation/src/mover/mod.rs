//! Sector movers: the per-sector state machines advanced once per tic.
//!
//! Every mover owns one or both planes of a single sector for its lifetime
//! and is driven through the [`Thinker`] capability. The family-specific
//! state lives in the [`Behavior`] variants.

use std::fmt;

use sd_core::{Geometry, Plane, SectorId};
use serde::{Deserialize, Serialize};

use crate::context::TickContext;
use crate::error::{SimError, SimResult};
use crate::event::SoundCue;
use crate::interpolation::PlaneInterpolation;

/// Implements `ALL` and `TryFrom<i32>` for a kind enum whose raw numbers are
/// its declaration order.
macro_rules! raw_kinds {
    ($ty:ident, $family:literal, [$($variant:ident),+ $(,)?]) => {
        impl $ty {
            /// Every kind, in raw-number order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];
        }

        impl TryFrom<i32> for $ty {
            type Error = crate::error::SimError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                usize::try_from(value)
                    .ok()
                    .and_then(|i| Self::ALL.get(i).copied())
                    .ok_or(crate::error::SimError::UnknownBehavior {
                        family: $family,
                        value,
                    })
            }
        }
    };
}

/// Frame-swap doors.
pub mod animated_door;
/// Crushers and ceiling movers.
pub mod ceiling;
/// Texture and special transfer on arrival.
pub mod change;
/// Vertical doors.
pub mod door;
/// Two-plane elevators.
pub mod elevator;
/// Floor movers, stairs, and donuts.
pub mod floor;
/// Pillars closing or opening both planes.
pub mod pillar;
/// Lifts and platforms.
pub mod plat;
/// Sinusoidal plane oscillation.
pub mod waggle;

use animated_door::AnimatedDoor;
use ceiling::Ceiling;
use door::Door;
use elevator::Elevator;
use floor::Floor;
use pillar::Pillar;
use plat::Plat;
use waggle::Waggle;

/// Identifier of a live mover, unique for the life of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MoverId(pub u32);

impl fmt::Display for MoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mover {}", self.0)
    }
}

/// Mover behavior families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Vertical door.
    Door,
    /// Frame-swap door.
    AnimatedDoor,
    /// Lift or platform.
    Plat,
    /// Ceiling mover or crusher.
    Ceiling,
    /// Floor mover, stair step, or donut ring.
    Floor,
    /// Pillar.
    Pillar,
    /// Elevator.
    Elevator,
    /// Waggle.
    Waggle,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Door => "door",
            Self::AnimatedDoor => "animated door",
            Self::Plat => "plat",
            Self::Ceiling => "ceiling",
            Self::Floor => "floor",
            Self::Pillar => "pillar",
            Self::Elevator => "elevator",
            Self::Waggle => "waggle",
        };
        f.write_str(name)
    }
}

/// What the level should do with a mover after its tic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep the mover.
    Continue,
    /// Remove the mover and release its planes.
    Finished,
}

/// The capability every mover family provides.
pub trait Thinker {
    /// The family this behavior belongs to.
    fn family(&self) -> Family;

    /// Planes owned for the mover's lifetime.
    fn planes(&self) -> &'static [Plane];

    /// Advance by one tic.
    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome;

    /// Enter stasis. Returns `true` if the mover was running and now is not.
    fn stop(&mut self) -> bool {
        false
    }

    /// Leave stasis. Returns `true` if the mover resumed.
    fn reactivate(&mut self) -> bool {
        false
    }

    /// Return `true` while suspended.
    fn in_stasis(&self) -> bool {
        false
    }

    /// Activation tag stored for later stop and reactivate lookups.
    fn tag(&self) -> Option<i32> {
        None
    }

    /// Sound cue raised when the mover is created.
    fn start_cue(&self) -> Option<SoundCue> {
        None
    }

    /// Return `true` if the state is internally consistent (used when
    /// restoring snapshots).
    fn is_valid(&self) -> bool;
}

/// Family-specific mover state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Behavior {
    /// Vertical door.
    Door(Door),
    /// Frame-swap door.
    AnimatedDoor(AnimatedDoor),
    /// Lift or platform.
    Plat(Plat),
    /// Ceiling mover or crusher.
    Ceiling(Ceiling),
    /// Floor mover.
    Floor(Floor),
    /// Pillar.
    Pillar(Pillar),
    /// Elevator.
    Elevator(Elevator),
    /// Waggle.
    Waggle(Waggle),
}

macro_rules! each_behavior {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Behavior::Door($inner) => $body,
            Behavior::AnimatedDoor($inner) => $body,
            Behavior::Plat($inner) => $body,
            Behavior::Ceiling($inner) => $body,
            Behavior::Floor($inner) => $body,
            Behavior::Pillar($inner) => $body,
            Behavior::Elevator($inner) => $body,
            Behavior::Waggle($inner) => $body,
        }
    };
}

impl Thinker for Behavior {
    fn family(&self) -> Family {
        each_behavior!(self, b => b.family())
    }

    fn planes(&self) -> &'static [Plane] {
        each_behavior!(self, b => b.planes())
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, sector: SectorId) -> TickOutcome {
        each_behavior!(self, b => b.tick(ctx, sector))
    }

    fn stop(&mut self) -> bool {
        each_behavior!(self, b => b.stop())
    }

    fn reactivate(&mut self) -> bool {
        each_behavior!(self, b => b.reactivate())
    }

    fn in_stasis(&self) -> bool {
        each_behavior!(self, b => b.in_stasis())
    }

    fn tag(&self) -> Option<i32> {
        each_behavior!(self, b => b.tag())
    }

    fn start_cue(&self) -> Option<SoundCue> {
        each_behavior!(self, b => b.start_cue())
    }

    fn is_valid(&self) -> bool {
        each_behavior!(self, b => b.is_valid())
    }
}

impl Behavior {
    /// The door state, if this is a door.
    pub fn as_door(&self) -> Option<&Door> {
        match self {
            Self::Door(d) => Some(d),
            _ => None,
        }
    }

    /// The animated door state, if this is one.
    pub fn as_animated_door(&self) -> Option<&AnimatedDoor> {
        match self {
            Self::AnimatedDoor(d) => Some(d),
            _ => None,
        }
    }

    /// The plat state, if this is a plat.
    pub fn as_plat(&self) -> Option<&Plat> {
        match self {
            Self::Plat(p) => Some(p),
            _ => None,
        }
    }

    /// The ceiling state, if this is a ceiling.
    pub fn as_ceiling(&self) -> Option<&Ceiling> {
        match self {
            Self::Ceiling(c) => Some(c),
            _ => None,
        }
    }

    /// The floor state, if this is a floor.
    pub fn as_floor(&self) -> Option<&Floor> {
        match self {
            Self::Floor(f) => Some(f),
            _ => None,
        }
    }

    /// The pillar state, if this is a pillar.
    pub fn as_pillar(&self) -> Option<&Pillar> {
        match self {
            Self::Pillar(p) => Some(p),
            _ => None,
        }
    }

    /// The elevator state, if this is an elevator.
    pub fn as_elevator(&self) -> Option<&Elevator> {
        match self {
            Self::Elevator(e) => Some(e),
            _ => None,
        }
    }

    /// The waggle state, if this is a waggle.
    pub fn as_waggle(&self) -> Option<&Waggle> {
        match self {
            Self::Waggle(w) => Some(w),
            _ => None,
        }
    }
}

/// A live mover: a behavior bound to one sector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mover {
    id: MoverId,
    sector: SectorId,
    behavior: Behavior,
    #[serde(skip)]
    interpolations: Vec<PlaneInterpolation>,
}

impl Mover {
    pub(crate) fn new(id: MoverId, sector: SectorId, behavior: Behavior, geometry: &Geometry) -> Self {
        let mut mover = Self {
            id,
            sector,
            behavior,
            interpolations: Vec::new(),
        };
        mover.attach_interpolations(geometry);
        mover
    }

    /// The mover's identifier.
    pub fn id(&self) -> MoverId {
        self.id
    }

    /// The sector being moved.
    pub fn sector(&self) -> SectorId {
        self.sector
    }

    /// The family-specific state.
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    /// The behavior family.
    pub fn family(&self) -> Family {
        self.behavior.family()
    }

    /// Planes owned by this mover.
    pub fn planes(&self) -> &'static [Plane] {
        self.behavior.planes()
    }

    /// Return `true` while suspended.
    pub fn in_stasis(&self) -> bool {
        self.behavior.in_stasis()
    }

    /// Height of `plane` between the previous and current tic.
    pub fn interpolated_height(&self, geometry: &Geometry, plane: Plane, frac: f64) -> Option<f64> {
        self.interpolations
            .iter()
            .find(|i| i.plane == plane)
            .map(|i| i.height_at(geometry, frac))
    }

    pub(crate) fn attach_interpolations(&mut self, geometry: &Geometry) {
        self.interpolations = self
            .planes()
            .iter()
            .map(|plane| PlaneInterpolation::new(geometry, self.sector, *plane))
            .collect();
    }

    pub(crate) fn tick(&mut self, ctx: &mut TickContext<'_>) -> TickOutcome {
        for interpolation in &mut self.interpolations {
            interpolation.record(ctx.geometry);
        }
        self.behavior.tick(ctx, self.sector)
    }

    pub(crate) fn is_valid(&self, geometry: &Geometry) -> bool {
        geometry.sector(self.sector).is_some() && self.behavior.is_valid()
    }
}

/// Reject speeds that are non-finite, zero, or negative.
pub(crate) fn require_speed(name: &str, speed: f64) -> SimResult<()> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter(format!(
            "{name} must be positive and finite, got {speed}"
        )))
    }
}

/// Reject non-finite distances.
pub(crate) fn require_finite(name: &str, value: f64) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidParameter(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Reject negative tic counts.
pub(crate) fn require_tics(name: &str, tics: i32) -> SimResult<()> {
    if tics >= 0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter(format!(
            "{name} must not be negative, got {tics}"
        )))
    }
}

/// Return `true` if every value is finite.
pub(crate) fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Return `true` if `direction` is one of -1, 0, 1.
pub(crate) fn valid_direction(direction: i8) -> bool {
    (-1..=1).contains(&direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mover::door::DoorKind;

    #[test]
    fn raw_kind_numbers_follow_declaration_order() {
        assert_eq!(DoorKind::try_from(0).unwrap(), DoorKind::Close);
        assert_eq!(DoorKind::try_from(2).unwrap(), DoorKind::Raise);
    }

    #[test]
    fn unknown_raw_kind_is_rejected() {
        let err = DoorKind::try_from(42).unwrap_err();
        assert!(err.to_string().contains("door"));
        assert!(DoorKind::try_from(-1).is_err());
    }

    #[test]
    fn family_display() {
        assert_eq!(Family::AnimatedDoor.to_string(), "animated door");
        assert_eq!(MoverId(3).to_string(), "mover 3");
    }
}
