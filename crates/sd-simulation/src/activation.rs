use std::fmt;

use serde::{Deserialize, Serialize};

use crate::level::Level;
use crate::mover::animated_door::SlidingDoorRequest;
use crate::mover::ceiling::CeilingRequest;
use crate::mover::door::DoorRequest;
use crate::mover::elevator::ElevatorRequest;
use crate::mover::floor::{DonutRequest, FloorRequest, StairRequest};
use crate::mover::pillar::PillarRequest;
use crate::mover::plat::PlatRequest;
use crate::mover::waggle::WaggleRequest;
use crate::scroller::ScrollerRequest;

/// One activation, as written in scripts and level triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activation {
    /// Start doors.
    Door(DoorRequest),
    /// Start frame-swap doors.
    SlidingDoor(SlidingDoorRequest),
    /// Start platforms.
    Plat(PlatRequest),
    /// Start ceiling movers.
    Ceiling(CeilingRequest),
    /// Start floor movers.
    Floor(FloorRequest),
    /// Build stairs.
    Stairs(StairRequest),
    /// Start a donut.
    Donut(DonutRequest),
    /// Start elevators.
    Elevator(ElevatorRequest),
    /// Start pillars.
    Pillar(PillarRequest),
    /// Start waggles.
    Waggle(WaggleRequest),
    /// Add scrollers.
    Scroller(ScrollerRequest),
    /// Pause or destroy platforms.
    StopPlat {
        /// Target tag.
        tag: i32,
        /// Destroy instead of pausing.
        #[serde(default)]
        remove: bool,
    },
    /// Pause or destroy moving ceilings.
    CeilingCrushStop {
        /// Target tag.
        tag: i32,
        /// Destroy instead of pausing.
        #[serde(default)]
        remove: bool,
    },
    /// Destroy ceiling movers.
    StopCeiling {
        /// Target tag.
        tag: i32,
    },
    /// Destroy floor movers.
    StopFloor {
        /// Target tag.
        tag: i32,
    },
    /// Destroy crushing floors.
    FloorCrushStop {
        /// Target tag.
        tag: i32,
    },
    /// Wake paused platforms.
    ActivateInStasis {
        /// Target tag.
        tag: i32,
    },
    /// Wake paused ceilings.
    ActivateInStasisCeiling {
        /// Target tag.
        tag: i32,
    },
}

impl Activation {
    /// Parse a list of activations from JSON.
    pub fn list_from_json(json: &str) -> serde_json::Result<Vec<Self>> {
        serde_json::from_str(json)
    }

    /// Short name of the activation type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Door(_) => "door",
            Self::SlidingDoor(_) => "sliding door",
            Self::Plat(_) => "plat",
            Self::Ceiling(_) => "ceiling",
            Self::Floor(_) => "floor",
            Self::Stairs(_) => "stairs",
            Self::Donut(_) => "donut",
            Self::Elevator(_) => "elevator",
            Self::Pillar(_) => "pillar",
            Self::Waggle(_) => "waggle",
            Self::Scroller(_) => "scroller",
            Self::StopPlat { .. } => "stop plat",
            Self::CeilingCrushStop { .. } => "ceiling crush stop",
            Self::StopCeiling { .. } => "stop ceiling",
            Self::StopFloor { .. } => "stop floor",
            Self::FloorCrushStop { .. } => "floor crush stop",
            Self::ActivateInStasis { .. } => "activate in stasis",
            Self::ActivateInStasisCeiling { .. } => "activate in stasis ceiling",
        }
    }

    /// The tag the activation targets.
    pub fn tag(&self) -> i32 {
        match self {
            Self::Door(r) => r.tag,
            Self::SlidingDoor(r) => r.tag,
            Self::Plat(r) => r.tag,
            Self::Ceiling(r) => r.tag,
            Self::Floor(r) => r.tag,
            Self::Stairs(r) => r.tag,
            Self::Donut(r) => r.tag,
            Self::Elevator(r) => r.tag,
            Self::Pillar(r) => r.tag,
            Self::Waggle(r) => r.tag,
            Self::Scroller(r) => r.tag,
            Self::StopPlat { tag, .. }
            | Self::CeilingCrushStop { tag, .. }
            | Self::StopCeiling { tag }
            | Self::StopFloor { tag }
            | Self::FloorCrushStop { tag }
            | Self::ActivateInStasis { tag }
            | Self::ActivateInStasisCeiling { tag } => *tag,
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (tag {})", self.name(), self.tag())
    }
}

impl Level {
    /// Route an activation to its entry point.
    pub fn activate(&mut self, activation: &Activation) -> bool {
        match activation {
            Activation::Door(r) => self.do_door(r),
            Activation::SlidingDoor(r) => self.sliding_door(r),
            Activation::Plat(r) => self.do_plat(r),
            Activation::Ceiling(r) => self.do_ceiling(r),
            Activation::Floor(r) => self.do_floor(r),
            Activation::Stairs(r) => self.build_stairs(r),
            Activation::Donut(r) => self.do_donut(r),
            Activation::Elevator(r) => self.do_elevator(r),
            Activation::Pillar(r) => self.do_pillar(r),
            Activation::Waggle(r) => self.start_waggle(r),
            Activation::Scroller(r) => self.create_scroller(r),
            Activation::StopPlat { tag, remove } => self.stop_plat(*tag, *remove),
            Activation::CeilingCrushStop { tag, remove } => self.ceiling_crush_stop(*tag, *remove),
            Activation::StopCeiling { tag } => self.stop_ceiling(*tag),
            Activation::StopFloor { tag } => self.stop_floor(*tag),
            Activation::FloorCrushStop { tag } => self.floor_crush_stop(*tag),
            Activation::ActivateInStasis { tag } => self.activate_in_stasis(*tag),
            Activation::ActivateInStasisCeiling { tag } => self.activate_in_stasis_ceiling(*tag),
        }
    }
}
