//! Core geometry for sector-dynamics: sectors, lines, actors, and the tag index.
//!
//! This crate defines the level data the simulation moves around. It is
//! independent of the movers themselves: you can build a [`Geometry`]
//! programmatically or deserialize one from JSON produced by a map loader.

/// Actors occupying sectors.
pub mod actor;
/// Frame-swap door definitions.
pub mod animation;
/// Error types used throughout the crate.
pub mod error;
/// Validated level geometry and neighbour queries.
pub mod geometry;
/// Lines and sidedefs.
pub mod line;
/// Sectors, planes, and sector specials.
pub mod sector;
/// Tag to sector-group index.
pub mod tags;

/// Re-export actor types.
pub use actor::{Actor, ActorId};
/// Re-export door animation definitions.
pub use animation::DoorAnimation;
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export geometry types.
pub use geometry::{Geometry, LevelData};
/// Re-export line types.
pub use line::{Line, LineId, Side, SidePart};
/// Re-export sector types.
pub use sector::{Plane, Sector, SectorId, SectorSpecial, TextureOffset};
/// Re-export the tag index.
pub use tags::TagIndex;
