//! Tic-stepped sector dynamics.
//!
//! A [`Level`] owns the geometry from [`sd_core`] together with every running
//! mover (doors, platforms, ceilings, floors, pillars, elevators, waggles,
//! frame-swap doors) and scroller. Activations go through the `do_*` entry
//! points or the serde-tagged [`Activation`] enum; [`Level::tick`] advances
//! everything by one tic. Side effects (sounds, texture changes, crushed
//! actors) are recorded in the [`EventLog`].

/// Serde-tagged activations and their routing.
pub mod activation;
/// Level clock and tic rate.
pub mod clock;
/// Actor fit checks and the built-in collision facility.
pub mod collision;
/// Configuration for a level run.
pub mod config;
/// Mutable context passed to movers and scrollers each tic.
pub mod context;
/// Crush modes and policies.
pub mod crush;
/// Activation entry points.
pub mod dispatch;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Per-plane render interpolation.
pub mod interpolation;
/// The level and its per-tic pass.
pub mod level;
/// Generic plane movement.
pub mod movement;
/// Mover families and the shared mover contract.
pub mod mover;
/// Plane ownership map.
pub mod ownership;
/// Texture and actor scrollers.
pub mod scroller;
/// Level persistence.
pub mod snapshot;

/// Re-export of [`activation::Activation`].
pub use activation::Activation;
/// Re-exports of [`clock::LevelClock`] and [`clock::TICRATE`].
pub use clock::{LevelClock, TICRATE};
/// Re-exports of [`collision::ActorField`], [`collision::Collision`], and [`collision::CrushRecord`].
pub use collision::{ActorField, Collision, CrushRecord};
/// Re-exports of [`config::SimConfig`] and [`config::CompatFlags`].
pub use config::{CompatFlags, SimConfig};
/// Re-exports of [`crush::CrushMode`] and [`crush::CrushPolicy`].
pub use crush::{CrushMode, CrushPolicy};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], [`event::SimEventKind`], and [`event::SoundCue`].
pub use event::{EventLog, SimEvent, SimEventKind, SoundCue};
/// Re-export of [`level::Level`].
pub use level::Level;
/// Re-exports of the shared mover types.
pub use mover::{Behavior, Family, Mover, MoverId, Thinker, TickOutcome};
/// Re-exports of the scroller types.
pub use scroller::{Affectee, CARRYFACTOR, ScrollKind, ScrollParts, Scroller, ScrollerRequest};
/// Re-exports of [`snapshot::LevelSnapshot`] and [`snapshot::RestoreReport`].
pub use snapshot::{LevelSnapshot, RestoreReport};
