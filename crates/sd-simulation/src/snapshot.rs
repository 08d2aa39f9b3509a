use log::warn;
use sd_core::{Actor, Line, Sector};
use serde::{Deserialize, Serialize};

use crate::collision::ActorField;
use crate::error::{SimError, SimResult};
use crate::level::Level;
use crate::mover::Mover;
use crate::scroller::Scroller;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Saved state of a running level.
///
/// Geometry is stored in full so texture, special and offset changes made
/// by movers and scrollers survive. Movers keep their tick order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSnapshot {
    /// Format version.
    pub version: u32,
    /// Tic the snapshot was taken at.
    pub tic: u64,
    /// Next mover id to hand out.
    pub next_id: u32,
    /// Sector state.
    pub sectors: Vec<Sector>,
    /// Line state.
    pub lines: Vec<Line>,
    /// Live movers in tick order.
    pub movers: Vec<Mover>,
    /// Live scrollers in tick order.
    #[serde(default)]
    pub scrollers: Vec<Scroller>,
    /// Actors of the built-in collision facility.
    #[serde(default)]
    pub actors: Vec<Actor>,
}

impl LevelSnapshot {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What a restore kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Movers restored.
    pub movers: usize,
    /// Movers dropped as invalid or conflicting.
    pub dropped_movers: usize,
    /// Scrollers restored.
    pub scrollers: usize,
    /// Scrollers dropped as invalid.
    pub dropped_scrollers: usize,
}

impl Level {
    /// Capture the level state.
    pub fn snapshot(&self) -> LevelSnapshot {
        let data = self.geometry.to_data();
        LevelSnapshot {
            version: SNAPSHOT_VERSION,
            tic: self.clock.tic(),
            next_id: self.next_id,
            sectors: data.sectors,
            lines: data.lines,
            movers: self.movers.clone(),
            scrollers: self.scrollers.clone(),
            actors: self.actors().map(<[Actor]>::to_vec).unwrap_or_default(),
        }
    }

    /// Replace the level state with a snapshot.
    ///
    /// Structurally the snapshot must match this level's geometry. Movers
    /// that fail validation or claim an already owned plane are dropped
    /// with a warning and never ticked.
    pub fn restore(&mut self, snapshot: LevelSnapshot) -> SimResult<RestoreReport> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SimError::InvalidParameter(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        self.geometry.restore_state(snapshot.sectors, snapshot.lines)?;
        self.clock.set_tic(snapshot.tic);
        self.owners.clear();
        self.movers.clear();
        self.scrollers.clear();

        let mut report = RestoreReport::default();
        let mut next_id = snapshot.next_id;
        for mut mover in snapshot.movers {
            if !mover.is_valid(&self.geometry) {
                warn!("dropping invalid {} {} on sector {}", mover.family(), mover.id(), mover.sector());
                report.dropped_movers += 1;
                continue;
            }
            if !self.owners.claim(mover.sector(), mover.planes(), mover.id()) {
                warn!("dropping {} {}: plane already owned", mover.family(), mover.id());
                report.dropped_movers += 1;
                continue;
            }
            next_id = next_id.max(mover.id().0.saturating_add(1));
            mover.attach_interpolations(&self.geometry);
            self.movers.push(mover);
            report.movers += 1;
        }
        self.next_id = next_id;

        for scroller in snapshot.scrollers {
            if scroller.is_valid(&self.geometry) {
                self.scrollers.push(scroller);
                report.scrollers += 1;
            } else {
                warn!("dropping invalid {:?} scroller", scroller.kind());
                report.dropped_scrollers += 1;
            }
        }

        if let Some(field) = self.actors_mut() {
            *field = ActorField::new(snapshot.actors);
        }
        Ok(report)
    }
}
