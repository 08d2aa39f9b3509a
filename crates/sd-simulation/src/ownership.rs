use std::collections::BTreeMap;

use sd_core::{Plane, SectorId};

use crate::mover::MoverId;

/// Records which mover owns each sector plane.
///
/// A plane has at most one owner. Claims are all-or-nothing so a mover that
/// needs both planes never ends up holding only one of them.
#[derive(Debug, Clone, Default)]
pub struct PlaneOwners {
    owners: BTreeMap<(SectorId, Plane), MoverId>,
}

impl PlaneOwners {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mover owning `plane` of `sector`.
    pub fn owner(&self, sector: SectorId, plane: Plane) -> Option<MoverId> {
        self.owners.get(&(sector, plane)).copied()
    }

    /// Return `true` if any of `planes` is owned.
    pub fn is_busy(&self, sector: SectorId, planes: &[Plane]) -> bool {
        planes.iter().any(|p| self.owners.contains_key(&(sector, *p)))
    }

    /// Claim every plane in `planes` for `mover`, or none of them.
    pub fn claim(&mut self, sector: SectorId, planes: &[Plane], mover: MoverId) -> bool {
        if self.is_busy(sector, planes) {
            return false;
        }
        for plane in planes {
            self.owners.insert((sector, *plane), mover);
        }
        true
    }

    /// Release every plane owned by `mover`.
    pub fn release(&mut self, mover: MoverId) {
        self.owners.retain(|_, owner| *owner != mover);
    }

    /// Forget all ownership.
    pub fn clear(&mut self) {
        self.owners.clear();
    }

    /// Number of owned planes.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Return `true` if no plane is owned.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
