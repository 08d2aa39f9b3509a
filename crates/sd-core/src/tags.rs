use std::collections::BTreeMap;

use crate::line::Line;
use crate::sector::{Sector, SectorId};

/// Maps activation tags to the sectors carrying them.
///
/// Built once at level load and immutable afterwards. Each group lists its
/// sectors in load order, which callers rely on for deterministic tie-breaks.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    groups: BTreeMap<i32, Vec<SectorId>>,
}

impl TagIndex {
    /// Index every tagged sector. Tag 0 is never indexed.
    pub fn build(sectors: &[Sector]) -> Self {
        let mut groups: BTreeMap<i32, Vec<SectorId>> = BTreeMap::new();
        for (i, sector) in sectors.iter().enumerate() {
            if sector.tag != 0 {
                groups.entry(sector.tag).or_default().push(SectorId(i));
            }
        }
        Self { groups }
    }

    /// Sectors carrying `tag`, in load order.
    pub fn group(&self, tag: i32) -> &[SectorId] {
        self.groups.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve an activation target.
    ///
    /// Tag 0 means "the sector behind the activating line": the line's back
    /// sector, or nothing when there is no line or it is one-sided.
    pub fn resolve(&self, tag: i32, line: Option<&Line>) -> Vec<SectorId> {
        if tag == 0 {
            return line.and_then(|l| l.back).into_iter().collect();
        }
        self.group(tag).to_vec()
    }

    /// All tags present in the level, ascending.
    pub fn tags(&self) -> impl Iterator<Item = i32> + '_ {
        self.groups.keys().copied()
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Return `true` if no sector is tagged.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
