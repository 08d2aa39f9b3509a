use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sector::{SectorId, TextureOffset};

/// Index of a line in the level's line table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId(pub usize);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// The three texture tiers of a sidedef.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidePart {
    /// Upper texture, visible above a lower neighbouring ceiling.
    Top,
    /// Middle texture.
    Mid,
    /// Lower texture, visible below a higher neighbouring floor.
    Bottom,
}

/// One face of a line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Side {
    /// Upper texture name.
    #[serde(default)]
    pub top_texture: String,
    /// Middle texture name.
    #[serde(default)]
    pub mid_texture: String,
    /// Lower texture name.
    #[serde(default)]
    pub bottom_texture: String,
    /// Upper texture offset.
    #[serde(default)]
    pub top_offset: TextureOffset,
    /// Middle texture offset.
    #[serde(default)]
    pub mid_offset: TextureOffset,
    /// Lower texture offset.
    #[serde(default)]
    pub bottom_offset: TextureOffset,
}

impl Side {
    /// Texture offset of one tier.
    pub fn offset_mut(&mut self, part: SidePart) -> &mut TextureOffset {
        match part {
            SidePart::Top => &mut self.top_offset,
            SidePart::Mid => &mut self.mid_offset,
            SidePart::Bottom => &mut self.bottom_offset,
        }
    }

    /// Texture offset of one tier.
    pub fn offset(&self, part: SidePart) -> TextureOffset {
        match part {
            SidePart::Top => self.top_offset,
            SidePart::Mid => self.mid_offset,
            SidePart::Bottom => self.bottom_offset,
        }
    }
}

/// A linedef separating a front sector from an optional back sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Sector on the front (right-hand) side.
    pub front: SectorId,
    /// Sector on the back side, if the line is two-sided.
    #[serde(default)]
    pub back: Option<SectorId>,
    /// Front sidedef.
    #[serde(default)]
    pub front_side: Side,
    /// Back sidedef, present on two-sided lines.
    #[serde(default)]
    pub back_side: Option<Side>,
    /// Whether the line blocks movement.
    #[serde(default)]
    pub blocking: bool,
}

impl Line {
    /// Create a one-sided line facing `front`.
    pub fn one_sided(front: SectorId) -> Self {
        Self {
            front,
            back: None,
            front_side: Side::default(),
            back_side: None,
            blocking: true,
        }
    }

    /// Create a two-sided line between `front` and `back`.
    pub fn two_sided(front: SectorId, back: SectorId) -> Self {
        Self {
            front,
            back: Some(back),
            front_side: Side::default(),
            back_side: Some(Side::default()),
            blocking: false,
        }
    }

    /// Set the front middle texture.
    pub fn with_mid_texture(mut self, texture: impl Into<String>) -> Self {
        self.front_side.mid_texture = texture.into();
        self
    }

    /// Set the lower texture on both sides.
    pub fn with_bottom_texture(mut self, texture: impl Into<String>) -> Self {
        let texture = texture.into();
        if let Some(back) = &mut self.back_side {
            back.bottom_texture = texture.clone();
        }
        self.front_side.bottom_texture = texture;
        self
    }

    /// Return `true` if the line has a sector on both sides.
    pub fn is_two_sided(&self) -> bool {
        self.back.is_some()
    }

    /// The sector across this line from `sector`, if any.
    ///
    /// Returns `None` for one-sided lines and for lines with the same sector
    /// on both sides.
    pub fn other_sector(&self, sector: SectorId) -> Option<SectorId> {
        let back = self.back?;
        if self.front == sector {
            (back != sector).then_some(back)
        } else {
            Some(self.front)
        }
    }

    /// Mutable access to one of the sides.
    pub fn side_mut(&mut self, back: bool) -> Option<&mut Side> {
        if back {
            self.back_side.as_mut()
        } else {
            Some(&mut self.front_side)
        }
    }

    /// Shared access to one of the sides.
    pub fn side(&self, back: bool) -> Option<&Side> {
        if back {
            self.back_side.as_ref()
        } else {
            Some(&self.front_side)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_sector_resolves_both_directions() {
        let line = Line::two_sided(SectorId(0), SectorId(1));
        assert_eq!(line.other_sector(SectorId(0)), Some(SectorId(1)));
        assert_eq!(line.other_sector(SectorId(1)), Some(SectorId(0)));
    }

    #[test]
    fn other_sector_none_for_one_sided_and_self_referencing() {
        assert_eq!(Line::one_sided(SectorId(0)).other_sector(SectorId(0)), None);
        let line = Line::two_sided(SectorId(2), SectorId(2));
        assert_eq!(line.other_sector(SectorId(2)), None);
    }

    #[test]
    fn bottom_texture_applies_to_both_sides() {
        let line = Line::two_sided(SectorId(0), SectorId(1)).with_bottom_texture("STEP1");
        assert_eq!(line.front_side.bottom_texture, "STEP1");
        assert_eq!(line.back_side.unwrap().bottom_texture, "STEP1");
    }
}
