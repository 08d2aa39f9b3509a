use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::animation::DoorAnimation;
use crate::error::{CoreError, CoreResult};
use crate::line::{Line, LineId, Side};
use crate::sector::{Sector, SectorId};
use crate::tags::TagIndex;

/// Height used for textures missing from the level's height table.
pub const DEFAULT_TEXTURE_HEIGHT: f64 = 64.0;

/// On-disk level description, as produced by the map loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelData {
    /// Level name, informational only.
    #[serde(default)]
    pub name: String,
    /// Sector table.
    pub sectors: Vec<Sector>,
    /// Line table.
    #[serde(default)]
    pub lines: Vec<Line>,
    /// Actors present at level start.
    #[serde(default)]
    pub actors: Vec<Actor>,
    /// Frame-swap door definitions.
    #[serde(default)]
    pub door_animations: Vec<DoorAnimation>,
    /// Texture heights used by "by texture" moves.
    #[serde(default)]
    pub texture_heights: BTreeMap<String, f64>,
}

impl LevelData {
    /// Parse a level from JSON.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Validated, indexed level geometry shared by every mover.
///
/// Owns the sector and line tables. The tag index and the per-sector line
/// lists are derived at construction and never change.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Level name.
    pub name: String,
    sectors: Vec<Sector>,
    lines: Vec<Line>,
    door_animations: Vec<DoorAnimation>,
    texture_heights: BTreeMap<String, f64>,

    // Indexes
    tags: TagIndex,
    sector_lines: Vec<Vec<LineId>>,
}

impl Geometry {
    /// Build geometry from sectors and lines, validating references.
    pub fn new(sectors: Vec<Sector>, lines: Vec<Line>) -> CoreResult<Self> {
        Self::from_data(LevelData {
            sectors,
            lines,
            ..LevelData::default()
        })
    }

    /// Build geometry from a parsed level, validating references.
    ///
    /// Actors are not part of the geometry; take them from `data.actors`
    /// before calling this if they are needed.
    pub fn from_data(data: LevelData) -> CoreResult<Self> {
        for (i, sector) in data.sectors.iter().enumerate() {
            if !sector.floor_height.is_finite() || !sector.ceiling_height.is_finite() {
                return Err(CoreError::Validation(format!(
                    "sector {} has a non-finite height",
                    SectorId(i)
                )));
            }
            if sector.floor_height > sector.ceiling_height {
                return Err(CoreError::InvertedSector(SectorId(i)));
            }
        }

        let mut sector_lines = vec![Vec::new(); data.sectors.len()];
        for (i, line) in data.lines.iter().enumerate() {
            let id = LineId(i);
            for sector in std::iter::once(line.front).chain(line.back) {
                let lines = sector_lines
                    .get_mut(sector.0)
                    .ok_or(CoreError::DanglingSector { line: id, sector })?;
                if !lines.contains(&id) {
                    lines.push(id);
                }
            }
        }

        let tags = TagIndex::build(&data.sectors);
        Ok(Self {
            name: data.name,
            sectors: data.sectors,
            lines: data.lines,
            door_animations: data.door_animations,
            texture_heights: data.texture_heights,
            tags,
            sector_lines,
        })
    }

    /// Parse and validate a level from JSON, returning geometry and actors.
    pub fn from_json(json: &str) -> CoreResult<(Self, Vec<Actor>)> {
        let mut data = LevelData::from_json(json)?;
        let actors = std::mem::take(&mut data.actors);
        Ok((Self::from_data(data)?, actors))
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    /// Get a sector by index.
    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(id.0)
    }

    /// Get a mutable sector by index.
    pub fn sector_mut(&mut self, id: SectorId) -> Option<&mut Sector> {
        self.sectors.get_mut(id.0)
    }

    /// Get a sector by index or fail.
    pub fn try_sector(&self, id: SectorId) -> CoreResult<&Sector> {
        self.sector(id).ok_or(CoreError::SectorNotFound(id))
    }

    /// All sectors in load order.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Number of sectors.
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Get a line by index.
    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.0)
    }

    /// Get a mutable line by index.
    pub fn line_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.lines.get_mut(id.0)
    }

    /// All lines in load order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The tag index.
    pub fn tags(&self) -> &TagIndex {
        &self.tags
    }

    /// Resolve an activation to its target sectors (see [`TagIndex::resolve`]).
    pub fn resolve(&self, tag: i32, line: Option<LineId>) -> Vec<SectorId> {
        let line = line.and_then(|l| self.line(l));
        self.tags.resolve(tag, line)
    }

    /// Lines bordering a sector, in line order.
    pub fn lines_of(&self, sector: SectorId) -> &[LineId] {
        self.sector_lines
            .get(sector.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sectors across the two-sided lines of `sector`, in line order.
    ///
    /// A neighbour bordering several lines appears once per line.
    pub fn neighbors(&self, sector: SectorId) -> impl Iterator<Item = SectorId> + '_ {
        self.lines_of(sector)
            .iter()
            .filter_map(|id| self.line(*id))
            .filter_map(move |line| line.other_sector(sector))
    }

    /// Door animation keyed by a line's middle texture.
    pub fn door_animation(&self, texture: &str) -> Option<&DoorAnimation> {
        self.door_animations.iter().find(|a| a.base == texture)
    }

    /// Height of a texture, falling back to [`DEFAULT_TEXTURE_HEIGHT`].
    pub fn texture_height(&self, texture: &str) -> f64 {
        self.texture_heights
            .get(texture)
            .copied()
            .unwrap_or(DEFAULT_TEXTURE_HEIGHT)
    }

    // -----------------------------------------------------------------------
    // Neighbour queries
    // -----------------------------------------------------------------------

    fn floor_of(&self, id: SectorId) -> f64 {
        self.sector(id).map_or(0.0, |s| s.floor_height)
    }

    fn ceiling_of(&self, id: SectorId) -> f64 {
        self.sector(id).map_or(0.0, |s| s.ceiling_height)
    }

    /// Lowest floor among the sector and its neighbours.
    pub fn find_lowest_floor_surrounding(&self, id: SectorId) -> f64 {
        self.neighbors(id)
            .map(|n| self.floor_of(n))
            .fold(self.floor_of(id), f64::min)
    }

    /// Highest neighbouring floor; the sector's own floor if it has no
    /// neighbours.
    pub fn find_highest_floor_surrounding(&self, id: SectorId) -> f64 {
        self.neighbors(id)
            .map(|n| self.floor_of(n))
            .reduce(f64::max)
            .unwrap_or_else(|| self.floor_of(id))
    }

    /// Lowest neighbouring floor strictly above this floor, or this floor.
    pub fn find_next_highest_floor(&self, id: SectorId) -> f64 {
        let own = self.floor_of(id);
        self.neighbors(id)
            .map(|n| self.floor_of(n))
            .filter(|h| *h > own)
            .reduce(f64::min)
            .unwrap_or(own)
    }

    /// Highest neighbouring floor strictly below this floor, or this floor.
    pub fn find_next_lowest_floor(&self, id: SectorId) -> f64 {
        let own = self.floor_of(id);
        self.neighbors(id)
            .map(|n| self.floor_of(n))
            .filter(|h| *h < own)
            .reduce(f64::max)
            .unwrap_or(own)
    }

    /// Lowest neighbouring ceiling; the sector's own ceiling if it has no
    /// neighbours.
    pub fn find_lowest_ceiling_surrounding(&self, id: SectorId) -> f64 {
        self.neighbors(id)
            .map(|n| self.ceiling_of(n))
            .reduce(f64::min)
            .unwrap_or_else(|| self.ceiling_of(id))
    }

    /// Highest neighbouring ceiling; the sector's own ceiling if it has no
    /// neighbours.
    pub fn find_highest_ceiling_surrounding(&self, id: SectorId) -> f64 {
        self.neighbors(id)
            .map(|n| self.ceiling_of(n))
            .reduce(f64::max)
            .unwrap_or_else(|| self.ceiling_of(id))
    }

    /// Highest neighbouring ceiling strictly below this ceiling, or this
    /// ceiling.
    pub fn find_next_lowest_ceiling(&self, id: SectorId) -> f64 {
        let own = self.ceiling_of(id);
        self.neighbors(id)
            .map(|n| self.ceiling_of(n))
            .filter(|h| *h < own)
            .reduce(f64::max)
            .unwrap_or(own)
    }

    /// Lowest neighbouring ceiling strictly above this ceiling, or this
    /// ceiling.
    pub fn find_next_highest_ceiling(&self, id: SectorId) -> f64 {
        let own = self.ceiling_of(id);
        self.neighbors(id)
            .map(|n| self.ceiling_of(n))
            .filter(|h| *h > own)
            .reduce(f64::min)
            .unwrap_or(own)
    }

    /// First neighbour (in line order) whose floor is at `height`.
    pub fn find_model_floor_sector(&self, id: SectorId, height: f64) -> Option<SectorId> {
        self.neighbors(id).find(|n| self.floor_of(*n) == height)
    }

    /// First neighbour (in line order) whose ceiling is at `height`.
    pub fn find_model_ceiling_sector(&self, id: SectorId, height: f64) -> Option<SectorId> {
        self.neighbors(id).find(|n| self.ceiling_of(*n) == height)
    }

    /// Shortest lower texture on the two-sided lines around a sector.
    pub fn shortest_lower_texture(&self, id: SectorId) -> f64 {
        self.shortest_texture(id, |side| &side.bottom_texture)
    }

    /// Shortest upper texture on the two-sided lines around a sector.
    pub fn shortest_upper_texture(&self, id: SectorId) -> f64 {
        self.shortest_texture(id, |side| &side.top_texture)
    }

    fn shortest_texture(&self, id: SectorId, tier: impl Fn(&Side) -> &String) -> f64 {
        self.lines_of(id)
            .iter()
            .filter_map(|l| self.line(*l))
            .filter(|line| line.is_two_sided())
            .flat_map(|line| [line.side(false), line.side(true)])
            .flatten()
            .map(&tier)
            .filter(|texture| !texture.is_empty() && texture.as_str() != "-")
            .map(|texture| self.texture_height(texture))
            .reduce(f64::min)
            .unwrap_or(DEFAULT_TEXTURE_HEIGHT)
    }

    /// Overwrite the mutable sector and line state with saved copies.
    ///
    /// Table sizes must match the loaded level; indexes are not rebuilt
    /// because tags and line topology never change after load.
    pub fn restore_state(&mut self, sectors: Vec<Sector>, lines: Vec<Line>) -> CoreResult<()> {
        if sectors.len() != self.sectors.len() || lines.len() != self.lines.len() {
            return Err(CoreError::Validation(format!(
                "saved state has {} sectors / {} lines, level has {} / {}",
                sectors.len(),
                lines.len(),
                self.sectors.len(),
                self.lines.len()
            )));
        }
        self.sectors = sectors;
        self.lines = lines;
        Ok(())
    }

    /// Snapshot of the mutable geometry state as level data.
    pub fn to_data(&self) -> LevelData {
        LevelData {
            name: self.name.clone(),
            sectors: self.sectors.clone(),
            lines: self.lines.clone(),
            actors: Vec::new(),
            door_animations: self.door_animations.clone(),
            texture_heights: self.texture_heights.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Center sector 0 surrounded by sectors 1..=3 with varied heights.
    fn ring() -> Geometry {
        let sectors = vec![
            Sector::new(0.0, 128.0),
            Sector::new(-32.0, 96.0),
            Sector::new(24.0, 160.0),
            Sector::new(64.0, 200.0),
        ];
        let lines = vec![
            Line::two_sided(SectorId(0), SectorId(1)),
            Line::two_sided(SectorId(0), SectorId(2)),
            Line::two_sided(SectorId(3), SectorId(0)),
            Line::one_sided(SectorId(0)),
        ];
        Geometry::new(sectors, lines).unwrap()
    }

    #[test]
    fn neighbors_follow_line_order() {
        let g = ring();
        let n: Vec<_> = g.neighbors(SectorId(0)).collect();
        assert_eq!(n, vec![SectorId(1), SectorId(2), SectorId(3)]);
        assert_eq!(g.lines_of(SectorId(0)).len(), 4);
    }

    #[test]
    fn floor_queries() {
        let g = ring();
        let c = SectorId(0);
        assert_eq!(g.find_lowest_floor_surrounding(c), -32.0);
        assert_eq!(g.find_highest_floor_surrounding(c), 64.0);
        assert_eq!(g.find_next_highest_floor(c), 24.0);
        assert_eq!(g.find_next_lowest_floor(c), -32.0);
    }

    #[test]
    fn ceiling_queries() {
        let g = ring();
        let c = SectorId(0);
        assert_eq!(g.find_lowest_ceiling_surrounding(c), 96.0);
        assert_eq!(g.find_highest_ceiling_surrounding(c), 200.0);
        assert_eq!(g.find_next_lowest_ceiling(c), 96.0);
        assert_eq!(g.find_next_highest_ceiling(c), 160.0);
    }

    #[test]
    fn isolated_sector_falls_back_to_own_heights() {
        let g = Geometry::new(vec![Sector::new(8.0, 72.0)], vec![]).unwrap();
        let s = SectorId(0);
        assert_eq!(g.find_lowest_floor_surrounding(s), 8.0);
        assert_eq!(g.find_highest_floor_surrounding(s), 8.0);
        assert_eq!(g.find_next_highest_floor(s), 8.0);
        assert_eq!(g.find_lowest_ceiling_surrounding(s), 72.0);
        assert_eq!(g.find_highest_ceiling_surrounding(s), 72.0);
        assert_eq!(g.shortest_lower_texture(s), DEFAULT_TEXTURE_HEIGHT);
    }

    #[test]
    fn model_sector_lookup() {
        let g = ring();
        assert_eq!(g.find_model_floor_sector(SectorId(0), 24.0), Some(SectorId(2)));
        assert_eq!(g.find_model_ceiling_sector(SectorId(0), 200.0), Some(SectorId(3)));
        assert_eq!(g.find_model_floor_sector(SectorId(0), 5.0), None);
    }

    #[test]
    fn shortest_texture_uses_height_table() {
        let data = LevelData {
            sectors: vec![Sector::new(0.0, 128.0), Sector::new(0.0, 128.0)],
            lines: vec![
                Line::two_sided(SectorId(0), SectorId(1)).with_bottom_texture("STEP2"),
                Line::two_sided(SectorId(0), SectorId(1)).with_bottom_texture("TALL"),
            ],
            texture_heights: BTreeMap::from([("STEP2".to_string(), 16.0), ("TALL".to_string(), 128.0)]),
            ..LevelData::default()
        };
        let g = Geometry::from_data(data).unwrap();
        assert_eq!(g.shortest_lower_texture(SectorId(0)), 16.0);
    }

    #[test]
    fn dangling_line_rejected() {
        let err = Geometry::new(
            vec![Sector::new(0.0, 64.0)],
            vec![Line::two_sided(SectorId(0), SectorId(9))],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DanglingSector { .. }));
    }

    #[test]
    fn inverted_sector_rejected() {
        let err = Geometry::new(vec![Sector::new(64.0, 0.0)], vec![]).unwrap_err();
        assert!(matches!(err, CoreError::InvertedSector(SectorId(0))));
    }

    #[test]
    fn from_json_splits_actors() {
        let json = r#"{
            "name": "tiny",
            "sectors": [
                {"floor_height": 0.0, "ceiling_height": 128.0, "tag": 3},
                {"floor_height": 0.0, "ceiling_height": 0.0}
            ],
            "lines": [{"front": 0, "back": 1}],
            "actors": [{"id": 1, "sector": 0, "height": 56.0, "health": 100}]
        }"#;
        let (g, actors) = Geometry::from_json(json).unwrap();
        assert_eq!(g.name, "tiny");
        assert_eq!(g.tags().group(3), &[SectorId(0)]);
        assert_eq!(actors.len(), 1);
        assert_eq!(g.resolve(0, Some(LineId(0))), vec![SectorId(1)]);
    }

    #[test]
    fn bad_json_is_parse_error() {
        assert!(matches!(
            Geometry::from_json("{ not json"),
            Err(CoreError::Parse(_))
        ));
    }
}
