use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a sector in the level's sector table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectorId(pub usize);

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two horizontal planes bounding a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plane {
    /// The floor plane.
    Floor,
    /// The ceiling plane.
    Ceiling,
}

impl Plane {
    /// Both planes, floor first.
    pub const BOTH: [Plane; 2] = [Plane::Floor, Plane::Ceiling];
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floor => write!(f, "floor"),
            Self::Ceiling => write!(f, "ceiling"),
        }
    }
}

/// The sector "special": damage, secret, friction and lighting behavior
/// interpreted by systems outside the simulation core. Movers only copy or
/// clear it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorSpecial {
    /// Raw special number (stair specials are recognised by value).
    #[serde(default)]
    pub special: i32,
    /// Damage applied per damage interval to actors standing in the sector.
    #[serde(default)]
    pub damage: i32,
    /// Behavior flags (secret, friction, ...), opaque here.
    #[serde(default)]
    pub flags: u32,
}

impl SectorSpecial {
    /// Special value marking the first alternating stair sector.
    pub const STAIRS_SPECIAL1: i32 = 26;
    /// Special value marking the second alternating stair sector.
    pub const STAIRS_SPECIAL2: i32 = 27;

    /// Return `true` if nothing is set.
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }
}

/// A 2D texture offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureOffset {
    /// Horizontal offset in map units.
    pub x: f64,
    /// Vertical offset in map units.
    pub y: f64,
}

impl TextureOffset {
    /// Shift the offset by `(dx, dy)`.
    pub fn add(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

/// A map region bounded by a floor and a ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// Floor height in map units.
    pub floor_height: f64,
    /// Ceiling height in map units.
    pub ceiling_height: f64,
    /// Activation tag (0 = untagged).
    #[serde(default)]
    pub tag: i32,
    /// Sector special bundle.
    #[serde(default)]
    pub special: SectorSpecial,
    /// Floor texture name.
    #[serde(default)]
    pub floor_texture: String,
    /// Ceiling texture name.
    #[serde(default)]
    pub ceiling_texture: String,
    /// Light level (0..=255).
    #[serde(default = "default_light")]
    pub light_level: i32,
    /// Floor texture offset, mutated by floor scrollers.
    #[serde(default)]
    pub floor_offset: TextureOffset,
    /// Ceiling texture offset, mutated by ceiling scrollers.
    #[serde(default)]
    pub ceiling_offset: TextureOffset,
}

fn default_light() -> i32 {
    160
}

impl Sector {
    /// Create an untagged sector with the given plane heights.
    pub fn new(floor_height: f64, ceiling_height: f64) -> Self {
        Self {
            floor_height,
            ceiling_height,
            tag: 0,
            special: SectorSpecial::default(),
            floor_texture: String::new(),
            ceiling_texture: String::new(),
            light_level: default_light(),
            floor_offset: TextureOffset::default(),
            ceiling_offset: TextureOffset::default(),
        }
    }

    /// Set the activation tag.
    pub fn with_tag(mut self, tag: i32) -> Self {
        self.tag = tag;
        self
    }

    /// Set the floor texture.
    pub fn with_floor_texture(mut self, texture: impl Into<String>) -> Self {
        self.floor_texture = texture.into();
        self
    }

    /// Set the ceiling texture.
    pub fn with_ceiling_texture(mut self, texture: impl Into<String>) -> Self {
        self.ceiling_texture = texture.into();
        self
    }

    /// Set the special bundle.
    pub fn with_special(mut self, special: SectorSpecial) -> Self {
        self.special = special;
        self
    }

    /// Height of the given plane.
    pub fn height(&self, plane: Plane) -> f64 {
        match plane {
            Plane::Floor => self.floor_height,
            Plane::Ceiling => self.ceiling_height,
        }
    }

    /// Set the height of the given plane.
    pub fn set_height(&mut self, plane: Plane, height: f64) {
        match plane {
            Plane::Floor => self.floor_height = height,
            Plane::Ceiling => self.ceiling_height = height,
        }
    }

    /// Texture of the given plane.
    pub fn texture(&self, plane: Plane) -> &str {
        match plane {
            Plane::Floor => &self.floor_texture,
            Plane::Ceiling => &self.ceiling_texture,
        }
    }

    /// Replace the texture of the given plane.
    pub fn set_texture(&mut self, plane: Plane, texture: impl Into<String>) {
        match plane {
            Plane::Floor => self.floor_texture = texture.into(),
            Plane::Ceiling => self.ceiling_texture = texture.into(),
        }
    }

    /// Mutable texture offset of the given plane.
    pub fn offset_mut(&mut self, plane: Plane) -> &mut TextureOffset {
        match plane {
            Plane::Floor => &mut self.floor_offset,
            Plane::Ceiling => &mut self.ceiling_offset,
        }
    }

    /// Open space between floor and ceiling.
    pub fn gap(&self) -> f64 {
        self.ceiling_height - self.floor_height
    }

    /// Floor plus ceiling height, used by displacement scrollers.
    pub fn height_sum(&self) -> f64 {
        self.floor_height + self.ceiling_height
    }
}
