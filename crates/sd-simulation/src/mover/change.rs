use sd_core::{Geometry, LineId, Plane, SectorId, SectorSpecial};
use serde::{Deserialize, Serialize};

use crate::context::TickContext;
use crate::event::SimEventKind;

/// A texture (and optionally special) to copy onto a sector when a mover
/// arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// Texture for the moved plane.
    pub texture: String,
    /// Replacement special; `None` leaves the special alone.
    pub special: Option<SectorSpecial>,
}

impl Transfer {
    /// Resolve a packed change code.
    ///
    /// Bits 0-1 select what is copied: 1 copies the texture and clears the
    /// special, 2 copies texture and special, 3 copies the texture only.
    /// Bit 2 takes the model from a neighbour whose `plane` sits at `target`
    /// instead of the activating line's front sector.
    pub fn from_code(
        geometry: &Geometry,
        sector: SectorId,
        plane: Plane,
        code: i32,
        line: Option<LineId>,
        target: f64,
    ) -> Option<Self> {
        if code & 3 == 0 {
            return None;
        }
        let model = if code & 4 != 0 {
            match plane {
                Plane::Floor => geometry.find_model_floor_sector(sector, target),
                Plane::Ceiling => geometry.find_model_ceiling_sector(sector, target),
            }
        } else {
            line.and_then(|l| geometry.line(l)).map(|l| l.front)
        }?;
        let model = geometry.sector(model)?;
        let special = match code & 3 {
            1 => Some(SectorSpecial::default()),
            2 => Some(model.special.clone()),
            _ => None,
        };
        Some(Self {
            texture: model.texture(plane).to_string(),
            special,
        })
    }

    /// Copy texture and special from `model`.
    pub fn copy_of(geometry: &Geometry, model: SectorId, plane: Plane) -> Option<Self> {
        let model = geometry.sector(model)?;
        Some(Self {
            texture: model.texture(plane).to_string(),
            special: Some(model.special.clone()),
        })
    }

    /// Write the transfer onto `sector`.
    pub fn apply(&self, ctx: &mut TickContext<'_>, sector: SectorId, plane: Plane) {
        let Some(target) = ctx.geometry.sector_mut(sector) else {
            return;
        };
        target.set_texture(plane, self.texture.clone());
        let special_changed = match &self.special {
            Some(special) => {
                target.special = special.clone();
                true
            }
            None => false,
        };
        ctx.emit(SimEventKind::TextureChanged {
            sector,
            plane,
            texture: self.texture.clone(),
        });
        if special_changed {
            ctx.emit(SimEventKind::SpecialChanged { sector });
        }
    }
}

#[cfg(test)]
mod tests {
    use sd_core::{Line, Sector};

    use super::*;

    fn geometry() -> Geometry {
        let special = SectorSpecial {
            special: 7,
            damage: 5,
            flags: 0,
        };
        Geometry::new(
            vec![
                Sector::new(0.0, 128.0).with_floor_texture("OWN"),
                Sector::new(32.0, 128.0)
                    .with_floor_texture("MODEL")
                    .with_special(special),
                Sector::new(64.0, 128.0).with_floor_texture("FRONT"),
            ],
            vec![
                Line::two_sided(SectorId(0), SectorId(1)),
                Line::two_sided(SectorId(2), SectorId(0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn code_zero_means_no_change() {
        assert!(Transfer::from_code(&geometry(), SectorId(0), Plane::Floor, 0, None, 0.0).is_none());
    }

    #[test]
    fn line_model_uses_front_sector() {
        let t = Transfer::from_code(&geometry(), SectorId(0), Plane::Floor, 3, Some(LineId(1)), 0.0)
            .unwrap();
        assert_eq!(t.texture, "FRONT");
        assert_eq!(t.special, None);
    }

    #[test]
    fn numeric_model_matches_target_height() {
        let t = Transfer::from_code(&geometry(), SectorId(0), Plane::Floor, 6, None, 32.0).unwrap();
        assert_eq!(t.texture, "MODEL");
        assert_eq!(t.special.unwrap().special, 7);
    }

    #[test]
    fn zero_special_variant_clears() {
        let t = Transfer::from_code(&geometry(), SectorId(0), Plane::Floor, 5, None, 32.0).unwrap();
        assert!(t.special.unwrap().is_cleared());
    }

    #[test]
    fn numeric_model_without_match_yields_none() {
        assert!(Transfer::from_code(&geometry(), SectorId(0), Plane::Floor, 6, None, 999.0).is_none());
    }
}
