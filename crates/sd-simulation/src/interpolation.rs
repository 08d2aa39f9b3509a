use sd_core::{Geometry, Plane, SectorId};

/// Remembers a plane's height at the start of the current tic so renderers
/// can draw it between tics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneInterpolation {
    /// The sector whose plane is tracked.
    pub sector: SectorId,
    /// The tracked plane.
    pub plane: Plane,
    previous: f64,
}

impl PlaneInterpolation {
    /// Start tracking a plane at its current height.
    pub fn new(geometry: &Geometry, sector: SectorId, plane: Plane) -> Self {
        let previous = geometry.sector(sector).map_or(0.0, |s| s.height(plane));
        Self {
            sector,
            plane,
            previous,
        }
    }

    /// Store the current height as the start of the next tic.
    pub fn record(&mut self, geometry: &Geometry) {
        if let Some(s) = geometry.sector(self.sector) {
            self.previous = s.height(self.plane);
        }
    }

    /// Height at `frac` (0..=1) of the way through the last tic.
    pub fn height_at(&self, geometry: &Geometry, frac: f64) -> f64 {
        let current = geometry
            .sector(self.sector)
            .map_or(self.previous, |s| s.height(self.plane));
        self.previous + (current - self.previous) * frac.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use sd_core::Sector;

    use super::*;

    #[test]
    fn interpolates_between_tics() {
        let mut geometry = Geometry::new(vec![Sector::new(0.0, 128.0)], vec![]).unwrap();
        let mut interp = PlaneInterpolation::new(&geometry, SectorId(0), Plane::Ceiling);
        interp.record(&geometry);
        geometry.sector_mut(SectorId(0)).unwrap().ceiling_height = 120.0;
        assert_eq!(interp.height_at(&geometry, 0.0), 128.0);
        assert_eq!(interp.height_at(&geometry, 0.5), 124.0);
        assert_eq!(interp.height_at(&geometry, 1.0), 120.0);
        assert_eq!(interp.height_at(&geometry, 2.0), 120.0);
    }
}
