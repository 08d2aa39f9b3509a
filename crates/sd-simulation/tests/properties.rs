//! Property tests over randomly parameterised movers.

use proptest::prelude::*;
use sd_core::{Geometry, Line, Sector, SectorId};
use sd_simulation::Level;
use sd_simulation::mover::floor::{FloorKind, FloorRequest};
use sd_simulation::mover::plat::{PlatKind, PlatRequest};

fn level(pit: f64) -> Level {
    let geometry = Geometry::new(
        vec![Sector::new(-pit, 512.0), Sector::new(0.0, 512.0).with_tag(1)],
        vec![Line::two_sided(SectorId(0), SectorId(1))],
    )
    .unwrap();
    Level::new(geometry)
}

fn floor(level: &Level) -> f64 {
    level.geometry().sector(SectorId(1)).unwrap().floor_height
}

/// Tics until tag 1 has no movers left, capped at `limit`.
fn tics_to_finish(level: &mut Level, limit: u64) -> Option<u64> {
    for tic in 1..=limit {
        level.tick();
        if level.movers().is_empty() {
            return Some(tic);
        }
    }
    None
}

proptest! {
    #[test]
    fn raise_by_value_lands_exactly(speed in 1u32..16, height in 1u32..256) {
        let mut level = level(0.0);
        let request = FloorRequest::new(FloorKind::RaiseByValue, 1, f64::from(speed))
            .with_height(f64::from(height));
        prop_assert!(level.do_floor(&request));

        let expected = u64::from(height.div_ceil(speed));
        let mut previous = floor(&level);
        for _ in 1..expected {
            level.tick();
            let now = floor(&level);
            prop_assert!(now > previous);
            prop_assert!(now < f64::from(height));
            previous = now;
        }
        level.tick();
        prop_assert_eq!(floor(&level), f64::from(height));
        prop_assert!(level.movers().is_empty());
    }

    #[test]
    fn stasis_delays_completion_by_its_length(
        pit in 8u32..128,
        delay in 1i32..70,
        pause_at in 1u64..60,
        pause_for in 1u64..80,
    ) {
        let request = PlatRequest::new(PlatKind::DownWaitUpStay, 1, 4.0).with_delay(delay);

        let mut baseline = level(f64::from(pit));
        prop_assert!(baseline.do_plat(&request));
        let Some(expected) = tics_to_finish(&mut baseline, 1_000) else {
            return Err(TestCaseError::fail("lift never finished"));
        };
        prop_assume!(pause_at < expected);

        let mut paused = level(f64::from(pit));
        prop_assert!(paused.do_plat(&request));
        paused.run(pause_at);
        prop_assert!(paused.stop_plat(1, false));
        let frozen = floor(&paused);
        paused.run(pause_for);
        prop_assert_eq!(floor(&paused), frozen);
        prop_assert!(paused.activate_in_stasis(1));

        let rest = tics_to_finish(&mut paused, 1_000);
        prop_assert_eq!(rest.map(|t| t + pause_at + pause_for), Some(expected));
        prop_assert_eq!(floor(&paused), 0.0);
    }

    #[test]
    fn lift_stays_between_its_ends(pit in 1u32..200, speed in 1u32..32) {
        let mut level = level(f64::from(pit));
        let request = PlatRequest::new(PlatKind::DownWaitUpStay, 1, f64::from(speed)).with_delay(3);
        prop_assert!(level.do_plat(&request));
        for _ in 0..600 {
            level.tick();
            let height = floor(&level);
            prop_assert!(height <= 0.0);
            prop_assert!(height >= -f64::from(pit));
        }
        prop_assert!(level.movers().is_empty());
    }
}
