extern crate lowthrust_shaping as lts;

use lts::dynamics::{Coast, ThrustedTwoBody};
use lts::linalg::{Vector3, Vector6};
use lts::od::GroundStation;
use lts::propagators::Propagator;
use lts::time::{Duration, Unit};
use rstest::*;

const EARTH_GM_KM3_S2: f64 = 398_600.435_436;

#[fixture]
fn null_island() -> GroundStation {
    let _ = pretty_env_logger::try_init();
    GroundStation::builder()
        .name("Null Island")
        .latitude_deg(0.0)
        .longitude_deg(0.0)
        .elevation_mask_deg(10.0)
        .build()
}

#[rstest]
fn equatorial_passes(null_island: GroundStation) {
    // Equatorial circular orbit, right above the station at the start
    let sma_km = 7_000.0;
    let v = (EARTH_GM_KM3_S2 / sma_km).sqrt();
    let x0 = Vector6::new(sma_km, 0.0, 0.0, 0.0, v, 0.0);

    let prop = Propagator::rk4(ThrustedTwoBody::new(EARTH_GM_KM3_S2, Coast), 30 * Unit::Second)
        .unwrap();
    let states = prop.propagate(x0, Duration::ZERO, 1 * Unit::Day).unwrap();

    let mut rises = 0;
    let mut max_elevation = f64::MIN;
    let mut was_visible = true;
    for (elapsed, state) in &states {
        let position = Vector3::new(state[0], state[1], state[2]);
        let az_el = null_island.azimuth_elevation_of(&position, *elapsed);
        if *elapsed > 30 * Unit::Minute {
            max_elevation = max_elevation.max(az_el.elevation_deg);
        }
        let visible = null_island.is_visible(&position, *elapsed);
        if visible && !was_visible {
            rises += 1;
            // Prograde orbit faster than the Earth: rises in the west
            assert!(
                (az_el.azimuth_deg - 270.0).abs() < 1.0,
                "rose at {az_el} after {elapsed}"
            );
        }
        was_visible = visible;
    }

    // Synodic period of about 1.74 hours
    println!("{rises} rises, highest elevation {max_elevation:.3} deg");
    assert!((12..=14).contains(&rises), "{rises} rises");
    assert!(max_elevation > 75.0);
}
