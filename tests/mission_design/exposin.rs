extern crate lowthrust_shaping as lts;

use crate::circular_state;
use lts::md::prelude::*;
use lts::md::shaping::exposin::flight_path_angle_bounds;
use rstest::*;
use std::f64::consts::PI;

#[fixture]
fn settings() -> ExposinSettings {
    let _ = pretty_env_logger::try_init();
    ExposinSettings::builder().winding(0.5).build()
}

#[rstest]
fn half_turn_exposin(settings: ExposinSettings) {
    let x0 = circular_state(1.0, 0.0, 0.0);
    let xf = circular_state(1.5, PI, 0.0);
    let expo = ExposinShaping::new(x0, xf, 300 * Unit::Day, 0, SUN_GM_KM3_S2, settings).unwrap();
    println!("{expo}");

    assert!((expo.transfer_angle() - PI).abs() < 1e-12);
    let (lo, hi) = expo.flight_path_angle_bounds();
    assert!((lo + 0.918_509_235).abs() < 1e-8);
    assert!((hi - 0.986_448_136).abs() < 1e-8);

    let tof_s = expo.time_of_flight().to_seconds();
    let required_s = (300 * Unit::Day).to_seconds();
    assert!(((tof_s - required_s) / required_s).abs() < 1e-6);

    assert!((expo.initial_flight_path_angle() - 0.241_442_289).abs() < 1e-6);
    assert!((expo.k0() - 0.916_65).abs() < 1e-4);
    assert!((expo.k1() - 0.500_12).abs() < 1e-4);
    assert_eq!(expo.k2(), 0.5);
    assert!((expo.phase() - 0.174_90).abs() < 1e-4);

    let dv = expo.delta_v_km_s().unwrap();
    assert!((dv - 4.9389).abs() < 1e-3, "ΔV = {dv} km/s");

    // Both radii are matched, the velocities are not
    assert!((expo.radius_at(0.0).unwrap() - AU).abs() < 1e-3);
    assert!((expo.radius_at(PI).unwrap() - 1.5 * AU).abs() < 1e-3);
    let departure = expo.state_at(0.0).unwrap();
    assert!((departure.fixed_rows::<3>(0) - x0.fixed_rows::<3>(0)).norm() < 1e-3);
    let arrival = expo.state_at(expo.transfer_angle()).unwrap();
    assert!((arrival.fixed_rows::<3>(0) - xf.fixed_rows::<3>(0)).norm() < 1.0);
    assert!(arrival[2].abs() < 1e-6);

    // Tangential thrust
    for theta in [0.1, 1.0, 2.5] {
        let velocity = expo.state_at(theta).unwrap().fixed_rows::<3>(3).into_owned();
        let thrust = expo.thrust_acceleration_at(theta).unwrap();
        assert!(thrust.cross(&velocity).norm() < 1e-9 * thrust.norm() * velocity.norm());
    }

    assert!(matches!(
        expo.state_at(PI + 0.1),
        Err(ShapingError::AngleOutOfBounds { .. })
    ));
}

#[rstest]
fn winding_too_large(settings: ExposinSettings) {
    let too_wound = ExposinSettings {
        winding: 2.0,
        ..settings
    };
    let err = ExposinShaping::new(
        circular_state(1.0, 0.0, 0.0),
        circular_state(1.5, PI, 0.0),
        300 * Unit::Day,
        0,
        SUN_GM_KM3_S2,
        too_wound,
    )
    .unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(err, ShapingError::NoExposinSolution { .. }));
    assert!(flight_path_angle_bounds(1.0, 1.5, 2.0, PI).is_err());
}

#[rstest]
fn unreachable_exposin_time_of_flight(settings: ExposinSettings) {
    // Faster than any admissible flight path angle allows
    let err = ExposinShaping::new(
        circular_state(1.0, 0.0, 0.0),
        circular_state(1.5, PI, 0.0),
        50 * Unit::Day,
        0,
        SUN_GM_KM3_S2,
        settings,
    )
    .unwrap_err();
    assert!(matches!(err, ShapingError::RootFinding { .. }), "{err}");
}
