extern crate lowthrust_shaping as lts;

use crate::circular_state;
use lts::dynamics::{Coast, GuidanceError, ShapedThrust, ThrustProfile, ThrustedTwoBody};
use lts::md::prelude::*;
use lts::propagators::{PropagationError, Propagator};
use lts::utils::rss_state_errors;
use rstest::*;

#[fixture]
fn coplanar() -> ShapingProblem {
    let _ = pretty_env_logger::try_init();
    ShapingProblem::new(
        circular_state(1.0, 0.0, 0.0),
        circular_state(1.5, 180.0_f64.to_radians(), 0.0),
        250 * Unit::Day,
        0,
        SUN_GM_KM3_S2,
        ShapingSettings::default(),
    )
    .unwrap()
}

#[rstest]
fn shaped_thrust_flies_the_shape(coplanar: ShapingProblem) {
    let rslt = propagate_shaped(&coplanar, 1 * Unit::Day).unwrap();
    println!("{rslt}");

    let tof = coplanar.time_angle_map().duration();
    assert_eq!(rslt.forward.first().unwrap().0, tof * 0.5);
    assert_eq!(rslt.forward.last().unwrap().0, tof);
    assert_eq!(rslt.backward.last().unwrap().0, Duration::ZERO);

    let (pos_err, vel_err) = rslt.final_errors();
    assert!(pos_err < 1_000.0, "arrival error {pos_err} km");
    assert!(vel_err < 1e-3, "arrival error {vel_err} km/s");
    let (pos_err, vel_err) = rslt.initial_errors();
    assert!(pos_err < 1_000.0, "departure error {pos_err} km");
    assert!(vel_err < 1e-3, "departure error {vel_err} km/s");

    // The propagated states follow the shape all along
    for (elapsed, state) in rslt.forward.iter().step_by(20) {
        let shaped = coplanar.state_at_time(*elapsed).unwrap();
        let (pos_err, _) = rss_state_errors(state, &shaped);
        assert!(pos_err < 1_000.0, "{pos_err} km off after {elapsed}");
    }
}

#[rstest]
fn coasting_misses_the_target(coplanar: ShapingProblem) {
    let tof = coplanar.time_angle_map().duration();
    let mid = tof * 0.5;
    let prop = Propagator::rk4(ThrustedTwoBody::new(SUN_GM_KM3_S2, Coast), 1 * Unit::Day).unwrap();
    let states = prop
        .propagate(coplanar.state_at_time(mid).unwrap(), mid, tof)
        .unwrap();
    let (pos_err, _) = rss_state_errors(
        &states.last().unwrap().1,
        coplanar.final_state().cartesian_km_s(),
    );
    assert!(pos_err > 1e6, "coasting only misses by {pos_err} km");
}

#[rstest]
fn thrust_profile_outside_of_transfer(coplanar: ShapingProblem) {
    let thrust = ShapedThrust::new(&coplanar);
    println!("{thrust}");
    let mid = coplanar.time_angle_map().duration() * 0.5;

    let direction = thrust.direction(mid).unwrap();
    assert!((direction.norm() - 1.0).abs() < 1e-12);
    let magnitude = thrust.magnitude(mid).unwrap();
    let expected = coplanar.thrust_acceleration_at_time(mid).unwrap();
    assert!((thrust.acceleration(mid).unwrap() - expected).norm() < 1e-20);
    assert!((direction * magnitude - expected).norm() < 1e-15);

    assert!(matches!(
        thrust.magnitude(300 * Unit::Day),
        Err(GuidanceError::ShapedTrajectory {
            source: ShapingError::TimeOutOfBounds { .. },
            ..
        })
    ));

    // Propagating beyond the transfer fails in the dynamics
    let prop = Propagator::rk4(ThrustedTwoBody::new(SUN_GM_KM3_S2, thrust), 1 * Unit::Day).unwrap();
    let state = coplanar.state_at_time(mid).unwrap();
    assert!(matches!(
        prop.propagate(state, mid, 300 * Unit::Day),
        Err(PropagationError::Dynamics { .. })
    ));
}
