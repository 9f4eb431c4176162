extern crate lowthrust_shaping as lts;

use crate::circular_state;
use lts::md::prelude::*;
use lts::md::shaping::{swept_azimuths, BoundaryState};
use lts::opti::{RootFinderMethod, RootFinderSettings};
use lts::utils::{assert_state_eq_or_rel, rss_state_errors};
use rstest::*;
use std::f64::consts::TAU;

/// Earth-like circular orbit to a Mars-like circular orbit, half a revolution ahead
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

/// Inclined arrival orbit, reached after one complete revolution
#[fixture]
fn inclined() -> ShapingProblem {
    let _ = pretty_env_logger::try_init();
    let settings = ShapingSettings::builder()
        .free_coefficient_bracket((-0.1, 0.0))
        .build();
    ShapingProblem::new(
        circular_state(1.0, 30.0_f64.to_radians(), 0.0),
        circular_state(1.5, 120.0_f64.to_radians(), 3.0_f64.to_radians()),
        500 * Unit::Day,
        1,
        SUN_GM_KM3_S2,
        settings,
    )
    .unwrap()
}

fn assert_boundaries(problem: &ShapingProblem) {
    let departure = problem.state_at(problem.initial_azimuth()).unwrap();
    let (pos_err, vel_err) = rss_state_errors(&departure, problem.initial_state().cartesian_km_s());
    println!("departure errors: {pos_err:e} km\t{vel_err:e} km/s");
    assert!(pos_err < 1e-3, "departure position error {pos_err} km");
    assert!(vel_err < 1e-9, "departure velocity error {vel_err} km/s");

    let arrival = problem.state_at(problem.final_azimuth()).unwrap();
    let (pos_err, vel_err) = rss_state_errors(&arrival, problem.final_state().cartesian_km_s());
    println!("arrival errors: {pos_err:e} km\t{vel_err:e} km/s");
    assert!(pos_err < 1e-3, "arrival position error {pos_err} km");
    assert!(vel_err < 1e-9, "arrival velocity error {vel_err} km/s");
}

fn assert_tof(problem: &ShapingProblem) {
    let required = problem.required_time_of_flight().to_seconds();
    let achieved = problem.time_of_flight().to_seconds();
    assert!(
        ((achieved - required) / required).abs() < 1e-6,
        "achieved {} instead of {}",
        problem.time_of_flight(),
        problem.required_time_of_flight()
    );
}

#[rstest]
fn coplanar_transfer(coplanar: ShapingProblem) {
    println!("{coplanar}");
    assert_tof(&coplanar);
    assert_boundaries(&coplanar);

    assert!((coplanar.free_coefficient() + 0.747_27).abs() < 1e-3);
    assert!(coplanar.boundary_rcond() > 1e-13);
    assert!((coplanar.final_azimuth() - coplanar.initial_azimuth() - TAU / 2.0).abs() < 1e-9);

    let dv = coplanar.delta_v_km_s().unwrap();
    println!("ΔV = {dv} km/s");
    assert!(dv > 11.4 && dv < 11.8, "ΔV = {dv} km/s");

    // Low thrust: the shape needs about 2 mm/s^2 at most
    let max_thrust = coplanar
        .sample(1 * Unit::Day)
        .unwrap()
        .iter()
        .map(|s| s.thrust_km_s2.norm())
        .fold(0.0, f64::max);
    assert!(max_thrust > 1.8e-6 && max_thrust < 2.1e-6, "{max_thrust:e} km/s^2");

    // Planar boundaries keep the whole transfer in the ecliptic
    let mid = 0.5 * (coplanar.initial_azimuth() + coplanar.final_azimuth());
    assert!(coplanar.state_at(mid).unwrap()[2].abs() < 1e-3);
    assert!(coplanar.thrust_acceleration_at(mid).unwrap()[2].abs() < 1e-15);
}

#[rstest]
fn impulsive_reference_is_cheaper(coplanar: ShapingProblem) {
    let hohmann = hohmann_delta_v(SUN_GM_KM3_S2, AU, 1.5 * AU).unwrap();
    println!("{hohmann}");
    assert!(hohmann.total_dv_km_s() < coplanar.delta_v_km_s().unwrap());
}

#[rstest]
fn inclined_multi_revolution_transfer(inclined: ShapingProblem) {
    println!("{inclined}");
    assert_tof(&inclined);
    assert_boundaries(&inclined);

    let sweep_deg = (inclined.final_azimuth() - inclined.initial_azimuth()).to_degrees();
    assert!((sweep_deg - 450.03).abs() < 0.01, "swept {sweep_deg} deg");
    assert!((inclined.free_coefficient() + 0.019_631).abs() < 1e-5);

    let dv = inclined.delta_v_km_s().unwrap();
    assert!((dv - 9.862).abs() < 0.01, "ΔV = {dv} km/s");

    // The out of plane motion requires out of plane thrust
    let mid = 0.5 * (inclined.initial_azimuth() + inclined.final_azimuth());
    assert!(inclined.thrust_acceleration_at(mid).unwrap()[2].abs() > 0.0);
}

#[rstest]
fn secant_matches_brent(coplanar: ShapingProblem) {
    let settings = ShapingSettings::builder()
        .root_finder(
            RootFinderSettings::builder()
                .method(RootFinderMethod::Secant)
                .build(),
        )
        .initial_guess(-0.7)
        .build();
    let secant = ShapingProblem::new(
        *coplanar.initial_state().cartesian_km_s(),
        *coplanar.final_state().cartesian_km_s(),
        250 * Unit::Day,
        0,
        SUN_GM_KM3_S2,
        settings,
    )
    .unwrap();
    assert!((secant.free_coefficient() - coplanar.free_coefficient()).abs() < 1e-6);
    assert_tof(&secant);

    let azimuth = coplanar.initial_azimuth() + 1.0;
    assert_state_eq_or_rel(
        &secant.state_at(azimuth).unwrap(),
        &coplanar.state_at(azimuth).unwrap(),
        1e-6,
        "secant and Brent shapes differ",
    );
}

#[rstest]
fn queries_are_idempotent(coplanar: ShapingProblem) {
    let azimuth = coplanar.initial_azimuth() + 1.234;
    assert_eq!(
        coplanar.state_at(azimuth).unwrap(),
        coplanar.state_at(azimuth).unwrap()
    );
    assert_eq!(
        coplanar.thrust_acceleration_at(azimuth).unwrap(),
        coplanar.thrust_acceleration_at(azimuth).unwrap()
    );
    assert_eq!(
        coplanar.delta_v_km_s().unwrap(),
        coplanar.delta_v_km_s().unwrap()
    );
    let elapsed = 100 * Unit::Day;
    assert_eq!(
        coplanar.azimuth_at_time(elapsed).unwrap(),
        coplanar.azimuth_at_time(elapsed).unwrap()
    );

    // Solving for the same free coefficient twice gives the same shape
    let free = coplanar.free_coefficient();
    let coeffs = coplanar.solve_coefficients(free);
    assert_eq!(coeffs, coplanar.solve_coefficients(free));
    assert_eq!(
        coplanar.tof_with(&coeffs).unwrap(),
        coplanar.tof_with(&coeffs).unwrap()
    );
    assert_eq!(coeffs.radial, coplanar.radial_function().coefficients());
}

#[rstest]
fn time_and_azimuth_maps_agree(coplanar: ShapingProblem) {
    let map = coplanar.time_angle_map();
    assert!(map.len() >= 250);
    let tof_s = coplanar.time_of_flight().to_seconds();
    assert!((map.duration().to_seconds() - tof_s).abs() < 1e-6 * tof_s);

    let (theta0, thetaf) = (coplanar.initial_azimuth(), coplanar.final_azimuth());
    for frac in [0.0, 0.1, 0.37, 0.5, 0.81, 1.0] {
        let theta = theta0 + frac * (thetaf - theta0);
        let elapsed = coplanar.time_at_azimuth(theta).unwrap();
        let back = coplanar.azimuth_at_time(elapsed).unwrap();
        assert!((back - theta).abs() < 1e-7, "{theta} -> {elapsed} -> {back}");
    }

    // The azimuth rate matches the slope of the map
    let theta = theta0 + 1.0;
    let rate = coplanar.azimuth_rate(theta).unwrap();
    let elapsed = coplanar.time_at_azimuth(theta).unwrap();
    let (_, map_rate) = map.angle_n_rate_at_time(elapsed).unwrap();
    let map_rate = map_rate / coplanar.normalization().time_s;
    assert!((rate - map_rate).abs() / rate < 1e-5, "{rate} vs {map_rate} rad/s");

    assert!(matches!(
        coplanar.azimuth_at_time(300 * Unit::Day),
        Err(ShapingError::TimeOutOfBounds { .. })
    ));
    assert!(matches!(
        coplanar.state_at(thetaf + 0.1),
        Err(ShapingError::AngleOutOfBounds { .. })
    ));
}

#[rstest]
fn sampling_covers_the_transfer(coplanar: ShapingProblem) {
    let samples = coplanar.sample(7 * Unit::Day).unwrap();
    // 0, 7, ..., 245 days, and the arrival
    assert_eq!(samples.len(), 37);
    assert_eq!(samples[0].elapsed, Duration::ZERO);
    assert_eq!(samples.last().unwrap().elapsed, coplanar.time_of_flight());
    assert!(samples
        .windows(2)
        .all(|pair| pair[1].azimuth_rad > pair[0].azimuth_rad));
    assert!(coplanar.sample(Duration::ZERO).is_err());
}

#[test]
fn each_revolution_adds_a_full_turn() {
    let norm = Normalization::heliocentric();
    let x0 = BoundaryState::new(circular_state(1.0, 0.3, 0.0), &norm).unwrap();
    let xf = BoundaryState::new(circular_state(1.5, 2.0, 0.0), &norm).unwrap();

    let (a0, af0) = swept_azimuths(&x0, &xf, 0);
    assert!(af0 > a0);
    for revs in 1..4 {
        let (b0, bf) = swept_azimuths(&x0, &xf, revs);
        assert_eq!(a0, b0);
        assert!((bf - af0 - TAU * f64::from(revs)).abs() < 1e-12);
    }

    // Arriving "behind" the departure needs more than a full turn
    let (c0, cf) = swept_azimuths(&xf, &x0, 0);
    assert!(cf > c0);
    assert!((cf - c0 - (TAU - 1.7)).abs() < 1e-12);
}

#[test]
fn infeasible_shape_is_reported() {
    let _ = pretty_env_logger::try_init();
    let settings = ShapingSettings::builder()
        .free_coefficient_bracket((-0.1, 0.01))
        .build();
    let problem = ShapingProblem::new(
        circular_state(1.0, 0.0, 0.0),
        circular_state(1.5, 90.0_f64.to_radians(), 0.0),
        630 * Unit::Day,
        1,
        SUN_GM_KM3_S2,
        settings,
    )
    .unwrap();
    assert!(problem.free_coefficient().abs() < 1e-2);

    // This free coefficient makes the time equation negative somewhere along the sweep
    match problem.tof_with(&problem.solve_coefficients(0.1)) {
        Err(ShapingError::Infeasible { radicand, .. }) => assert!(!radicand.is_nan()),
        other => panic!("expected an infeasible shape, got {other:?}"),
    }
}

#[rstest]
fn wrong_coefficient_count(coplanar: ShapingProblem) {
    let mut radial = coplanar.radial_function().clone();
    let err = radial.reset_coefficients(vec![1.0; 3]).unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(
        err,
        ShapingError::CoefficientCount {
            expected: 7,
            provided: 3
        }
    ));
}
