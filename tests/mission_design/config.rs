extern crate lowthrust_shaping as lts;

use crate::{circular_state, test_config_path};
use lts::io::{ConfigError, ConfigRepr};
use lts::md::prelude::*;
use lts::od::GroundStation;
use lts::opti::RootFinderMethod;

#[test]
fn shaping_settings_from_yaml() {
    let _ = pretty_env_logger::try_init();

    let settings = ShapingSettings::load(test_config_path("shaping.yaml")).unwrap();
    println!("{settings}");
    assert_eq!(settings.quadrature.order, 20);
    assert_eq!(settings.quadrature.segments, 10);
    assert_eq!(settings.root_finder.method, RootFinderMethod::Brent);
    assert_eq!(settings.root_finder.max_iterations, 50);
    assert_eq!(settings.free_coefficient_bracket, (-0.1, 0.0));
    assert_eq!(settings.initial_guess, None);
    assert_eq!(settings.time_step, 12 * Unit::Hour);

    // The loaded settings design the inclined transfer
    let problem = ShapingProblem::new(
        circular_state(1.0, 30.0_f64.to_radians(), 0.0),
        circular_state(1.5, 120.0_f64.to_radians(), 3.0_f64.to_radians()),
        500 * Unit::Day,
        1,
        SUN_GM_KM3_S2,
        settings,
    )
    .unwrap();
    assert!((problem.free_coefficient() + 0.019_631).abs() < 1e-5);
    // Twice as many map samples as days
    assert!(problem.time_angle_map().len() >= 1000);
}

#[test]
fn exposin_settings_from_yaml() {
    let settings = ExposinSettings::load(test_config_path("exposin.yaml")).unwrap();
    assert_eq!(settings.winding, 0.5);
    assert_eq!(settings.root_finder.max_iterations, 80);
    assert_eq!(settings.quadrature, ExposinSettings::default().quadrature);

    let round_trip = ExposinSettings::loads(&settings.dumps().unwrap()).unwrap();
    assert_eq!(round_trip, settings);
}

#[test]
fn stations_from_yaml() {
    let stations = GroundStation::load_named(test_config_path("many_stations.yaml")).unwrap();
    assert_eq!(stations.len(), 3);
    assert_eq!(stations["Madrid"], GroundStation::dss65_madrid(5.0));
    assert_eq!(stations["Canberra"], GroundStation::dss34_canberra(5.0));
    // Mask defaults to the horizon
    assert_eq!(stations["Goldstone"].elevation_mask_deg, 0.0);
}

#[test]
fn config_errors() {
    assert!(matches!(
        ShapingSettings::load(test_config_path("does_not_exist.yaml")),
        Err(ConfigError::ReadError { .. })
    ));
    assert!(matches!(
        ShapingSettings::loads("free_coefficient_bracket: not a bracket"),
        Err(ConfigError::ParseError { .. })
    ));
}
