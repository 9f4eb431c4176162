extern crate lowthrust_shaping as lts;

use crate::circular_state;
use lts::md::prelude::*;
use lts::opti::RootFinderError;

#[test]
fn parallel_tof_sweep() {
    let _ = pretty_env_logger::try_init();

    let tofs = [255 * Unit::Day, 1 * Unit::Day, 250 * Unit::Day];
    let points = tof_sweep(
        circular_state(1.0, 0.0, 0.0),
        circular_state(1.5, 180.0_f64.to_radians(), 0.0),
        &tofs,
        0,
        SUN_GM_KM3_S2,
        ShapingSettings::default(),
    );

    assert_eq!(points.len(), 3);
    for point in &points {
        println!("{point}");
    }
    // Sorted by time of flight
    assert_eq!(points[0].tof, 1 * Unit::Day);
    assert_eq!(points[1].tof, 250 * Unit::Day);
    assert_eq!(points[2].tof, 255 * Unit::Day);

    // The impossible transfer does not prevent the others from converging
    assert!(matches!(
        points[0].outcome,
        Err(ShapingError::RootFinding {
            source: RootFinderError::NotBracketed { .. }
        })
    ));

    // Failed points are kept along with the others, e.g. to rerun them with other settings
    let failed: Vec<SweepPoint> = points.iter().filter(|p| p.outcome.is_err()).cloned().collect();
    assert_eq!(failed, vec![points[0].clone()]);
    assert!(failed[0].outcome.clone().unwrap_err().to_string().contains("no sign change"));

    let fast = points[1].outcome.as_ref().unwrap();
    let slow = points[2].outcome.as_ref().unwrap();
    assert!((fast.free_coefficient + 0.747_27).abs() < 1e-3);
    assert!(slow.free_coefficient > fast.free_coefficient);
    assert!(fast.delta_v_km_s > 0.0 && slow.delta_v_km_s > 0.0);
    assert!(fast.max_thrust_km_s2 > 0.0);

    // Same result as a single design
    let single = ShapingProblem::new(
        circular_state(1.0, 0.0, 0.0),
        circular_state(1.5, 180.0_f64.to_radians(), 0.0),
        250 * Unit::Day,
        0,
        SUN_GM_KM3_S2,
        ShapingSettings::default(),
    )
    .unwrap();
    assert_eq!(
        *fast,
        SweepSummary::from_problem(&single).unwrap()
    );
}
