/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{PropagationError, Propagator, ShapingSnafu};
use crate::dynamics::{ShapedThrust, ThrustedTwoBody};
use crate::linalg::Vector6;
use crate::md::shaping::ShapingProblem;
use crate::time::Duration;
use crate::utils::rss_state_errors;
use snafu::ResultExt;
use std::fmt;

/// Outcome of flying a shaped thrust profile in two-body dynamics, starting from the middle of the
/// transfer and propagating towards both boundaries.
#[derive(Clone, Debug)]
pub struct FullPropagationResult {
    /// States from mid transfer to the arrival
    pub forward: Vec<(Duration, Vector6<f64>)>,
    /// States from mid transfer back to the departure
    pub backward: Vec<(Duration, Vector6<f64>)>,
    /// Propagated minus shaped state at the arrival
    pub final_difference: Vector6<f64>,
    /// Propagated minus shaped state at the departure
    pub initial_difference: Vector6<f64>,
}

impl FullPropagationResult {
    /// RSS position (km) and velocity (km/s) errors at the arrival
    pub fn final_errors(&self) -> (f64, f64) {
        rss_state_errors(&self.final_difference, &Vector6::zeros())
    }

    /// RSS position (km) and velocity (km/s) errors at the departure
    pub fn initial_errors(&self) -> (f64, f64) {
        rss_state_errors(&self.initial_difference, &Vector6::zeros())
    }
}

impl fmt::Display for FullPropagationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ri, vi) = self.initial_errors();
        let (rf, vf) = self.final_errors();
        write!(
            f,
            "departure error: {ri:.3} km, {vi:.3e} km/s\tarrival error: {rf:.3} km, {vf:.3e} km/s"
        )
    }
}

/// Propagates the thrust profile of the shaped transfer with a fixed step RK4, from the shaped
/// state at half the time of flight towards both ends, and compares the propagated boundary states
/// to the shaped ones.
pub fn propagate_shaped(
    problem: &ShapingProblem,
    step: Duration,
) -> Result<FullPropagationResult, PropagationError> {
    let tof = problem.time_angle_map().duration();
    let mid = tof * 0.5;
    let mid_state = problem.state_at_time(mid).context(ShapingSnafu)?;

    let dynamics = ThrustedTwoBody::new(problem.gm_km3_s2(), ShapedThrust::new(problem));
    let prop = Propagator::rk4(dynamics, step)?;

    let forward = prop.propagate(mid_state, mid, tof)?;
    let backward = prop.propagate(mid_state, mid, Duration::ZERO)?;

    let shaped_final = problem.final_state().cartesian_km_s();
    let shaped_initial = problem.initial_state().cartesian_km_s();

    // Both propagations start with the mid state, so neither is empty
    let final_difference = forward.last().map_or(mid_state, |(_, x)| *x) - shaped_final;
    let initial_difference = backward.last().map_or(mid_state, |(_, x)| *x) - shaped_initial;

    let rslt = FullPropagationResult {
        forward,
        backward,
        final_difference,
        initial_difference,
    };
    info!("propagated shaped transfer with {prop}: {rslt}");
    Ok(rslt)
}
