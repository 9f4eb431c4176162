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

use super::{ShapingProblem, ShapingSettings};
use crate::errors::ShapingError;
use crate::linalg::Vector6;
use crate::time::Duration;
use rayon::prelude::*;
use std::fmt;

/// Key figures of a converged transfer
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepSummary {
    pub free_coefficient: f64,
    pub delta_v_km_s: f64,
    /// Largest thrust acceleration over the samples of the transfer
    pub max_thrust_km_s2: f64,
}

impl SweepSummary {
    pub fn from_problem(problem: &ShapingProblem) -> Result<Self, ShapingError> {
        let max_thrust_km_s2 = problem
            .sample(problem.settings().time_step)?
            .iter()
            .map(|sample| sample.thrust_km_s2.norm())
            .fold(0.0, f64::max);

        Ok(Self {
            free_coefficient: problem.free_coefficient(),
            delta_v_km_s: problem.delta_v_km_s()?,
            max_thrust_km_s2,
        })
    }
}

/// Outcome of the shaping for one time of flight
#[derive(Clone, Debug, PartialEq)]
pub struct SweepPoint {
    pub tof: Duration,
    pub outcome: Result<SweepSummary, ShapingError>,
}

impl fmt::Display for SweepPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(summary) => write!(
                f,
                "{}: ΔV = {:.3} km/s, max thrust = {:e} km/s^2 (free coefficient {:e})",
                self.tof, summary.delta_v_km_s, summary.max_thrust_km_s2, summary.free_coefficient
            ),
            Err(e) => write!(f, "{}: {e}", self.tof),
        }
    }
}

/// Designs one transfer per time of flight, in parallel, and returns them sorted by time of flight.
///
/// Each transfer is independent, so a failure for one time of flight is reported in its outcome
/// and does not affect the others.
pub fn tof_sweep(
    initial_km_s: Vector6<f64>,
    final_km_s: Vector6<f64>,
    tofs: &[Duration],
    revolutions: u32,
    gm_km3_s2: f64,
    settings: ShapingSettings,
) -> Vec<SweepPoint> {
    let mut points = tofs
        .par_iter()
        .map(|tof| {
            let outcome = ShapingProblem::new(
                initial_km_s,
                final_km_s,
                *tof,
                revolutions,
                gm_km3_s2,
                settings,
            )
            .and_then(|problem| SweepSummary::from_problem(&problem));
            if let Err(e) = &outcome {
                debug!("no transfer in {tof}: {e}");
            }
            SweepPoint { tof: *tof, outcome }
        })
        .collect::<Vec<SweepPoint>>();

    points.sort_by(|a, b| a.tof.cmp(&b.tof));
    info!(
        "{} of {} times of flight converged",
        points.iter().filter(|p| p.outcome.is_ok()).count(),
        points.len()
    );
    points
}
