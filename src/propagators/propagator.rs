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

use super::{DynamicsSnafu, InvalidStepSnafu, PropagationError, RK4Fixed, RK};
use crate::dynamics::Dynamics;
use crate::linalg::Vector6;
use crate::time::{Duration, Unit};
use snafu::{ensure, ResultExt};
use std::fmt;

/// A fixed step explicit Runge Kutta propagator of some dynamics.
///
/// The propagator may go forward or backward in time: the sign of the step follows the direction
/// from the start time to the end time, and the last step is shortened to land on the end time.
#[derive(Clone, Debug)]
pub struct Propagator<D: Dynamics> {
    pub dynamics: D,
    step: Duration,
    order: u8,
    stages: usize,
    a_coeffs: &'static [f64],
    b_coeffs: &'static [f64],
}

impl<D: Dynamics> Propagator<D> {
    /// Each propagator must be initialized with `new` which stores the Butcher table of the integrator.
    pub fn new<T: RK>(dynamics: D, step: Duration) -> Result<Self, PropagationError> {
        ensure!(step > Duration::ZERO, InvalidStepSnafu { step });
        Ok(Self {
            dynamics,
            step,
            order: T::ORDER,
            stages: T::STAGES,
            a_coeffs: T::A_COEFFS,
            b_coeffs: T::B_COEFFS,
        })
    }

    /// A classical RK4 propagator with the provided step.
    pub fn rk4(dynamics: D, step: Duration) -> Result<Self, PropagationError> {
        Self::new::<RK4Fixed>(dynamics, step)
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Propagates the state from `start` to `end`, both measured from the start of the transfer.
    ///
    /// Returns every integrated state, including the initial one.
    pub fn propagate(
        &self,
        state: Vector6<f64>,
        start: Duration,
        end: Duration,
    ) -> Result<Vec<(Duration, Vector6<f64>)>, PropagationError> {
        let end_s = end.to_seconds();
        let mut t = start.to_seconds();
        let direction = if end_s >= t { 1.0 } else { -1.0 };
        let step_s = direction * self.step.to_seconds();

        let mut x = state;
        let mut states = vec![(start, x)];
        // Remaining spans smaller than this are rounding of the end time
        let tiny = 1e-9 * self.step.to_seconds();

        while (end_s - t) * direction > tiny {
            if (end_s - t).abs() > step_s.abs() {
                x = self.derive(t, &x, step_s)?;
                t += step_s;
                states.push((t * Unit::Second, x));
            } else {
                x = self.derive(t, &x, end_s - t)?;
                t = end_s;
                states.push((end, x));
            }
        }

        debug!(
            "propagated {} steps with {} from {start} to {end}",
            states.len() - 1,
            self
        );

        Ok(states)
    }

    /// Performs one step of the integrator.
    fn derive(&self, t: f64, x: &Vector6<f64>, h: f64) -> Result<Vector6<f64>, PropagationError> {
        let mut k = Vec::with_capacity(self.stages);
        k.push(self.dynamics.eom(t, x).context(DynamicsSnafu)?);

        let mut a_idx: usize = 0;
        for i in 0..(self.stages - 1) {
            // c_i is the sum of the a_ij of this row
            let mut ci: f64 = 0.0;
            // wi stores a_{i1} k_1 + a_{i2} k_2 + ... + a_{i, i-1} k_{i-1}
            let mut wi = Vector6::zeros();
            for kj in &k[0..i + 1] {
                let a_ij = self.a_coeffs[a_idx];
                ci += a_ij;
                wi += a_ij * kj;
                a_idx += 1;
            }
            k.push(
                self.dynamics
                    .eom(t + ci * h, &(x + h * wi))
                    .context(DynamicsSnafu)?,
            );
        }

        let mut next = *x;
        for (b_i, ki) in self.b_coeffs.iter().zip(&k) {
            next += h * b_i * ki;
        }
        Ok(next)
    }
}

impl<D: Dynamics> fmt::Display for Propagator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "order {} fixed step ({}) propagator",
            self.order, self.step
        )
    }
}
