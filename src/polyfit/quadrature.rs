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

use super::{InterpolationError, InvalidDataSnafu};
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use typed_builder::TypedBuilder;

/// Settings of the composite Gauss-Legendre quadrature.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct QuadratureSettings {
    /// Number of Gauss-Legendre nodes per segment
    #[builder(default = 16)]
    #[serde(default = "default_order")]
    pub order: usize,
    /// Number of equal segments the integration interval is split into
    #[builder(default = 8)]
    #[serde(default = "default_segments")]
    pub segments: usize,
}

fn default_order() -> usize {
    16
}

fn default_segments() -> usize {
    8
}

impl Default for QuadratureSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Display for QuadratureSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gauss-Legendre with {} nodes over {} segments",
            self.order, self.segments
        )
    }
}

/// Composite Gauss-Legendre quadrature.
///
/// The nodes and weights are computed once at initialization by a Newton iteration on the Legendre
/// polynomial recurrence, so any order may be used.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
    segments: usize,
}

impl GaussLegendre {
    pub fn new(settings: QuadratureSettings) -> Result<Self, InterpolationError> {
        if settings.order == 0 || settings.segments == 0 {
            return InvalidDataSnafu {
                msg: format!("quadrature requires at least one node and one segment ({settings})"),
            }
            .fail();
        }

        let n = settings.order;
        let mut nodes = Vec::with_capacity(n);
        let mut weights = Vec::with_capacity(n);

        for i in 1..=n {
            // Initial guess of the i-th root, from Tricomi's approximation
            let mut x = (PI * (i as f64 - 0.25) / (n as f64 + 0.5)).cos();
            let mut dp = 0.0;
            for _ in 0..100 {
                let (p, p_deriv) = legendre(n, x);
                dp = p_deriv;
                let dx = p / p_deriv;
                x -= dx;
                if dx.abs() < 1e-15 {
                    break;
                }
            }
            // Recompute the derivative at the converged root
            let (_, p_deriv) = legendre(n, x);
            if p_deriv.is_finite() {
                dp = p_deriv;
            }
            nodes.push(x);
            weights.push(2.0 / ((1.0 - x * x) * dp * dp));
        }

        Ok(Self {
            nodes,
            weights,
            segments: settings.segments,
        })
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Integrates `f` between `lower` and `upper`.
    ///
    /// The integrand is fallible: the first error it returns aborts the integration and is returned unchanged.
    pub fn integrate<E, F>(&self, mut f: F, lower: f64, upper: f64) -> Result<f64, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
    {
        let step = (upper - lower) / self.segments as f64;
        let mut total = 0.0;
        for segment in 0..self.segments {
            let seg_start = lower + segment as f64 * step;
            let mid = seg_start + 0.5 * step;
            let half = 0.5 * step;
            let mut partial = 0.0;
            for (x, w) in self.nodes.iter().zip(&self.weights) {
                partial += w * f(mid + half * x)?;
            }
            total += partial * half;
        }
        Ok(total)
    }
}

/// Returns the Legendre polynomial of degree n and its derivative at x, from Bonnet's recursion.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.0;
    let mut p = x;
    for k in 2..=n {
        let kf = k as f64;
        let p_next = ((2.0 * kf - 1.0) * x * p - (kf - 1.0) * p_prev) / kf;
        p_prev = p;
        p = p_next;
    }
    if n == 0 {
        return (1.0, 0.0);
    }
    let p_deriv = n as f64 * (x * p - p_prev) / (x * x - 1.0);
    (p, p_deriv)
}
