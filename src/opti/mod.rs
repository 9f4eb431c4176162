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

use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;
use typed_builder::TypedBuilder;

mod brent;
pub use brent::{brent, secant};

/// Scalar root finding algorithms.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootFinderMethod {
    /// Brent's method on the bracket, robust as long as the bracket holds a sign change
    #[default]
    Brent,
    /// Secant method from the initial guess, bounded by the bracket
    Secant,
}

/// Convergence settings of the root finders.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct RootFinderSettings {
    #[builder(default)]
    #[serde(default)]
    pub method: RootFinderMethod,
    /// Convergence is declared when the bracket (or the secant step) is smaller than this
    #[builder(default = 1e-12)]
    #[serde(default = "default_tolerance")]
    pub x_tolerance: f64,
    /// Convergence is declared when the absolute residual is smaller than this
    #[builder(default = 1e-12)]
    #[serde(default = "default_tolerance")]
    pub residual_tolerance: f64,
    #[builder(default = 100)]
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_tolerance() -> f64 {
    1e-12
}

fn default_max_iterations() -> usize {
    100
}

impl Default for RootFinderSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Display for RootFinderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} root finder (x tol: {:e}, residual tol: {:e}, max iter: {})",
            self.method, self.x_tolerance, self.residual_tolerance, self.max_iterations
        )
    }
}

/// A converged root
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RootSolution {
    pub root: f64,
    pub residual: f64,
    /// Number of iterations after the evaluation of the initial points
    pub iterations: usize,
}

impl fmt::Display for RootSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "root = {} (residual = {:e}) in {} iterations",
            self.root, self.residual, self.iterations
        )
    }
}

#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RootFinderError {
    #[snafu(display(
        "no sign change in [{lower}, {upper}]: f(lower) = {f_lower:e}, f(upper) = {f_upper:e}"
    ))]
    NotBracketed {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },
    #[snafu(display(
        "maximum iterations ({iterations}) reached: last estimate {estimate} has residual {residual:e}"
    ))]
    MaxIterReached {
        iterations: usize,
        estimate: f64,
        residual: f64,
    },
    #[snafu(display("function is flat around {estimate}, secant step undefined"))]
    FlatFunction { estimate: f64 },
    #[snafu(display("invalid bracket [{lower}, {upper}]"))]
    InvalidBracket { lower: f64, upper: f64 },
}
