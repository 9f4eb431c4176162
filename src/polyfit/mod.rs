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

use snafu::prelude::*;

pub mod hermite;
pub use hermite::{hermite_divided_differences, HermiteSeries};

pub mod quadrature;
pub use quadrature::{GaussLegendre, QuadratureSettings};

#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InterpolationError {
    #[snafu(display("interpolation requires at least {min} samples, got {got}"))]
    TooFewSamples { min: usize, got: usize },
    #[snafu(display("{what} has {got} entries but {expected} were expected"))]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[snafu(display("abscissa must be strictly increasing, sample #{index} is not"))]
    NotMonotonic { index: usize },
    #[snafu(display("{x} is outside of the interpolation domain [{start}, {end}]"))]
    OutOfDomain { x: f64, start: f64, end: f64 },
    #[snafu(display("invalid interpolation data: {msg}"))]
    InvalidData { msg: String },
}
