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

use crate::opti::RootFinderError;
use crate::polyfit::InterpolationError;
use snafu::prelude::*;

/// Errors of the shaping methods.
///
/// Configuration errors (singular boundary matrix, wrong coefficient count, invalid boundary states
/// or settings) are never retried. An infeasible shape is reported separately from a failure of the
/// root finder so that callers can tell "this shape cannot be flown" from "no time of flight match".
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ShapingError {
    #[snafu(display(
        "boundary condition matrix is singular (rcond = {rcond:e}) between azimuths {initial_azimuth_rad} and {final_azimuth_rad} rad"
    ))]
    SingularBoundaryMatrix {
        initial_azimuth_rad: f64,
        final_azimuth_rad: f64,
        rcond: f64,
    },
    #[snafu(display("shape function expects {expected} coefficients but {provided} were provided"))]
    CoefficientCount { expected: usize, provided: usize },
    #[snafu(display("invalid boundary state: {msg}"))]
    InvalidBoundaryState { msg: String },
    #[snafu(display("invalid shaping settings: {msg}"))]
    InvalidSettings { msg: String },
    #[snafu(display(
        "shape is infeasible at azimuth {azimuth_rad} rad: radicand of the time equation is {radicand:e}"
    ))]
    Infeasible { azimuth_rad: f64, radicand: f64 },
    #[snafu(display("time of flight could not be matched: {source}"))]
    RootFinding { source: RootFinderError },
    #[snafu(display(
        "no exposin reaches the final radius with winding parameter {winding} over {transfer_angle_rad} rad (discriminant = {discriminant:e})"
    ))]
    NoExposinSolution {
        winding: f64,
        transfer_angle_rad: f64,
        discriminant: f64,
    },
    #[snafu(display("elapsed time {elapsed_s} s is outside of the transfer [0, {tof_s}] s"))]
    TimeOutOfBounds { elapsed_s: f64, tof_s: f64 },
    #[snafu(display("azimuth {azimuth_rad} rad is outside of the transfer [{initial_rad}, {final_rad}] rad"))]
    AngleOutOfBounds {
        azimuth_rad: f64,
        initial_rad: f64,
        final_rad: f64,
    },
    #[snafu(display("time to azimuth table failed: {source}"))]
    TimeMap { source: InterpolationError },
}

impl ShapingError {
    /// Returns true if this error is a configuration error, i.e. one which no other free coefficient could fix.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::SingularBoundaryMatrix { .. }
                | Self::CoefficientCount { .. }
                | Self::InvalidBoundaryState { .. }
                | Self::InvalidSettings { .. }
                | Self::NoExposinSolution { .. }
        )
    }

    /// Returns true if the shape curves away from the central body somewhere along the transfer.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible { .. })
    }
}

impl From<RootFinderError> for ShapingError {
    fn from(source: RootFinderError) -> Self {
        Self::RootFinding { source }
    }
}
