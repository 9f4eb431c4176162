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

use crate::linalg::{Vector3, Vector6};
use crate::time::Unit;
use snafu::prelude::*;
use std::fmt;

/// Thrust profiles, including the thrust of shaped transfers.
pub mod guidance;
pub use self::guidance::{Coast, GuidanceError, ShapedThrust, ThrustProfile};

/// A trait for models with equations of motion that can be integrated.
///
/// The state is a Cartesian position and velocity in km and km/s, and the time is the number of
/// seconds elapsed since the start of the transfer.
pub trait Dynamics: Send + Sync {
    fn eom(&self, elapsed_s: f64, state: &Vector6<f64>) -> Result<Vector6<f64>, DynamicsError>;
}

/// Dynamical model errors.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DynamicsError {
    /// Guidance error.
    #[snafu(display("dynamical model encountered an issue with the guidance: {source}"))]
    DynamicsGuidance { source: GuidanceError },
    #[snafu(display("state {state} is at the center of the central body"))]
    Singularity { state: Vector6<f64> },
}

/// Two body dynamics of a spacecraft subject to a thrust profile
#[derive(Clone, Debug)]
pub struct ThrustedTwoBody<T: ThrustProfile> {
    pub gm_km3_s2: f64,
    pub thrust: T,
}

impl<T: ThrustProfile> ThrustedTwoBody<T> {
    pub fn new(gm_km3_s2: f64, thrust: T) -> Self {
        Self { gm_km3_s2, thrust }
    }
}

impl<T: ThrustProfile> Dynamics for ThrustedTwoBody<T> {
    fn eom(&self, elapsed_s: f64, state: &Vector6<f64>) -> Result<Vector6<f64>, DynamicsError> {
        let radius = state.fixed_rows::<3>(0).into_owned();
        let velocity = state.fixed_rows::<3>(3).into_owned();
        let rmag = radius.norm();
        ensure!(rmag > 0.0, SingularitySnafu { state: *state });

        let thrust = self
            .thrust
            .acceleration(elapsed_s * Unit::Second)
            .context(DynamicsGuidanceSnafu)?;
        let accel: Vector3<f64> = -self.gm_km3_s2 / rmag.powi(3) * radius + thrust;

        Ok(Vector6::new(
            velocity[0],
            velocity[1],
            velocity[2],
            accel[0],
            accel[1],
            accel[2],
        ))
    }
}

impl<T: ThrustProfile> fmt::Display for ThrustedTwoBody<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "two body (GM = {} km^3/s^2) with {}",
            self.gm_km3_s2, self.thrust
        )
    }
}
