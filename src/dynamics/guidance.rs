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

use crate::errors::ShapingError;
use crate::linalg::Vector3;
use crate::md::shaping::ShapingProblem;
use crate::time::Duration;
use snafu::prelude::*;
use std::fmt;

/// The `ThrustProfile` trait provides the thrust acceleration as a function of the time elapsed
/// since the start of the transfer. This is the interface between a trajectory design and the
/// propagation of the thrusted motion.
pub trait ThrustProfile: fmt::Display + Send + Sync {
    /// Returns the magnitude of the thrust acceleration in km/s^2.
    fn magnitude(&self, elapsed: Duration) -> Result<f64, GuidanceError>;

    /// Returns a unit vector corresponding to the thrust direction in the inertial frame, or a
    /// zero vector when coasting.
    fn direction(&self, elapsed: Duration) -> Result<Vector3<f64>, GuidanceError>;

    /// Returns the thrust acceleration vector in km/s^2.
    fn acceleration(&self, elapsed: Duration) -> Result<Vector3<f64>, GuidanceError> {
        Ok(self.direction(elapsed)? * self.magnitude(elapsed)?)
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GuidanceError {
    #[snafu(display("shaped thrust unavailable after {elapsed}: {source}"))]
    ShapedTrajectory {
        elapsed: Duration,
        source: ShapingError,
    },
}

/// No thrust at any time
#[derive(Copy, Clone, Debug, Default)]
pub struct Coast;

impl ThrustProfile for Coast {
    fn magnitude(&self, _elapsed: Duration) -> Result<f64, GuidanceError> {
        Ok(0.0)
    }

    fn direction(&self, _elapsed: Duration) -> Result<Vector3<f64>, GuidanceError> {
        Ok(Vector3::zeros())
    }
}

impl fmt::Display for Coast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coast")
    }
}

/// The thrust of a shaped transfer, looked up through its time to azimuth map.
#[derive(Copy, Clone, Debug)]
pub struct ShapedThrust<'a> {
    problem: &'a ShapingProblem,
}

impl<'a> ShapedThrust<'a> {
    pub fn new(problem: &'a ShapingProblem) -> Self {
        Self { problem }
    }
}

impl ThrustProfile for ShapedThrust<'_> {
    fn magnitude(&self, elapsed: Duration) -> Result<f64, GuidanceError> {
        Ok(self.acceleration(elapsed)?.norm())
    }

    fn direction(&self, elapsed: Duration) -> Result<Vector3<f64>, GuidanceError> {
        let thrust = self.acceleration(elapsed)?;
        let mag = thrust.norm();
        if mag > 0.0 {
            Ok(thrust / mag)
        } else {
            Ok(Vector3::zeros())
        }
    }

    fn acceleration(&self, elapsed: Duration) -> Result<Vector3<f64>, GuidanceError> {
        self.problem
            .thrust_acceleration_at_time(elapsed)
            .context(ShapedTrajectorySnafu { elapsed })
    }
}

impl fmt::Display for ShapedThrust<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shaped thrust of {}", self.problem)
    }
}
