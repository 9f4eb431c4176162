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

use super::time::ShapeDerivatives;
use crate::errors::ShapingError;
use crate::linalg::{Vector3, Vector6};
use crate::utils::{spherical_to_cartesian, spherical_to_cartesian_vector};

/// Kinematics of the shaped trajectory at one azimuth, in normalized units.
///
/// Vectors are expressed in the local spherical frame (radial, azimuthal, elevation) unless the
/// accessor name says otherwise.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapedKinematics {
    /// `[r, θ, φ, v_r, v_θ, v_φ]`
    pub spherical_state: Vector6<f64>,
    /// Total acceleration along the shape
    pub acceleration: Vector3<f64>,
    /// Acceleration which the thrusters must provide on top of the central body's gravity
    pub thrust: Vector3<f64>,
    pub azimuth_rate: f64,
    pub azimuth_acceleration: f64,
}

impl ShapedKinematics {
    pub fn from_derivatives(deriv: &ShapeDerivatives, gm: f64) -> Result<Self, ShapingError> {
        let azimuth_rate = deriv.azimuth_rate(gm)?;
        let azimuth_acceleration = deriv.azimuth_acceleration(gm)?;

        let velocity_params = velocity_parameters(deriv);
        let velocity = velocity_params * azimuth_rate;
        let acceleration = acceleration_parameters(deriv) * azimuth_rate.powi(2)
            + velocity_params * azimuth_acceleration;

        let r = deriv.radius[0];
        let thrust = acceleration + Vector3::new(gm / (r * r), 0.0, 0.0);

        Ok(Self {
            spherical_state: Vector6::new(
                r,
                deriv.azimuth_rad,
                deriv.elevation[0],
                velocity[0],
                velocity[1],
                velocity[2],
            ),
            acceleration,
            thrust,
            azimuth_rate,
            azimuth_acceleration,
        })
    }

    pub fn cartesian_state(&self) -> Vector6<f64> {
        spherical_to_cartesian(&self.spherical_state)
    }

    pub fn cartesian_acceleration(&self) -> Vector3<f64> {
        self.to_cartesian(&self.acceleration)
    }

    pub fn cartesian_thrust(&self) -> Vector3<f64> {
        self.to_cartesian(&self.thrust)
    }

    fn to_cartesian(&self, local: &Vector3<f64>) -> Vector3<f64> {
        spherical_to_cartesian_vector(local, self.spherical_state[1], self.spherical_state[2])
    }
}

/// Velocity divided by the azimuth rate: `(r', r cos φ, r φ')`
pub fn velocity_parameters(deriv: &ShapeDerivatives) -> Vector3<f64> {
    let [r, dr, ..] = deriv.radius;
    let [phi, dphi, ..] = deriv.elevation;
    Vector3::new(dr, r * phi.cos(), r * dphi)
}

/// Acceleration terms proportional to the square of the azimuth rate
pub fn acceleration_parameters(deriv: &ShapeDerivatives) -> Vector3<f64> {
    let [r, dr, ddr, _] = deriv.radius;
    let [phi, dphi, ddphi, _] = deriv.elevation;
    let (s, c) = phi.sin_cos();
    Vector3::new(
        ddr - r * deriv.elevation_factor(),
        2.0 * dr * c - 2.0 * r * dphi * s,
        2.0 * dr * dphi + r * (ddphi + s * c),
    )
}
