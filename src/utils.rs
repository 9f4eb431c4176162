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

use crate::linalg::{Matrix3, Vector3, Vector6};
use approx::{abs_diff_eq, relative_eq};
use std::f64::consts::TAU;

/// Returns the provided angle bounded between 0.0 and 360.0
pub fn between_0_360(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Returns the provided angle bounded between 0.0 and 2π
pub fn between_0_tau(angle_rad: f64) -> f64 {
    angle_rad.rem_euclid(TAU)
}

/// Rotation matrix about the Y axis (positive angle rotates the frame, not the vector)
pub fn r2(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Rotation matrix about the Z axis (positive angle rotates the frame, not the vector)
pub fn r3(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Returns the local radial, azimuthal and elevation unit vectors at the provided azimuth and elevation, as the columns of a DCM.
///
/// The DCM rotates a vector expressed in the local spherical frame into the Cartesian frame.
pub fn spherical_dcm(azimuth_rad: f64, elevation_rad: f64) -> Matrix3<f64> {
    let (s_az, c_az) = azimuth_rad.sin_cos();
    let (s_el, c_el) = elevation_rad.sin_cos();
    let e_r = Vector3::new(c_el * c_az, c_el * s_az, s_el);
    let e_az = Vector3::new(-s_az, c_az, 0.0);
    let e_el = Vector3::new(-s_el * c_az, -s_el * s_az, c_el);
    Matrix3::from_columns(&[e_r, e_az, e_el])
}

/// Converts a Cartesian state (position then velocity) into a spherical state.
///
/// The spherical state is `[r, azimuth, elevation, v_r, v_azimuth, v_elevation]`, where the velocity
/// components are the projections of the velocity onto the local radial, azimuthal, and elevation
/// unit vectors. The azimuth is returned in [-π, π] and the elevation in [-π/2, π/2].
/// The origin maps to a null state.
pub fn cartesian_to_spherical(state: &Vector6<f64>) -> Vector6<f64> {
    let position = state.fixed_rows::<3>(0).into_owned();
    let velocity = state.fixed_rows::<3>(3).into_owned();
    let r = position.norm();
    if r == 0.0 {
        return Vector6::zeros();
    }
    let azimuth = position.y.atan2(position.x);
    let elevation = (position.z / r).asin();
    let local_velocity = spherical_dcm(azimuth, elevation).transpose() * velocity;
    Vector6::new(
        r,
        azimuth,
        elevation,
        local_velocity[0],
        local_velocity[1],
        local_velocity[2],
    )
}

/// Converts a spherical state `[r, azimuth, elevation, v_r, v_azimuth, v_elevation]` back into a Cartesian state.
pub fn spherical_to_cartesian(state: &Vector6<f64>) -> Vector6<f64> {
    let dcm = spherical_dcm(state[1], state[2]);
    let position = dcm.column(0) * state[0];
    let velocity = dcm * state.fixed_rows::<3>(3);
    Vector6::new(
        position[0],
        position[1],
        position[2],
        velocity[0],
        velocity[1],
        velocity[2],
    )
}

/// Rotates a vector expressed in the local spherical frame (radial, azimuthal, elevation) into the Cartesian frame.
pub fn spherical_to_cartesian_vector(
    local: &Vector3<f64>,
    azimuth_rad: f64,
    elevation_rad: f64,
) -> Vector3<f64> {
    spherical_dcm(azimuth_rad, elevation_rad) * local
}

/// Returns the root sum squared (RSS) position and velocity errors between two Cartesian states
pub fn rss_state_errors(prop: &Vector6<f64>, expect: &Vector6<f64>) -> (f64, f64) {
    let delta = prop - expect;
    (
        delta.fixed_rows::<3>(0).norm(),
        delta.fixed_rows::<3>(3).norm(),
    )
}

/// Panics if the two Cartesian states differ by more than `epsilon` on any component.
pub fn assert_state_eq_or_abs(left: &Vector6<f64>, right: &Vector6<f64>, epsilon: f64, msg: &str) {
    if !(left == right) && !abs_diff_eq!(left, right, epsilon = epsilon) {
        panic!(
            r#"assertion failed: `(left == right)`
  left: `{}`,
 right: `{}`: {}"#,
            left.transpose(),
            right.transpose(),
            msg
        )
    }
}

/// Panics if the two Cartesian states differ by more than `epsilon` relative to their magnitude.
pub fn assert_state_eq_or_rel(left: &Vector6<f64>, right: &Vector6<f64>, epsilon: f64, msg: &str) {
    if !(left == right) && !relative_eq!(left, right, max_relative = epsilon) {
        panic!(
            r#"assertion failed: `(left == right)`
  left: `{}`,
 right: `{}`: {}"#,
            left.transpose(),
            right.transpose(),
            msg
        )
    }
}
