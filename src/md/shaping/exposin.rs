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

use crate::cosmic::Normalization;
use crate::errors::{
    AngleOutOfBoundsSnafu, InfeasibleSnafu, InvalidBoundaryStateSnafu, InvalidSettingsSnafu,
    NoExposinSolutionSnafu, ShapingError,
};
use crate::io::ConfigRepr;
use crate::linalg::{Vector3, Vector6};
use crate::opti::{brent, RootFinderSettings, RootSolution};
use crate::polyfit::{GaussLegendre, QuadratureSettings};
use crate::time::Duration;
use crate::utils::between_0_tau;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::f64::consts::TAU;
use std::fmt;
use typed_builder::TypedBuilder;

/// Settings of the exponential sinusoid shaping.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct ExposinSettings {
    /// Winding parameter k2 of the exponential sinusoid
    #[builder(default = 1.0 / 12.0)]
    #[serde(default = "default_winding")]
    pub winding: f64,
    #[builder(default)]
    #[serde(default)]
    pub quadrature: QuadratureSettings,
    #[builder(default)]
    #[serde(default)]
    pub root_finder: RootFinderSettings,
}

fn default_winding() -> f64 {
    1.0 / 12.0
}

impl Default for ExposinSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ConfigRepr for ExposinSettings {}

/// The exponential sinusoid r(θ) = k0 exp(k1 sin(k2 θ + φ)), with θ measured from the initial position.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Exposin {
    k0: f64,
    k1: f64,
    k2: f64,
    phase: f64,
}

impl Exposin {
    /// Builds the exposin which leaves r1 with the flight path angle γ1 and reaches r2 after ψ.
    fn from_flight_path_angle(r1: f64, r2: f64, k2: f64, psi: f64, gamma1: f64) -> Self {
        let log_ratio = (r1 / r2).ln();
        let tan_gamma = gamma1.tan();
        let wound = k2 * psi;
        let num = log_ratio + tan_gamma / k2 * wound.sin();
        let k1 = ((num / (1.0 - wound.cos())).powi(2) + (tan_gamma / k2).powi(2))
            .sqrt()
            .copysign(num);

        let phase = if k1 == 0.0 {
            // Circular: the phase is irrelevant
            0.5 * std::f64::consts::PI
        } else {
            let cos_phase = tan_gamma / (k1 * k2);
            if cos_phase.abs() > 1.0 {
                warn!("clamping cos(phase) = {cos_phase} of exposin with k2 = {k2}");
            }
            cos_phase.clamp(-1.0, 1.0).acos()
        };

        let k0 = r1 / (k1 * phase.sin()).exp();

        Self { k0, k1, k2, phase }
    }

    fn radius(&self, theta: f64) -> f64 {
        self.k0 * (self.k1 * (self.k2 * theta + self.phase).sin()).exp()
    }

    fn tan_flight_path_angle(&self, theta: f64) -> f64 {
        self.k1 * self.k2 * (self.k2 * theta + self.phase).cos()
    }

    /// tan² γ + k1 k2² sin(k2 θ + φ) + 1, which must be positive for the shape to be flown
    fn radicand(&self, theta: f64) -> f64 {
        let tan_gamma = self.tan_flight_path_angle(theta);
        tan_gamma * tan_gamma + self.k1 * self.k2.powi(2) * (self.k2 * theta + self.phase).sin() + 1.0
    }

    fn checked_radicand(&self, theta: f64) -> Result<f64, ShapingError> {
        let radicand = self.radicand(theta);
        ensure!(
            radicand > 0.0,
            InfeasibleSnafu {
                azimuth_rad: theta,
                radicand
            }
        );
        Ok(radicand)
    }

    /// dt/dθ
    fn time_derivative(&self, theta: f64, gm: f64) -> Result<f64, ShapingError> {
        let radicand = self.checked_radicand(theta)?;
        Ok((self.radius(theta).powi(3) * radicand / gm).sqrt())
    }

    /// dθ/dt
    fn azimuth_rate(&self, theta: f64, gm: f64) -> Result<f64, ShapingError> {
        let radicand = self.checked_radicand(theta)?;
        Ok((gm / (self.radius(theta).powi(3) * radicand)).sqrt())
    }

    /// Signed tangential thrust acceleration, positive along the velocity
    fn tangential_thrust(&self, theta: f64, gm: f64) -> Result<f64, ShapingError> {
        let radicand = self.checked_radicand(theta)?;
        let tan_gamma = self.tan_flight_path_angle(theta);
        let cos_gamma = tan_gamma.atan().cos();
        let s = (self.k2 * theta + self.phase).sin();
        let r = self.radius(theta);
        Ok(tan_gamma / (2.0 * cos_gamma)
            * (1.0 / radicand - self.k2.powi(2) * (1.0 - 2.0 * self.k1 * s) / radicand.powi(2))
            * gm
            / (r * r))
    }
}

/// A planar low-thrust transfer shaped as an exponential sinusoid.
///
/// The transfer lies in the plane of the initial position and angular momentum. Only the radii of
/// the boundary states are matched, so the velocities at both ends follow from the shape. The
/// initial flight path angle is solved for such that the time of flight matches the required one.
#[derive(Clone, Debug)]
pub struct ExposinShaping {
    shape: Exposin,
    norm: Normalization,
    gm: f64,
    transfer_angle: f64,
    gamma_bounds: (f64, f64),
    gamma1: f64,
    achieved_tof: f64,
    root: RootSolution,
    quadrature: GaussLegendre,
    /// In-plane unit vectors: toward the initial position, and 90 degrees ahead in the direction of motion
    e1: Vector3<f64>,
    e2: Vector3<f64>,
}

impl ExposinShaping {
    pub fn new(
        initial_km_s: Vector6<f64>,
        final_km_s: Vector6<f64>,
        time_of_flight: Duration,
        revolutions: u32,
        gm_km3_s2: f64,
        settings: ExposinSettings,
    ) -> Result<Self, ShapingError> {
        ensure!(
            settings.winding.is_finite() && settings.winding > 0.0,
            InvalidSettingsSnafu {
                msg: format!("winding parameter must be positive, got {}", settings.winding)
            }
        );
        ensure!(
            time_of_flight > Duration::ZERO,
            InvalidSettingsSnafu {
                msg: format!("time of flight must be positive, got {time_of_flight}")
            }
        );
        ensure!(
            gm_km3_s2.is_finite() && gm_km3_s2 > 0.0,
            InvalidSettingsSnafu {
                msg: format!("gravitational parameter must be positive, got {gm_km3_s2}")
            }
        );

        let norm = Normalization::heliocentric();
        let gm = norm.gm(gm_km3_s2);
        let x1 = norm.state(&initial_km_s);
        let x2 = norm.state(&final_km_s);
        let pos1 = x1.fixed_rows::<3>(0).into_owned();
        let pos2 = x2.fixed_rows::<3>(0).into_owned();
        let hvec = pos1.cross(&x1.fixed_rows::<3>(3).into_owned());

        let (r1, r2) = (pos1.norm(), pos2.norm());
        ensure!(
            r1 > 0.0 && r2 > 0.0 && r1.is_finite() && r2.is_finite(),
            InvalidBoundaryStateSnafu {
                msg: "exposin requires both positions away from the origin"
            }
        );
        ensure!(
            hvec.norm() > 0.0,
            InvalidBoundaryStateSnafu {
                msg: "initial state has no angular momentum"
            }
        );

        let e1 = pos1 / r1;
        let e3 = hvec.normalize();
        let e2 = e3.cross(&e1);

        let u2 = pos2 / r2;
        let raw_angle = between_0_tau(e1.cross(&u2).dot(&e3).atan2(e1.dot(&u2)));
        let mut transfer_angle = raw_angle + TAU * f64::from(revolutions);
        if raw_angle <= 0.0 {
            transfer_angle += TAU;
        }

        let k2 = settings.winding;
        let gamma_bounds = flight_path_angle_bounds(r1, r2, k2, transfer_angle)?;
        let quadrature =
            GaussLegendre::new(settings.quadrature).map_err(|e| ShapingError::InvalidSettings {
                msg: e.to_string(),
            })?;

        let required_tof = norm.duration(time_of_flight);
        let tof_of = |gamma1: f64| -> Result<f64, ShapingError> {
            let shape = Exposin::from_flight_path_angle(r1, r2, k2, transfer_angle, gamma1);
            quadrature.integrate(
                |theta| shape.time_derivative(theta, gm),
                0.0,
                transfer_angle,
            )
        };

        let root = brent(
            |gamma1| {
                let tof = tof_of(gamma1)?;
                debug!("exposin γ1 = {gamma1} -> TOF error {:e}", required_tof - tof);
                Ok::<f64, ShapingError>(required_tof - tof)
            },
            gamma_bounds.0,
            gamma_bounds.1,
            &settings.root_finder,
        )?;
        let gamma1 = root.root;
        let achieved_tof = tof_of(gamma1)?;

        info!(
            "exposin converged on initial flight path angle {:.6} deg ({} iterations) over {:.3} deg",
            gamma1.to_degrees(),
            root.iterations,
            transfer_angle.to_degrees()
        );

        Ok(Self {
            shape: Exposin::from_flight_path_angle(r1, r2, k2, transfer_angle, gamma1),
            norm,
            gm,
            transfer_angle,
            gamma_bounds,
            gamma1,
            achieved_tof,
            root,
            quadrature,
            e1,
            e2,
        })
    }

    /// Admissible range of the initial flight path angle, in radians
    pub fn flight_path_angle_bounds(&self) -> (f64, f64) {
        self.gamma_bounds
    }

    pub fn initial_flight_path_angle(&self) -> f64 {
        self.gamma1
    }

    pub fn k0(&self) -> f64 {
        self.shape.k0
    }

    pub fn k1(&self) -> f64 {
        self.shape.k1
    }

    pub fn k2(&self) -> f64 {
        self.shape.k2
    }

    pub fn phase(&self) -> f64 {
        self.shape.phase
    }

    /// Angle swept by the transfer, including the complete revolutions
    pub fn transfer_angle(&self) -> f64 {
        self.transfer_angle
    }

    pub fn root_solution(&self) -> &RootSolution {
        &self.root
    }

    pub fn time_of_flight(&self) -> Duration {
        self.norm.to_duration(self.achieved_tof)
    }

    /// Radius, in km, at the provided angle from the initial position.
    pub fn radius_at(&self, theta_rad: f64) -> Result<f64, ShapingError> {
        let theta = self.checked_angle(theta_rad)?;
        Ok(self.shape.radius(theta) * self.norm.distance_km)
    }

    /// Cartesian state, in km and km/s, at the provided angle from the initial position.
    pub fn state_at(&self, theta_rad: f64) -> Result<Vector6<f64>, ShapingError> {
        let theta = self.checked_angle(theta_rad)?;
        let r = self.shape.radius(theta);
        let rate = self.shape.azimuth_rate(theta, self.gm)?;
        let (radial, transverse) = self.local_axes(theta);

        let position = radial * r;
        let velocity =
            (radial * self.shape.tan_flight_path_angle(theta) + transverse) * (r * rate);

        let mut state = Vector6::zeros();
        state.fixed_rows_mut::<3>(0).copy_from(&position);
        state.fixed_rows_mut::<3>(3).copy_from(&velocity);
        Ok(self.norm.state_km_s(&state))
    }

    /// Cartesian thrust acceleration, in km/s^2, at the provided angle from the initial position.
    ///
    /// The thrust is tangential: it is aligned with the velocity.
    pub fn thrust_acceleration_at(&self, theta_rad: f64) -> Result<Vector3<f64>, ShapingError> {
        let theta = self.checked_angle(theta_rad)?;
        let thrust = self.shape.tangential_thrust(theta, self.gm)?;
        let (radial, transverse) = self.local_axes(theta);
        let direction = (radial * self.shape.tan_flight_path_angle(theta) + transverse).normalize();
        Ok(self.norm.acceleration_to_km_s2(&(direction * thrust)))
    }

    /// Total velocity increment provided by the thrusters, in km/s.
    pub fn delta_v_km_s(&self) -> Result<f64, ShapingError> {
        let dv = self.quadrature.integrate(
            |theta| {
                Ok::<f64, ShapingError>(
                    self.shape.tangential_thrust(theta, self.gm)?.abs()
                        * self.shape.time_derivative(theta, self.gm)?,
                )
            },
            0.0,
            self.transfer_angle,
        )?;
        Ok(dv * self.norm.velocity_km_s())
    }

    fn local_axes(&self, theta: f64) -> (Vector3<f64>, Vector3<f64>) {
        let (s, c) = theta.sin_cos();
        (self.e1 * c + self.e2 * s, self.e2 * c - self.e1 * s)
    }

    fn checked_angle(&self, theta_rad: f64) -> Result<f64, ShapingError> {
        let slack = 1e-12 * self.transfer_angle;
        ensure!(
            theta_rad >= -slack && theta_rad <= self.transfer_angle + slack,
            AngleOutOfBoundsSnafu {
                azimuth_rad: theta_rad,
                initial_rad: 0.0,
                final_rad: self.transfer_angle
            }
        );
        Ok(theta_rad.clamp(0.0, self.transfer_angle))
    }
}

impl fmt::Display for ExposinShaping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exposin k0 = {}, k1 = {}, k2 = {}, phase = {} over {:.3} deg in {}",
            self.shape.k0,
            self.shape.k1,
            self.shape.k2,
            self.shape.phase,
            self.transfer_angle.to_degrees(),
            self.time_of_flight()
        )
    }
}

/// Returns the range of initial flight path angles for which an exposin of winding parameter k2
/// links the radii r1 and r2 over the transfer angle ψ.
pub fn flight_path_angle_bounds(
    r1: f64,
    r2: f64,
    k2: f64,
    transfer_angle: f64,
) -> Result<(f64, f64), ShapingError> {
    let log_ratio = (r1 / r2).ln();
    let wound = k2 * transfer_angle;
    let discriminant = 2.0 * (1.0 - wound.cos()) / k2.powi(4) - log_ratio * log_ratio;
    ensure!(
        discriminant > 0.0,
        NoExposinSolutionSnafu {
            winding: k2,
            transfer_angle_rad: transfer_angle,
            discriminant
        }
    );
    let center = -log_ratio / (0.5 * wound).tan();
    let half_width = discriminant.sqrt();
    Ok((
        (0.5 * k2 * (center - half_width)).atan(),
        (0.5 * k2 * (center + half_width)).atan(),
    ))
}

#[cfg(test)]
mod ut_exposin {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn bounds() {
        let (lo, hi) = flight_path_angle_bounds(1.0, 1.5, 0.5, PI).unwrap();
        assert!((lo + 0.918_509_235_103_881).abs() < 1e-12);
        assert!((hi - 0.986_448_135_728_126).abs() < 1e-12);

        match flight_path_angle_bounds(1.0, 1.5, 2.0, PI).unwrap_err() {
            ShapingError::NoExposinSolution { discriminant, .. } => assert!(discriminant < 0.0),
            e => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn shape_links_both_radii() {
        let (lo, hi) = flight_path_angle_bounds(1.0, 1.5, 0.5, PI).unwrap();
        for frac in [0.05, 0.3, 0.5, 0.8, 0.95] {
            let gamma1 = lo + frac * (hi - lo);
            let shape = Exposin::from_flight_path_angle(1.0, 1.5, 0.5, PI, gamma1);
            assert!((shape.radius(0.0) - 1.0).abs() < 1e-12);
            assert!((shape.radius(PI) - 1.5).abs() < 1e-12);
            assert!((shape.tan_flight_path_angle(0.0) - gamma1.tan()).abs() < 1e-12);
        }
    }

    #[test]
    fn circular_exposin_needs_no_thrust() {
        let shape = Exposin::from_flight_path_angle(1.0, 1.0, 0.5, PI, 0.0);
        assert_eq!(shape.k1, 0.0);
        let gm = 39.476_926_421_373;
        assert!(shape.tangential_thrust(1.0, gm).unwrap().abs() < 1e-15);
        assert!((shape.azimuth_rate(1.0, gm).unwrap() - gm.sqrt()).abs() < 1e-12);
    }
}
