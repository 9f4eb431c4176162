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

use super::basis::ShapeFunction;
use crate::errors::{InfeasibleSnafu, ShapingError};
use crate::polyfit::GaussLegendre;
use snafu::ensure;

/// The radius and elevation shapes, with their first three derivatives, at one azimuth.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapeDerivatives {
    pub azimuth_rad: f64,
    /// r, r', r'', r'''
    pub radius: [f64; 4],
    /// φ, φ', φ'', φ'''
    pub elevation: [f64; 4],
}

impl ShapeDerivatives {
    pub fn evaluate<R, E>(radial: &R, elevation: &E, azimuth_rad: f64) -> Self
    where
        R: ShapeFunction + ?Sized,
        E: ShapeFunction + ?Sized,
    {
        Self {
            azimuth_rad,
            radius: radial.derivatives(azimuth_rad),
            elevation: elevation.derivatives(azimuth_rad),
        }
    }

    /// F1 = φ'² + cos² φ
    pub fn elevation_factor(&self) -> f64 {
        let [phi, dphi, ..] = self.elevation;
        dphi * dphi + phi.cos().powi(2)
    }

    /// Returns T(θ) such that (dt/dθ)² = T r² / μ.
    pub fn time_equation(&self) -> f64 {
        let [r, dr, ddr, _] = self.radius;
        let [phi, dphi, ddphi, _] = self.elevation;
        let f1 = self.elevation_factor();
        -ddr + 2.0 * dr * dr / r + dr * dphi * (ddphi - phi.sin() * phi.cos()) / f1 + r * f1
    }

    /// Derivative of the time equation with respect to the azimuth
    pub fn time_equation_derivative(&self) -> f64 {
        let [r, dr, ddr, dddr] = self.radius;
        let [phi, dphi, ddphi, dddphi] = self.elevation;
        let f1 = self.elevation_factor();
        let g = ddphi - phi.sin() * phi.cos();
        let dg = dddphi - (2.0 * phi).cos() * dphi;
        let df1 = 2.0 * dphi * g;

        -dddr + 4.0 * dr * ddr / r - 2.0 * dr.powi(3) / (r * r)
            + ((ddr * dphi * g + dr * ddphi * g + dr * dphi * dg) * f1 - dr * dphi * g * df1)
                / (f1 * f1)
            + dr * f1
            + r * df1
    }

    /// Returns the time equation after checking that the shape can be flown here.
    ///
    /// A negative (or NaN) radicand, or a radius which is not strictly positive and finite, is infeasible.
    pub fn feasible_time_equation(&self) -> Result<f64, ShapingError> {
        let r = self.radius[0];
        let t_eq = self.time_equation();
        ensure!(
            r.is_finite() && r > 0.0 && t_eq >= 0.0,
            InfeasibleSnafu {
                azimuth_rad: self.azimuth_rad,
                radicand: if r.is_finite() && r > 0.0 {
                    t_eq
                } else {
                    f64::NAN
                }
            }
        );
        Ok(t_eq)
    }

    /// dt/dθ, in normalized units
    pub fn time_derivative(&self, gm: f64) -> Result<f64, ShapingError> {
        let t_eq = self.feasible_time_equation()?;
        let r = self.radius[0];
        Ok((t_eq * r * r / gm).sqrt())
    }

    /// Returns the time equation where the azimuth rate is finite, i.e. where T is strictly positive.
    ///
    /// The shape may graze T = 0 (dt/dθ = 0 is integrable), but no velocity exists there.
    fn moving_time_equation(&self) -> Result<f64, ShapingError> {
        let t_eq = self.feasible_time_equation()?;
        ensure!(
            t_eq > 0.0,
            InfeasibleSnafu {
                azimuth_rad: self.azimuth_rad,
                radicand: t_eq
            }
        );
        Ok(t_eq)
    }

    /// dθ/dt, in normalized units
    pub fn azimuth_rate(&self, gm: f64) -> Result<f64, ShapingError> {
        let t_eq = self.moving_time_equation()?;
        let r = self.radius[0];
        Ok((gm / (t_eq * r * r)).sqrt())
    }

    /// d²θ/dt², in normalized units
    pub fn azimuth_acceleration(&self, gm: f64) -> Result<f64, ShapingError> {
        let t_eq = self.moving_time_equation()?;
        let rate = self.azimuth_rate(gm)?;
        let [r, dr, ..] = self.radius;
        Ok(-rate * rate * (self.time_equation_derivative() / (2.0 * t_eq) + dr / r))
    }
}

/// Integrates dt/dθ of the provided shapes between two azimuths.
pub fn time_of_flight<R, E>(
    radial: &R,
    elevation: &E,
    gm: f64,
    quadrature: &GaussLegendre,
    lower_rad: f64,
    upper_rad: f64,
) -> Result<f64, ShapingError>
where
    R: ShapeFunction + ?Sized,
    E: ShapeFunction + ?Sized,
{
    quadrature.integrate(
        |azimuth_rad| ShapeDerivatives::evaluate(radial, elevation, azimuth_rad).time_derivative(gm),
        lower_rad,
        upper_rad,
    )
}
