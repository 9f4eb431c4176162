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

use crate::errors::{CoefficientCountSnafu, ShapingError};
use snafu::ensure;
use std::fmt;

/// A closed-form basis function of the azimuth, with its first three derivatives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentFunction {
    /// 1
    Constant,
    /// θ
    Linear,
    /// θ²
    Squared,
    /// cos θ
    Cosine,
    /// θ cos θ
    ScaledCosine,
    /// sin θ
    Sine,
    /// θ sin θ
    ScaledSine,
}

impl ComponentFunction {
    /// Returns the value and the first, second, and third derivatives at the provided azimuth.
    pub fn derivatives(&self, azimuth_rad: f64) -> [f64; 4] {
        let th = azimuth_rad;
        match self {
            Self::Constant => [1.0, 0.0, 0.0, 0.0],
            Self::Linear => [th, 1.0, 0.0, 0.0],
            Self::Squared => [th * th, 2.0 * th, 2.0, 0.0],
            Self::Cosine => {
                let (s, c) = th.sin_cos();
                [c, -s, -c, s]
            }
            Self::ScaledCosine => {
                let (s, c) = th.sin_cos();
                [
                    th * c,
                    c - th * s,
                    -2.0 * s - th * c,
                    -3.0 * c + th * s,
                ]
            }
            Self::Sine => {
                let (s, c) = th.sin_cos();
                [s, c, -s, -c]
            }
            Self::ScaledSine => {
                let (s, c) = th.sin_cos();
                [
                    th * s,
                    s + th * c,
                    2.0 * c - th * s,
                    -3.0 * s - th * c,
                ]
            }
        }
    }

    pub fn evaluate(&self, azimuth_rad: f64) -> f64 {
        self.derivatives(azimuth_rad)[0]
    }
}

impl fmt::Display for ComponentFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Constant => "1",
            Self::Linear => "θ",
            Self::Squared => "θ²",
            Self::Cosine => "cos θ",
            Self::ScaledCosine => "θ cos θ",
            Self::Sine => "sin θ",
            Self::ScaledSine => "θ sin θ",
        };
        write!(f, "{repr}")
    }
}

/// Basis of the inverse of the radial distance: u(θ) = 1/r(θ).
pub const INVERSE_RADIUS_BASIS: [ComponentFunction; 7] = [
    ComponentFunction::Constant,
    ComponentFunction::Linear,
    ComponentFunction::Squared,
    ComponentFunction::Cosine,
    ComponentFunction::ScaledCosine,
    ComponentFunction::Sine,
    ComponentFunction::ScaledSine,
];

/// Index in [INVERSE_RADIUS_BASIS] of the coefficient left free by the boundary conditions.
pub const FREE_COEFFICIENT_INDEX: usize = 2;

/// Basis of the elevation angle φ(θ).
pub const ELEVATION_BASIS: [ComponentFunction; 4] = [
    ComponentFunction::Cosine,
    ComponentFunction::ScaledCosine,
    ComponentFunction::Sine,
    ComponentFunction::ScaledSine,
];

/// A shape of the trajectory as a function of the azimuth, with its first three derivatives.
pub trait ShapeFunction {
    fn evaluate(&self, azimuth_rad: f64) -> f64;
    fn first_derivative(&self, azimuth_rad: f64) -> f64;
    fn second_derivative(&self, azimuth_rad: f64) -> f64;
    fn third_derivative(&self, azimuth_rad: f64) -> f64;

    /// Returns the value and the three derivatives in one call.
    fn derivatives(&self, azimuth_rad: f64) -> [f64; 4] {
        [
            self.evaluate(azimuth_rad),
            self.first_derivative(azimuth_rad),
            self.second_derivative(azimuth_rad),
            self.third_derivative(azimuth_rad),
        ]
    }
}

/// A linear combination of component functions.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeShapeFunction {
    components: Vec<ComponentFunction>,
    coefficients: Vec<f64>,
}

impl CompositeShapeFunction {
    /// Initializes a new composite function, failing if there isn't exactly one coefficient per component.
    pub fn new(
        components: Vec<ComponentFunction>,
        coefficients: Vec<f64>,
    ) -> Result<Self, ShapingError> {
        let mut me = Self::zeros(components);
        me.reset_coefficients(coefficients)?;
        Ok(me)
    }

    /// Initializes a composite function whose coefficients are all zero.
    pub fn zeros(components: Vec<ComponentFunction>) -> Self {
        let coefficients = vec![0.0; components.len()];
        Self {
            components,
            coefficients,
        }
    }

    /// Replaces the coefficients. Neither truncates nor pads: a length mismatch is a configuration error.
    pub fn reset_coefficients(&mut self, coefficients: Vec<f64>) -> Result<(), ShapingError> {
        ensure!(
            coefficients.len() == self.components.len(),
            CoefficientCountSnafu {
                expected: self.components.len(),
                provided: coefficients.len()
            }
        );
        self.coefficients = coefficients;
        Ok(())
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn components(&self) -> &[ComponentFunction] {
        &self.components
    }

    fn weighted(&self, azimuth_rad: f64) -> [f64; 4] {
        let mut rslt = [0.0; 4];
        for (component, coeff) in self.components.iter().zip(&self.coefficients) {
            for (acc, val) in rslt.iter_mut().zip(component.derivatives(azimuth_rad)) {
                *acc += coeff * val;
            }
        }
        rslt
    }
}

impl ShapeFunction for CompositeShapeFunction {
    fn evaluate(&self, azimuth_rad: f64) -> f64 {
        self.weighted(azimuth_rad)[0]
    }

    fn first_derivative(&self, azimuth_rad: f64) -> f64 {
        self.weighted(azimuth_rad)[1]
    }

    fn second_derivative(&self, azimuth_rad: f64) -> f64 {
        self.weighted(azimuth_rad)[2]
    }

    fn third_derivative(&self, azimuth_rad: f64) -> f64 {
        self.weighted(azimuth_rad)[3]
    }

    fn derivatives(&self, azimuth_rad: f64) -> [f64; 4] {
        self.weighted(azimuth_rad)
    }
}

impl fmt::Display for CompositeShapeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .components
            .iter()
            .zip(&self.coefficients)
            .map(|(comp, coeff)| format!("{coeff:+e} {comp}"))
            .collect();
        write!(f, "{}", terms.join(" "))
    }
}

/// The radial distance, shaped through its inverse u(θ) = 1/r(θ).
///
/// The derivatives of the radius follow from the chain rule:
/// r' = -u'/u², r'' = -u''/u² + 2u'²/u³, r''' = -u'''/u² + 6u'u''/u³ - 6u'³/u⁴.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialDistanceFunction {
    inverse: CompositeShapeFunction,
}

impl RadialDistanceFunction {
    /// Builds the radial distance from the coefficients of its inverse on [INVERSE_RADIUS_BASIS].
    pub fn new(coefficients: Vec<f64>) -> Result<Self, ShapingError> {
        Ok(Self {
            inverse: CompositeShapeFunction::new(INVERSE_RADIUS_BASIS.to_vec(), coefficients)?,
        })
    }

    pub fn reset_coefficients(&mut self, coefficients: Vec<f64>) -> Result<(), ShapingError> {
        self.inverse.reset_coefficients(coefficients)
    }

    pub fn coefficients(&self) -> &[f64] {
        self.inverse.coefficients()
    }

    /// Returns the coefficient left free by the boundary conditions.
    pub fn free_coefficient(&self) -> f64 {
        self.inverse.coefficients()[FREE_COEFFICIENT_INDEX]
    }

    pub fn inverse(&self) -> &CompositeShapeFunction {
        &self.inverse
    }
}

impl ShapeFunction for RadialDistanceFunction {
    fn evaluate(&self, azimuth_rad: f64) -> f64 {
        self.derivatives(azimuth_rad)[0]
    }

    fn first_derivative(&self, azimuth_rad: f64) -> f64 {
        self.derivatives(azimuth_rad)[1]
    }

    fn second_derivative(&self, azimuth_rad: f64) -> f64 {
        self.derivatives(azimuth_rad)[2]
    }

    fn third_derivative(&self, azimuth_rad: f64) -> f64 {
        self.derivatives(azimuth_rad)[3]
    }

    fn derivatives(&self, azimuth_rad: f64) -> [f64; 4] {
        let [u, du, ddu, dddu] = self.inverse.derivatives(azimuth_rad);
        let u2 = u * u;
        let u3 = u2 * u;
        [
            1.0 / u,
            -du / u2,
            -ddu / u2 + 2.0 * du * du / u3,
            -dddu / u2 + 6.0 * du * ddu / u3 - 6.0 * du.powi(3) / (u3 * u),
        ]
    }
}
