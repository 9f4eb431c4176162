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

use super::basis::{
    ComponentFunction, ELEVATION_BASIS, FREE_COEFFICIENT_INDEX, INVERSE_RADIUS_BASIS,
};
use crate::cosmic::Normalization;
use crate::errors::{InvalidBoundaryStateSnafu, ShapingError, SingularBoundaryMatrixSnafu};
use crate::linalg::{DMatrix, DVector, Vector6};
use crate::utils::{between_0_tau, cartesian_to_spherical};
use snafu::ensure;
use std::f64::consts::TAU;
use std::fmt;

/// Boundary matrices whose reciprocal condition number is below this are considered singular.
pub const SINGULARITY_RCOND: f64 = 1e-13;

/// A boundary state of the transfer, in physical, normalized, and normalized spherical forms.
///
/// The spherical form is `[r, θ, φ, v_r, v_θ, v_φ]` with the azimuth θ in [0, 2π).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundaryState {
    cartesian_km_s: Vector6<f64>,
    normalized: Vector6<f64>,
    spherical: Vector6<f64>,
}

impl BoundaryState {
    /// Builds a boundary state from a Cartesian state in km and km/s.
    ///
    /// Fails if the state is at the origin, on the polar axis, or if it does not move prograde in
    /// azimuth: the azimuth could not be used as the independent variable.
    pub fn new(cartesian_km_s: Vector6<f64>, norm: &Normalization) -> Result<Self, ShapingError> {
        ensure!(
            cartesian_km_s.iter().all(|x| x.is_finite()),
            InvalidBoundaryStateSnafu {
                msg: format!("non finite state {cartesian_km_s}")
            }
        );
        let normalized = norm.state(&cartesian_km_s);
        let mut spherical = cartesian_to_spherical(&normalized);
        ensure!(
            spherical[0] > 0.0,
            InvalidBoundaryStateSnafu {
                msg: "state is at the origin"
            }
        );
        ensure!(
            spherical[2].cos() > 1e-12,
            InvalidBoundaryStateSnafu {
                msg: "state is on the polar axis"
            }
        );
        ensure!(
            spherical[4] > 0.0,
            InvalidBoundaryStateSnafu {
                msg: format!(
                    "azimuthal velocity must be positive (got {:e} AU/yr)",
                    spherical[4]
                )
            }
        );
        spherical[1] = between_0_tau(spherical[1]);

        Ok(Self {
            cartesian_km_s,
            normalized,
            spherical,
        })
    }

    pub fn cartesian_km_s(&self) -> &Vector6<f64> {
        &self.cartesian_km_s
    }

    pub fn normalized(&self) -> &Vector6<f64> {
        &self.normalized
    }

    pub fn spherical(&self) -> &Vector6<f64> {
        &self.spherical
    }

    pub fn radius(&self) -> f64 {
        self.spherical[0]
    }

    pub fn azimuth_rad(&self) -> f64 {
        self.spherical[1]
    }

    pub fn elevation_rad(&self) -> f64 {
        self.spherical[2]
    }

    /// Time derivative of the azimuth, in normalized units
    pub fn azimuth_rate(&self) -> f64 {
        self.spherical[4] / (self.spherical[0] * self.spherical[2].cos())
    }

    /// Returns this state with the azimuth as the independent variable.
    pub fn azimuth_parametrized(&self) -> AzimuthParametrizedState {
        let azimuth_rate = self.azimuth_rate();
        let mut state = self.spherical;
        for i in 3..6 {
            state[i] /= azimuth_rate;
        }
        AzimuthParametrizedState {
            state,
            azimuth_rate,
        }
    }
}

impl fmt::Display for BoundaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "r = {:.6} AU, θ = {:.6} deg, φ = {:.6} deg",
            self.radius(),
            self.azimuth_rad().to_degrees(),
            self.elevation_rad().to_degrees()
        )
    }
}

/// A boundary state whose velocity components are derivatives with respect to the azimuth.
///
/// The state is `[r, θ, φ, r', r cos φ, r φ']` where the prime denotes d/dθ.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AzimuthParametrizedState {
    pub state: Vector6<f64>,
    /// dθ/dt at this state, normalized
    pub azimuth_rate: f64,
}

impl AzimuthParametrizedState {
    pub fn radius(&self) -> f64 {
        self.state[0]
    }

    pub fn elevation(&self) -> f64 {
        self.state[2]
    }

    /// dr/dθ
    pub fn radius_derivative(&self) -> f64 {
        self.state[3]
    }

    /// dφ/dθ
    pub fn elevation_derivative(&self) -> f64 {
        self.state[5] / self.state[0]
    }

    /// The coupling of the elevation curvature in the radial curvature condition.
    fn elevation_curvature_factor(&self) -> f64 {
        let dphi = self.elevation_derivative();
        -self.radius_derivative() * dphi / (dphi * dphi + self.elevation().cos().powi(2))
    }

    /// Right hand side of the radial curvature condition, from the equations of motion without
    /// any thrust at the boundary.
    fn curvature_condition(&self, gm: f64) -> f64 {
        let r = self.radius();
        let dr = self.radius_derivative();
        let phi = self.elevation();
        let dphi = self.elevation_derivative();
        let f1 = dphi * dphi + phi.cos().powi(2);
        -gm / (r * r * self.azimuth_rate.powi(2)) + r * f1 - dr * dphi * phi.sin() * phi.cos() / f1
    }
}

/// Computes the initial and final azimuths of the transfer.
///
/// The final azimuth is incremented by 2π per revolution, plus one more turn if it is not already
/// ahead of the initial azimuth, so that the swept angle is strictly positive.
pub fn swept_azimuths(
    initial: &BoundaryState,
    final_state: &BoundaryState,
    revolutions: u32,
) -> (f64, f64) {
    let initial_azimuth = initial.azimuth_rad();
    let mut final_azimuth = final_state.azimuth_rad() + TAU * f64::from(revolutions);
    if final_state.azimuth_rad() - initial_azimuth <= 0.0 {
        final_azimuth += TAU;
    }
    (initial_azimuth, final_azimuth)
}

/// Coefficients of the radial and elevation shapes
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeCoefficients {
    /// Coefficients of the inverse radius on [INVERSE_RADIUS_BASIS]
    pub radial: Vec<f64>,
    /// Coefficients of the elevation on [ELEVATION_BASIS]
    pub elevation: Vec<f64>,
}

/// The linear system mapping the shape coefficients to the boundary conditions.
///
/// The unknowns are the six radial coefficients other than the free one, followed by the four
/// elevation coefficients. The ten conditions are, in order: the inverse radius at both ends, its
/// derivative at both ends, the radial curvature at both ends (coupled with the elevation curvature),
/// the elevation at both ends, and its derivative at both ends.
///
/// The matrix only depends on the boundary azimuths and states, so it is inverted once.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryConditionSystem {
    inverse: DMatrix<f64>,
    rhs: DVector<f64>,
    free_column: DVector<f64>,
    rcond: f64,
}

impl BoundaryConditionSystem {
    pub const SIZE: usize = INVERSE_RADIUS_BASIS.len() - 1 + ELEVATION_BASIS.len();

    pub fn assemble(
        initial: &AzimuthParametrizedState,
        final_state: &AzimuthParametrizedState,
        initial_azimuth: f64,
        final_azimuth: f64,
        gm: f64,
    ) -> Result<Self, ShapingError> {
        let n = Self::SIZE;
        let mut matrix = DMatrix::<f64>::zeros(n, n);

        let solved_radial = INVERSE_RADIUS_BASIS
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != FREE_COEFFICIENT_INDEX)
            .map(|(_, comp)| *comp);

        let radial_rows = |comp: ComponentFunction| {
            let d0 = comp.derivatives(initial_azimuth);
            let df = comp.derivatives(final_azimuth);
            [
                d0[0],
                df[0],
                d0[1],
                df[1],
                -initial.radius().powi(2) * d0[2],
                -final_state.radius().powi(2) * df[2],
            ]
        };

        for (col, comp) in solved_radial.enumerate() {
            for (row, val) in radial_rows(comp).iter().enumerate() {
                matrix[(row, col)] = *val;
            }
        }

        let alpha0 = initial.elevation_curvature_factor();
        let alphaf = final_state.elevation_curvature_factor();
        let offset = INVERSE_RADIUS_BASIS.len() - 1;
        for (i, comp) in ELEVATION_BASIS.iter().enumerate() {
            let col = offset + i;
            let d0 = comp.derivatives(initial_azimuth);
            let df = comp.derivatives(final_azimuth);
            matrix[(4, col)] = alpha0 * d0[2];
            matrix[(5, col)] = alphaf * df[2];
            matrix[(6, col)] = d0[0];
            matrix[(7, col)] = df[0];
            matrix[(8, col)] = d0[1];
            matrix[(9, col)] = df[1];
        }

        let rhs = DVector::from_column_slice(&[
            1.0 / initial.radius(),
            1.0 / final_state.radius(),
            -initial.radius_derivative() / initial.radius().powi(2),
            -final_state.radius_derivative() / final_state.radius().powi(2),
            initial.curvature_condition(gm),
            final_state.curvature_condition(gm),
            initial.elevation(),
            final_state.elevation(),
            initial.elevation_derivative(),
            final_state.elevation_derivative(),
        ]);

        let mut free_column = DVector::<f64>::zeros(n);
        for (row, val) in radial_rows(INVERSE_RADIUS_BASIS[FREE_COEFFICIENT_INDEX])
            .iter()
            .enumerate()
        {
            free_column[row] = *val;
        }

        let singular_values = matrix.clone().singular_values();
        let max_sv = singular_values.max();
        let rcond = if max_sv > 0.0 {
            singular_values.min() / max_sv
        } else {
            0.0
        };
        ensure!(
            rcond.is_finite() && rcond >= SINGULARITY_RCOND,
            SingularBoundaryMatrixSnafu {
                initial_azimuth_rad: initial_azimuth,
                final_azimuth_rad: final_azimuth,
                rcond
            }
        );

        let inverse = matrix.try_inverse().ok_or(ShapingError::SingularBoundaryMatrix {
            initial_azimuth_rad: initial_azimuth,
            final_azimuth_rad: final_azimuth,
            rcond,
        })?;

        debug!(
            "boundary condition matrix inverted between {initial_azimuth} and {final_azimuth} rad (rcond = {rcond:e})"
        );

        Ok(Self {
            inverse,
            rhs,
            free_column,
            rcond,
        })
    }

    /// Reciprocal condition number of the boundary matrix
    pub fn rcond(&self) -> f64 {
        self.rcond
    }

    /// Solves for all of the shape coefficients given the value of the free coefficient.
    pub fn solve(&self, free_coefficient: f64) -> ShapeCoefficients {
        let solved = &self.inverse * (&self.rhs - free_coefficient * &self.free_column);

        let offset = INVERSE_RADIUS_BASIS.len() - 1;
        let mut radial = Vec::with_capacity(INVERSE_RADIUS_BASIS.len());
        radial.extend(solved.iter().take(FREE_COEFFICIENT_INDEX));
        radial.push(free_coefficient);
        radial.extend(solved.iter().take(offset).skip(FREE_COEFFICIENT_INDEX));

        ShapeCoefficients {
            radial,
            elevation: solved.iter().skip(offset).copied().collect(),
        }
    }
}

#[cfg(test)]
mod ut_boundary {
    use super::*;
    use crate::cosmic::{AU, SUN_GM_KM3_S2};

    fn circular(radius_au: f64, angle_rad: f64) -> Vector6<f64> {
        let r = radius_au * AU;
        let v = (SUN_GM_KM3_S2 / r).sqrt();
        let (s, c) = angle_rad.sin_cos();
        Vector6::new(r * c, r * s, 0.0, -v * s, v * c, 0.0)
    }

    #[test]
    fn boundary_state_forms() {
        let norm = Normalization::heliocentric();
        let state = BoundaryState::new(circular(1.0, -0.5), &norm).unwrap();
        assert!((state.radius() - 1.0).abs() < 1e-14);
        // Azimuth is wrapped in [0, 2π)
        assert!((state.azimuth_rad() - (TAU - 0.5)).abs() < 1e-14);
        assert!(state.elevation_rad().abs() < 1e-15);
        // Circular: no radial velocity, azimuth rate is the mean motion
        let param = state.azimuth_parametrized();
        assert!(param.radius_derivative().abs() < 1e-12);
        assert!((param.state[4] - 1.0).abs() < 1e-12);
        assert!((param.azimuth_rate - norm.gm(SUN_GM_KM3_S2).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn invalid_boundary_states() {
        let norm = Normalization::heliocentric();
        assert!(BoundaryState::new(Vector6::zeros(), &norm)
            .unwrap_err()
            .is_configuration());
        // Retrograde
        let mut retro = circular(1.0, 0.0);
        retro[4] *= -1.0;
        assert!(BoundaryState::new(retro, &norm).is_err());
        // Polar
        let polar = Vector6::new(0.0, 0.0, AU, 0.0, 30.0, 0.0);
        assert!(BoundaryState::new(polar, &norm).is_err());
        let mut nan = circular(1.0, 0.0);
        nan[2] = f64::NAN;
        assert!(BoundaryState::new(nan, &norm).is_err());
    }

    #[test]
    fn azimuth_sweep() {
        let norm = Normalization::heliocentric();
        let start = BoundaryState::new(circular(1.0, 0.3), &norm).unwrap();
        let ahead = BoundaryState::new(circular(1.5, 2.0), &norm).unwrap();
        let behind = BoundaryState::new(circular(1.5, 0.1), &norm).unwrap();

        let (a0, af) = swept_azimuths(&start, &ahead, 0);
        assert!((af - a0 - 1.7).abs() < 1e-14);
        let (_, af_behind) = swept_azimuths(&start, &behind, 0);
        assert!((af_behind - a0 - (TAU - 0.2)).abs() < 1e-14);
        // Coincident azimuths still sweep a full turn
        let (_, af_same) = swept_azimuths(&start, &start, 0);
        assert!((af_same - a0 - TAU).abs() < 1e-14);

        for revs in 0..4 {
            let (_, af_n) = swept_azimuths(&start, &ahead, revs);
            let (_, af_n1) = swept_azimuths(&start, &ahead, revs + 1);
            assert!(af_n > a0);
            assert!((af_n1 - af_n - TAU).abs() < 1e-12);
        }
    }

    #[test]
    fn singular_for_coincident_azimuths() {
        let norm = Normalization::heliocentric();
        let start = BoundaryState::new(circular(1.0, 0.3), &norm).unwrap();
        let param = start.azimuth_parametrized();
        let gm = norm.gm(SUN_GM_KM3_S2);
        let err = BoundaryConditionSystem::assemble(
            &param,
            &param,
            start.azimuth_rad(),
            start.azimuth_rad(),
            gm,
        )
        .unwrap_err();
        assert!(matches!(err, ShapingError::SingularBoundaryMatrix { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn solution_satisfies_conditions() {
        use super::super::basis::{CompositeShapeFunction, RadialDistanceFunction, ShapeFunction};

        let norm = Normalization::heliocentric();
        let start = BoundaryState::new(circular(1.0, 0.0), &norm).unwrap();
        let end = BoundaryState::new(circular(1.5, 2.5), &norm).unwrap();
        let (a0, af) = swept_azimuths(&start, &end, 0);
        let (p0, pf) = (start.azimuth_parametrized(), end.azimuth_parametrized());
        let system =
            BoundaryConditionSystem::assemble(&p0, &pf, a0, af, norm.gm(SUN_GM_KM3_S2)).unwrap();
        assert!(system.rcond() > SINGULARITY_RCOND);

        for free in [-0.5, 0.0, 0.2] {
            let coeffs = system.solve(free);
            assert_eq!(coeffs.radial.len(), 7);
            assert_eq!(coeffs.elevation.len(), 4);
            assert_eq!(coeffs.radial[FREE_COEFFICIENT_INDEX], free);

            let radial = RadialDistanceFunction::new(coeffs.radial).unwrap();
            let elevation =
                CompositeShapeFunction::new(ELEVATION_BASIS.to_vec(), coeffs.elevation).unwrap();
            assert!((radial.evaluate(a0) - 1.0).abs() < 1e-12);
            assert!((radial.evaluate(af) - 1.5).abs() < 1e-12);
            assert!(radial.first_derivative(a0).abs() < 1e-12);
            assert!(radial.first_derivative(af).abs() < 1e-12);
            // Coplanar transfer stays in the plane
            for az in [a0, 0.5 * (a0 + af), af] {
                assert!(elevation.evaluate(az).abs() < 1e-12);
            }
        }
    }
}
