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
use crate::errors::{AngleOutOfBoundsSnafu, InvalidSettingsSnafu, ShapingError};
use crate::linalg::{Vector3, Vector6};
use crate::opti::{brent, secant, RootFinderMethod, RootSolution};
use crate::polyfit::GaussLegendre;
use crate::time::Duration;
use snafu::ensure;
use std::fmt;

pub mod basis;
pub mod boundary;
pub mod exposin;
pub mod kinematics;
mod options;
pub mod sweep;
pub mod time;
pub mod time_map;

pub use basis::{
    ComponentFunction, CompositeShapeFunction, RadialDistanceFunction, ShapeFunction,
    ELEVATION_BASIS, FREE_COEFFICIENT_INDEX, INVERSE_RADIUS_BASIS,
};
pub use boundary::{
    swept_azimuths, AzimuthParametrizedState, BoundaryConditionSystem, BoundaryState,
    ShapeCoefficients,
};
pub use kinematics::ShapedKinematics;
pub use options::ShapingSettings;
pub use time::ShapeDerivatives;
pub use time_map::TimeAngleMap;

/// Relative slack on the azimuth bounds, to absorb rounding at the ends of the transfer.
const AZIMUTH_TOLERANCE: f64 = 1e-12;

/// A point of a sampled shaped trajectory
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapedSample {
    /// Time since the start of the transfer
    pub elapsed: Duration,
    pub azimuth_rad: f64,
    /// Cartesian position and velocity, in km and km/s
    pub state_km: Vector6<f64>,
    /// Cartesian thrust acceleration, in km/s^2
    pub thrust_km_s2: Vector3<f64>,
}

/// A low-thrust transfer designed by spherical shaping.
///
/// The inverse of the radius and the elevation are shaped as functions of the azimuth. Building
/// the problem solves the boundary conditions for all of the shape coefficients but one, and the
/// remaining one is found such that the time of flight of the shape matches the required one.
/// Once built, the problem is immutable and every query is a pure function of its inputs.
///
/// All public quantities are physical: kilometers, seconds, and radians.
#[derive(Clone, Debug)]
pub struct ShapingProblem {
    initial: BoundaryState,
    final_state: BoundaryState,
    norm: Normalization,
    gm_km3_s2: f64,
    gm: f64,
    revolutions: u32,
    required_tof: f64,
    achieved_tof: f64,
    initial_azimuth: f64,
    final_azimuth: f64,
    settings: ShapingSettings,
    quadrature: GaussLegendre,
    boundary: BoundaryConditionSystem,
    radial: RadialDistanceFunction,
    elevation: CompositeShapeFunction,
    root: RootSolution,
    time_map: TimeAngleMap,
}

impl ShapingProblem {
    /// Designs the transfer between two heliocentric states, provided in km and km/s.
    pub fn new(
        initial_km_s: Vector6<f64>,
        final_km_s: Vector6<f64>,
        time_of_flight: Duration,
        revolutions: u32,
        gm_km3_s2: f64,
        settings: ShapingSettings,
    ) -> Result<Self, ShapingError> {
        Self::with_normalization(
            initial_km_s,
            final_km_s,
            time_of_flight,
            revolutions,
            gm_km3_s2,
            settings,
            Normalization::heliocentric(),
        )
    }

    /// Designs the transfer with a specific normalization of the distances and times.
    ///
    /// The converged shape is checked for feasibility at every sample of the time to azimuth map
    /// and at every quadrature node of its segments. A shape which cannot be flown there fails
    /// with [ShapingError::Infeasible].
    pub fn with_normalization(
        initial_km_s: Vector6<f64>,
        final_km_s: Vector6<f64>,
        time_of_flight: Duration,
        revolutions: u32,
        gm_km3_s2: f64,
        settings: ShapingSettings,
        norm: Normalization,
    ) -> Result<Self, ShapingError> {
        settings.validate()?;
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

        let initial = BoundaryState::new(initial_km_s, &norm)?;
        let final_state = BoundaryState::new(final_km_s, &norm)?;
        let (initial_azimuth, final_azimuth) = swept_azimuths(&initial, &final_state, revolutions);
        let gm = norm.gm(gm_km3_s2);
        let required_tof = norm.duration(time_of_flight);

        let boundary = BoundaryConditionSystem::assemble(
            &initial.azimuth_parametrized(),
            &final_state.azimuth_parametrized(),
            initial_azimuth,
            final_azimuth,
            gm,
        )?;

        let quadrature =
            GaussLegendre::new(settings.quadrature).map_err(|e| ShapingError::InvalidSettings {
                msg: e.to_string(),
            })?;

        info!(
            "shaping {initial} -> {final_state} over {:.3} deg in {time_of_flight} ({revolutions} rev)",
            (final_azimuth - initial_azimuth).to_degrees()
        );

        let objective = |free: f64| -> Result<f64, ShapingError> {
            let coeffs = boundary.solve(free);
            let tof = shape_time_of_flight(&coeffs, gm, &quadrature, initial_azimuth, final_azimuth)?;
            debug!("free coefficient {free:e} -> TOF error {:e}", required_tof - tof);
            Ok(required_tof - tof)
        };

        let (lower, upper) = settings.free_coefficient_bracket;
        let root = match settings.root_finder.method {
            RootFinderMethod::Brent => brent(objective, lower, upper, &settings.root_finder)?,
            RootFinderMethod::Secant => secant(
                objective,
                settings.secant_guess(),
                lower,
                upper,
                &settings.root_finder,
            )?,
        };

        let coeffs = boundary.solve(root.root);
        let radial = RadialDistanceFunction::new(coeffs.radial)?;
        let elevation = CompositeShapeFunction::new(ELEVATION_BASIS.to_vec(), coeffs.elevation)?;
        let achieved_tof = time::time_of_flight(
            &radial,
            &elevation,
            gm,
            &quadrature,
            initial_azimuth,
            final_azimuth,
        )?;

        info!(
            "converged on free coefficient {} ({} iterations): TOF = {}",
            root.root,
            root.iterations,
            norm.to_duration(achieved_tof)
        );

        let sample_count =
            (time_of_flight.to_seconds() / settings.time_step.to_seconds()).ceil() as usize;
        let time_map = TimeAngleMap::build(
            &radial,
            &elevation,
            gm,
            &quadrature,
            initial_azimuth,
            final_azimuth,
            sample_count,
            norm,
        )?;

        Ok(Self {
            initial,
            final_state,
            norm,
            gm_km3_s2,
            gm,
            revolutions,
            required_tof,
            achieved_tof,
            initial_azimuth,
            final_azimuth,
            settings,
            quadrature,
            boundary,
            radial,
            elevation,
            root,
            time_map,
        })
    }

    pub fn initial_state(&self) -> &BoundaryState {
        &self.initial
    }

    pub fn final_state(&self) -> &BoundaryState {
        &self.final_state
    }

    pub fn normalization(&self) -> Normalization {
        self.norm
    }

    pub fn gm_km3_s2(&self) -> f64 {
        self.gm_km3_s2
    }

    pub fn revolutions(&self) -> u32 {
        self.revolutions
    }

    pub fn settings(&self) -> &ShapingSettings {
        &self.settings
    }

    pub fn initial_azimuth(&self) -> f64 {
        self.initial_azimuth
    }

    /// Final azimuth, including the complete revolutions
    pub fn final_azimuth(&self) -> f64 {
        self.final_azimuth
    }

    pub fn free_coefficient(&self) -> f64 {
        self.radial.free_coefficient()
    }

    /// Details of the convergence of the free coefficient
    pub fn root_solution(&self) -> &RootSolution {
        &self.root
    }

    /// Reciprocal condition number of the boundary condition matrix
    pub fn boundary_rcond(&self) -> f64 {
        self.boundary.rcond()
    }

    pub fn radial_function(&self) -> &RadialDistanceFunction {
        &self.radial
    }

    pub fn elevation_function(&self) -> &CompositeShapeFunction {
        &self.elevation
    }

    pub fn time_angle_map(&self) -> &TimeAngleMap {
        &self.time_map
    }

    /// Time of flight required when the problem was built
    pub fn required_time_of_flight(&self) -> Duration {
        self.norm.to_duration(self.required_tof)
    }

    /// Time of flight of the converged shape
    pub fn time_of_flight(&self) -> Duration {
        self.norm.to_duration(self.achieved_tof)
    }

    /// Solves the boundary conditions for the provided value of the free coefficient.
    pub fn solve_coefficients(&self, free_coefficient: f64) -> ShapeCoefficients {
        self.boundary.solve(free_coefficient)
    }

    /// Time of flight of the shape with the provided coefficients.
    pub fn tof_with(&self, coefficients: &ShapeCoefficients) -> Result<Duration, ShapingError> {
        let tof = shape_time_of_flight(
            coefficients,
            self.gm,
            &self.quadrature,
            self.initial_azimuth,
            self.final_azimuth,
        )?;
        Ok(self.norm.to_duration(tof))
    }

    /// Kinematics of the converged shape at the provided azimuth, in normalized units.
    pub fn kinematics_at(&self, azimuth_rad: f64) -> Result<ShapedKinematics, ShapingError> {
        let azimuth_rad = self.checked_azimuth(azimuth_rad)?;
        ShapedKinematics::from_derivatives(&self.derivatives_at(azimuth_rad), self.gm)
    }

    /// Cartesian state at the provided azimuth, in km and km/s.
    pub fn state_at(&self, azimuth_rad: f64) -> Result<Vector6<f64>, ShapingError> {
        Ok(self
            .norm
            .state_km_s(&self.kinematics_at(azimuth_rad)?.cartesian_state()))
    }

    /// Cartesian velocity at the provided azimuth, in km/s.
    pub fn velocity_at(&self, azimuth_rad: f64) -> Result<Vector3<f64>, ShapingError> {
        Ok(self.state_at(azimuth_rad)?.fixed_rows::<3>(3).into_owned())
    }

    /// Cartesian acceleration (gravity and thrust) at the provided azimuth, in km/s^2.
    pub fn acceleration_at(&self, azimuth_rad: f64) -> Result<Vector3<f64>, ShapingError> {
        Ok(self
            .norm
            .acceleration_to_km_s2(&self.kinematics_at(azimuth_rad)?.cartesian_acceleration()))
    }

    /// Cartesian thrust acceleration at the provided azimuth, in km/s^2.
    pub fn thrust_acceleration_at(&self, azimuth_rad: f64) -> Result<Vector3<f64>, ShapingError> {
        Ok(self
            .norm
            .acceleration_to_km_s2(&self.kinematics_at(azimuth_rad)?.cartesian_thrust()))
    }

    pub fn thrust_acceleration_magnitude_at(&self, azimuth_rad: f64) -> Result<f64, ShapingError> {
        Ok(self.thrust_acceleration_at(azimuth_rad)?.norm())
    }

    /// Unit vector of the thrust at the provided azimuth, or a zero vector if no thrust is needed there.
    pub fn thrust_direction_at(&self, azimuth_rad: f64) -> Result<Vector3<f64>, ShapingError> {
        let thrust = self.thrust_acceleration_at(azimuth_rad)?;
        let mag = thrust.norm();
        if mag > 0.0 {
            Ok(thrust / mag)
        } else {
            Ok(Vector3::zeros())
        }
    }

    /// dθ/dt at the provided azimuth, in rad/s
    pub fn azimuth_rate(&self, azimuth_rad: f64) -> Result<f64, ShapingError> {
        let azimuth_rad = self.checked_azimuth(azimuth_rad)?;
        Ok(self.derivatives_at(azimuth_rad).azimuth_rate(self.gm)? / self.norm.time_s)
    }

    /// d²θ/dt² at the provided azimuth, in rad/s^2
    pub fn azimuth_acceleration(&self, azimuth_rad: f64) -> Result<f64, ShapingError> {
        let azimuth_rad = self.checked_azimuth(azimuth_rad)?;
        Ok(self.derivatives_at(azimuth_rad).azimuth_acceleration(self.gm)?
            / self.norm.time_s.powi(2))
    }

    /// Total velocity increment provided by the thrusters, in km/s.
    pub fn delta_v_km_s(&self) -> Result<f64, ShapingError> {
        let dv = self.quadrature.integrate(
            |azimuth_rad| {
                let deriv = self.derivatives_at(azimuth_rad);
                let kin = ShapedKinematics::from_derivatives(&deriv, self.gm)?;
                Ok::<f64, ShapingError>(kin.thrust.norm() * deriv.time_derivative(self.gm)?)
            },
            self.initial_azimuth,
            self.final_azimuth,
        )?;
        Ok(dv * self.norm.velocity_km_s())
    }

    /// Elapsed time from the start of the transfer until the provided azimuth is reached.
    pub fn time_at_azimuth(&self, azimuth_rad: f64) -> Result<Duration, ShapingError> {
        let azimuth_rad = self.checked_azimuth(azimuth_rad)?;
        let time = time::time_of_flight(
            &self.radial,
            &self.elevation,
            self.gm,
            &self.quadrature,
            self.initial_azimuth,
            azimuth_rad,
        )?;
        Ok(self.norm.to_duration(time))
    }

    /// Azimuth reached after the provided elapsed time.
    pub fn azimuth_at_time(&self, elapsed: Duration) -> Result<f64, ShapingError> {
        self.time_map.angle_at_time(elapsed)
    }

    /// Cartesian state after the provided elapsed time, in km and km/s.
    pub fn state_at_time(&self, elapsed: Duration) -> Result<Vector6<f64>, ShapingError> {
        self.state_at(self.azimuth_at_time(elapsed)?)
    }

    /// Cartesian thrust acceleration after the provided elapsed time, in km/s^2.
    pub fn thrust_acceleration_at_time(
        &self,
        elapsed: Duration,
    ) -> Result<Vector3<f64>, ShapingError> {
        self.thrust_acceleration_at(self.azimuth_at_time(elapsed)?)
    }

    /// Samples the trajectory with the provided time step, including both ends of the transfer.
    pub fn sample(&self, step: Duration) -> Result<Vec<ShapedSample>, ShapingError> {
        ensure!(
            step > Duration::ZERO,
            InvalidSettingsSnafu {
                msg: format!("sampling step must be positive, got {step}")
            }
        );
        let tof = self.time_map.duration();
        let count = (tof.to_seconds() / step.to_seconds()).floor() as i64;

        let mut elapsed_times: Vec<Duration> = (0..=count).map(|i| step * i).collect();
        if elapsed_times.last().map_or(true, |last| *last < tof) {
            elapsed_times.push(tof);
        }

        elapsed_times
            .into_iter()
            .map(|elapsed| {
                let azimuth_rad = self.azimuth_at_time(elapsed)?;
                let kin = self.kinematics_at(azimuth_rad)?;
                Ok(ShapedSample {
                    elapsed,
                    azimuth_rad,
                    state_km: self.norm.state_km_s(&kin.cartesian_state()),
                    thrust_km_s2: self.norm.acceleration_to_km_s2(&kin.cartesian_thrust()),
                })
            })
            .collect()
    }

    fn derivatives_at(&self, azimuth_rad: f64) -> ShapeDerivatives {
        ShapeDerivatives::evaluate(&self.radial, &self.elevation, azimuth_rad)
    }

    fn checked_azimuth(&self, azimuth_rad: f64) -> Result<f64, ShapingError> {
        let slack = AZIMUTH_TOLERANCE * self.final_azimuth.abs().max(1.0);
        ensure!(
            azimuth_rad >= self.initial_azimuth - slack && azimuth_rad <= self.final_azimuth + slack,
            AngleOutOfBoundsSnafu {
                azimuth_rad,
                initial_rad: self.initial_azimuth,
                final_rad: self.final_azimuth
            }
        );
        Ok(azimuth_rad.clamp(self.initial_azimuth, self.final_azimuth))
    }
}

impl fmt::Display for ShapingProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "spherical shaping from {} to {} ({} rev) in {}: free coefficient {:e}",
            self.initial,
            self.final_state,
            self.revolutions,
            self.time_of_flight(),
            self.free_coefficient()
        )
    }
}

/// Time of flight, normalized, of the shape with the provided coefficients
fn shape_time_of_flight(
    coefficients: &ShapeCoefficients,
    gm: f64,
    quadrature: &GaussLegendre,
    initial_azimuth: f64,
    final_azimuth: f64,
) -> Result<f64, ShapingError> {
    let radial = RadialDistanceFunction::new(coefficients.radial.clone())?;
    let elevation =
        CompositeShapeFunction::new(ELEVATION_BASIS.to_vec(), coefficients.elevation.clone())?;
    time::time_of_flight(
        &radial,
        &elevation,
        gm,
        quadrature,
        initial_azimuth,
        final_azimuth,
    )
}
