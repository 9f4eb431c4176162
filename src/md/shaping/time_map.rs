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
use super::time::{time_of_flight, ShapeDerivatives};
use crate::cosmic::Normalization;
use crate::errors::{ShapingError, TimeMapSnafu, TimeOutOfBoundsSnafu};
use crate::polyfit::{GaussLegendre, HermiteSeries};
use crate::time::Duration;
use snafu::{ensure, ResultExt};
use std::fmt;

/// Relative slack on the end of the table, to absorb the rounding of the time of flight.
const END_TOLERANCE: f64 = 1e-9;

/// Maps the elapsed time since the start of the transfer to the azimuth.
///
/// The table holds samples uniformly spaced in azimuth. The elapsed time of each sample is the
/// time of the previous sample plus the quadrature of dt/dθ over the segment between them, and the
/// azimuth is interpolated with cubic Hermite polynomials using dθ/dt as the derivative. The last
/// sample is pinned to the quadrature over the whole sweep, so the table ends on the time of flight
/// of the shape.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeAngleMap {
    series: HermiteSeries,
    norm: Normalization,
}

impl TimeAngleMap {
    /// Builds the map from the shapes with `sample_count` samples (at least two).
    #[allow(clippy::too_many_arguments)]
    pub fn build<R, E>(
        radial: &R,
        elevation: &E,
        gm: f64,
        quadrature: &GaussLegendre,
        initial_azimuth_rad: f64,
        final_azimuth_rad: f64,
        sample_count: usize,
        norm: Normalization,
    ) -> Result<Self, ShapingError>
    where
        R: ShapeFunction + ?Sized,
        E: ShapeFunction + ?Sized,
    {
        let sample_count = sample_count.max(2);
        let step = (final_azimuth_rad - initial_azimuth_rad) / (sample_count - 1) as f64;

        let mut times = Vec::with_capacity(sample_count);
        let mut azimuths = Vec::with_capacity(sample_count);
        let mut rates = Vec::with_capacity(sample_count);

        let mut elapsed = 0.0;
        for i in 0..sample_count {
            let azimuth = if i == sample_count - 1 {
                final_azimuth_rad
            } else {
                initial_azimuth_rad + i as f64 * step
            };
            if i > 0 {
                elapsed += time_of_flight(
                    radial,
                    elevation,
                    gm,
                    quadrature,
                    azimuths[i - 1],
                    azimuth,
                )?;
            }
            times.push(elapsed);
            azimuths.push(azimuth);
            rates.push(ShapeDerivatives::evaluate(radial, elevation, azimuth).azimuth_rate(gm)?);
        }

        // The segments add up to the time of flight of the whole sweep up to rounding: rescale
        // them so that the table ends exactly on that time of flight.
        let total = time_of_flight(
            radial,
            elevation,
            gm,
            quadrature,
            initial_azimuth_rad,
            final_azimuth_rad,
        )?;
        if elapsed > 0.0 {
            let scale = total / elapsed;
            times.iter_mut().for_each(|time| *time *= scale);
        }
        if let Some(last) = times.last_mut() {
            *last = total;
        }

        debug!(
            "time to azimuth map built with {sample_count} samples over {} (segments sum to {})",
            norm.to_duration(total),
            norm.to_duration(elapsed)
        );

        Ok(Self {
            series: HermiteSeries::try_from_samples(times, azimuths, rates)
                .context(TimeMapSnafu)?,
            norm,
        })
    }

    /// Time of flight covered by the map
    pub fn duration(&self) -> Duration {
        self.norm.to_duration(self.series.domain().1)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Returns the azimuth (radians) reached after the provided elapsed time.
    pub fn angle_at_time(&self, elapsed: Duration) -> Result<f64, ShapingError> {
        Ok(self.angle_n_rate_at_normalized(self.checked_time(elapsed)?)?.0)
    }

    /// Returns the azimuth and its rate (normalized) after the provided elapsed time.
    pub fn angle_n_rate_at_time(&self, elapsed: Duration) -> Result<(f64, f64), ShapingError> {
        self.angle_n_rate_at_normalized(self.checked_time(elapsed)?)
    }

    fn angle_n_rate_at_normalized(&self, time: f64) -> Result<(f64, f64), ShapingError> {
        self.series.evaluate_n_deriv(time).context(TimeMapSnafu)
    }

    /// Converts the elapsed time to normalized time, clamping a negligible overshoot of the bounds.
    fn checked_time(&self, elapsed: Duration) -> Result<f64, ShapingError> {
        let (start, end) = self.series.domain();
        let time = self.norm.duration(elapsed);
        let slack = END_TOLERANCE * end;
        ensure!(
            time >= start - slack && time <= end + slack,
            TimeOutOfBoundsSnafu {
                elapsed_s: elapsed.to_seconds(),
                tof_s: end * self.norm.time_s
            }
        );
        Ok(time.clamp(start, end))
    }
}

impl fmt::Display for TimeAngleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time to azimuth map of {} samples over {}",
            self.len(),
            self.duration()
        )
    }
}

#[cfg(test)]
mod ut_time_map {
    use super::super::basis::{CompositeShapeFunction, RadialDistanceFunction, ELEVATION_BASIS};
    use super::*;
    use crate::polyfit::QuadratureSettings;
    use crate::time::Unit;
    use std::f64::consts::TAU;

    #[test]
    fn circular_map_is_linear() {
        let norm = Normalization::heliocentric();
        let gm = norm.gm(crate::cosmic::SUN_GM_KM3_S2);
        let radial = RadialDistanceFunction::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let elevation = CompositeShapeFunction::zeros(ELEVATION_BASIS.to_vec());
        let quad = GaussLegendre::new(QuadratureSettings::default()).unwrap();

        let map =
            TimeAngleMap::build(&radial, &elevation, gm, &quad, 0.5, 0.5 + TAU, 40, norm).unwrap();
        assert_eq!(map.len(), 40);

        let mean_motion = gm.sqrt();
        let period_s = TAU / mean_motion * norm.time_s;
        assert!((map.duration().to_seconds() - period_s).abs() < 1e-3);

        for days in [0.0, 10.0, 100.0, 250.0] {
            let az = map.angle_at_time(days * Unit::Day).unwrap();
            let expected = 0.5 + mean_motion * norm.duration(days * Unit::Day);
            assert!((az - expected).abs() < 1e-10, "{days} days: {az} != {expected}");
        }

        let (_, rate) = map.angle_n_rate_at_time(30.0 * Unit::Day).unwrap();
        assert!((rate - mean_motion).abs() < 1e-10);

        assert!(matches!(
            map.angle_at_time(400.0 * Unit::Day),
            Err(ShapingError::TimeOutOfBounds { .. })
        ));
        assert!(map.angle_at_time(-1.0 * Unit::Second).is_err());
        // The end of the table is reachable
        assert!((map.angle_at_time(map.duration()).unwrap() - (0.5 + TAU)).abs() < 1e-9);
    }

    #[test]
    fn map_ends_on_time_of_flight() {
        let norm = Normalization::heliocentric();
        let gm = norm.gm(crate::cosmic::SUN_GM_KM3_S2);
        // Spiral outward: u = 1 - 0.1 θ + 0.01 θ², so u + u'' stays positive
        let radial =
            RadialDistanceFunction::new(vec![1.0, -0.1, 0.01, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let elevation = CompositeShapeFunction::zeros(ELEVATION_BASIS.to_vec());
        let quad = GaussLegendre::new(QuadratureSettings::default()).unwrap();

        for samples in [2, 7, 250] {
            let map =
                TimeAngleMap::build(&radial, &elevation, gm, &quad, 0.0, 3.0, samples, norm).unwrap();
            let tof = time_of_flight(&radial, &elevation, gm, &quad, 0.0, 3.0).unwrap();
            assert_eq!(map.duration(), norm.to_duration(tof));
            assert!((map.angle_at_time(map.duration()).unwrap() - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn infeasible_shape_fails_map() {
        let norm = Normalization::heliocentric();
        let radial = RadialDistanceFunction::new(vec![1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let elevation = CompositeShapeFunction::zeros(ELEVATION_BASIS.to_vec());
        let quad = GaussLegendre::new(QuadratureSettings::default()).unwrap();
        let err =
            TimeAngleMap::build(&radial, &elevation, 1.0, &quad, 0.0, 1.0, 10, norm).unwrap_err();
        assert!(err.is_infeasible());
    }
}
