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

use super::{
    InterpolationError, InvalidDataSnafu, LengthMismatchSnafu, NotMonotonicSnafu,
    OutOfDomainSnafu, TooFewSamplesSnafu,
};
use snafu::ensure;

/// Computes the Newton form of the Hermite interpolating polynomial of the provided samples.
///
/// Returns the doubled nodes `z` and the Newton coefficients `c` such that
/// P(x) = c_0 + c_1 (x - z_0) + c_2 (x - z_0)(x - z_1) + ...
///
/// ```
/// use lowthrust_shaping::polyfit::hermite::{hermite_divided_differences, newton_eval};
///
/// let xs: Vec<_> = (0..8).map(|i| i as f64).collect();
/// let ys: Vec<_> = xs.iter().map(|x| x.cos()).collect();
/// let derivs: Vec<_> = xs.iter().map(|x| -x.sin()).collect();
///
/// let (zs, coeffs) = hermite_divided_differences(&xs, &ys, &derivs).unwrap();
/// let (eval, deriv) = newton_eval(&zs, &coeffs, 3.0);
/// assert!((eval - 3.0_f64.cos()).abs() < 1e-10);
/// assert!((deriv + 3.0_f64.sin()).abs() < 1e-10);
/// ```
pub fn hermite_divided_differences(
    xs: &[f64],
    ys: &[f64],
    derivs: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), InterpolationError> {
    ensure!(!xs.is_empty(), TooFewSamplesSnafu { min: 1_usize, got: 0_usize });
    ensure!(
        xs.len() == ys.len(),
        LengthMismatchSnafu {
            what: "values",
            expected: xs.len(),
            got: ys.len()
        }
    );
    ensure!(
        xs.len() == derivs.len(),
        LengthMismatchSnafu {
            what: "derivatives",
            expected: xs.len(),
            got: derivs.len()
        }
    );

    let n = 2 * xs.len();
    let mut zs = vec![0.0; n];
    // Divided difference table, stored column major: qs[i + j * n] is the j-th order difference ending at i.
    let mut qs = vec![0.0; n * n];

    for i in 0..xs.len() {
        zs[2 * i] = xs[i];
        zs[2 * i + 1] = xs[i];
        qs[2 * i] = ys[i];
        qs[2 * i + 1] = ys[i];
        qs[2 * i + 1 + n] = derivs[i];

        if i != 0 {
            qs[2 * i + n] = (qs[2 * i] - qs[2 * i - 1]) / (zs[2 * i] - zs[2 * i - 1]);
        }
    }

    for i in 2..n {
        for j in 2..=i {
            qs[i + j * n] = (qs[i + (j - 1) * n] - qs[i - 1 + (j - 1) * n]) / (zs[i] - zs[i - j]);
        }
    }

    let coeffs: Vec<f64> = (0..n).map(|i| qs[i + i * n]).collect();

    if coeffs.iter().any(|c| !c.is_finite()) {
        return InvalidDataSnafu {
            msg: format!("non finite Hermite coefficients {coeffs:?} (duplicated abscissa?)"),
        }
        .fail();
    }

    Ok((zs, coeffs))
}

/// Evaluates a polynomial in Newton form and its derivative at `x`.
pub fn newton_eval(zs: &[f64], coeffs: &[f64], x: f64) -> (f64, f64) {
    let mut eval = 0.0;
    let mut deriv = 0.0;
    for (c, z) in coeffs.iter().zip(zs).rev() {
        deriv = deriv * (x - z) + eval;
        eval = eval * (x - z) + c;
    }
    (eval, deriv)
}

/// A piecewise cubic Hermite interpolation over strictly increasing abscissas.
///
/// Each segment is the Hermite polynomial matching the value and the first derivative at both of
/// its ends, so the interpolant is C1 continuous.
#[derive(Clone, Debug, PartialEq)]
pub struct HermiteSeries {
    xs: Vec<f64>,
    ys: Vec<f64>,
    derivs: Vec<f64>,
}

impl HermiteSeries {
    pub fn try_from_samples(
        xs: Vec<f64>,
        ys: Vec<f64>,
        derivs: Vec<f64>,
    ) -> Result<Self, InterpolationError> {
        ensure!(
            xs.len() >= 2,
            TooFewSamplesSnafu {
                min: 2_usize,
                got: xs.len()
            }
        );
        ensure!(
            ys.len() == xs.len(),
            LengthMismatchSnafu {
                what: "values",
                expected: xs.len(),
                got: ys.len()
            }
        );
        ensure!(
            derivs.len() == xs.len(),
            LengthMismatchSnafu {
                what: "derivatives",
                expected: xs.len(),
                got: derivs.len()
            }
        );
        for (index, pair) in xs.windows(2).enumerate() {
            ensure!(pair[1] > pair[0], NotMonotonicSnafu { index: index + 1 });
        }

        Ok(Self { xs, ys, derivs })
    }

    /// Returns the first and last abscissa
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Evaluates the interpolant at `x`.
    pub fn evaluate(&self, x: f64) -> Result<f64, InterpolationError> {
        Ok(self.evaluate_n_deriv(x)?.0)
    }

    /// Evaluates the interpolant and its derivative at `x`.
    pub fn evaluate_n_deriv(&self, x: f64) -> Result<(f64, f64), InterpolationError> {
        let (start, end) = self.domain();
        ensure!(
            (start..=end).contains(&x),
            OutOfDomainSnafu { x, start, end }
        );

        // Index of the segment [x_i, x_{i+1}] which contains x
        let i = (self.xs.partition_point(|xi| *xi <= x).max(1) - 1).min(self.xs.len() - 2);

        // Interpolate in the local coordinate of the segment to preserve precision.
        let x0 = self.xs[i];
        let (zs, coeffs) = hermite_divided_differences(
            &[0.0, self.xs[i + 1] - x0],
            &self.ys[i..i + 2],
            &self.derivs[i..i + 2],
        )?;

        Ok(newton_eval(&zs, &coeffs, x - x0))
    }
}

#[test]
fn hermite_sine_test() {
    let xs: Vec<_> = (0..8).map(|i| i as f64).collect();
    let ys: Vec<_> = xs.iter().map(|x| x.cos()).collect();
    let derivs: Vec<_> = xs.iter().map(|x| -x.sin()).collect();

    let tol = 1e-10;
    let (zs, coeffs) = hermite_divided_differences(&xs, &ys, &derivs).unwrap();

    for x in xs {
        let (eval, deriv) = newton_eval(&zs, &coeffs, x);
        assert!((eval - x.cos()).abs() < tol);
        assert!((deriv + x.sin()).abs() < tol);
    }
}

#[test]
fn hermite_series_test() {
    let xs: Vec<_> = (0..=100).map(|i| i as f64 * 0.1).collect();
    let ys: Vec<_> = xs.iter().map(|x| x.sin()).collect();
    let derivs: Vec<_> = xs.iter().map(|x| x.cos()).collect();

    let series = HermiteSeries::try_from_samples(xs, ys, derivs).unwrap();
    assert_eq!(series.domain(), (0.0, 10.0));

    let mut max_err: f64 = 0.0;
    for i in 0..1000 {
        let x = 0.00999 * i as f64;
        let (eval, deriv) = series.evaluate_n_deriv(x).unwrap();
        max_err = max_err.max((eval - x.sin()).abs());
        assert!((deriv - x.cos()).abs() < 1e-4, "deriv error at {x}");
    }
    // Cubic Hermite error bound is h^4/384 max|f''''|
    assert!(max_err < 5e-7, "max error {max_err:e}");

    // Nodes are reproduced exactly
    assert!((series.evaluate(10.0).unwrap() - 10.0_f64.sin()).abs() < 1e-15);
    assert!(series.evaluate(10.5).is_err());
    assert!(series.evaluate(-1e-3).is_err());
}

#[test]
fn hermite_series_rejects_bad_data() {
    assert_eq!(
        HermiteSeries::try_from_samples(vec![0.0], vec![1.0], vec![0.0]),
        Err(InterpolationError::TooFewSamples { min: 2, got: 1 })
    );
    assert_eq!(
        HermiteSeries::try_from_samples(vec![0.0, 1.0, 1.0], vec![1.0; 3], vec![0.0; 3]),
        Err(InterpolationError::NotMonotonic { index: 2 })
    );
    assert!(HermiteSeries::try_from_samples(vec![0.0, 1.0], vec![1.0; 3], vec![0.0; 2]).is_err());
}
