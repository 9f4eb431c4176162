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
    FlatFunctionSnafu, InvalidBracketSnafu, MaxIterReachedSnafu, NotBracketedSnafu,
    RootFinderError, RootFinderSettings, RootSolution,
};

/// Finds a root of `f` in the `[lower, upper]` bracket with Brent's method.
///
/// The function is fallible: any error it returns is propagated as is, which allows the objective to
/// signal that a trial point is invalid rather than returning a NaN. Root finder failures are
/// converted into the caller's error type.
///
/// # Limitations
/// The bracket must hold a sign change. If the function is not monotonic on the bracket, any of the
/// roots may be returned.
pub fn brent<E, F>(
    mut f: F,
    lower: f64,
    upper: f64,
    settings: &RootFinderSettings,
) -> Result<RootSolution, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<RootFinderError>,
{
    if !(lower.is_finite() && upper.is_finite() && lower < upper) {
        return Err(InvalidBracketSnafu { lower, upper }.build().into());
    }

    let has_converged = |xa: f64, xb: f64| (xa - xb).abs() <= settings.x_tolerance;
    let arrange = |a: f64, ya: f64, b: f64, yb: f64| {
        if ya.abs() > yb.abs() {
            (a, ya, b, yb)
        } else {
            (b, yb, a, ya)
        }
    };

    let mut xa = lower;
    let mut xb = upper;
    let mut ya = f(xa)?;
    let mut yb = f(xb)?;

    // Check if we're already at the root
    if ya.abs() <= settings.residual_tolerance {
        return Ok(RootSolution {
            root: xa,
            residual: ya,
            iterations: 0,
        });
    } else if yb.abs() <= settings.residual_tolerance {
        return Ok(RootSolution {
            root: xb,
            residual: yb,
            iterations: 0,
        });
    }

    if ya * yb > 0.0 {
        return Err(NotBracketedSnafu {
            lower,
            upper,
            f_lower: ya,
            f_upper: yb,
        }
        .build()
        .into());
    }

    // Keep b as the best estimate
    (xa, ya, xb, yb) = arrange(xa, ya, xb, yb);
    let (mut xc, mut yc, mut xd) = (xa, ya, xa);
    let mut flag = true;

    for iteration in 0..settings.max_iterations {
        if yb.abs() <= settings.residual_tolerance || has_converged(xa, xb) {
            return Ok(RootSolution {
                root: xb,
                residual: yb,
                iterations: iteration,
            });
        }

        let mut s = if (ya - yc).abs() > f64::EPSILON && (yb - yc).abs() > f64::EPSILON {
            // Inverse quadratic interpolation
            xa * yb * yc / ((ya - yb) * (ya - yc))
                + xb * ya * yc / ((yb - ya) * (yb - yc))
                + xc * ya * yb / ((yc - ya) * (yc - yb))
        } else {
            // Secant
            xb - yb * (xb - xa) / (yb - ya)
        };
        let cond1 = (s - xb) * (s - (3.0 * xa + xb) / 4.0) > 0.0;
        let cond2 = flag && (s - xb).abs() >= (xb - xc).abs() / 2.0;
        let cond3 = !flag && (s - xb).abs() >= (xc - xd).abs() / 2.0;
        let cond4 = flag && has_converged(xb, xc);
        let cond5 = !flag && has_converged(xc, xd);
        if cond1 || cond2 || cond3 || cond4 || cond5 {
            s = (xa + xb) / 2.0;
            flag = true;
        } else {
            flag = false;
        }

        let ys = f(s)?;
        debug!("Brent #{iteration}: f({s}) = {ys:e}");
        xd = xc;
        xc = xb;
        yc = yb;
        if ya * ys < 0.0 {
            // Root bracketed between a and s
            (xa, ya, xb, yb) = arrange(xa, ya, s, ys);
        } else {
            // Root bracketed between s and b
            (xa, ya, xb, yb) = arrange(s, ys, xb, yb);
        }
    }

    error!(
        "Brent solver failed after {} iterations",
        settings.max_iterations
    );
    Err(MaxIterReachedSnafu {
        iterations: settings.max_iterations,
        estimate: xb,
        residual: yb,
    }
    .build()
    .into())
}

/// Finds a root of `f` with the secant method, starting from the initial guess.
///
/// Every iterate is clamped to the `[lower, upper]` bounds. There is no bracketing requirement, so
/// convergence is faster than Brent when the guess is good, but is not guaranteed.
pub fn secant<E, F>(
    mut f: F,
    initial_guess: f64,
    lower: f64,
    upper: f64,
    settings: &RootFinderSettings,
) -> Result<RootSolution, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<RootFinderError>,
{
    if !(lower.is_finite() && upper.is_finite() && lower < upper) {
        return Err(InvalidBracketSnafu { lower, upper }.build().into());
    }

    let mut x_prev = initial_guess.clamp(lower, upper);
    let mut y_prev = f(x_prev)?;
    if y_prev.abs() <= settings.residual_tolerance {
        return Ok(RootSolution {
            root: x_prev,
            residual: y_prev,
            iterations: 0,
        });
    }

    // Second point a small step inside the bounds
    let probe = 1e-3 * (upper - lower);
    let mut x = if x_prev + probe <= upper {
        x_prev + probe
    } else {
        x_prev - probe
    };
    let mut y = f(x)?;

    for iteration in 0..settings.max_iterations {
        if y.abs() <= settings.residual_tolerance {
            return Ok(RootSolution {
                root: x,
                residual: y,
                iterations: iteration,
            });
        }
        if y == y_prev {
            return Err(FlatFunctionSnafu { estimate: x }.build().into());
        }

        let x_next = (x - y * (x - x_prev) / (y - y_prev)).clamp(lower, upper);
        let step = x_next - x;
        x_prev = x;
        y_prev = y;
        x = x_next;
        y = f(x)?;
        debug!("secant #{iteration}: f({x}) = {y:e}");

        if step.abs() <= settings.x_tolerance {
            return Ok(RootSolution {
                root: x,
                residual: y,
                iterations: iteration + 1,
            });
        }
    }

    error!(
        "secant solver failed after {} iterations",
        settings.max_iterations
    );
    Err(MaxIterReachedSnafu {
        iterations: settings.max_iterations,
        estimate: x,
        residual: y,
    }
    .build()
    .into())
}

#[cfg(test)]
mod ut_root_finding {
    use super::*;

    fn cubic(x: f64) -> Result<f64, RootFinderError> {
        Ok(x.powi(3) - 2.0 * x - 5.0)
    }

    const CUBIC_ROOT: f64 = 2.094_551_481_542_326_5;

    #[test]
    fn brent_cubic() {
        let settings = RootFinderSettings::default();
        let sol = brent(cubic, 2.0, 3.0, &settings).unwrap();
        assert!((sol.root - CUBIC_ROOT).abs() < 1e-11, "{sol}");
        assert!(sol.residual.abs() < 1e-10);
        assert!(sol.iterations < 20);
    }

    #[test]
    fn secant_cubic() {
        let settings = RootFinderSettings::default();
        let sol = secant(cubic, 2.5, 0.0, 4.0, &settings).unwrap();
        assert!((sol.root - CUBIC_ROOT).abs() < 1e-11, "{sol}");
    }

    #[test]
    fn root_on_bound() {
        let settings = RootFinderSettings::default();
        let sol = brent(|x: f64| Ok::<f64, RootFinderError>(x - 1.0), 1.0, 2.0, &settings).unwrap();
        assert_eq!(sol.root, 1.0);
        assert_eq!(sol.iterations, 0);
    }

    #[test]
    fn not_bracketed() {
        let settings = RootFinderSettings::default();
        let err = brent(cubic, 3.0, 4.0, &settings).unwrap_err();
        assert!(matches!(err, RootFinderError::NotBracketed { .. }));
        let err = brent(cubic, 4.0, 3.0, &settings).unwrap_err();
        assert!(matches!(err, RootFinderError::InvalidBracket { .. }));
    }

    #[test]
    fn max_iterations() {
        let settings = RootFinderSettings::builder()
            .max_iterations(2)
            .x_tolerance(1e-15)
            .residual_tolerance(0.0)
            .build();
        match brent(cubic, 0.0, 10.0, &settings).unwrap_err() {
            RootFinderError::MaxIterReached {
                iterations,
                residual,
                ..
            } => {
                assert_eq!(iterations, 2);
                assert!(residual.abs() > 0.0);
            }
            e => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn objective_errors_propagate() {
        #[derive(Debug, PartialEq)]
        enum ObjError {
            Invalid(f64),
            Solver(RootFinderError),
        }
        impl From<RootFinderError> for ObjError {
            fn from(e: RootFinderError) -> Self {
                Self::Solver(e)
            }
        }

        let settings = RootFinderSettings::default();
        let err = brent(
            |x: f64| {
                if x > 2.5 {
                    Err(ObjError::Invalid(x))
                } else {
                    Ok(x - 2.0)
                }
            },
            0.0,
            3.0,
            &settings,
        )
        .unwrap_err();
        assert_eq!(err, ObjError::Invalid(3.0));
    }
}
