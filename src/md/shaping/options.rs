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

use crate::errors::{InvalidSettingsSnafu, ShapingError};
use crate::io::{duration_from_str, duration_to_str, ConfigRepr};
use crate::opti::RootFinderSettings;
use crate::polyfit::QuadratureSettings;
use crate::time::{Duration, Unit};
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use typed_builder::TypedBuilder;

/// Settings of the spherical shaping.
///
/// ```
/// use lowthrust_shaping::md::prelude::*;
/// use lowthrust_shaping::io::ConfigRepr;
///
/// let settings = ShapingSettings::loads(
///     "free_coefficient_bracket: [-0.1, 0.0]\ntime_step: 12 h\nquadrature:\n  order: 20\n",
/// )
/// .unwrap();
/// assert_eq!(settings.free_coefficient_bracket, (-0.1, 0.0));
/// assert_eq!(settings.quadrature.order, 20);
/// assert_eq!(settings.quadrature.segments, 8);
/// assert_eq!(settings.time_step, 12 * Unit::Hour);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct ShapingSettings {
    #[builder(default)]
    #[serde(default)]
    pub quadrature: QuadratureSettings,
    #[builder(default)]
    #[serde(default)]
    pub root_finder: RootFinderSettings,
    /// Search interval of the free coefficient of the inverse radius
    #[builder(default = (-1.0, 1.0))]
    #[serde(default = "default_bracket")]
    pub free_coefficient_bracket: (f64, f64),
    /// Starting point of the secant method, defaults to the middle of the bracket
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub initial_guess: Option<f64>,
    /// Approximate time between two samples of the time to azimuth map
    #[builder(default_code = "1 * Unit::Day")]
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str",
        default = "default_time_step"
    )]
    pub time_step: Duration,
}

fn default_bracket() -> (f64, f64) {
    (-1.0, 1.0)
}

fn default_time_step() -> Duration {
    1 * Unit::Day
}

impl ShapingSettings {
    /// Checks that these settings can be used, returning an `InvalidSettings` error otherwise.
    pub fn validate(&self) -> Result<(), ShapingError> {
        let (lower, upper) = self.free_coefficient_bracket;
        ensure!(
            lower.is_finite() && upper.is_finite() && lower < upper,
            InvalidSettingsSnafu {
                msg: format!("free coefficient bracket [{lower}, {upper}] is empty")
            }
        );
        if let Some(guess) = self.initial_guess {
            ensure!(
                (lower..=upper).contains(&guess),
                InvalidSettingsSnafu {
                    msg: format!("initial guess {guess} outside of [{lower}, {upper}]")
                }
            );
        }
        ensure!(
            self.quadrature.order > 0 && self.quadrature.segments > 0,
            InvalidSettingsSnafu {
                msg: format!("{}", self.quadrature)
            }
        );
        ensure!(
            self.time_step > Duration::ZERO,
            InvalidSettingsSnafu {
                msg: format!("time step must be positive, got {}", self.time_step)
            }
        );
        ensure!(
            self.root_finder.max_iterations > 0,
            InvalidSettingsSnafu {
                msg: "root finder needs at least one iteration"
            }
        );
        Ok(())
    }

    /// Starting point of the secant method
    pub fn secant_guess(&self) -> f64 {
        let (lower, upper) = self.free_coefficient_bracket;
        self.initial_guess.unwrap_or(0.5 * (lower + upper))
    }
}

impl Default for ShapingSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Display for ShapingSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; {}; bracket [{}, {}]; time step {}",
            self.quadrature,
            self.root_finder,
            self.free_coefficient_bracket.0,
            self.free_coefficient_bracket.1,
            self.time_step
        )
    }
}

impl ConfigRepr for ShapingSettings {}
