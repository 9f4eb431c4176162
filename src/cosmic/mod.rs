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

use crate::linalg::{Vector3, Vector6};
use crate::time::{Duration, Unit};

/// Astronomical unit, in kilometers, according to the [IAU](https://www.iau.org/public/themes/measuring/).
pub const AU: f64 = 149_597_870.700;

/// Julian year, in seconds.
pub const JULIAN_YEAR_S: f64 = 365.25 * 86_400.0;

/// Gravitational parameter of the Sun, in km^3/s^2 (DE440).
pub const SUN_GM_KM3_S2: f64 = 132_712_440_041.279_42;

/// Equatorial radius of the Earth, in km.
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6_378.136_3;

/// Mean rotation rate of the Earth, in rad/s.
pub const EARTH_ROTATION_RATE_RAD_S: f64 = 7.292_115_146_706_979e-5;

/// Scaling between physical units (km, s) and the normalized units of the shaping methods.
///
/// The shaping is computed with a distance unit of one AU and a time unit of one Julian year: this
/// keeps the boundary condition matrix and the time of flight residuals of order one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Normalization {
    pub distance_km: f64,
    pub time_s: f64,
}

impl Normalization {
    /// Heliocentric normalization: distances in AU and times in Julian years.
    pub const fn heliocentric() -> Self {
        Self {
            distance_km: AU,
            time_s: JULIAN_YEAR_S,
        }
    }

    pub fn velocity_km_s(&self) -> f64 {
        self.distance_km / self.time_s
    }

    pub fn acceleration_km_s2(&self) -> f64 {
        self.distance_km / self.time_s.powi(2)
    }

    /// Normalizes a gravitational parameter provided in km^3/s^2.
    pub fn gm(&self, gm_km3_s2: f64) -> f64 {
        gm_km3_s2 * self.time_s.powi(2) / self.distance_km.powi(3)
    }

    /// Normalizes a Cartesian state provided in km and km/s.
    pub fn state(&self, state_km_s: &Vector6<f64>) -> Vector6<f64> {
        let mut normalized = *state_km_s;
        for i in 0..3 {
            normalized[i] /= self.distance_km;
            normalized[i + 3] /= self.velocity_km_s();
        }
        normalized
    }

    /// Converts a normalized Cartesian state back to km and km/s.
    pub fn state_km_s(&self, normalized: &Vector6<f64>) -> Vector6<f64> {
        let mut physical = *normalized;
        for i in 0..3 {
            physical[i] *= self.distance_km;
            physical[i + 3] *= self.velocity_km_s();
        }
        physical
    }

    pub fn acceleration_to_km_s2(&self, normalized: &Vector3<f64>) -> Vector3<f64> {
        normalized * self.acceleration_km_s2()
    }

    pub fn duration(&self, duration: Duration) -> f64 {
        duration.to_seconds() / self.time_s
    }

    pub fn to_duration(&self, normalized_time: f64) -> Duration {
        (normalized_time * self.time_s) * Unit::Second
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::heliocentric()
    }
}

#[cfg(test)]
mod ut_normalization {
    use super::*;

    #[test]
    fn earth_speed_is_two_pi() {
        let norm = Normalization::heliocentric();
        let mu = norm.gm(SUN_GM_KM3_S2);
        // A circular orbit at 1 AU has a period of about one year
        assert!((mu.sqrt() - 2.0 * std::f64::consts::PI).abs() < 1e-3);

        let state = Vector6::new(AU, 0.0, 0.0, 0.0, 29.78, 0.0);
        let back = norm.state_km_s(&norm.state(&state));
        assert!((back - state).norm() < 1e-6);

        let tof = 250.0 * Unit::Day;
        assert!((norm.to_duration(norm.duration(tof)) - tof).to_seconds().abs() < 1e-6);
    }
}
