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

use crate::errors::{InvalidBoundaryStateSnafu, ShapingError};
use snafu::ensure;
use std::f64::consts::PI;
use std::fmt;

/// Impulsive Hohmann transfer between two coplanar circular orbits
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HohmannTransfer {
    /// Departure burn, in km/s
    pub departure_dv_km_s: f64,
    /// Arrival burn, in km/s
    pub arrival_dv_km_s: f64,
    /// Half period of the transfer ellipse, in seconds
    pub tof_s: f64,
}

impl HohmannTransfer {
    pub fn total_dv_km_s(&self) -> f64 {
        self.departure_dv_km_s + self.arrival_dv_km_s
    }
}

impl fmt::Display for HohmannTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hohmann: {:.3} + {:.3} = {:.3} km/s in {:.1} days",
            self.departure_dv_km_s,
            self.arrival_dv_km_s,
            self.total_dv_km_s(),
            self.tof_s / 86_400.0
        )
    }
}

/// Computes the Hohmann transfer from the circular orbit of radius `r1_km` to that of radius `r2_km`.
///
/// This is the impulsive reference against which the ΔV of a shaped transfer can be compared.
pub fn hohmann_delta_v(
    gm_km3_s2: f64,
    r1_km: f64,
    r2_km: f64,
) -> Result<HohmannTransfer, ShapingError> {
    ensure!(
        gm_km3_s2 > 0.0 && r1_km > 0.0 && r2_km > 0.0,
        InvalidBoundaryStateSnafu {
            msg: format!("Hohmann transfer needs positive GM and radii, got {gm_km3_s2}, {r1_km}, {r2_km}")
        }
    );

    let sma = 0.5 * (r1_km + r2_km);
    let v1 = (gm_km3_s2 / r1_km).sqrt();
    let v2 = (gm_km3_s2 / r2_km).sqrt();
    let vis_viva = |r: f64| (gm_km3_s2 * (2.0 / r - 1.0 / sma)).sqrt();

    Ok(HohmannTransfer {
        departure_dv_km_s: (vis_viva(r1_km) - v1).abs(),
        arrival_dv_km_s: (v2 - vis_viva(r2_km)).abs(),
        tof_s: PI * (sma.powi(3) / gm_km3_s2).sqrt(),
    })
}
