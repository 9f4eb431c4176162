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

use crate::cosmic::{EARTH_EQUATORIAL_RADIUS_KM, EARTH_ROTATION_RATE_RAD_S};
use crate::io::ConfigRepr;
use crate::linalg::Vector3;
use crate::time::Duration;
use crate::utils::{between_0_360, r2, r3};
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use typed_builder::TypedBuilder;

/// Targets closer than this to the station have no direction, only a range.
const COLLOCATED_RANGE_KM: f64 = 1e-9;

/// A ground station on a spherical body rotating about its Z axis.
///
/// The inertial frame is aligned with the body fixed frame at the start of the transfer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct GroundStation {
    #[builder(setter(into))]
    pub name: String,
    /// in degrees
    pub latitude_deg: f64,
    /// in degrees
    pub longitude_deg: f64,
    /// in km
    #[builder(default)]
    #[serde(default)]
    pub height_km: f64,
    /// in degrees
    #[builder(default)]
    #[serde(default)]
    pub elevation_mask_deg: f64,
    #[builder(default = EARTH_EQUATORIAL_RADIUS_KM)]
    #[serde(default = "default_body_radius")]
    pub body_radius_km: f64,
    #[builder(default = EARTH_ROTATION_RATE_RAD_S)]
    #[serde(default = "default_rotation_rate")]
    pub rotation_rate_rad_s: f64,
}

fn default_body_radius() -> f64 {
    EARTH_EQUATORIAL_RADIUS_KM
}

fn default_rotation_rate() -> f64 {
    EARTH_ROTATION_RATE_RAD_S
}

/// Pointing of a target as seen from a ground station
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AzElRange {
    /// Clockwise from the north, in [0, 360)
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

impl fmt::Display for AzElRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "az.: {:.3} deg    el.: {:.3} deg    range: {:.3} km",
            self.azimuth_deg, self.elevation_deg, self.range_km
        )
    }
}

impl GroundStation {
    pub fn dss65_madrid(elevation_mask_deg: f64) -> Self {
        Self::builder()
            .name("Madrid")
            .latitude_deg(40.427_222)
            .longitude_deg(4.250_556)
            .height_km(0.834_939)
            .elevation_mask_deg(elevation_mask_deg)
            .build()
    }

    pub fn dss34_canberra(elevation_mask_deg: f64) -> Self {
        Self::builder()
            .name("Canberra")
            .latitude_deg(-35.398_333)
            .longitude_deg(148.981_944)
            .height_km(0.691_750)
            .elevation_mask_deg(elevation_mask_deg)
            .build()
    }

    /// Body fixed position of the station, in km
    pub fn position_fixed_km(&self) -> Vector3<f64> {
        let radius = self.body_radius_km + self.height_km;
        let (s_lat, c_lat) = self.latitude_deg.to_radians().sin_cos();
        let (s_lon, c_lon) = self.longitude_deg.to_radians().sin_cos();
        Vector3::new(radius * c_lat * c_lon, radius * c_lat * s_lon, radius * s_lat)
    }

    /// Inertial position of the station after the body rotated for `elapsed`, in km
    pub fn position_inertial_km(&self, elapsed: Duration) -> Vector3<f64> {
        r3(-self.rotation_angle(elapsed)) * self.position_fixed_km()
    }

    /// Computes the azimuth, elevation, and range of the target, whose inertial position is in km.
    pub fn azimuth_elevation_of(&self, target_inertial_km: &Vector3<f64>, elapsed: Duration) -> AzElRange {
        let target_fixed = r3(self.rotation_angle(elapsed)) * target_inertial_km;
        let rho_fixed = target_fixed - self.position_fixed_km();

        // Rotate the relative position into the South East Zenith frame of the station
        let dcm_fixed2sez =
            r2(FRAC_PI_2 - self.latitude_deg.to_radians()) * r3(self.longitude_deg.to_radians());
        let rho_sez = dcm_fixed2sez * rho_fixed;

        let range_km = rho_sez.norm();
        if range_km < COLLOCATED_RANGE_KM {
            warn!(
                "{} is collocated with {}, reporting it at the zenith",
                target_inertial_km.transpose(),
                self.name
            );
            return AzElRange {
                azimuth_deg: 0.0,
                elevation_deg: 90.0,
                range_km,
            };
        }

        let elevation_deg = (rho_sez.z / range_km).asin().to_degrees();
        if (90.0 - elevation_deg.abs()) < 1e-6 {
            warn!(
                "{} is (almost) directly over {}, azimuth is ill defined",
                target_inertial_km.transpose(),
                self.name
            );
        }
        // Azimuth is measured from the north, i.e. minus the south axis, towards the east
        let azimuth_deg = between_0_360(rho_sez.y.atan2(-rho_sez.x).to_degrees());

        AzElRange {
            azimuth_deg,
            elevation_deg,
            range_km,
        }
    }

    /// Returns whether the target is above the elevation mask of this station
    pub fn is_visible(&self, target_inertial_km: &Vector3<f64>, elapsed: Duration) -> bool {
        self.azimuth_elevation_of(target_inertial_km, elapsed)
            .elevation_deg
            >= self.elevation_mask_deg
    }

    fn rotation_angle(&self, elapsed: Duration) -> f64 {
        self.rotation_rate_rad_s * elapsed.to_seconds()
    }
}

impl ConfigRepr for GroundStation {}

impl fmt::Display for GroundStation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (lat.: {:.4} deg    long.: {:.4} deg    alt.: {:.3} m)",
            self.name,
            self.latitude_deg,
            self.longitude_deg,
            self.height_km * 1e3,
        )
    }
}
