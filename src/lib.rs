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

/*! # lowthrust-shaping

Shape-based design of low-thrust interplanetary transfers.

The trajectory is not propagated: its radius and elevation are closed-form functions of the swept
azimuth angle, whose coefficients are fixed by the boundary states, and a single free coefficient is
tuned until the time of flight matches the requirement. The resulting thrust profile can then be
handed to a numerical propagator to validate the shape in full two-body dynamics.

```no_run
use lowthrust_shaping::cosmic::SUN_GM_KM3_S2;
use lowthrust_shaping::linalg::Vector6;
use lowthrust_shaping::md::shaping::{ShapingProblem, ShapingSettings};
use lowthrust_shaping::time::Unit;

let earth = Vector6::new(149_597_870.7, 0.0, 0.0, 0.0, 29.784_691_83, 0.0);
let mars = Vector6::new(-224_396_806.05, 0.0, 0.0, 0.0, -24.318_900_63, 0.0);

let problem = ShapingProblem::new(
    earth,
    mars,
    250.0 * Unit::Day,
    0,
    SUN_GM_KM3_S2,
    ShapingSettings::default(),
)
.unwrap();

println!("ΔV = {:.3} km/s", problem.delta_v_km_s().unwrap());
```
*/

/// Fixed step propagators used to fly the shaped thrust profile in two-body dynamics.
pub mod propagators;

/// Dynamics and thrust profiles which can be propagated.
pub mod dynamics;

/// Physical constants and the normalization used by the shaping methods.
pub mod cosmic;

/// Utility functions shared by different modules, and which may be useful to engineers.
pub mod utils;

mod errors;
/// Functions which may fail will return an error, the shaping itself never panics.
pub use self::errors::ShapingError;

/// Configuration representations, loaded from YAML.
pub mod io;

/// Ground station pointing geometry.
pub mod od;

/// All of the mission design tools: spherical shaping, exposins, and time of flight sweeps.
pub mod md;

/// Simple tools (e.g. Hohmann transfer)
pub mod tools;

/// Root finding module
pub mod opti;

/// Interpolation and quadrature module
pub mod polyfit;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}
