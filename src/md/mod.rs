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

/// Shape-based design of low-thrust transfers
pub mod shaping;

pub mod prelude {
    pub use super::shaping::exposin::{ExposinSettings, ExposinShaping};
    pub use super::shaping::sweep::{tof_sweep, SweepPoint, SweepSummary};
    pub use super::shaping::{
        BoundaryState, CompositeShapeFunction, ShapeFunction, ShapedSample, ShapingProblem,
        ShapingSettings, TimeAngleMap,
    };
    pub use crate::cosmic::{Normalization, AU, SUN_GM_KM3_S2};
    pub use crate::linalg::{Vector3, Vector6};
    pub use crate::propagators::{propagate_shaped, FullPropagationResult};
    pub use crate::tools::{hohmann_delta_v, HohmannTransfer};
    pub use crate::time::{Duration, Unit};
    pub use crate::ShapingError;
}
