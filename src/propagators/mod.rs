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

use snafu::prelude::*;

// Re-Export
mod propagator;
pub use propagator::*;
mod rk_methods;
pub use rk_methods::*;
mod shaped;
pub use shaped::*;

use crate::{dynamics::DynamicsError, errors::ShapingError, time::Duration};

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PropagationError {
    #[snafu(display("encountered a dynamics error {source}"))]
    Dynamics { source: DynamicsError },
    #[snafu(display("could not seed the propagation from the shaped trajectory: {source}"))]
    Shaping { source: ShapingError },
    #[snafu(display("propagation step must be strictly positive, got {step}"))]
    InvalidStep { step: Duration },
}
