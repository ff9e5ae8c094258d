// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Creation of VLTI/MATISSE observing blocks (OBs) for ESO's Phase 2 system.

Night plans are parsed into runs, nights and observation groups; every target
of a group is composed into an OB from catalog data, configurable defaults and
templates; finished OBs are written as OBX files or uploaded.
 */

pub mod catalog;
mod cli;
pub mod constants;
pub mod coord;
pub mod instrument;
pub mod night_plan;
pub mod ob;
pub mod pipeline;
pub mod settings;
pub mod upload;

// Re-exports.
pub use cli::{P2ob, P2obError};
pub use night_plan::NightPlan;
pub use ob::{Composer, ObDescriptor, ObRequest};
pub use pipeline::{Pipeline, RunSummary};
pub use settings::Configuration;
