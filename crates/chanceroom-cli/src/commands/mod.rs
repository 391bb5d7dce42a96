// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Commands of the ChanceRoom CLI, one module per group.

mod bootstrap;
mod config;
mod estimate;
mod factory;
mod implementation;
mod room;
mod template;
mod verify;

pub use bootstrap::BootstrapCmd;
pub use config::ConfigCmd;
pub use estimate::EstimateCmd;
pub use factory::{FactoryAddImpl, FactoryAddTemplate, FactoryCommands, FactoryDeploy, FactoryNames};
pub use implementation::{ImplementationCommands, ImplementationDeploy};
pub use room::{RoomCommands, RoomList, RoomNew, RoomShow};
pub use template::{TemplateCommands, TemplateDeploy};
pub use verify::VerifyCmd;

use chanceroom::{tasks::Registration, Deployer};

use crate::display::DisplayManager;

/// Display manager labelled with the deployer's chain.
pub(crate) fn display_for(deployer: &Deployer, network: &str) -> DisplayManager {
    DisplayManager::with_network(format!("{network} ({})", deployer.chain_id()))
}

pub(crate) fn show_registration(display: &DisplayManager, label: &str, registration: &Registration) {
    display.outcome("Registered", &registration.outcome);
    display.names(label, &registration.names);
}
