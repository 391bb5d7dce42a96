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

//! The ChanceRoom CLI deploys and administers the ChanceRoom factory, its room clones and
//! ticket templates.

#![deny(missing_docs)]

pub mod commands;
pub mod config;
pub mod display;

use chanceroom::{ConfigError, DeployError};

/// Process exit code for an error returned by a command.
///
/// Library errors keep their category code through any added context; everything else
/// exits with 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<DeployError>() {
        return err.exit_code();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    1
}
