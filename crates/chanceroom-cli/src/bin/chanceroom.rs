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

//! The ChanceRoom CLI deploys and administers ChanceRoom contracts.

const CLI_LONG_ABOUT: &str = r#"
The ChanceRoom CLI deploys the ChanceRoomFactory, room implementations and ticket templates,
registers them, and opens rooms by cloning an implementation and initializing the clone.

Networks are selected with --network. Factory addresses are built in for Polygon and
Polygon Mumbai; other networks need a factory_address entry in chanceroom.toml.
"#;

use anyhow::Result;
use chanceroom::{CodedError, DeployError};
use chanceroom_cli::{
    commands::{
        BootstrapCmd, ConfigCmd, EstimateCmd, FactoryCommands, ImplementationCommands,
        RoomCommands, TemplateCommands, VerifyCmd,
    },
    config::GlobalConfig,
    exit_code,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Subcommand, Clone, Debug)]
enum Command {
    /// Commands operating on the ChanceRoomFactory
    #[command(subcommand)]
    Factory(FactoryCommands),

    /// Commands for room implementation contracts
    #[command(subcommand)]
    Implementation(ImplementationCommands),

    /// Commands for ticket template contracts
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Commands for ChanceRoom clones
    #[command(subcommand)]
    Room(RoomCommands),

    /// Estimate the fee of deploying a contract
    Estimate(EstimateCmd),

    /// Verify a deployed contract on the block explorer
    Verify(VerifyCmd),

    /// Deploy everything from scratch and open a first room
    Bootstrap(Box<BootstrapCmd>),

    /// Show the resolved configuration
    Config(ConfigCmd),
}

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "CLI for ChanceRoom deployments",
    long_about = CLI_LONG_ABOUT,
    arg_required_else_help = true
)]
struct MainArgs {
    /// Subcommand to run
    #[command(subcommand)]
    command: Command,

    #[command(flatten, next_help_heading = "Global Options")]
    config: GlobalConfig,
}

#[tokio::main]
async fn main() {
    let args = MainArgs::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(args.config.log_level.into())
                .from_env_lossy(),
        )
        .init();

    let cancel = args.config.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling pending transaction waits");
            cancel.cancel();
        }
    });

    if let Err(err) = run(&args).await {
        let code = match err.downcast_ref::<DeployError>() {
            Some(deploy_err) => format!("{} ", deploy_err.code()),
            None => String::new(),
        };
        eprintln!("{} {code}{err:#}", "Error:".red().bold());
        std::process::exit(exit_code(&err));
    }
}

async fn run(args: &MainArgs) -> Result<()> {
    let config = &args.config;
    match &args.command {
        Command::Factory(cmd) => cmd.run(config).await,
        Command::Implementation(cmd) => cmd.run(config).await,
        Command::Template(cmd) => cmd.run(config).await,
        Command::Room(cmd) => cmd.run(config).await,
        Command::Estimate(cmd) => cmd.run(config).await,
        Command::Verify(cmd) => cmd.run(config).await,
        Command::Bootstrap(cmd) => cmd.run(config).await,
        Command::Config(cmd) => cmd.run(config).await,
    }
}
