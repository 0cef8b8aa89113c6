#![doc = include_str!("../README.md")]

mod config;
mod output;
mod telemetry;

use clap::Parser;
use config::{CliArgs, CliConfig, Command};
use snowfall::{IdGenerator, LockIdGenerator};
use telemetry::init_telemetry;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;

    let mut stdout = std::io::stdout().lock();
    match &config.command {
        Command::Generate { count } => {
            let generator = LockIdGenerator::configured(&config.generator)?;
            tracing::debug!(
                group_id = generator.identity().group_id(),
                worker_id = generator.identity().worker_id(),
                epoch_ms = config.generator.epoch_millis(),
                "generator ready"
            );
            output::generate(&mut stdout, &generator, *count, config.json)?;
        }
        Command::Decode { ids } => {
            output::decode(&mut stdout, &config.generator, ids, config.json)?;
        }
    }
    Ok(())
}
