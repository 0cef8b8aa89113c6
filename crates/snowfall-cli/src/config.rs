use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use core::time::Duration;
use snowfall::{Config, Identity, Reseed};

/// Command-line arguments for the `snowfall` binary.
///
/// Every generator setting can also come from the environment (or a `.env`
/// file in the working directory), so a deployment can pin its identity
/// once and call the tool without flags.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowfall",
    version,
    about = "Mint and decode 64-bit Snowflake-style IDs"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Worker id within the group (0..=31 with the standard layout).
    ///
    /// When unset the worker id is derived from the local hardware address,
    /// falling back to a random value.
    ///
    /// Environment variable: `SNOWFALL_WORKER_ID`
    #[arg(long, global = true, env = "SNOWFALL_WORKER_ID")]
    pub worker_id: Option<i64>,

    /// Group id, e.g. a data-center or business line.
    ///
    /// Environment variable: `SNOWFALL_GROUP_ID`
    #[arg(long, global = true, env = "SNOWFALL_GROUP_ID", default_value_t = 0)]
    pub group_id: i64,

    /// Custom epoch as an RFC 3339 timestamp, overriding the preset's.
    ///
    /// Example: "2020-01-01T00:00:00Z"
    ///
    /// Environment variable: `SNOWFALL_EPOCH`
    #[arg(long, global = true, env = "SNOWFALL_EPOCH")]
    pub epoch: Option<String>,

    /// Parameter preset the other options are applied on top of.
    #[arg(long, global = true, value_enum, default_value_t = Preset::Standard)]
    pub preset: Preset,

    /// Restart the sequence at zero on every new millisecond instead of at a
    /// small random value.
    #[arg(long, global = true, default_value_t = false)]
    pub reseed_zero: bool,

    /// Print JSON instead of plain text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print freshly generated IDs, one per line.
    Generate {
        /// Number of IDs to generate.
        #[arg(short = 'n', long, default_value_t = 30)]
        count: usize,
    },
    /// Split IDs into timestamp, group, worker and sequence.
    Decode {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 2020-01-01 epoch, sequence reseeded below 32.
    Standard,
    /// Twitter epoch, sequence reseeded below 10.
    Legacy,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub command: Command,
    pub generator: Config,
    pub json: bool,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let mut generator = match args.preset {
            Preset::Standard => Config::standard(),
            Preset::Legacy => Config::legacy(),
        };

        if let Some(epoch) = &args.epoch {
            generator.epoch = parse_epoch(epoch)?;
        }
        if args.reseed_zero {
            generator.reseed = Reseed::Zero;
        }
        generator.group_id = args.group_id;
        generator.worker_id = args.worker_id;

        if let Command::Generate { count: 0 } = args.command {
            bail!("--count must be greater than 0");
        }

        generator.validate()?;
        // An unset worker id is derived later; only the group can be checked
        // here.
        Identity::new(
            &generator.layout,
            args.worker_id.unwrap_or(0),
            args.group_id,
        )?;

        Ok(Self {
            command: args.command,
            generator,
            json: args.json,
        })
    }
}

fn parse_epoch(value: &str) -> anyhow::Result<Duration> {
    let epoch = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("SNOWFALL_EPOCH is not an RFC 3339 timestamp: {value:?}"))?
        .with_timezone(&Utc);
    let millis = epoch.timestamp_millis();
    if millis < 0 {
        bail!("SNOWFALL_EPOCH ({epoch}) must not be before 1970-01-01T00:00:00Z");
    }
    if epoch > Utc::now() {
        bail!("SNOWFALL_EPOCH ({epoch}) is in the future");
    }
    Ok(Duration::from_millis(millis as u64))
}
