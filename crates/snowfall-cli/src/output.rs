use std::io::Write;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use snowfall::{Components, Config, IdGenerator, SnowflakeId};

#[derive(Serialize)]
struct Generated {
    id: SnowflakeId,
}

#[derive(Serialize)]
struct Decoded {
    id: SnowflakeId,
    time: String,
    #[serde(flatten)]
    components: Components,
}

/// Writes `count` new IDs, one per line.
pub fn generate<W, G>(out: &mut W, generator: &G, count: usize, json: bool) -> anyhow::Result<()>
where
    W: Write,
    G: IdGenerator,
{
    for _ in 0..count {
        let id = generator.next_id()?;
        if json {
            serde_json::to_writer(&mut *out, &Generated { id })?;
            writeln!(out)?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Writes the fields of each ID, one per line, interpreted with the layout
/// and epoch of `config`.
pub fn decode<W: Write>(
    out: &mut W,
    config: &Config,
    ids: &[u64],
    json: bool,
) -> anyhow::Result<()> {
    for &raw in ids {
        let id = SnowflakeId::from_raw(raw);
        if id.to_i64() < 0 {
            tracing::warn!(%id, "reserved top bit is set, not an id this layout produces");
        }

        let components = config.layout.decode(id);
        let unix_ms = components.unix_time(config.epoch).as_millis() as i64;
        let time = DateTime::<Utc>::from_timestamp_millis(unix_ms)
            .with_context(|| format!("timestamp of {id} is out of range"))?
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        if json {
            serde_json::to_writer(
                &mut *out,
                &Decoded {
                    id,
                    time,
                    components,
                },
            )?;
            writeln!(out)?;
        } else {
            writeln!(
                out,
                "{id}\ttime={time} delta_ms={} group={} worker={} sequence={}",
                components.timestamp,
                components.group_id,
                components.worker_id,
                components.sequence,
            )?;
        }
    }
    out.flush()?;
    Ok(())
}
