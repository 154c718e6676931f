use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use ned_io::{assemble, export_tracks, Format, HomePolicy, LogReader};
use std::path::PathBuf;

use config::RunConfig;

mod config;

#[derive(Parser)]
#[command(author, version, about = "Convert telemetry log positions into a local north/east/down frame")]
struct Args {
    /// Telemetry log to read
    #[arg(long)]
    log: Option<PathBuf>,
    /// Load run settings from YAML; other flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for the exported series
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// csv or json
    #[arg(long)]
    format: Option<Format>,
    /// What to do with positions logged before the home: discard or buffer
    #[arg(long)]
    home_policy: Option<HomePolicy>,
    /// Abort on the first malformed or out-of-range record
    #[arg(long, default_value_t = false)]
    strict: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<RunConfig> {
        let mut config = match (&self.config, &self.log) {
            (Some(path), _) => RunConfig::load(path)?,
            (None, Some(log)) => RunConfig::from_log(log.clone()),
            (None, None) => bail!("either --log or --config is required"),
        };

        if let Some(log) = self.log {
            config.log = log;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(policy) = self.home_policy {
            config.home_policy = policy;
        }
        config.strict |= self.strict;

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Args::parse().into_config()?;
    info!(
        "reading {} (home policy {}, strict {})",
        config.log.display(),
        config.home_policy,
        config.strict
    );

    let reader = LogReader::open(&config.log)
        .with_context(|| format!("opening telemetry log {}", config.log.display()))?;
    let tracks = assemble(reader, config.home_policy, config.strict)
        .with_context(|| format!("processing telemetry log {}", config.log.display()))?;

    let written = export_tracks(&tracks, &config.output_dir, config.format)
        .with_context(|| format!("writing series to {}", config.output_dir.display()))?;

    match tracks.home {
        Some(home) => {
            let p = home.point();
            println!("home: lon {} lat {} alt {}", p.lon, p.lat, p.alt);
        }
        None => println!("home: none"),
    }
    println!(
        "global_position {}, global_ned {}, local_position {}, local_velocity {}, local_geodetic {}, discarded {}, skipped {}",
        tracks.global_position.len(),
        tracks.global_ned.len(),
        tracks.local_position.len(),
        tracks.local_velocity.len(),
        tracks.local_geodetic.len(),
        tracks.discarded,
        tracks.skipped
    );
    for path in written {
        println!("wrote {}", path.display());
    }

    Ok(())
}
