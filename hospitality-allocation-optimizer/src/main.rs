use std::fs::File;
use std::io::{self, BufReader, Write};

use hospitality_allocation_config::{get_config, ConfigError};
use hospitality_allocation_optimizer::{AllocationError, Scenario};
use hospitality_allocation_telemetry::{setup_telemetry, TelemetryError};
use tracing::info;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("logging setup failed: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),
}

fn main() -> Result<(), CliError> {
    let config = get_config()?;
    setup_telemetry(&config.log_filter)?;

    info!(scenario = %config.scenario.display(), "loading scenario");
    let scenario: Scenario = serde_json::from_reader(BufReader::new(File::open(&config.scenario)?))?;
    info!(
        guests = scenario.guests.len(),
        rooms = scenario.rooms.len(),
        "scenario loaded"
    );

    let outcome = scenario.run(config.auto_fill)?;

    let mut stdout = io::stdout().lock();
    if config.pretty {
        serde_json::to_writer_pretty(&mut stdout, &outcome)?;
    } else {
        serde_json::to_writer(&mut stdout, &outcome)?;
    }
    writeln!(stdout)?;
    Ok(())
}
