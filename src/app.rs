use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use log::{debug, info, warn};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{self, Layer, Settings, DEFAULT_CONFIG_FILE};
use crate::logging;
use crate::port_io::PortIo;
use crate::port_map;
use crate::transaction::{self, Report};

const COPY_YEARS: &str = "2009-2015";
const COPY_HOLDER: &str = "KB4OID Labs, a division of Kodetroll Heavy Industries";

/// Program name and version, then the copyright line
pub fn header() -> [String; 2] {
    [
        format!("{} V{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("Copyright (C) {} {}", COPY_YEARS, COPY_HOLDER),
    ]
}

pub fn version_banner() -> String {
    format!(
        "This {} Version {} (C) {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        COPY_YEARS
    )
}

#[derive(Debug)]
pub enum Outcome {
    /// Help or version text was printed; nothing else ran
    Informational,
    Keyed(Report),
}

/// Parse `args` and key the configured line through `io`
pub fn run_from<I, T>(args: I, io: &mut dyn PortIo) -> Result<Outcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            println!("{}", version_banner());
            return Ok(Outcome::Informational);
        }
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            e.print()?;
            return Ok(Outcome::Informational);
        }
        Err(e) => return Err(e.into()),
    };

    run(&cli, io).map(Outcome::Keyed)
}

pub fn run(cli: &Cli, io: &mut dyn PortIo) -> Result<Report> {
    let explicit_file = cli.file.is_some();
    let path = cli
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    // Logging depends on the merged settings, so report the load afterwards
    let loaded = config::load_file(&path);
    let file_layer = loaded.as_ref().map(Layer::clone).unwrap_or_default();
    let settings = Settings::resolve(file_layer, cli.layer());

    logging::init(&settings);

    match &loaded {
        Ok(_) => info!("Config loaded from '{}'", path.display()),
        Err(e) if e.is_not_found() && !explicit_file => {
            info!("No config file '{}', using defaults", path.display())
        }
        Err(e) => warn!("Can't load '{}': {}", path.display(), e),
    }

    if !settings.quiet {
        for line in header() {
            println!("{}", line);
        }
    }

    debug!("Settings: {}", serde_json::to_string(&settings)?);

    if !port_map::is_known_port(settings.port) {
        warn!(
            "Port {} ({}) is not in the address table, using 0x{:04X}",
            settings.port,
            settings.device,
            port_map::base_address(settings.port)
        );
    }

    let report = transaction::key_line(io, &settings).with_context(|| {
        format!(
            "Failed to set {} {} on {} (port {})",
            settings.line, settings.state, settings.device, settings.port
        )
    })?;

    if !settings.quiet {
        for line in report.summary(settings.verbose) {
            println!("{}", line);
        }
    }

    Ok(report)
}
