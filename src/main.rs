use anyhow::Result;

mod app;
mod cli;
mod config;
mod logging;
mod mcr;
mod port_io;
mod port_map;
mod transaction;

use port_io::RawPort;

fn main() -> Result<()> {
    let mut port = RawPort::new();

    match app::run_from(std::env::args_os(), &mut port) {
        Ok(_) => Ok(()),
        // Usage errors keep clap's formatting and exit code
        Err(e) => match e.downcast::<clap::Error>() {
            Ok(usage) => usage.exit(),
            Err(e) => Err(e),
        },
    }
}
