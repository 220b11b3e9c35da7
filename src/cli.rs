use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::{ControlLine, Layer, LineState, WriteMask, MAX_DEBUG_LEVEL};

#[derive(Parser, Debug)]
#[command(name = "ptt", version)]
#[command(
    about = "Key a radio transmitter by setting DTR/RTS on a legacy 8250 serial port",
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    /// Report register addresses and values
    #[arg(long, overrides_with = "brief")]
    verbose: bool,

    /// Turn off verbose reporting (default)
    #[arg(long, overrides_with = "verbose")]
    brief: bool,

    /// Print configuration and debug diagnostics
    #[arg(long, overrides_with = "nodebug")]
    debug: bool,

    /// Turn off debug diagnostics (default)
    #[arg(long, overrides_with = "debug")]
    nodebug: bool,

    /// Suppress all normal output
    #[arg(long, overrides_with = "unquiet")]
    quiet: bool,

    /// Turn off quiet mode (default)
    #[arg(long, overrides_with = "quiet")]
    unquiet: bool,

    /// Debug level [0-5]
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=MAX_DEBUG_LEVEL as i64))]
    level: Option<u8>,

    /// Print version and exit
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Serial device name, e.g. '/dev/ttyS0'
    #[arg(short, long)]
    device: Option<String>,

    /// Serial port number [0-7]
    #[arg(short, long, allow_negative_numbers = true)]
    port: Option<i64>,

    /// Line to control [NONE, DTR, RTS, BOTH]
    #[arg(short, long)]
    line: Option<ControlLine>,

    /// Config file [default: ptt.conf]
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Line value, 0 (OFF) or 1 (ON)
    #[arg(short, long)]
    set: Option<LineState>,

    /// Keep MCR bits 2-7 instead of clearing them
    #[arg(long)]
    preserve_bits: bool,

    /// Line value, same as --set
    value: Option<LineState>,
}

fn pair(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}

impl Cli {
    /// The command-line layer of the configuration
    pub fn layer(&self) -> Layer {
        Layer {
            device: self.device.clone(),
            port: self.port,
            line: self.line,
            state: self.set.or(self.value),
            verbose: pair(self.verbose, self.brief),
            quiet: pair(self.quiet, self.unquiet),
            debug: pair(self.debug, self.nodebug),
            level: self.level,
            lines: None,
            write_mask: self.preserve_bits.then_some(WriteMask::Preserve),
        }
    }
}
