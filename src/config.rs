use ini::Ini;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::mcr::Signal;
use crate::port_map;

pub const DEFAULT_DEVICE: &str = "/dev/ttyS0";
pub const DEFAULT_CONFIG_FILE: &str = "ptt.conf";
pub const MAX_DEBUG_LEVEL: u8 = 5;

/// Which MCR outputs key the transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlLine {
    None,
    Dtr,
    Rts,
    Both,
}

impl ControlLine {
    /// Numeric form used by the `ControlLine` config key
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(ControlLine::None),
            1 => Some(ControlLine::Dtr),
            2 => Some(ControlLine::Rts),
            3 => Some(ControlLine::Both),
            _ => None,
        }
    }

    pub fn signals(self) -> &'static [Signal] {
        match self {
            ControlLine::None => &[],
            ControlLine::Dtr => &[Signal::Dtr],
            ControlLine::Rts => &[Signal::Rts],
            ControlLine::Both => &Signal::ALL,
        }
    }

    pub fn mask(self) -> u8 {
        self.signals().iter().fold(0, |mask, signal| mask | signal.mask())
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlLine::None => "NONE",
            ControlLine::Dtr => "DTR",
            ControlLine::Rts => "RTS",
            ControlLine::Both => "BOTH",
        }
    }
}

impl fmt::Display for ControlLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown control line '{0}', expected NONE, DTR, RTS or BOTH")]
pub struct ParseControlLineError(String);

impl FromStr for ControlLine {
    type Err = ParseControlLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(ControlLine::None),
            "DTR" => Ok(ControlLine::Dtr),
            "RTS" => Ok(ControlLine::Rts),
            "BOTH" => Ok(ControlLine::Both),
            _ => Err(ParseControlLineError(s.to_string())),
        }
    }
}

/// Requested state of the controlled line(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineState {
    Off,
    On,
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineState::Off => f.write_str("OFF"),
            LineState::On => f.write_str("ON"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid line value '{0}', expected 0, 1, off or on")]
pub struct ParseLineStateError(String);

impl FromStr for LineState {
    type Err = ParseLineStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "off" => Ok(LineState::Off),
            "1" | "on" => Ok(LineState::On),
            _ => Err(ParseLineStateError(s.to_string())),
        }
    }
}

/// What happens to MCR bits 2-7 on write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMask {
    /// Only DTR and RTS survive; loopback, OUT1 and OUT2 are cleared
    ControlOnly,
    /// Unrelated bits are written back as they were read
    Preserve,
}

/// Final configuration, read-only once resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub device: String,
    pub port: i64,
    pub line: ControlLine,
    pub state: LineState,
    pub verbose: bool,
    pub quiet: bool,
    pub debug: bool,
    pub level: u8,
    pub lines: Option<u8>,
    pub write_mask: WriteMask,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            device: DEFAULT_DEVICE.to_string(),
            port: 0,
            line: ControlLine::Dtr,
            state: LineState::Off,
            verbose: false,
            quiet: false,
            debug: false,
            level: 0,
            lines: None,
            write_mask: WriteMask::ControlOnly,
        }
    }
}

impl Settings {
    /// Layer the config file and then the command line over the built-in defaults
    pub fn resolve(file: Layer, cli: Layer) -> Settings {
        Settings::default().apply(&file.overlay(cli))
    }

    fn apply(self, layer: &Layer) -> Settings {
        let port = layer.effective_port().unwrap_or(self.port);
        let device = match (&layer.device, layer.port) {
            (Some(device), _) => device.clone(),
            (None, Some(_)) => port_map::device_for_port(port)
                .map(str::to_string)
                .unwrap_or_else(|| format!("port {}", port)),
            (None, None) => self.device,
        };

        Settings {
            port,
            device,
            line: layer.line.unwrap_or(self.line),
            state: layer.state.unwrap_or(self.state),
            verbose: layer.verbose.unwrap_or(self.verbose),
            quiet: layer.quiet.unwrap_or(self.quiet),
            debug: layer.debug.unwrap_or(self.debug),
            level: layer.level.unwrap_or(self.level),
            lines: layer.lines.or(self.lines),
            write_mask: layer.write_mask.unwrap_or(self.write_mask),
        }
    }
}

/// One configuration source. `None` leaves the lower layer's value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub device: Option<String>,
    pub port: Option<i64>,
    pub line: Option<ControlLine>,
    pub state: Option<LineState>,
    pub verbose: Option<bool>,
    pub quiet: Option<bool>,
    pub debug: Option<bool>,
    pub level: Option<u8>,
    pub lines: Option<u8>,
    pub write_mask: Option<WriteMask>,
}

impl Layer {
    /// Port selected by this layer. An explicit port number beats the device
    /// path; a path missing from the device table selects port -1.
    pub fn effective_port(&self) -> Option<i64> {
        self.port.or_else(|| {
            self.device
                .as_deref()
                .map(|device| port_map::port_for_device(device).unwrap_or(-1))
        })
    }

    /// Merge `upper` on top of `self`, field by field
    pub fn overlay(self, upper: Layer) -> Layer {
        Layer {
            port: upper.effective_port().or_else(|| self.effective_port()),
            // a port number from a higher layer outranks a lower layer's device
            device: if upper.device.is_none() && upper.port.is_some() {
                None
            } else {
                upper.device.or(self.device)
            },
            line: upper.line.or(self.line),
            state: upper.state.or(self.state),
            verbose: upper.verbose.or(self.verbose),
            quiet: upper.quiet.or(self.quiet),
            debug: upper.debug.or(self.debug),
            level: upper.level.or(self.level),
            lines: upper.lines.or(self.lines),
            write_mask: upper.write_mask.or(self.write_mask),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read {path}: {err}")]
    Io { path: PathBuf, err: std::io::Error },

    #[error("syntax error: {0}")]
    Syntax(#[from] ini::ParseError),

    #[error("unknown key '{key}' in section [{section}]")]
    UnknownKey { section: String, key: String },

    #[error("invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::Io { err, .. } if err.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Keys as they appear in the file. `ControlLine` and `LineName` are kept
/// apart so the numeric form wins regardless of order.
#[derive(Default)]
struct IniLayer {
    layer: Layer,
    line_name: Option<ControlLine>,
    control_line: Option<ControlLine>,
}

type Setter = fn(&mut IniLayer, &str) -> Result<(), String>;

const INI_KEYS: &[(&str, &str, Setter)] = &[
    ("DEBUG", "Debug", |ini, value| {
        ini.layer.debug = Some(parse_flag(value)?);
        Ok(())
    }),
    ("DEBUG", "Verbose", |ini, value| {
        ini.layer.verbose = Some(parse_flag(value)?);
        Ok(())
    }),
    ("DEBUG", "Quiet", |ini, value| {
        ini.layer.quiet = Some(parse_flag(value)?);
        Ok(())
    }),
    ("DEBUG", "Level", |ini, value| {
        ini.layer.level = Some(parse_level(value)?);
        Ok(())
    }),
    ("DEVICES", "DeviceName", |ini, value| {
        ini.layer.device = Some(value.to_string());
        Ok(())
    }),
    ("DEVICES", "LineName", |ini, value| {
        ini.line_name = Some(value.parse().map_err(|e: ParseControlLineError| e.to_string())?);
        Ok(())
    }),
    ("DEVICES", "ControlLine", |ini, value| {
        let index = parse_int(value)?;
        ini.control_line =
            Some(ControlLine::from_index(index).ok_or("expected 0 (NONE) to 3 (BOTH)")?);
        Ok(())
    }),
    ("DEVICES", "PortNumber", |ini, value| {
        ini.layer.port = Some(parse_int(value)?);
        Ok(())
    }),
    ("LINES", "Lines", |ini, value| {
        let lines = parse_int(value)?;
        ini.layer.lines = Some(u8::try_from(lines).map_err(|_| "out of range".to_string())?);
        Ok(())
    }),
];

fn parse_int(value: &str) -> Result<i64, String> {
    value.trim().parse::<i64>().map_err(|e| e.to_string())
}

fn parse_flag(value: &str) -> Result<bool, String> {
    parse_int(value).map(|n| n != 0)
}

fn parse_level(value: &str) -> Result<u8, String> {
    match parse_int(value)? {
        n @ 0..=5 => Ok(n as u8),
        _ => Err(format!("expected 0 to {}", MAX_DEBUG_LEVEL)),
    }
}

/// Drop a trailing `; comment` or `# comment`. The marker only counts after
/// whitespace, so `/dev/tty#1` stays intact.
fn strip_inline_comment(value: &str) -> &str {
    let mut previous = None;
    for (index, c) in value.char_indices() {
        if (c == ';' || c == '#') && previous.map_or(false, char::is_whitespace) {
            return value[..index].trim_end();
        }
        previous = Some(c);
    }
    value.trim_end()
}

/// Parse INI text into a layer. Any unknown key or bad value fails the whole load.
pub fn parse_layer(text: &str) -> Result<Layer, ConfigError> {
    let ini = Ini::load_from_str(text)?;
    let mut parsed = IniLayer::default();

    for (section, properties) in ini.iter() {
        let section = section.unwrap_or("");
        for (key, value) in properties.iter() {
            let value = strip_inline_comment(value);
            let setter = INI_KEYS
                .iter()
                .find(|(s, k, _)| *s == section && *k == key)
                .map(|(_, _, setter)| setter)
                .ok_or_else(|| ConfigError::UnknownKey {
                    section: section.to_string(),
                    key: key.to_string(),
                })?;

            setter(&mut parsed, value).map_err(|reason| ConfigError::InvalidValue {
                section: section.to_string(),
                key: key.to_string(),
                value: value.to_string(),
                reason,
            })?;
        }
    }

    let mut layer = parsed.layer;
    layer.line = parsed.control_line.or(parsed.line_name);
    Ok(layer)
}

/// Load a layer from an INI file on disk
pub fn load_file(path: &Path) -> Result<Layer, ConfigError> {
    let text = fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: path.to_path_buf(),
        err,
    })?;
    parse_layer(&text)
}
