use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::tools::Tool;

#[derive(Parser, Debug)]
#[command(
    name = "penumbra",
    version,
    about = "Direct lighting over a 2D grid with point occluders"
)]
pub struct Cli {
    /// Scene/lighting config (TOML). Built-in defaults when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames to compute.
    #[arg(long, default_value_t = 1)]
    pub frames: u32,

    /// Supersamples per cell for point lights (overrides config).
    #[arg(long)]
    pub samples: Option<u32>,

    /// Fixed jitter seed (overrides config).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads for the grid scan. Defaults to rayon's global pool.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Place a point light at X,Y (repeatable).
    #[arg(long = "light", value_name = "X,Y", value_parser = parse_pair)]
    pub lights: Vec<(i32, i32)>,

    /// Place an occluder at X,Y (repeatable).
    #[arg(long = "solid", value_name = "X,Y", value_parser = parse_pair)]
    pub solids: Vec<(i32, i32)>,

    /// Tool selected before the first frame.
    #[arg(long, value_enum)]
    pub tool: Option<Tool>,

    /// Press Escape after the tool selection, dropping it before the first
    /// frame.
    #[arg(long)]
    pub escape: bool,

    /// Pointer position in window pixels. Clicks with the selected tool, and
    /// positions the flashlight while that tool is active.
    #[arg(long, value_name = "PX,PY", value_parser = parse_pair)]
    pub pointer: Option<(i32, i32)>,

    /// Recompute whenever the config file changes.
    #[arg(long, requires = "config")]
    pub watch: bool,

    /// Print an ASCII preview of the last frame.
    #[arg(long)]
    pub ascii: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

pub fn parse_pair(s: &str) -> Result<(i32, i32), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let a = a.trim().parse::<i32>().map_err(|e| format!("bad X in '{}': {}", s, e))?;
    let b = b.trim().parse::<i32>().map_err(|e| format!("bad Y in '{}': {}", s, e))?;
    Ok((a, b))
}
