use clap::{Args, Subcommand, ValueEnum};
use legmux_pipeline::{DonePolicy, RepeatPolicy};
use legmux_record::DEFAULT_DELAY;
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod inspect;
pub mod merge;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge per-leg record streams into one composite stream.
    Merge(MergeArgs),
    /// Decode a record file or a composite stream.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Merge(args) => merge::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Record stream for channel 0.
    #[arg(long, value_name = "PATH")]
    pub chan0: PathBuf,
    /// Record stream for channel 1.
    #[arg(long, value_name = "PATH")]
    pub chan1: PathBuf,
    /// Record stream for channel 2.
    #[arg(long, value_name = "PATH")]
    pub chan2: PathBuf,
    /// Additional channels, appended after chan2 in the order given.
    #[arg(long = "chan", value_name = "PATH")]
    pub extra: Vec<PathBuf>,
    /// Delay byte appended to every composite frame.
    #[arg(long, env = "LEGMUX_DELAY", default_value_t = DEFAULT_DELAY)]
    pub delay: u8,
    /// How the repeat-count byte maps to payload copies.
    #[arg(long, value_enum, default_value = "exact")]
    pub repeat: RepeatArg,
    /// What a finished channel contributes to later frames.
    #[arg(long, value_enum, default_value = "hold")]
    pub on_done: DoneArg,
    /// Write the composite stream to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl MergeArgs {
    /// Channel sources in channel-index order.
    pub fn channel_paths(&self) -> Vec<PathBuf> {
        [&self.chan0, &self.chan1, &self.chan2]
            .into_iter()
            .chain(&self.extra)
            .cloned()
            .collect()
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum RepeatArg {
    /// Emit exactly `repeat` copies (0 skips the record).
    Exact,
    /// Emit `repeat + 1` copies.
    AtLeastOnce,
}

impl From<RepeatArg> for RepeatPolicy {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Exact => RepeatPolicy::Exact,
            RepeatArg::AtLeastOnce => RepeatPolicy::AtLeastOnce,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DoneArg {
    /// Keep sending the channel's last payload.
    Hold,
    /// Send zero bytes for the channel.
    Blank,
}

impl From<DoneArg> for DonePolicy {
    fn from(arg: DoneArg) -> Self {
        match arg {
            DoneArg::Hold => DonePolicy::Hold,
            DoneArg::Blank => DonePolicy::Blank,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(subcommand)]
    pub target: InspectTarget,
}

#[derive(Subcommand, Debug)]
pub enum InspectTarget {
    /// Decode a leg record file.
    Records(InspectRecordsArgs),
    /// Decode a composite stream.
    Frames(InspectFramesArgs),
}

#[derive(Args, Debug)]
pub struct InspectRecordsArgs {
    /// Record file to decode.
    pub path: PathBuf,
    /// Stop after N records.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct InspectFramesArgs {
    /// Composite stream to decode.
    pub path: PathBuf,
    /// Number of channels per frame.
    #[arg(long, default_value = "3")]
    pub channels: usize,
    /// Stop after N frames.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
