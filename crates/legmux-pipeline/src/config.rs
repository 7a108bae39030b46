use legmux_record::DEFAULT_DELAY;
use serde::Serialize;

/// How a record's repeat-count byte maps to a number of payload copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatPolicy {
    /// `d` copies; a repeat count of 0 emits nothing for that record.
    #[default]
    Exact,
    /// `d + 1` copies; every record is emitted at least once.
    AtLeastOnce,
}

impl RepeatPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatPolicy::Exact => "exact",
            RepeatPolicy::AtLeastOnce => "at-least-once",
        }
    }

    /// Number of copies emitted for a raw repeat-count byte.
    pub fn emissions(self, repeat: u8) -> u16 {
        match self {
            RepeatPolicy::Exact => u16::from(repeat),
            RepeatPolicy::AtLeastOnce => u16::from(repeat) + 1,
        }
    }
}

/// What a finished channel contributes to frames after its last payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DonePolicy {
    /// Keep repeating the channel's last payload.
    #[default]
    Hold,
    /// Contribute all-zero bytes.
    Blank,
}

impl DonePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DonePolicy::Hold => "hold",
            DonePolicy::Blank => "blank",
        }
    }
}

/// Merge configuration, built once and passed into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeConfig {
    /// Delay byte appended to every composite frame.
    pub delay: u8,
    /// Repeat-count interpretation.
    pub repeat: RepeatPolicy,
    /// Finished-channel contribution.
    pub on_done: DonePolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            repeat: RepeatPolicy::default(),
            on_done: DonePolicy::default(),
        }
    }
}
