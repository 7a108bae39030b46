use std::io::Write;
use std::path::Path;
use std::thread;

use crossbeam::channel::bounded;
use legmux_record::{FrameLayout, FrameWriter, RecordError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{DonePolicy, MergeConfig, RepeatPolicy};
use crate::error::{PipelineError, Result};
use crate::expander::{Expander, ExpanderStats, Handoff};
use crate::merger::Merger;
use crate::source::{ChannelSet, ChannelSource, FileSource};

/// Per-channel summary of a finished merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    pub index: usize,
    pub label: String,
    pub records: u64,
    pub payloads: u64,
}

/// Summary of a finished merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub frames: u64,
    pub frame_len: usize,
    pub delay: u8,
    pub repeat: RepeatPolicy,
    pub on_done: DonePolicy,
    pub channels: Vec<ChannelReport>,
}

/// Merge every channel in `channels` into `sink`.
///
/// One expander thread per channel borrows its source for the duration of
/// the merge; the sources stay owned by `channels` so the caller can close
/// them afterwards. The first read or write error aborts the merge. Frames
/// written before it stay written; a cycle that could not be completed is
/// never written.
pub fn merge<S, W>(channels: &mut ChannelSet<S>, sink: W, config: &MergeConfig) -> Result<MergeReport>
where
    S: ChannelSource,
    W: Write,
{
    let layout = FrameLayout::new(channels.len()).map_err(|err| match err {
        RecordError::ZeroChannels => PipelineError::NoChannels,
        other => PipelineError::Record(other),
    })?;
    let labels = channels.labels();
    let config = *config;
    info!(
        channels = layout.channels(),
        delay = config.delay,
        repeat = ?config.repeat,
        on_done = ?config.on_done,
        "starting merge"
    );

    let (outcome, stats) = thread::scope(|scope| {
        let mut receivers = Vec::with_capacity(layout.channels());
        let mut workers = Vec::with_capacity(layout.channels());

        for (index, source) in channels.sources_mut().iter_mut().enumerate() {
            let (tx, rx) = bounded::<std::result::Result<Handoff, RecordError>>(0);
            let expander = Expander::new(source, config.repeat);
            let worker = thread::Builder::new()
                .name(format!("legmux-chan{index}"))
                .spawn_scoped(scope, move || expander.run(index, tx))
                .map_err(|source| PipelineError::Spawn {
                    channel: index,
                    source,
                });
            match worker {
                Ok(worker) => workers.push(worker),
                Err(err) => return (Err(err), Vec::new()),
            }
            receivers.push(rx);
        }

        let outcome = Merger::new(receivers, &config).and_then(|mut merger| {
            let mut writer = FrameWriter::new(sink, layout);
            while merger.advance()? {
                writer.send(merger.current(), config.delay)?;
                debug!(frame = writer.frames_written(), "composite frame emitted");
            }
            Ok(writer.frames_written())
        });
        // The merger (and every receiver) is gone here, so blocked expanders
        // see a disconnect and exit before the joins below.

        let stats: Vec<std::result::Result<ExpanderStats, usize>> = workers
            .into_iter()
            .enumerate()
            .map(|(index, worker)| worker.join().map_err(|_| index))
            .collect();
        (outcome, stats)
    });

    let frames = outcome?;
    let mut reports = Vec::with_capacity(stats.len());
    for ((index, stats), label) in stats.into_iter().enumerate().zip(labels) {
        let stats = stats.map_err(|channel| PipelineError::WorkerPanicked { channel })?;
        reports.push(ChannelReport {
            index,
            label,
            records: stats.records,
            payloads: stats.payloads,
        });
    }

    info!(frames, "merge finished");
    Ok(MergeReport {
        frames,
        frame_len: layout.frame_len(),
        delay: config.delay,
        repeat: config.repeat,
        on_done: config.on_done,
        channels: reports,
    })
}

/// Open `paths` as channels 0..N, merge them into `sink`, then close them.
///
/// Sources are closed on every path. If the merge itself failed, that error
/// is returned and close failures are only logged.
pub fn merge_files<P, W>(paths: &[P], sink: W, config: &MergeConfig) -> Result<MergeReport>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut channels = ChannelSet::<FileSource>::open(paths)?;
    let merged = merge(&mut channels, sink, config);
    let closed = channels.close();

    match (merged, closed) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(close)) => Err(close),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close)) => {
            warn!(%close, "channel cleanup failed after merge error");
            Err(err)
        }
    }
}
