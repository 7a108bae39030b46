//! Lock-step fan-in of per-channel payload handoffs into composite frames.
//!
//! Each cycle visits the channels in ascending index order and blocks on
//! every channel that is not yet done. The cycle's frame is the current
//! payload of every channel plus the delay byte. A channel whose final
//! handoff arrives in a cycle becomes done in that same cycle, so the last
//! frame is the one in which the last channel finishes.

use crossbeam::channel::Receiver;
use legmux_record::{CompositeFrame, FrameLayout, Payload, RecordError};
use tracing::trace;

use crate::config::{DonePolicy, MergeConfig};
use crate::error::{PipelineError, Result};
use crate::expander::Handoff;

struct ChannelState {
    rx: Receiver<std::result::Result<Handoff, RecordError>>,
    done: bool,
    payloads: u64,
}

/// Drives one receiver per channel and composes their payloads.
pub struct Merger {
    channels: Vec<ChannelState>,
    // Per-channel slots, reused across cycles.
    current: Vec<Payload>,
    layout: FrameLayout,
    config: MergeConfig,
    cycles: u64,
    failed: bool,
}

impl Merger {
    pub fn new(
        receivers: Vec<Receiver<std::result::Result<Handoff, RecordError>>>,
        config: &MergeConfig,
    ) -> Result<Self> {
        if receivers.is_empty() {
            return Err(PipelineError::NoChannels);
        }
        let layout = FrameLayout::new(receivers.len())?;
        Ok(Self {
            current: vec![Payload::ZERO; receivers.len()],
            channels: receivers
                .into_iter()
                .map(|rx| ChannelState {
                    rx,
                    done: false,
                    payloads: 0,
                })
                .collect(),
            layout,
            config: *config,
            cycles: 0,
            failed: false,
        })
    }

    /// True once every channel has finished.
    pub fn is_done(&self) -> bool {
        self.channels.iter().all(|c| c.done)
    }

    /// Whether channel `index` has finished.
    pub fn channel_done(&self, index: usize) -> Result<bool> {
        self.layout.section(index)?;
        Ok(self.channels[index].done)
    }

    /// Payloads received so far, per channel.
    pub fn payload_counts(&self) -> Vec<u64> {
        self.channels.iter().map(|c| c.payloads).collect()
    }

    /// Current per-channel payloads, in channel order.
    pub fn current(&self) -> &[Payload] {
        &self.current
    }

    /// Run one cycle.
    ///
    /// Returns `Ok(true)` when a frame's worth of payloads is ready in
    /// [`Merger::current`], `Ok(false)` once every channel is done. A cycle
    /// in which no channel delivered anything (the remaining channels all
    /// finished empty) produces no frame.
    pub fn advance(&mut self) -> Result<bool> {
        if self.failed {
            return Ok(false);
        }

        if self.config.on_done == DonePolicy::Blank {
            for (slot, channel) in self.current.iter_mut().zip(&self.channels) {
                if channel.done {
                    *slot = Payload::ZERO;
                }
            }
        }

        while !self.is_done() {
            let mut delivered = false;
            for (index, channel) in self.channels.iter_mut().enumerate() {
                if channel.done {
                    continue;
                }
                match channel.rx.recv() {
                    Ok(Ok(handoff)) => {
                        self.current[index] = handoff.payload;
                        channel.payloads += 1;
                        channel.done = handoff.last;
                        delivered = true;
                    }
                    Ok(Err(source)) => {
                        self.failed = true;
                        return Err(PipelineError::Channel {
                            channel: index,
                            source,
                        });
                    }
                    // Hung up without a final handoff: nothing was produced.
                    Err(_) => channel.done = true,
                }
            }

            if delivered {
                self.cycles += 1;
                trace!(cycle = self.cycles, "merge cycle complete");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run one cycle and return an owned frame.
    pub fn next_frame(&mut self) -> Result<Option<CompositeFrame>> {
        if self.advance()? {
            Ok(Some(CompositeFrame::new(
                self.current.clone(),
                self.config.delay,
            )))
        } else {
            Ok(None)
        }
    }
}

impl Iterator for Merger {
    type Item = Result<CompositeFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crossbeam::channel::{bounded, Sender};

    use super::*;

    type Tx = Sender<std::result::Result<Handoff, RecordError>>;

    fn p(byte: u8) -> Payload {
        Payload::new([byte; 6])
    }

    /// Spawn a feeder that hands off `payloads` and marks the last one.
    fn feeder(payloads: Vec<Payload>) -> Receiver<std::result::Result<Handoff, RecordError>> {
        let (tx, rx): (Tx, _) = bounded(0);
        thread::spawn(move || {
            let count = payloads.len();
            for (i, payload) in payloads.into_iter().enumerate() {
                let last = i + 1 == count;
                if tx.send(Ok(Handoff { payload, last })).is_err() {
                    return;
                }
            }
        });
        rx
    }

    #[test]
    fn three_channels_finish_in_two_frames() {
        let receivers = vec![
            feeder(vec![p(0xAA)]),
            feeder(vec![p(0xBB), p(0xBB)]),
            feeder(vec![p(0xCC)]),
        ];
        let merger = Merger::new(receivers, &MergeConfig::default()).unwrap();

        let frames: Vec<CompositeFrame> = merger.map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 2);
        for frame in &frames {
            assert_eq!(frame.payloads, vec![p(0xAA), p(0xBB), p(0xCC)]);
            assert_eq!(frame.delay, 5);
        }
    }

    #[test]
    fn finished_channel_holds_last_payload() {
        let receivers = vec![
            feeder(vec![p(1), p(2), p(3), p(4)]),
            feeder(vec![p(10), p(11)]),
        ];
        let mut merger = Merger::new(receivers, &MergeConfig::default()).unwrap();

        let mut seen = Vec::new();
        while let Some(frame) = merger.next_frame().unwrap() {
            seen.push(frame.payloads);
        }
        assert_eq!(
            seen,
            vec![
                vec![p(1), p(10)],
                vec![p(2), p(11)],
                vec![p(3), p(11)],
                vec![p(4), p(11)],
            ]
        );
        assert_eq!(merger.payload_counts(), vec![4, 2]);
        assert!(merger.is_done());
    }

    #[test]
    fn blank_policy_zeroes_after_final_frame() {
        let receivers = vec![feeder(vec![p(1), p(2), p(3)]), feeder(vec![p(9)])];
        let config = MergeConfig {
            on_done: DonePolicy::Blank,
            ..MergeConfig::default()
        };
        let merger = Merger::new(receivers, &config).unwrap();

        let seen: Vec<Vec<Payload>> = merger.map(|f| f.unwrap().payloads).collect();
        assert_eq!(
            seen,
            vec![
                vec![p(1), p(9)],
                vec![p(2), Payload::ZERO],
                vec![p(3), Payload::ZERO],
            ]
        );
    }

    #[test]
    fn empty_channel_contributes_zero_bytes() {
        let receivers = vec![feeder(vec![p(5), p(6)]), feeder(Vec::new())];
        let merger = Merger::new(receivers, &MergeConfig::default()).unwrap();

        let seen: Vec<Vec<Payload>> = merger.map(|f| f.unwrap().payloads).collect();
        assert_eq!(
            seen,
            vec![vec![p(5), Payload::ZERO], vec![p(6), Payload::ZERO]]
        );
    }

    #[test]
    fn all_channels_empty_emits_nothing() {
        let receivers = vec![feeder(Vec::new()), feeder(Vec::new()), feeder(Vec::new())];
        let mut merger = Merger::new(receivers, &MergeConfig::default()).unwrap();

        assert!(merger.next_frame().unwrap().is_none());
        assert!(merger.is_done());
    }

    #[test]
    fn channel_error_aborts_merge() {
        let (tx, bad): (Tx, _) = bounded(0);
        thread::spawn(move || {
            let _ = tx.send(Ok(Handoff {
                payload: p(1),
                last: false,
            }));
            let _ = tx.send(Err(RecordError::Truncated {
                len: 3,
                expected: 7,
            }));
        });
        let receivers = vec![feeder(vec![p(7), p(7), p(7)]), bad];
        let mut merger = Merger::new(receivers, &MergeConfig::default()).unwrap();

        assert!(merger.next_frame().unwrap().is_some());
        let err = merger.next_frame().unwrap_err();
        assert!(matches!(err, PipelineError::Channel { channel: 1, .. }));
        assert!(merger.next_frame().unwrap().is_none());
    }

    #[test]
    fn channel_done_checks_index() {
        let merger = Merger::new(vec![feeder(vec![p(1)])], &MergeConfig::default()).unwrap();
        assert!(!merger.channel_done(0).unwrap());
        assert!(matches!(
            merger.channel_done(4),
            Err(PipelineError::Record(RecordError::ChannelOutOfRange {
                index: 4,
                channels: 1
            }))
        ));
    }

    #[test]
    fn no_receivers_rejected() {
        assert!(matches!(
            Merger::new(Vec::new(), &MergeConfig::default()),
            Err(PipelineError::NoChannels)
        ));
    }
}
