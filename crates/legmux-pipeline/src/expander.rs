use std::io::Read;

use crossbeam::channel::Sender;
use legmux_record::{Payload, RecordError, RecordReader};
use tracing::{debug, trace};

use crate::config::RepeatPolicy;

/// One payload copy handed from an expander to the merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handoff {
    pub payload: Payload,
    /// No further payloads follow on this channel.
    pub last: bool,
}

/// Per-channel counters returned when an expander finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpanderStats {
    pub records: u64,
    pub payloads: u64,
}

/// Replays each leg record's payload according to its repeat count.
pub struct Expander<R> {
    reader: RecordReader<R>,
    policy: RepeatPolicy,
    current: Payload,
    remaining: u16,
    emitted: u64,
}

impl<R: Read> Expander<R> {
    pub fn new(source: R, policy: RepeatPolicy) -> Self {
        Self {
            reader: RecordReader::new(source),
            policy,
            current: Payload::ZERO,
            remaining: 0,
            emitted: 0,
        }
    }

    /// Produce the next payload copy, pulling records as needed.
    ///
    /// Records whose repeat count yields zero copies are skipped. `Ok(None)`
    /// means the source ended cleanly.
    pub fn next_payload(&mut self) -> Result<Option<Payload>, RecordError> {
        while self.remaining == 0 {
            let Some(record) = self.reader.read_record()? else {
                return Ok(None);
            };
            self.current = record.payload;
            self.remaining = self.policy.emissions(record.repeat);
            trace!(
                record = self.reader.records_read(),
                repeat = record.repeat,
                copies = self.remaining,
                "record decoded"
            );
        }

        self.remaining -= 1;
        self.emitted += 1;
        Ok(Some(self.current))
    }

    pub fn stats(&self) -> ExpanderStats {
        ExpanderStats {
            records: self.reader.records_read(),
            payloads: self.emitted,
        }
    }

    /// Feed payload copies into `tx` until the source is exhausted.
    ///
    /// The expander stays one copy ahead so the final handoff carries
    /// `last: true`. A source with no copies at all just drops `tx`. Read
    /// errors are sent as `Err` and end the expander. A closed receiver ends
    /// it silently.
    pub fn run(mut self, channel: usize, tx: Sender<Result<Handoff, RecordError>>) -> ExpanderStats {
        let mut pending = match self.next_payload() {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(channel, "channel produced no payloads");
                return self.stats();
            }
            Err(err) => {
                let _ = tx.send(Err(err));
                return self.stats();
            }
        };

        loop {
            match self.next_payload() {
                Ok(Some(next)) => {
                    let handoff = Handoff {
                        payload: pending,
                        last: false,
                    };
                    if tx.send(Ok(handoff)).is_err() {
                        debug!(channel, "merger hung up");
                        break;
                    }
                    pending = next;
                }
                Ok(None) => {
                    let _ = tx.send(Ok(Handoff {
                        payload: pending,
                        last: true,
                    }));
                    break;
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            }
        }

        let stats = self.stats();
        debug!(channel, records = stats.records, payloads = stats.payloads, "expander finished");
        stats
    }
}
