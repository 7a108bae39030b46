use std::fs::File;
use std::path::Path;

use legmux_record::{CompositeReader, FrameLayout, RecordReader};

use crate::cmd::{InspectArgs, InspectFramesArgs, InspectRecordsArgs, InspectTarget};
use crate::exit::{io_error, record_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frames, print_records, FrameRow, OutputFormat, RecordRow};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    match args.target {
        InspectTarget::Records(args) => records(args, format),
        InspectTarget::Frames(args) => frames(args, format),
    }
}

fn open(path: &Path) -> CliResult<File> {
    File::open(path).map_err(|err| io_error(&format!("failed opening {}", path.display()), err))
}

fn records(args: InspectRecordsArgs, format: OutputFormat) -> CliResult<i32> {
    let reader = RecordReader::new(open(&args.path)?);
    let limit = args.limit.unwrap_or(usize::MAX);

    let mut rows = Vec::new();
    let mut failure = None;
    for (index, record) in reader.take(limit).enumerate() {
        match record {
            Ok(record) => rows.push(RecordRow {
                index: index as u64,
                payload: hex::encode(record.payload),
                repeat: record.repeat,
            }),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    // Rows decoded before a bad tail are still worth seeing.
    print_records(&rows, format);
    match failure {
        Some(err) => Err(record_error(
            &format!("failed decoding {}", args.path.display()),
            err,
        )),
        None => Ok(SUCCESS),
    }
}

fn frames(args: InspectFramesArgs, format: OutputFormat) -> CliResult<i32> {
    let layout = FrameLayout::new(args.channels)
        .map_err(|err| CliError::new(USAGE, format!("--channels: {err}")))?;
    let reader = CompositeReader::new(open(&args.path)?, layout);
    let limit = args.limit.unwrap_or(usize::MAX);

    let mut rows = Vec::new();
    let mut failure = None;
    for (index, frame) in reader.take(limit).enumerate() {
        match frame {
            Ok(frame) => rows.push(FrameRow {
                index: index as u64,
                sections: frame.payloads.iter().map(hex::encode).collect(),
                delay: frame.delay,
            }),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    print_frames(&rows, format);
    match failure {
        Some(err) => Err(record_error(
            &format!("failed decoding {}", args.path.display()),
            err,
        )),
        None => Ok(SUCCESS),
    }
}
