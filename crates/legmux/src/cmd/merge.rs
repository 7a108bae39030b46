use std::fs::File;
use std::path::{Path, PathBuf};

use legmux_pipeline::{merge_files, MergeConfig, MergeReport};

use crate::cmd::MergeArgs;
use crate::exit::{io_error, pipeline_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, OutputFormat};

pub fn run(args: MergeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = merge_config(&args);
    let paths = args.channel_paths();

    let report = match &args.output {
        Some(path) => {
            ensure_output_is_not_input(path, &paths)?;
            let file = File::create(path).map_err(|err| {
                io_error(&format!("failed creating {}", path.display()), err)
            })?;
            let report = merge_files(&paths, file, &config)
                .map_err(|err| pipeline_error("merge failed", err))?;
            // stdout is free when the stream goes to a file.
            print_report(&report, format);
            report
        }
        None => merge_files(&paths, std::io::stdout().lock(), &config)
            .map_err(|err| pipeline_error("merge failed", err))?,
    };

    log_report(&report);
    Ok(SUCCESS)
}

fn merge_config(args: &MergeArgs) -> MergeConfig {
    MergeConfig {
        delay: args.delay,
        repeat: args.repeat.into(),
        on_done: args.on_done.into(),
    }
}

/// Creating the output truncates it, so it must not alias any channel input.
fn ensure_output_is_not_input(output: &Path, inputs: &[PathBuf]) -> CliResult<()> {
    match inputs.iter().find(|input| same_file(output, input)) {
        Some(input) => Err(CliError::new(
            USAGE,
            format!(
                "--output {} is also channel input {}",
                output.display(),
                input.display()
            ),
        )),
        None => Ok(()),
    }
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn log_report(report: &MergeReport) {
    for channel in &report.channels {
        tracing::info!(
            channel = channel.index,
            source = %channel.label,
            records = channel.records,
            payloads = channel.payloads,
            "channel summary"
        );
    }
    tracing::info!(
        frames = report.frames,
        frame_len = report.frame_len,
        repeat = report.repeat.as_str(),
        on_done = report.on_done.as_str(),
        "merge complete"
    );
}
