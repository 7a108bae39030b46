//! Channel byte sources and their open/close lifecycle.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{CloseErrors, CloseFailure, PipelineError, Result};

/// A byte source owned by exactly one channel.
pub trait ChannelSource: Read + Send {
    /// Human-readable name used in reports and close errors.
    fn label(&self) -> &str;

    /// Release the source, reporting any failure.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}

/// File-backed channel source.
#[derive(Debug)]
pub struct FileSource {
    label: String,
    file: File,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| PipelineError::Open {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "opened channel source");
        Ok(Self {
            label: path.display().to_string(),
            file,
        })
    }
}

impl Read for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl ChannelSource for FileSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn close(self) -> io::Result<()> {
        close_file(self.file)
    }
}

#[cfg(unix)]
fn close_file(file: File) -> io::Result<()> {
    use std::os::unix::io::IntoRawFd;

    let fd = file.into_raw_fd();
    // SAFETY: `into_raw_fd` released ownership of `fd`, so nothing else will
    // close it; it is closed exactly once here.
    let rc = unsafe { libc::close(fd) };
    if rc == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(not(unix))]
fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

/// The ordered set of channel sources for one merge.
///
/// Channel `i` is the `i`-th source. The set owns every source and closes
/// each of them exactly once in [`ChannelSet::close`].
pub struct ChannelSet<S> {
    sources: Vec<S>,
}

impl ChannelSet<FileSource> {
    /// Open every path in order.
    ///
    /// If any path fails, the sources opened so far are closed before the
    /// open error is returned.
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(PipelineError::NoChannels);
        }

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            match FileSource::open(path) {
                Ok(source) => sources.push(source),
                Err(err) => {
                    if let Err(PipelineError::Close(close)) = (ChannelSet { sources }).close() {
                        warn!(%close, "cleanup after failed open");
                    }
                    return Err(err);
                }
            }
        }
        Ok(Self { sources })
    }
}

impl<S: ChannelSource> ChannelSet<S> {
    pub fn from_sources(sources: Vec<S>) -> Result<Self> {
        if sources.is_empty() {
            return Err(PipelineError::NoChannels);
        }
        Ok(Self { sources })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.label().to_string()).collect()
    }

    pub fn sources_mut(&mut self) -> &mut [S] {
        &mut self.sources
    }

    /// Close every source, even after failures, and aggregate the errors.
    pub fn close(self) -> Result<()> {
        let mut failures = Vec::new();
        for source in self.sources {
            let label = source.label().to_string();
            if let Err(error) = source.close() {
                failures.push(CloseFailure { label, error });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Close(CloseErrors::new(failures)))
        }
    }
}
