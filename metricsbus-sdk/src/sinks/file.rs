use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use metricsbus_types::Event;
use parking_lot::Mutex;

use super::Sink;
use crate::codec::EventCodec;
use crate::error::SinkError;

/// Appends each event to a file as one line of JSON.
///
/// The file is created if missing and never truncated, so the result is a
/// newline-delimited stream that `metricsbus relay` can read back.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
    codec: EventCodec,
}

impl FileSink {
    /// Open `path` for appending.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        Self::with_codec(path, EventCodec::new())
    }

    /// Open `path` for appending, encoding with `codec`.
    pub fn with_codec(path: impl Into<PathBuf>, codec: EventCodec) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            codec,
        })
    }

    /// The file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn record(&self, event: &Event) -> Result<(), SinkError> {
        let mut line = self.codec.encode(event)?;
        line.push('\n');

        // One write per line keeps concurrent records from interleaving
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
