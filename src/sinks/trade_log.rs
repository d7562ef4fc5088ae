//! Human-readable trade log, one line per executed trade.

use crate::error::BotResult;
use crate::models::order::TradeLogEntry;
use crate::sinks::TradeSink;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

pub struct TradeLog<W: Write + Send> {
    writer: W,
    entries_written: u64,
}

impl TradeLog<File> {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> BotResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> TradeLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            entries_written: 0,
        }
    }

    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> TradeSink for TradeLog<W> {
    fn record(&mut self, entry: &TradeLogEntry) -> BotResult<()> {
        writeln!(self.writer, "{}", entry)?;
        self.writer.flush()?;
        self.entries_written += 1;
        Ok(())
    }
}
