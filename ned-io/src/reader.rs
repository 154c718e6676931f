use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::record::Record;

/// Iterator over the records of a telemetry log
///
/// Blank lines are skipped. Each malformed line yields an
/// [`IoError::Parse`](crate::IoError::Parse) without ending iteration, so
/// the caller decides whether to stop or carry on.
pub struct LogReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl LogReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening telemetry log {}", path.display());
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;

            if text.trim().is_empty() {
                continue;
            }

            return Some(Record::parse(&text, self.line).map_err(Into::into));
        }
    }
}
