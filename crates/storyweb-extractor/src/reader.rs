//! JSON lines reader for article records

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::types::ArticleRecord;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::{debug, warn};

/// Streams article records from a JSON lines source
///
/// Blank lines are ignored. Lines that fail to parse, records without an id,
/// and records in a language the config does not accept are skipped and
/// counted; only I/O failures end the stream with an error.
pub struct ArticleReader<R> {
    lines: Lines<R>,
    config: ExtractorConfig,
    line_number: usize,
    skipped: usize,
}

impl ArticleReader<BufReader<File>> {
    /// Open a JSON lines file
    pub fn open(path: impl AsRef<Path>, config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file), config))
    }
}

impl<R: BufRead> ArticleReader<R> {
    /// Wrap any buffered reader
    pub fn new(reader: R, config: &ExtractorConfig) -> Self {
        Self {
            lines: reader.lines(),
            config: config.clone(),
            line_number: 0,
            skipped: 0,
        }
    }

    /// Records skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn accept(&mut self, line: &str) -> Option<ArticleRecord> {
        let record: ArticleRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = self.line_number, error = %e, "Skipping unparseable article record");
                self.skipped += 1;
                return None;
            }
        };

        if record.to_ref().is_none() {
            warn!(line = self.line_number, "Skipping article record without id");
            self.skipped += 1;
            return None;
        }

        if !self.config.accepts_language(record.language.as_deref()) {
            debug!(
                line = self.line_number,
                language = record.language.as_deref().unwrap_or("-"),
                "Skipping article in filtered language"
            );
            self.skipped += 1;
            return None;
        }

        Some(record)
    }
}

impl<R: BufRead> Iterator for ArticleReader<R> {
    type Item = Result<ArticleRecord, ExtractorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(record) = self.accept(line) {
                return Some(Ok(record));
            }
        }
    }
}
