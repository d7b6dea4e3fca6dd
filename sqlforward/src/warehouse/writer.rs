//! Probe file writer.
//!
//! Runs on its own thread and owns the sink. Every job becomes
//! one YAML entry, flushed before the next job is taken.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::Arc;

use tokio::sync::mpsc::Receiver;
use tracing::{debug, error};

use super::Counters;

/// A statement seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteJob {
    pub fingerprint: String,
    pub statement: String,
}

pub(super) struct Writer {
    sink: Box<dyn Write + Send>,
    rx: Receiver<WriteJob>,
    counters: Arc<Counters>,
}

impl Writer {
    pub(super) fn new(
        sink: Box<dyn Write + Send>,
        rx: Receiver<WriteJob>,
        counters: Arc<Counters>,
    ) -> Self {
        Self { sink, rx, counters }
    }

    /// Write jobs until every sender is gone and the queue is empty.
    pub(super) fn run(mut self) {
        debug!("warehouse writer started");

        while let Some(job) = self.rx.blocking_recv() {
            match self.write(&job) {
                Ok(()) => {
                    self.counters.written.fetch_add(1, Relaxed);
                }
                Err(err) => {
                    self.counters.errors.fetch_add(1, Relaxed);
                    error!(
                        "statement [{}] not written to probe file: {}",
                        job.fingerprint, err
                    );
                }
            }
        }

        debug!("warehouse writer stopped");
    }

    fn write(&mut self, job: &WriteJob) -> std::io::Result<()> {
        let entry = entry(&job.fingerprint, &job.statement)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        self.sink.write_all(entry.as_bytes())?;
        self.sink.flush()
    }
}

/// Format one probe file entry.
///
/// Statements are written as literal block scalars so they stay
/// readable and editable. Text YAML can't carry in a block scalar
/// is left to the YAML emitter, which quotes and escapes it.
pub fn entry(fingerprint: &str, statement: &str) -> Result<String, serde_yaml::Error> {
    if !block_safe(statement) {
        let mut entry = BTreeMap::new();
        entry.insert(fingerprint, statement);
        return serde_yaml::to_string(&entry);
    }

    let chomping = if statement.ends_with('\n') { '+' } else { '-' };
    let mut out = format!("'{}': |2{}\n", fingerprint.replace('\'', "''"), chomping);

    for line in statement.split_inclusive('\n') {
        out.push_str("  ");
        out.push_str(line);
    }

    if !out.ends_with('\n') {
        out.push('\n');
    }

    Ok(out)
}

fn block_safe(statement: &str) -> bool {
    !statement.chars().any(|c| {
        (c.is_control() && c != '\n' && c != '\t')
            || matches!(
                c,
                '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}'
            )
    })
}
