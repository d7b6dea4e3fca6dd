//! Statement warehouse.
//!
//! Records every distinct statement seen in traffic to a probe file,
//! keyed by fingerprint. Recording never blocks the caller on disk:
//! the first caller to see a fingerprint queues it for a dedicated
//! writer thread, everyone else returns immediately.
//!
//! The queue is bounded. When the writer can't keep up, new statements
//! are dropped and counted instead of slowing down the application.

use std::fs::{read_to_string, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use dashmap::{mapref::entry::Entry, DashMap};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::mpsc::{channel, error::TrySendError, Sender};
use tracing::{debug, error, info, warn};

use crate::fingerprint::Fingerprint;
use crate::translator::Store;

pub mod error;
pub mod writer;

pub use error::Error;
pub use writer::WriteJob;

use writer::Writer;

static WAREHOUSE: OnceCell<Arc<Warehouse>> = OnceCell::new();

#[derive(Debug, Default)]
pub(crate) struct Counters {
    seen: AtomicUsize,
    duplicates: AtomicUsize,
    written: AtomicUsize,
    dropped: AtomicUsize,
    errors: AtomicUsize,
}

/// Warehouse statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Distinct statements accepted for recording.
    pub seen: usize,
    /// Statements already recorded.
    pub duplicates: usize,
    /// Entries written to the probe file.
    pub written: usize,
    /// Statements rejected because the queue was full.
    pub dropped: usize,
    /// Entries that failed to write.
    pub errors: usize,
}

/// Deduplicating statement recorder.
#[derive(Debug)]
pub struct Warehouse {
    seen: DashMap<String, ()>,
    tx: RwLock<Option<Sender<WriteJob>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
    queue: usize,
    path: Option<PathBuf>,
}

impl Warehouse {
    /// Record to a probe file. The file is appended to, and statements
    /// it already contains are not recorded again.
    pub fn open(path: &Path, queue: usize) -> Result<Self, Error> {
        let known = match read_to_string(path) {
            Ok(existing) => match Store::from_table(&existing) {
                Ok(store) => store.keys().map(|key| key.to_owned()).collect(),
                Err(err) => {
                    warn!(
                        "probe file \"{}\" has unreadable entries, recording all statements: {}",
                        path.display(),
                        err
                    );
                    vec![]
                }
            },
            Err(_) => vec![],
        };

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| Error::Open {
                path: path.to_owned(),
                source,
            })?;

        let warehouse = Self::start(Box::new(BufWriter::new(file)), queue, Some(path.to_owned()))?;
        for fingerprint in known {
            warehouse.seen.insert(fingerprint, ());
        }

        info!(
            "recording statements to \"{}\" [known: {}, queue: {}]",
            path.display(),
            warehouse.seen.len(),
            queue
        );

        Ok(warehouse)
    }

    /// Record to any sink.
    pub fn with_sink(sink: Box<dyn Write + Send>, queue: usize) -> Result<Self, Error> {
        Self::start(sink, queue, None)
    }

    fn start(
        sink: Box<dyn Write + Send>,
        queue: usize,
        path: Option<PathBuf>,
    ) -> Result<Self, Error> {
        let queue = queue.max(1);
        let (tx, rx) = channel(queue);
        let counters = Arc::new(Counters::default());
        let writer = Writer::new(sink, rx, counters.clone());

        let handle = thread::Builder::new()
            .name("warehouse-writer".into())
            .spawn(move || writer.run())
            .map_err(Error::Spawn)?;

        Ok(Self {
            seen: DashMap::new(),
            tx: RwLock::new(Some(tx)),
            writer: Mutex::new(Some(handle)),
            counters,
            queue,
            path,
        })
    }

    /// Get the warehouse shared by all connections, opening
    /// the probe file on first use.
    pub fn shared(path: &Path, queue: usize) -> Result<Arc<Self>, Error> {
        let warehouse = WAREHOUSE.get_or_try_init(|| Self::open(path, queue).map(Arc::new))?;

        if warehouse.path.as_deref() != Some(path) {
            warn!(
                "probe file \"{}\" ignored, already recording to \"{}\"",
                path.display(),
                warehouse
                    .path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default()
            );
        }

        Ok(warehouse.clone())
    }

    /// The shared warehouse, if one was opened.
    pub fn get() -> Option<Arc<Self>> {
        WAREHOUSE.get().cloned()
    }

    /// Record a statement and pass it through unchanged.
    pub fn record<'a>(&self, statement: &'a str) -> &'a str {
        let fingerprint = Fingerprint::new(statement).id();

        match self.seen.entry(fingerprint) {
            Entry::Occupied(_) => {
                self.counters.duplicates.fetch_add(1, Relaxed);
                return statement;
            }
            Entry::Vacant(entry) => {
                let job = WriteJob {
                    fingerprint: entry.key().clone(),
                    statement: statement.to_owned(),
                };
                entry.insert(());
                self.counters.seen.fetch_add(1, Relaxed);
                self.send(job);
            }
        }

        statement
    }

    fn send(&self, job: WriteJob) {
        let guard = self.tx.read();
        let Some(tx) = guard.as_ref() else {
            debug!("warehouse is shut down, statement [{}] not recorded", job.fingerprint);
            return;
        };

        match tx.try_send(job) {
            Ok(()) => (),
            Err(TrySendError::Full(job)) => {
                self.counters.dropped.fetch_add(1, Relaxed);
                error!(
                    "warehouse queue is full ({} statements), statement [{}] not recorded; increase \"warehouse_queue\"",
                    self.queue, job.fingerprint
                );
            }
            Err(TrySendError::Closed(job)) => {
                debug!("warehouse writer is gone, statement [{}] not recorded", job.fingerprint);
            }
        }
    }

    /// Fingerprint was recorded.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains_key(&fingerprint.id())
    }

    /// Warehouse statistics.
    pub fn stats(&self) -> Stats {
        Stats {
            seen: self.counters.seen.load(Relaxed),
            duplicates: self.counters.duplicates.load(Relaxed),
            written: self.counters.written.load(Relaxed),
            dropped: self.counters.dropped.load(Relaxed),
            errors: self.counters.errors.load(Relaxed),
        }
    }

    /// Stop accepting statements and wait for queued ones to be written.
    /// Returns false if the writer didn't finish in time, in which case
    /// it's left running in the background.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.tx.write().take();

        let Some(handle) = self.writer.lock().take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    "warehouse writer didn't finish in {:.3}s, {} statements may be lost",
                    timeout.as_secs_f64(),
                    self.stats().unwritten()
                );
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }

        if handle.join().is_err() {
            error!("warehouse writer panicked");
            return false;
        }

        let stats = self.stats();
        info!(
            "warehouse shut down [written: {}, dropped: {}, errors: {}]",
            stats.written, stats.dropped, stats.errors
        );

        true
    }
}

impl Stats {
    /// Statements queued but not written yet.
    pub fn unwritten(&self) -> usize {
        self.seen
            .saturating_sub(self.written + self.dropped + self.errors)
    }
}

impl Drop for Warehouse {
    fn drop(&mut self) {
        self.tx.get_mut().take();
    }
}
