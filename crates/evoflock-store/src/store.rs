use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use tracing::{info, warn};

use evoflock_evolution::PopulationRecord;

use crate::retry::RetryPolicy;

/// Error left over after the retry budget for one store operation is spent.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StoreError {
    #[display("population file i/o failed: {_0}")]
    Io(io::Error),
    #[display("population snapshot is malformed: {_0}")]
    Malformed(serde_json::Error),
}

/// Gateway to the snapshot file shared by every process training the same
/// topology.
///
/// The file name is derived deterministically and solely from the layer
/// sizes, so identical topologies converge on the same persisted
/// population. The gateway tracks the last modification timestamp it
/// observed and only adopts strictly newer snapshots.
#[derive(Debug)]
pub struct PopulationStore {
    path: PathBuf,
    retry: RetryPolicy,
    last_observed: Option<SystemTime>,
}

impl PopulationStore {
    #[must_use]
    pub fn new(dir: &Path, layers: &[usize], retry: RetryPolicy) -> Self {
        Self {
            path: dir.join(file_name(layers)),
            retry,
            last_observed: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists a whole-population snapshot, retrying on contention. After
    /// exhaustion the error is logged and returned; in-memory state is
    /// untouched and persistence is simply skipped for this cycle.
    pub fn write(&mut self, record: &PopulationRecord) -> Result<(), StoreError> {
        match self
            .retry
            .run("writing population file", || write_file(&self.path, record))
        {
            Ok(modified) => {
                self.last_observed = Some(modified);
                Ok(())
            }
            Err(error) => {
                warn!(path = %self.path.display(), %error, "giving up on population write");
                Err(error)
            }
        }
    }

    /// Returns the shared snapshot when a sibling process has written a
    /// newer one; `None` when the file is absent, not newer than the last
    /// observed write, or unreadable after all retries (logged and skipped).
    pub fn read_if_newer(&mut self) -> Option<PopulationRecord> {
        let modified = modification_time(&self.path)?;
        if self.last_observed.is_some_and(|seen| modified <= seen) {
            return None;
        }
        match self
            .retry
            .run("reading population file", || read_file(&self.path))
        {
            Ok(record) => {
                self.last_observed = Some(modified);
                Some(record)
            }
            Err(error) => {
                warn!(path = %self.path.display(), %error, "giving up on population refresh");
                None
            }
        }
    }

    /// Initial load. Every failure mode (absent, unreadable, malformed) is
    /// logged and reported as `None` so the caller can start from scratch.
    pub fn load(&mut self) -> Option<PopulationRecord> {
        let modified = modification_time(&self.path)?;
        match self
            .retry
            .run("loading population file", || read_file(&self.path))
        {
            Ok(record) => {
                self.last_observed = Some(modified);
                info!(
                    path = %self.path.display(),
                    species = record.species.len(),
                    "population snapshot loaded"
                );
                Some(record)
            }
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    %error,
                    "failed to load population snapshot, starting from scratch"
                );
                None
            }
        }
    }
}

fn file_name(layers: &[usize]) -> String {
    let mut name = String::from("species");
    for layer in layers {
        name.push('_');
        name.push_str(&layer.to_string());
    }
    name.push_str(".json");
    name
}

fn modification_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}

fn write_file(path: &Path, record: &PopulationRecord) -> Result<SystemTime, StoreError> {
    let bytes = serde_json::to_vec(record).map_err(StoreError::Malformed)?;
    fs::write(path, bytes).map_err(StoreError::Io)?;
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(StoreError::Io)
}

fn read_file(path: &Path) -> Result<PopulationRecord, StoreError> {
    let file = fs::File::open(path).map_err(StoreError::Io)?;
    serde_json::from_reader(io::BufReader::new(file)).map_err(StoreError::Malformed)
}
