//! File-backed persistence gateway for the shared population.
//!
//! Cooperating trainer processes have no channel between them other than one
//! snapshot file per network topology. Consistency is deliberately weak:
//! writes are whole-population snapshots with last-write-wins semantics, and
//! staleness is detected through the file's modification timestamp. There is
//! no real locking; contention shows up as transient I/O or parse failures
//! and is absorbed by a bounded retry policy. A lost update delays
//! convergence but can never corrupt adopted state, because readers only
//! ever adopt a complete, parseable snapshot.

pub use self::{
    retry::RetryPolicy,
    store::{PopulationStore, StoreError},
};

mod retry;
mod store;
