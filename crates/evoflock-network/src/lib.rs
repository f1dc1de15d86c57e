//! Per-process facade over the evolutionary engine.
//!
//! One [`EvoNet`] drives one process's slice of the cooperative search: it
//! holds the candidate currently being evaluated, runs the forward pass for
//! the agent ([`EvoNet::predict`]), and on episode end
//! ([`EvoNet::finish_life`]) folds the reported fitness into the shared
//! population, synchronizing with sibling processes through the persistence
//! gateway before and after its own update.

pub use self::{
    config::NetworkConfig,
    net::{EvoNet, sigmoid},
};

mod config;
mod net;
