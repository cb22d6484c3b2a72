//! Forge and anvil simulations, their replicated registers, and persistence.
//!
//! Stations own their state outright. A [`Workshop`] drives a set of them from
//! one clock in a fixed order, so a run is reproducible from its inputs.

mod anvil;
mod change;
mod container;
mod forge;
mod persist;
mod replication;
mod workshop;

pub use anvil::*;
pub use change::*;
pub use container::*;
pub use forge::*;
pub use persist::*;
pub use replication::*;
pub use workshop::*;
