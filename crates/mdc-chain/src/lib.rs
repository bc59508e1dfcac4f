//! Voice allocation over MDC device slots.
//!
//! A [`DeviceChain`] groups device slots into a ring and hands notes to them
//! with one of three strategies ([`ChainType`]). Chains hold non-owning
//! references; the [`DeviceScheduler`](mdc_core::DeviceScheduler) stays the
//! sole owner of every device. [`ChainRegistry`] owns the chains.
//!
//! ```ignore
//! let mut chains = ChainRegistry::new();
//! chains.create_chain(0, ChainType::RoundRobin, &[0, 1, 2, 3], &scheduler)?;
//! chains.assign_note(0, 60);
//! ```

pub mod error;
pub use error::{Error, Result};

mod node;
pub use node::DeviceNode;

mod ring;
pub use ring::{DeviceRing, MAX_CHAIN_NODES};

mod chain;
pub use chain::{ChainType, DeviceChain};

mod registry;
pub use registry::{ChainRegistry, ChainStatus, RegistryStatus, MAX_CHAINS};
