//! Fixed-capacity circular store of chain nodes.
//!
//! Nodes live in contiguous storage and link by index: the successor of `i` is
//! `(i + 1) % len`. Every walk visits each node exactly once and so terminates
//! after `len` steps.

use smallvec::SmallVec;

use mdc_core::MAX_DEVICES;

use crate::{DeviceNode, Error, Result};

/// Upper bound on nodes in one chain.
pub const MAX_CHAIN_NODES: usize = MAX_DEVICES;

#[derive(Debug, Clone, Default)]
pub struct DeviceRing {
    nodes: SmallVec<[DeviceNode; MAX_CHAIN_NODES]>,
}

impl DeviceRing {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        MAX_CHAIN_NODES
    }

    /// Append at the ring end.
    pub fn push(&mut self, node: DeviceNode) -> Result<()> {
        if self.nodes.len() >= MAX_CHAIN_NODES {
            return Err(Error::ChainFull {
                capacity: MAX_CHAIN_NODES,
            });
        }
        self.nodes.push(node);
        Ok(())
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&DeviceNode> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceNode> {
        self.nodes.iter()
    }

    pub fn contains_device(&self, device_index: usize) -> bool {
        self.nodes.iter().any(|n| n.device_index() == device_index)
    }

    /// Successor of `index`, wrapping at the ring end.
    #[inline]
    pub fn next(&self, index: usize) -> usize {
        (index + 1) % self.nodes.len().max(1)
    }

    /// Predecessor of `index`, wrapping at the ring start.
    #[inline]
    pub fn prev(&self, index: usize) -> usize {
        let len = self.nodes.len().max(1);
        (index + len - 1) % len
    }

    /// Node positions in forward order, starting at `start`, one full turn.
    pub fn walk_forward(&self, start: usize) -> impl Iterator<Item = usize> {
        let len = self.nodes.len();
        (0..len).map(move |step| (start + step) % len)
    }

    /// Node positions in reverse order, starting at `start`, one full turn.
    pub fn walk_backward(&self, start: usize) -> impl Iterator<Item = usize> {
        let len = self.nodes.len();
        (0..len).map(move |step| (start + len - step) % len)
    }
}
