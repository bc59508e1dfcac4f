//! Voice allocation strategies over a device ring.

use core::fmt;

use serde::{Deserialize, Serialize};

use mdc_core::compat::Arc;
use mdc_core::Device;

use crate::{DeviceNode, DeviceRing, Error, Result};

/// Allocation strategy of a [`DeviceChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChainType {
    /// Every available device plays every note (unison)
    Direct,
    /// First available device from the ring start
    FirstAvailable,
    /// Rotate through devices, resuming after the last one assigned
    #[default]
    RoundRobin,
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainType::Direct => write!(f, "direct"),
            ChainType::FirstAvailable => write!(f, "first-available"),
            ChainType::RoundRobin => write!(f, "round-robin"),
        }
    }
}

/// Ordered, circular group of devices sharing one allocation strategy.
///
/// Main loop only: the round-robin cursor is plain state behind `&mut self`.
/// The per-device assign and clear are still atomic against the tick handler.
#[derive(Debug, Clone)]
pub struct DeviceChain {
    kind: ChainType,
    ring: DeviceRing,
    /// Ring position of the last round-robin assignment.
    cursor: Option<usize>,
}

impl DeviceChain {
    pub fn new(kind: ChainType) -> Self {
        Self {
            kind,
            ring: DeviceRing::new(),
            cursor: None,
        }
    }

    /// Append a device at the ring end.
    pub fn add_device<D: Device + 'static>(&mut self, device: &Arc<D>) -> Result<()> {
        if self.ring.contains_device(device.id()) {
            return Err(Error::DuplicateMember(device.id()));
        }
        self.ring.push(DeviceNode::new(device))
    }

    #[inline]
    pub fn kind(&self) -> ChainType {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DeviceNode> {
        self.ring.iter()
    }

    /// Device slot indices in ring order.
    pub fn device_indices(&self) -> Vec<usize> {
        self.ring.iter().map(DeviceNode::device_index).collect()
    }

    /// Allocate `note` according to the chain's strategy.
    pub fn assign_note(&mut self, note: u8) -> bool {
        match self.kind {
            ChainType::Direct => self.assign_direct(note),
            ChainType::FirstAvailable => self.assign_first_available(note),
            ChainType::RoundRobin => self.assign_round_robin(note),
        }
    }

    /// Release `note` according to the chain's strategy.
    pub fn clear_note(&mut self, note: u8) -> bool {
        match self.kind {
            ChainType::Direct => self.clear_direct(note),
            ChainType::FirstAvailable => self.clear_first_available(note),
            ChainType::RoundRobin => self.clear_round_robin(note),
        }
    }

    /// Broadcast to every member.
    pub fn pitch_bend(&self, bend: u16) {
        for node in self.ring.iter() {
            node.pitch_bend(bend);
        }
    }

    fn assign_direct(&self, note: u8) -> bool {
        // No short circuit: every available device takes the note
        self.ring
            .iter()
            .fold(false, |any, node| node.try_assign(note) || any)
    }

    fn clear_direct(&self, note: u8) -> bool {
        self.ring
            .iter()
            .fold(false, |any, node| node.try_clear(note) || any)
    }

    fn assign_first_available(&self, note: u8) -> bool {
        self.ring.iter().any(|node| node.try_assign(note))
    }

    fn clear_first_available(&self, note: u8) -> bool {
        self.ring.iter().any(|node| node.try_clear(note))
    }

    fn assign_round_robin(&mut self, note: u8) -> bool {
        match self.ring.len() {
            0 => false,
            1 => self.delegate_single(|node| node.try_assign(note)),
            _ => {
                let start = self.cursor.map_or(0, |c| self.ring.next(c));
                let hit = self.ring.walk_forward(start).find(|&i| {
                    self.ring
                        .get(i)
                        .is_some_and(|node| node.try_assign(note))
                });
                match hit {
                    Some(i) => {
                        self.cursor = Some(i);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    fn clear_round_robin(&self, note: u8) -> bool {
        match self.ring.len() {
            0 => false,
            1 => self.delegate_single(|node| node.try_clear(note)),
            len => {
                let start = self.cursor.map_or(len - 1, |c| self.ring.prev(c));
                self.ring.walk_backward(start).any(|i| {
                    self.ring
                        .get(i)
                        .is_some_and(|node| node.try_clear(note))
                })
            }
        }
    }

    fn delegate_single(&self, op: impl FnOnce(&DeviceNode) -> bool) -> bool {
        self.ring.get(0).is_some_and(op)
    }
}
