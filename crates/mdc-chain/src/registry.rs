//! Fixed-capacity table of chain slots.

use core::fmt;

use mdc_core::DeviceScheduler;

use crate::{ChainType, DeviceChain, Error, Result, MAX_CHAIN_NODES};

/// Hard upper bound on chain slots.
pub const MAX_CHAINS: usize = 16;

/// Owner of every [`DeviceChain`], addressed by slot.
///
/// Slot operations outside `[0, capacity)` or on an occupied slot fail without
/// mutation. Note routing to an empty slot is a no-op returning `false`.
#[derive(Debug)]
pub struct ChainRegistry {
    chains: Vec<Option<DeviceChain>>,
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CHAINS)
    }

    /// Registry with `capacity` slots, clamped to `1..=MAX_CHAINS`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_CHAINS);
        Self {
            chains: (0..capacity).map(|_| None).collect(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.chains.len()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.iter().flatten().count()
    }

    fn check_vacant(&self, slot: usize) -> Result<()> {
        match self.chains.get(slot) {
            None => Err(Error::SlotOutOfRange {
                index: slot,
                capacity: self.chains.len(),
            }),
            Some(Some(_)) => Err(Error::SlotOccupied(slot)),
            Some(None) => Ok(()),
        }
    }

    /// Install a prebuilt chain.
    pub fn add_chain(&mut self, slot: usize, chain: DeviceChain) -> Result<()> {
        if let Err(e) = self.check_vacant(slot) {
            tracing::warn!("Can't add chain: {}", e);
            return Err(e);
        }
        tracing::debug!(
            "Added {} chain at slot {} with {} devices",
            chain.kind(),
            slot,
            chain.len()
        );
        self.chains[slot] = Some(chain);
        Ok(())
    }

    /// Build a chain over `members` (device slot indices, in ring order) and
    /// install it.
    ///
    /// Every member must exist in `scheduler` and appear once.
    pub fn create_chain(
        &mut self,
        slot: usize,
        kind: ChainType,
        members: &[usize],
        scheduler: &DeviceScheduler,
    ) -> Result<()> {
        let built = self
            .check_vacant(slot)
            .and_then(|()| Self::build_chain(kind, members, scheduler));

        match built {
            Ok(chain) => self.add_chain(slot, chain),
            Err(e) => {
                tracing::warn!("Can't create chain at slot {}: {}", slot, e);
                Err(e)
            }
        }
    }

    fn build_chain(kind: ChainType, members: &[usize], scheduler: &DeviceScheduler) -> Result<DeviceChain> {
        if members.is_empty() {
            return Err(Error::EmptyChain);
        }
        if members.len() > MAX_CHAIN_NODES {
            return Err(Error::ChainFull {
                capacity: MAX_CHAIN_NODES,
            });
        }

        let mut chain = DeviceChain::new(kind);
        for &index in members {
            let device = scheduler
                .device(index)
                .ok_or(Error::UnknownDevice(index))?;
            chain.add_device(&device)?;
        }
        Ok(chain)
    }

    /// Remove the chain at `slot`. Returns false if nothing was there.
    ///
    /// Member devices keep whatever notes they hold.
    pub fn delete_chain(&mut self, slot: usize) -> bool {
        let Some(entry) = self.chains.get_mut(slot) else {
            tracing::debug!("Max chain index is {}", self.chains.len() - 1);
            return false;
        };

        if entry.take().is_some() {
            tracing::debug!("Deleted chain at {}", slot);
            true
        } else {
            tracing::debug!("No chain at {}", slot);
            false
        }
    }

    pub fn chain(&self, slot: usize) -> Option<&DeviceChain> {
        self.chains.get(slot).and_then(Option::as_ref)
    }

    pub fn chain_mut(&mut self, slot: usize) -> Option<&mut DeviceChain> {
        self.chains.get_mut(slot).and_then(Option::as_mut)
    }

    /// Iterate over `(slot, chain)` for populated slots.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &DeviceChain)> {
        self.chains
            .iter()
            .enumerate()
            .filter_map(|(slot, chain)| chain.as_ref().map(|c| (slot, c)))
    }

    pub fn assign_note(&mut self, slot: usize, note: u8) -> bool {
        self.chain_mut(slot).is_some_and(|c| c.assign_note(note))
    }

    pub fn clear_note(&mut self, slot: usize, note: u8) -> bool {
        self.chain_mut(slot).is_some_and(|c| c.clear_note(note))
    }

    pub fn pitch_bend(&self, slot: usize, bend: u16) -> bool {
        match self.chain(slot) {
            Some(chain) => {
                chain.pitch_bend(bend);
                true
            }
            None => false,
        }
    }

    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            chains: self
                .chains
                .iter()
                .map(|slot| {
                    slot.as_ref().map(|chain| ChainStatus {
                        kind: chain.kind(),
                        members: chain.device_indices(),
                        cursor: chain.cursor(),
                        sounding: chain
                            .nodes()
                            .filter(|n| n.current_note().is_some())
                            .count(),
                    })
                })
                .collect(),
        }
    }

    pub fn log_status(&self) {
        tracing::info!("{}", self.status());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStatus {
    pub kind: ChainType,
    /// Device slot indices in ring order.
    pub members: Vec<usize>,
    pub cursor: Option<usize>,
    /// Members currently holding a note.
    pub sounding: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStatus {
    /// One entry per slot; `None` for empty slots.
    pub chains: Vec<Option<ChainStatus>>,
}

impl fmt::Display for RegistryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (slot, chain) in self.chains.iter().enumerate() {
            match chain {
                None => writeln!(f, "Chain {}: empty", slot)?,
                Some(chain) => writeln!(
                    f,
                    "Chain {}: {} {:?} ({} sounding)",
                    slot, chain.kind, chain.members, chain.sounding
                )?,
            }
        }
        Ok(())
    }
}
