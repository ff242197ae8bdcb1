use std::sync::Arc;

use tracing::{debug, error};

use raft_core::Address;

use crate::error::{Result, StoreError};
use crate::store::KeyValueStore;

pub const ADDRESS_KEY_PREFIX: &[u8] = b"addr/";

/// Cluster configuration persisted as encoded addresses, one per raft id.
///
/// Anything read back that fails to decode is reported as
/// [`StoreError::Corrupted`]: stored membership must never be ambiguous, so
/// callers are expected to abort the operation rather than skip the entry.
#[derive(Clone)]
pub struct AddressBook {
    store: Arc<dyn KeyValueStore>,
}

impl AddressBook {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn key(raft_id: u16) -> Vec<u8> {
        let mut key = ADDRESS_KEY_PREFIX.to_vec();
        key.extend_from_slice(&raft_id.to_be_bytes());
        key
    }

    fn raft_id_of_key(key: &[u8]) -> Result<u16> {
        key.strip_prefix(ADDRESS_KEY_PREFIX)
            .and_then(|id| <[u8; 2]>::try_from(id).ok())
            .map(u16::from_be_bytes)
            .ok_or_else(|| StoreError::MalformedKey(key.to_vec()))
    }

    pub fn save(&self, address: &Address) -> Result<()> {
        if !address.is_assigned() {
            return Err(StoreError::Unassigned);
        }
        self.store.put(&Self::key(address.raft_id()), &address.to_bytes())?;
        debug!("saved {}", address);
        Ok(())
    }

    pub fn load(&self, raft_id: u16) -> Result<Option<Address>> {
        match self.store.get(&Self::key(raft_id))? {
            None => Ok(None),
            Some(bytes) => Self::decode_stored(raft_id, &bytes).map(Some),
        }
    }

    pub fn remove(&self, raft_id: u16) -> Result<bool> {
        let removed = self.store.delete(&Self::key(raft_id))?;
        if removed {
            debug!("removed address of raft id {}", raft_id);
        }
        Ok(removed)
    }

    /// All stored addresses ordered by raft id.
    pub fn load_all(&self) -> Result<Vec<Address>> {
        let mut addresses = vec![];
        for (key, bytes) in self.store.scan_prefix(ADDRESS_KEY_PREFIX)? {
            let raft_id = Self::raft_id_of_key(&key)?;
            addresses.push(Self::decode_stored(raft_id, &bytes)?);
        }
        addresses.sort_by_key(|a| a.raft_id());
        Ok(addresses)
    }

    fn decode_stored(raft_id: u16, bytes: &[u8]) -> Result<Address> {
        let address = Address::from_bytes(bytes).map_err(|source| {
            error!("failed to decode stored address of raft id {}: {}", raft_id, source);
            StoreError::Corrupted { raft_id, source }
        })?;
        if address.raft_id() != raft_id {
            error!("address stored under raft id {} is {}", raft_id, address);
            return Err(StoreError::Mismatch { key: raft_id, stored: address.raft_id() });
        }
        Ok(address)
    }
}
