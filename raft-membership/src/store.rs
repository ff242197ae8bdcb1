use std::fmt::{Debug, Formatter};

use dashmap::DashMap;

/// Byte oriented key-value storage the address book is persisted into.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>>;

    fn put(&self, key: &[u8], value: &[u8]) -> anyhow::Result<()>;

    /// Returns whether the key was present.
    fn delete(&self, key: &[u8]) -> anyhow::Result<bool>;

    fn scan_prefix(&self, prefix: &[u8]) -> anyhow::Result<Vec<(Vec<u8>, Vec<u8>)>>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> anyhow::Result<()> {
        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> anyhow::Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> anyhow::Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut entries = self.entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect::<Vec<_>>();
        entries.sort();
        Ok(entries)
    }
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}
