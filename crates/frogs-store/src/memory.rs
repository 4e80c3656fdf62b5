use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use frogs_core::{KeyValueStore, StorageError};

/// In-process key-value store with switchable read/write failures.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value without counting it as a write.
    pub fn insert(&self, key: &str, value: impl Into<Vec<u8>>) {
        let _ = self.entries.lock().insert(key.to_string(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StorageError::Unavailable("read failure injected".into()));
        }
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StorageError::Unavailable("write failure injected".into()));
        }
        self.insert(key, value);
        let _ = self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_successful_writes_only() {
        let kv = MemoryKv::new();
        kv.set("k", b"a").await.unwrap();
        kv.fail_writes(true);
        assert!(kv.set("k", b"b").await.is_err());
        assert_eq!(kv.write_count(), 1);
        assert_eq!(kv.raw("k"), Some(b"a".to_vec()));
    }

    #[tokio::test]
    async fn injected_read_failure() {
        let kv = MemoryKv::new();
        kv.insert("k", "v");
        kv.fail_reads(true);
        assert!(matches!(kv.get("k").await, Err(StorageError::Unavailable(_))));
        kv.fail_reads(false);
        assert_eq!(kv.get("k").await.unwrap(), Some(b"v".to_vec()));
    }
}
