//! Process-local record store.

use super::{RecordStore, StoreResult};
use std::collections::BTreeMap;

/// Ordered in-memory record store; contents are lost on drop.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: BTreeMap<String, String>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, name: &str) -> StoreResult<Option<String>> {
        Ok(self.records.get(name).cloned())
    }

    fn put(&mut self, name: &str, body: &str) -> StoreResult<()> {
        self.records.insert(name.to_string(), body.to_string());
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryRecordStore;
    use crate::store::RecordStore;

    #[test]
    fn keys_are_case_sensitive_and_sorted() {
        let mut store = MemoryRecordStore::new();
        store.put("beta", "{}").expect("put beta");
        store.put("Alpha", "{}").expect("put Alpha");
        store.put("alpha", "{}").expect("put alpha");

        assert_eq!(
            store.keys().expect("keys"),
            vec!["Alpha".to_string(), "alpha".to_string(), "beta".to_string()]
        );
        assert_eq!(store.get("ALPHA").expect("get"), None);
    }

    #[test]
    fn put_replaces_existing_value() {
        let mut store = MemoryRecordStore::new();
        store.put("a", "one").expect("first put");
        store.put("a", "two").expect("second put");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").expect("get").as_deref(), Some("two"));
    }
}
