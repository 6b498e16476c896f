//! Correlation id → last key touched under that id.

use std::collections::HashMap;
use trainticket_core::correlation::CorrelationId;

/// Remembers, per correlation id, the single most recent key a request read.
///
/// Only the latest key is kept. A request that reads two keys from the same
/// cache can invalidate only the second one through its id.
#[derive(Debug)]
pub struct CorrelationLedger<K> {
    entries: HashMap<CorrelationId, K>,
}

impl<K> Default for CorrelationLedger<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K> CorrelationLedger<K> {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` for `id`, replacing any earlier key.
    pub fn remember(&mut self, id: &CorrelationId, key: K) {
        self.entries.insert(id.clone(), key);
    }

    /// Remove and return the key remembered for `id`.
    pub fn take(&mut self, id: &CorrelationId) -> Option<K> {
        self.entries.remove(id)
    }

    /// Drop the entry for `id`. Returns whether one existed.
    pub fn forget(&mut self, id: &CorrelationId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Key currently remembered for `id`
    #[must_use]
    pub fn get(&self, id: &CorrelationId) -> Option<&K> {
        self.entries.get(id)
    }

    /// Number of ids with a remembered key
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no id has a remembered key
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut ledger = CorrelationLedger::new();
        let id = CorrelationId::new("7");

        ledger.remember(&id, "first");
        ledger.remember(&id, "second");

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.take(&id), Some("second"));
        assert!(ledger.take(&id).is_none());
    }

    #[test]
    fn ids_are_independent() {
        let mut ledger = CorrelationLedger::new();
        ledger.remember(&CorrelationId::new("1"), 10);
        ledger.remember(&CorrelationId::new("2"), 20);

        assert!(ledger.forget(&CorrelationId::new("1")));
        assert!(!ledger.forget(&CorrelationId::new("1")));
        assert_eq!(ledger.get(&CorrelationId::new("2")), Some(&20));
    }
}
