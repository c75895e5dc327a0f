//! Record store: the ordered, identity-keyed source of truth.

use std::collections::HashMap;
use tabula_core::{CellValue, Record, RecordId};

/// Insertion-ordered records with O(1) lookup by identity.
///
/// The store never validates field arity; the engine checks records against
/// its schema before they get here.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    positions: HashMap<RecordId, usize>,
    /// Highest identity ever handed out. Survives `remove` and `clear`.
    high_water: RecordId,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            positions: HashMap::new(),
            high_water: RecordId::new(0),
        }
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identity the next insert will receive.
    pub fn next_id(&self) -> RecordId {
        self.high_water.next()
    }

    /// Append a record and return its identity.
    pub fn insert(&mut self, fields: Vec<CellValue>) -> RecordId {
        let id = self.next_id();
        self.high_water = id;
        self.positions.insert(id, self.records.len());
        self.records.push(Record::new(id, fields));
        id
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.positions.get(&id).map(|&pos| &self.records[pos])
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        match self.positions.get(&id) {
            Some(&pos) => self.records.get_mut(pos),
            None => None,
        }
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Remove a record, keeping the relative order of the rest.
    pub fn remove(&mut self, id: RecordId) -> Option<Record> {
        let pos = self.positions.remove(&id)?;
        let record = self.records.remove(pos);
        for (offset, later) in self.records[pos..].iter().enumerate() {
            self.positions.insert(later.id, pos + offset);
        }
        Some(record)
    }

    /// Drop every record. Identities keep counting from the high-water mark,
    /// so a reference taken before the clear never resolves afterwards.
    pub fn clear(&mut self) {
        self.records.clear();
        self.positions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.records.iter().map(|r| r.id)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> Vec<CellValue> {
        vec![CellValue::text(name)]
    }

    #[test]
    fn test_insert_assigns_monotonic_ids() {
        let mut store = RecordStore::new();
        assert_eq!(store.insert(row("a")), RecordId::new(1));
        assert_eq!(store.insert(row("b")), RecordId::new(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_deleted_max_id_is_not_reissued() {
        let mut store = RecordStore::new();
        store.insert(row("a"));
        let b = store.insert(row("b"));
        assert!(store.remove(b).is_some());
        assert_eq!(store.insert(row("c")), RecordId::new(3));
    }

    #[test]
    fn test_remove_preserves_order_and_lookup() {
        let mut store = RecordStore::new();
        let a = store.insert(row("a"));
        let b = store.insert(row("b"));
        let c = store.insert(row("c"));
        store.remove(a);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![b, c]);
        assert_eq!(store.get(c).map(|r| r.fields[0].as_text().into_owned()), Some("c".to_string()));
        assert!(store.remove(a).is_none());
    }

    #[test]
    fn test_clear_keeps_counting_identities() {
        let mut store = RecordStore::new();
        let a = store.insert(row("a"));
        store.insert(row("b"));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.insert(row("c")), RecordId::new(3));
        assert!(store.get(a).is_none());
    }

    #[test]
    fn test_next_id_comes_from_high_water() {
        let mut store = RecordStore::new();
        for i in 0..100_000 {
            store.insert(row(if i % 2 == 0 { "even" } else { "odd" }));
        }
        assert_eq!(store.next_id(), RecordId::new(100_001));
        assert!(store.remove(RecordId::new(100_000)).is_some());
        assert_eq!(store.next_id(), RecordId::new(100_001));
    }
}
