use logconsole_types::Entry;

/// Append-only store of every entry received since the last clear
#[derive(Debug, Default)]
pub struct EntryStore {
    /// Entries in arrival order
    entries: Vec<Entry>,

    /// Next entry ID
    next_id: u64,
}

impl EntryStore {
    /// Create an empty store with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next_id: 0,
        }
    }

    /// Append an entry, returning its index
    pub fn push(&mut self, mut entry: Entry) -> usize {
        entry.set_id(self.next_id);
        self.next_id += 1;
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry and restart numbering
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_id = 0;
    }

    /// Export all entries as text blocks separated by blank lines
    pub fn export_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("[{}] {}", e.severity().as_str(), e.display_text()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logconsole_types::Severity;

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut store = EntryStore::default();
        let a = store.push(Entry::new("a", "", Severity::Info));
        let b = store.push(Entry::new("b", "", Severity::Error));

        assert_eq!((a, b), (0, 1));
        assert_eq!(store.get(1).map(|e| e.id()), Some(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear_restarts_numbering() {
        let mut store = EntryStore::with_capacity(4);
        store.push(Entry::new("a", "", Severity::Info));
        store.push(Entry::new("b", "", Severity::Info));
        store.clear();
        assert!(store.is_empty());

        store.push(Entry::new("c", "", Severity::Info));
        assert_eq!(store.get(0).map(|e| e.id()), Some(0));
    }

    #[test]
    fn test_export_text() {
        let mut store = EntryStore::default();
        store.push(Entry::new("started", "", Severity::Info));
        store.push(Entry::new("failed", "at main", Severity::Error));

        assert_eq!(store.export_text(), "[INF] started\n\n[ERR] failed\nat main");
    }
}
