//! Ordered work list with idempotent insertion

/// Notes of one review run in visiting order.
///
/// Everything before the cursor has been offered; everything from the
/// cursor on is pending. The initial list is lexicographically sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkQueue {
    items: Vec<String>,
    cursor: usize,
    deferred: Vec<String>,
}

impl WorkQueue {
    pub fn new(mut keys: Vec<String>) -> Self {
        keys.sort();
        keys.dedup();
        Self {
            items: keys,
            cursor: 0,
            deferred: Vec::new(),
        }
    }

    /// Take the next pending key
    pub fn next_key(&mut self) -> Option<String> {
        let key = self.items.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(key)
    }

    /// Keys not yet offered, in order
    pub fn pending(&self) -> &[String] {
        &self.items[self.cursor..]
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    /// 1-based position of the key most recently taken
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Whether the key is anywhere in this run's list
    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|k| k == key)
    }

    /// Mark an offered key as left unresolved (skipped)
    pub fn defer(&mut self, key: &str) {
        if !self.deferred.iter().any(|k| k == key) {
            self.deferred.push(key.to_string());
        }
    }

    pub fn deferred(&self) -> &[String] {
        &self.deferred
    }

    /// True when every key was offered and none was deferred
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0 && self.deferred.is_empty()
    }

    /// Insert keys right after `after`, in sorted order among themselves.
    ///
    /// Keys already in the list or rejected by `exclude` are skipped, so
    /// inserting the same key twice leaves exactly one copy. Insertion never
    /// lands before the cursor. Returns the keys actually inserted.
    pub fn insert_after(
        &mut self,
        after: &str,
        keys: &[String],
        exclude: impl Fn(&str) -> bool,
    ) -> Vec<String> {
        let mut fresh: Vec<String> = keys
            .iter()
            .filter(|k| !self.contains(k.as_str()) && !exclude(k.as_str()))
            .cloned()
            .collect();
        fresh.sort();
        fresh.dedup();
        if fresh.is_empty() {
            return fresh;
        }

        let anchor = self
            .items
            .iter()
            .position(|k| k == after)
            .map(|i| i + 1)
            .unwrap_or(self.cursor)
            .max(self.cursor);

        self.items.splice(anchor..anchor, fresh.iter().cloned());
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sorted_and_deduped() {
        let mut q = WorkQueue::new(keys(&["c.md", "a.md", "b.md", "a.md"]));
        assert_eq!(q.pending(), keys(&["a.md", "b.md", "c.md"]).as_slice());
        assert_eq!(q.next_key().as_deref(), Some("a.md"));
        assert_eq!(q.position(), 1);
        assert_eq!(q.remaining(), 2);
    }

    #[test]
    fn test_insert_after_current() {
        let mut q = WorkQueue::new(keys(&["a.md", "b.md", "c.md"]));
        q.next_key();
        let inserted = q.insert_after("a.md", &keys(&["z.md", "m.md"]), |_| false);
        assert_eq!(inserted, keys(&["m.md", "z.md"]));
        assert_eq!(
            q.pending(),
            keys(&["m.md", "z.md", "b.md", "c.md"]).as_slice()
        );
    }

    #[test]
    fn test_insert_idempotent() {
        let mut q = WorkQueue::new(keys(&["a.md", "b.md"]));
        q.next_key();
        q.insert_after("a.md", &keys(&["new.md"]), |_| false);
        let second = q.insert_after("a.md", &keys(&["new.md", "new.md"]), |_| false);
        assert!(second.is_empty());
        assert_eq!(q.pending().iter().filter(|k| *k == "new.md").count(), 1);
    }

    #[test]
    fn test_insert_respects_exclusion() {
        let mut q = WorkQueue::new(keys(&["a.md"]));
        q.next_key();
        let inserted = q.insert_after("a.md", &keys(&["done.md", "x.md"]), |k| k == "done.md");
        assert_eq!(inserted, keys(&["x.md"]));
    }

    #[test]
    fn test_insert_never_before_cursor() {
        let mut q = WorkQueue::new(keys(&["a.md", "b.md", "c.md"]));
        q.next_key();
        q.next_key();
        q.insert_after("a.md", &keys(&["n.md"]), |_| false);
        assert_eq!(q.pending(), keys(&["n.md", "c.md"]).as_slice());
    }

    #[test]
    fn test_completion_tracks_deferred() {
        let mut q = WorkQueue::new(keys(&["a.md"]));
        assert!(!q.is_complete());
        q.next_key();
        q.defer("a.md");
        assert!(!q.is_complete());
        assert_eq!(q.deferred(), keys(&["a.md"]).as_slice());

        let mut q = WorkQueue::new(keys(&["a.md"]));
        q.next_key();
        assert!(q.is_complete());
    }
}
