use std::collections::{btree_map::Entry, BTreeMap};

/// Map keyed by numeric ids, e.g. automaton state numbers. Ids may be sparse and
/// arbitrarily large; storage grows with the number of entries only.
pub struct IdMap<V> {
    entries: BTreeMap<usize, V>,
}

impl<V> IdMap<V> {
    pub fn new() -> IdMap<V> {
        IdMap {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: usize) -> Option<&V> {
        self.entries.get(&key)
    }

    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: usize, init: F) -> &mut V {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(init()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &V)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }
}

impl<V> Default for IdMap<V> {
    fn default() -> IdMap<V> {
        IdMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_fwd() {
        //setup
        let mut map: IdMap<usize> = IdMap::new();

        //exercise
        for i in 0..100 {
            *map.get_or_insert_with(i, || 0) = i * i;
        }

        //verify
        for i in 0..100 {
            assert_eq!(*map.get(i).unwrap(), i * i);
        }
        assert_eq!(map.len(), 100);
    }

    #[test]
    fn sparse_keys() {
        //setup
        let mut map: IdMap<&str> = IdMap::new();

        //exercise
        map.get_or_insert_with(7, || "s7");
        map.get_or_insert_with(2, || "s2");

        //verify
        assert_eq!(map.len(), 2);
        assert!(map.get(0).is_none());
        assert_eq!(map.get(2), Some(&"s2"));
        assert!(map.get(5).is_none());
        assert_eq!(map.get(7), Some(&"s7"));
        assert!(map.get(8).is_none());
    }

    #[test]
    fn huge_key() {
        //setup
        let mut map: IdMap<&str> = IdMap::new();

        //exercise
        map.get_or_insert_with(100_000_000_000, || "far");
        map.get_or_insert_with(usize::max_value(), || "last");

        //verify
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(100_000_000_000), Some(&"far"));
        assert_eq!(map.get(usize::max_value()), Some(&"last"));
        assert!(map.get(0).is_none());
    }

    #[test]
    fn empty_get() {
        //setup
        let map: IdMap<usize> = IdMap::new();

        //exercise
        let res = map.get(0);

        //verify
        assert!(res.is_none());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn get_or_insert_keeps_existing() {
        //setup
        let mut map: IdMap<Vec<usize>> = IdMap::new();

        //exercise
        map.get_or_insert_with(3, Vec::new).push(1);
        map.get_or_insert_with(3, || vec![9]).push(2);

        //verify
        assert_eq!(map.get(3).unwrap(), &vec![1, 2]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn iter_in_key_order() {
        //setup
        let mut map: IdMap<char> = IdMap::new();
        map.get_or_insert_with(4, || 'd');
        map.get_or_insert_with(0, || 'a');
        map.get_or_insert_with(2, || 'c');

        //exercise
        let entries: Vec<(usize, char)> = map.iter().map(|(k, v)| (k, *v)).collect();

        //verify
        assert_eq!(entries, vec![(0, 'a'), (2, 'c'), (4, 'd')]);
    }
}
