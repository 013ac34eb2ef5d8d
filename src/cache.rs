//! Fixed-capacity most-recently-used cache for composited thumbnails.
//!
//! Holds at most `N` entries in MRU order. A hit moves the entry to the
//! front; an insert into a full cache evicts the least recently used entry.
//! No allocation: entries live in an inline array. `N` must be at least 1,
//! checked at compile time.

/// Most-recently-used cache of `N` entries keyed by source image identity.
#[derive(Clone, Debug)]
pub struct ThumbnailCache<K, V, const N: usize> {
    /// `entries[..len]` are live, most recently used first.
    entries: [Option<(K, V)>; N],
    len: usize,
}

impl<K, V, const N: usize> Default for ThumbnailCache<K, V, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, const N: usize> ThumbnailCache<K, V, N> {
    /// Create an empty cache.
    pub fn new() -> Self {
        const { assert!(N > 0, "ThumbnailCache needs a capacity of at least 1") };
        Self {
            entries: core::array::from_fn(|_| None),
            len: 0,
        }
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of live entries.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        for slot in &mut self.entries[..self.len] {
            *slot = None;
        }
        self.len = 0;
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries[..self.len]
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(k, _)| k))
    }
}

impl<K: PartialEq, V, const N: usize> ThumbnailCache<K, V, N> {
    fn position(&self, key: &K) -> Option<usize> {
        self.entries[..self.len]
            .iter()
            .position(|slot| matches!(slot, Some((k, _)) if k == key))
    }

    /// Move the entry at `idx` to the front.
    fn promote(&mut self, idx: usize) {
        self.entries[..=idx].rotate_right(1);
    }

    fn front(&self) -> Option<&V> {
        self.entries.first()?.as_ref().map(|(_, v)| v)
    }

    /// Remove the entry for `key`, leaving its slot empty.
    fn take(&mut self, key: &K) -> Option<(usize, (K, V))> {
        let idx = self.position(key)?;
        Some((idx, self.entries[idx].take()?))
    }

    /// Slot for a new entry: the next free one, or the least recently used.
    fn free_slot(&mut self) -> usize {
        if self.len < N {
            self.len += 1;
        }
        self.len - 1
    }

    /// Whether `key` is cached. Does not change the MRU order.
    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = self.position(key)?;
        self.promote(idx);
        self.front()
    }

    /// Insert or replace `key` as the most recently used entry.
    ///
    /// Returns the evicted entry when a full cache had to drop its least
    /// recently used one.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(idx) = self.position(&key) {
            self.entries[idx] = Some((key, value));
            self.promote(idx);
            return None;
        }
        let evicted = if self.len == N {
            self.entries[N - 1].take()
        } else {
            self.len += 1;
            None
        };
        // The slot at len - 1 is now empty; rotate it to the front.
        self.promote(self.len - 1);
        self.entries[0] = Some((key, value));
        evicted
    }

    /// Return the cached value for `key`, creating it with `make` on a miss.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &V {
        match self.try_get_or_insert_with(key, || Ok::<V, core::convert::Infallible>(make())) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_insert_with`](Self::get_or_insert_with), but `make`
    /// may fail. Nothing is inserted on failure.
    pub fn try_get_or_insert_with<E>(
        &mut self,
        key: K,
        make: impl FnOnce() -> Result<V, E>,
    ) -> Result<&V, E> {
        let (slot, entry) = match self.take(&key) {
            Some(hit) => hit,
            None => {
                let value = make()?;
                // A full cache overwrites its least recently used entry.
                (self.free_slot(), (key, value))
            }
        };
        self.promote(slot);
        Ok(&self.entries[0].insert(entry).1)
    }
}
