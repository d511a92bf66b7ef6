use alloc::boxed::Box;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::iter::FusedIterator;

use crate::capacity::BucketCount;
use crate::capacity::MAX_BUCKET_COUNT;
use crate::capacity::index_for;
use crate::chain::Chain;
use crate::entry::Entry;
use crate::error::CapacityError;

/// A fixed-capacity hash table mapping string keys to values of type `V`.
///
/// The bucket array is sized once, at construction, to the smallest power of
/// two that covers the requested capacity. Keys that land in the same bucket
/// share a chain. The table never grows: once it holds `capacity` entries,
/// further `set` calls are rejected until something is deleted.
///
/// Keys are hashed with the [`BuildHasher`] `S`. Each entry caches its key's
/// hash, and a lookup only compares key strings when the cached hash matches.
///
/// ## Example
///
/// ```rust
/// # use std::hash::RandomState;
/// # use chained_hash::FixedTable;
/// #
/// let mut table: FixedTable<&str, RandomState> = FixedTable::new(1);
///
/// assert!(table.set("K", "Kleiner"));
/// assert!(!table.set("P", "Perkins"));
///
/// assert_eq!(table.get("K"), Some(&"Kleiner"));
/// assert_eq!(table.get("P"), None);
/// assert_eq!(table.load(), 1.0);
/// ```
#[derive(Clone)]
pub struct FixedTable<V, S> {
    buckets: Box<[Option<Chain<V>>]>,
    mask: usize,
    capacity: usize,
    len: usize,
    hash_builder: S,
}

impl<V, S> FixedTable<V, S> {
    /// Creates a table that can hold nothing.
    ///
    /// Every `set` on it fails; it still answers `get` and `delete`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates a table that holds at most `capacity` entries.
    ///
    /// Capacities whose bucket array would exceed [`MAX_BUCKET_COUNT`] are
    /// still accepted; the bucket array is clamped and chains get longer.
    /// Use [`TableBuilder`] to pick a different maximum.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::from_parts(capacity, MAX_BUCKET_COUNT, hash_builder)
    }

    fn from_parts(capacity: usize, max_bucket_count: usize, hash_builder: S) -> Self {
        let buckets = BucketCount::new(capacity, max_bucket_count);
        if buckets.was_clamped() {
            tracing::warn!(
                requested = capacity,
                bucket_count = buckets.get(),
                "bucket count clamped to the configured maximum"
            );
        }
        tracing::debug!(capacity, bucket_count = buckets.get(), "created fixed table");

        FixedTable {
            buckets: (0..buckets.get()).map(|_| None).collect(),
            mask: buckets.mask(),
            capacity,
            len: 0,
            hash_builder,
        }
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum number of entries the table accepts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns how many more new keys the table accepts.
    pub fn remaining(&self) -> usize {
        self.capacity - self.len
    }

    /// Returns `true` if no new key can be set.
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Returns the number of buckets. Always a power of two, at least 1.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the table's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns `len / capacity`.
    ///
    /// Never greater than 1.0. A zero-capacity table reports 0.0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// # use chained_hash::FixedTable;
    /// #
    /// let mut table: FixedTable<i32, RandomState> = FixedTable::new(10);
    /// for i in 0..5 {
    ///     table.set(&i.to_string(), i);
    /// }
    /// assert_eq!(table.load(), 0.5);
    /// ```
    pub fn load(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.len as f64 / self.capacity as f64
        }
    }

    /// Removes every entry. Capacity and bucket count are unchanged.
    pub fn clear(&mut self) {
        for chain in self.buckets.iter_mut().flatten() {
            chain.clear();
        }
        self.len = 0;
    }

    /// Returns an iterator over `(key, value)` pairs.
    ///
    /// Buckets are visited in index order and each chain from head to tail;
    /// callers should not rely on any particular order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    /// Returns an iterator over the keys of the table.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the table.
    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::stats::DebugStats {
        let allocated_chains = self.buckets.iter().flatten().count();
        let occupied_buckets = self
            .buckets
            .iter()
            .flatten()
            .filter(|chain| !chain.is_empty())
            .count();
        let longest_chain = self
            .buckets
            .iter()
            .flatten()
            .map(Chain::len)
            .max()
            .unwrap_or(0);

        crate::stats::DebugStats {
            populated: self.len,
            capacity: self.capacity,
            bucket_count: self.bucket_count(),
            occupied_buckets,
            allocated_chains,
            longest_chain,
            load_factor: self.load(),
            bucket_utilization: occupied_buckets as f64 / self.bucket_count() as f64,
        }
    }

    /// Returns the distribution of chain lengths over all buckets.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> crate::stats::ChainHistogram {
        crate::stats::ChainHistogram::from_lengths(
            self.buckets
                .iter()
                .map(|bucket| bucket.as_ref().map_or(0, Chain::len)),
        )
    }
}

impl<V, S> FixedTable<V, S>
where
    S: BuildHasher,
{
    #[inline(always)]
    fn locate(&self, key: &str) -> (u64, usize) {
        let hash = self.hash_builder.hash_one(key);
        (hash, index_for(hash, self.mask))
    }

    /// Stores `value` under `key`.
    ///
    /// Returns `false`, leaving the table untouched, when the table already
    /// holds `capacity` entries. That check comes first, so a full table also
    /// refuses to update keys it already holds. Otherwise an existing entry
    /// is overwritten in place, or a new entry is appended to the key's
    /// chain, and `true` is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// # use chained_hash::FixedTable;
    /// #
    /// let mut table: FixedTable<&str, RandomState> = FixedTable::new(10);
    /// assert!(table.set("K", "Kleiner"));
    /// assert!(table.set("K", "Kevin"));
    /// assert_eq!(table.get("K"), Some(&"Kevin"));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn set(&mut self, key: &str, value: V) -> bool {
        self.try_set(key, value).is_ok()
    }

    /// Stores `value` under `key`, reporting what happened.
    ///
    /// Returns `Ok(Some(old))` when an existing value was replaced,
    /// `Ok(None)` when a new entry was added, and a [`CapacityError`]
    /// holding `value` when the table is full.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// # use chained_hash::FixedTable;
    /// #
    /// let mut table: FixedTable<i32, RandomState> = FixedTable::new(1);
    /// assert_eq!(table.try_set("a", 1), Ok(None));
    ///
    /// let err = table.try_set("b", 2).unwrap_err();
    /// assert_eq!(err.capacity(), 1);
    /// assert_eq!(err.into_value(), 2);
    /// ```
    pub fn try_set(&mut self, key: &str, value: V) -> Result<Option<V>, CapacityError<V>> {
        if self.len >= self.capacity {
            tracing::trace!(capacity = self.capacity, "set rejected, table is full");
            return Err(CapacityError::new(self.capacity, value));
        }

        let (hash, index) = self.locate(key);
        let chain = self.buckets[index].get_or_insert_with(Chain::new);

        if let Some(entry) = chain.find(hash, key).and_then(|handle| chain.get_mut(handle)) {
            return Ok(Some(entry.replace(value, hash)));
        }

        chain.push_back(Entry::new(key.into(), value, hash));
        self.len += 1;
        Ok(None)
    }

    /// Returns a reference to the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        let (hash, index) = self.locate(key);
        let chain = self.buckets[index].as_ref()?;
        chain
            .find(hash, key)
            .and_then(|handle| chain.get(handle))
            .map(Entry::value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// # use chained_hash::FixedTable;
    /// #
    /// let mut table: FixedTable<Vec<i32>, RandomState> = FixedTable::new(4);
    /// table.set("xs", vec![1]);
    /// if let Some(xs) = table.get_mut("xs") {
    ///     xs.push(2);
    /// }
    /// assert_eq!(table.get("xs"), Some(&vec![1, 2]));
    /// ```
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let (hash, index) = self.locate(key);
        let chain = self.buckets[index].as_mut()?;
        let handle = chain.find(hash, key)?;
        chain.get_mut(handle).map(Entry::value_mut)
    }

    /// Returns `true` if the table holds a value for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key` from the table, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// # use chained_hash::FixedTable;
    /// #
    /// let mut table: FixedTable<&str, RandomState> = FixedTable::new(2);
    /// table.set("K", "Kleiner");
    /// assert_eq!(table.delete("P"), None);
    /// assert_eq!(table.delete("K"), Some("Kleiner"));
    /// assert!(table.is_empty());
    /// ```
    pub fn delete(&mut self, key: &str) -> Option<V> {
        let (hash, index) = self.locate(key);
        let chain = self.buckets[index].as_mut()?;
        let handle = chain.find(hash, key)?;
        let entry = chain.unlink(handle)?;
        self.len -= 1;
        Some(entry.into_value())
    }

    /// Number of entries in the chain of the bucket `key` maps to.
    ///
    /// Counts every entry sharing the bucket, not only `key`. Zero when the
    /// bucket has never received a chain.
    pub fn chain_len(&self, key: &str) -> usize {
        let (_, index) = self.locate(key);
        self.buckets[index].as_ref().map_or(0, Chain::len)
    }
}

impl<V, S> FixedTable<V, S>
where
    S: BuildHasher + Default,
{
    /// Creates a table that holds at most `capacity` entries, using the
    /// default hasher builder.
    pub fn new(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<V, S> Default for FixedTable<V, S>
where
    S: Default,
{
    /// A zero-capacity table.
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<V, S> Debug for FixedTable<V, S>
where
    V: Debug,
{
    /// Dumps every bucket with its chain, `NULL` for buckets without entries.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FixedTable")
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .field("bucket_count", &self.bucket_count())
            .field("buckets", &BucketsDump(&self.buckets))
            .finish()
    }
}

struct BucketsDump<'a, V>(&'a [Option<Chain<V>>]);

impl<V: Debug> Debug for BucketsDump<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(
                self.0
                    .iter()
                    .enumerate()
                    .map(|(index, bucket)| (index, ChainDump(bucket.as_ref()))),
            )
            .finish()
    }
}

struct ChainDump<'a, V>(Option<&'a Chain<V>>);

impl<V: Debug> Debug for ChainDump<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Some(chain) if !chain.is_empty() => f
                .debug_map()
                .entries(chain.iter().map(|entry| (entry.key(), entry.value())))
                .finish(),
            _ => f.write_str("NULL"),
        }
    }
}

/// Builds a [`FixedTable`] with a non-default bucket limit.
///
/// # Examples
///
/// ```rust
/// # use std::hash::RandomState;
/// # use chained_hash::FixedTable;
/// # use chained_hash::TableBuilder;
/// #
/// let table: FixedTable<u32, RandomState> =
///     TableBuilder::new(1_000).max_bucket_count(64).build();
/// assert_eq!(table.capacity(), 1_000);
/// assert_eq!(table.bucket_count(), 64);
/// ```
#[derive(Clone, Debug)]
pub struct TableBuilder<S> {
    capacity: usize,
    max_bucket_count: usize,
    hash_builder: S,
}

impl<S> TableBuilder<S> {
    /// Starts a builder for a table of `capacity` entries hashed with
    /// `hash_builder`.
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Self {
        TableBuilder {
            capacity,
            max_bucket_count: MAX_BUCKET_COUNT,
            hash_builder,
        }
    }

    /// Caps the bucket array at `max_bucket_count` buckets, rounded down to a
    /// power of two and never below one.
    pub fn max_bucket_count(mut self, max_bucket_count: usize) -> Self {
        self.max_bucket_count = max_bucket_count;
        self
    }

    /// Swaps in a different hasher builder.
    pub fn hasher<T>(self, hash_builder: T) -> TableBuilder<T> {
        TableBuilder {
            capacity: self.capacity,
            max_bucket_count: self.max_bucket_count,
            hash_builder,
        }
    }

    /// Builds the table.
    pub fn build<V>(self) -> FixedTable<V, S> {
        FixedTable::from_parts(self.capacity, self.max_bucket_count, self.hash_builder)
    }
}

impl<S> TableBuilder<S>
where
    S: Default,
{
    /// Starts a builder for a table of `capacity` entries using the default
    /// hasher builder.
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, S::default())
    }
}

/// An iterator over the `(key, value)` pairs of a [`FixedTable`].
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Option<Chain<V>>>,
    chain: Option<crate::chain::Iter<'a, V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((entry.key(), entry.value()));
            }
            self.chain = self.buckets.next()?.as_ref().map(Chain::iter);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// An iterator over the keys of a [`FixedTable`].
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the values of a [`FixedTable`].
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V, S> IntoIterator for &'a FixedTable<V, S> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
