use alloc::string::String;

/// A key/value record stored in a [`Chain`](crate::chain::Chain).
///
/// The key's hash is cached so chain walks can reject most mismatches
/// without comparing strings. `prev`/`next` are slot handles into the owning
/// chain; they link entries for traversal but do not own anything.
#[derive(Clone, Debug)]
pub(crate) struct Entry<V> {
    key: String,
    value: V,
    hash: u64,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl<V> Entry<V> {
    pub(crate) fn new(key: String, value: V, hash: u64) -> Self {
        Entry {
            key,
            value,
            hash,
            prev: None,
            next: None,
        }
    }

    #[inline(always)]
    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    #[inline(always)]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[inline(always)]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// The cached hash is only a pre-filter; the key must also be equal.
    #[inline(always)]
    pub(crate) fn matches(&self, hash: u64, key: &str) -> bool {
        self.hash == hash && self.key == key
    }

    /// Overwrites the value and cached hash in place, returning the old value.
    pub(crate) fn replace(&mut self, value: V, hash: u64) -> V {
        self.hash = hash;
        core::mem::replace(&mut self.value, value)
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }
}
