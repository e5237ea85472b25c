use super::{MAX_HEADERS, MAX_KEY_LEN, MAX_VALUE_LEN};
use heapless::{String, Vec};

/// A `key: value` pair, used for both headers and query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValuePair {
    /// Header name or parameter key.
    pub key: String<MAX_KEY_LEN>,
    /// Header or parameter value.
    pub value: String<MAX_VALUE_LEN>,
}

impl KeyValuePair {
    /// Creates a pair, or `None` if either side exceeds its capacity.
    pub fn new(key: &str, value: &str) -> Option<Self> {
        Some(Self {
            key: String::try_from(key).ok()?,
            value: String::try_from(value).ok()?,
        })
    }
}

/// An insertion-ordered list of [`KeyValuePair`]s that never holds more than
/// `N` entries.
///
/// Duplicate keys are kept, since HTTP allows repeated headers. Adding to a
/// full set drops the new pair and emits a diagnostic; the backing storage is
/// never grown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueSet<const N: usize = MAX_HEADERS> {
    pairs: Vec<KeyValuePair, N>,
}

impl<const N: usize> KeyValueSet<N> {
    /// Creates an empty set.
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Appends a pair. Returns `false` when it was dropped, either because
    /// the set is full or because the key or value is too long.
    pub fn add(&mut self, key: &str, value: &str) -> bool {
        if self.pairs.is_full() {
            warn!("max headers reached, dropping {}", key);
            return false;
        }
        let Some(pair) = KeyValuePair::new(key, value) else {
            warn!("header too long, dropping {}", key);
            return false;
        };
        // Cannot fail, fullness was checked above.
        self.pairs.push(pair).is_ok()
    }

    /// Removes every pair, wiping their contents.
    pub fn clear(&mut self) {
        for pair in self.pairs.iter_mut() {
            pair.key.clear();
            pair.value.clear();
        }
        self.pairs.clear();
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair is stored.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Whether another `add` would be dropped.
    pub fn is_full(&self) -> bool {
        self.pairs.is_full()
    }

    /// Maximum number of pairs, `N`.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The pair at `index`, in insertion order.
    pub fn get(&self, index: usize) -> Option<&KeyValuePair> {
        self.pairs.get(index)
    }

    /// Value of the first pair whose key matches `key`, ignoring ASCII case.
    pub fn find(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.key.eq_ignore_ascii_case(key))
            .map(|pair| pair.value.as_str())
    }

    /// Iterates the pairs in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, KeyValuePair> {
        self.pairs.iter()
    }
}

impl<'a, const N: usize> IntoIterator for &'a KeyValueSet<N> {
    type Item = &'a KeyValuePair;
    type IntoIter = core::slice::Iter<'a, KeyValuePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyValuePair {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str} : {=str}", self.key.as_str(), self.value.as_str())
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for KeyValueSet<N> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[?]}", self.pairs.as_slice())
    }
}
