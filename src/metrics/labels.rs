use crate::common::{KeyValue, StringValue};
use fnv::FnvHasher;
use std::hash::{Hash, Hasher};
use std::slice;

/// A canonicalized, order-independent set of labels identifying one time
/// series within a metric.
///
/// Two label sets built from the same pairs in any order compare equal and
/// hash identically: construction sorts the pairs by key, and the 64-bit
/// identity hash is computed once over the canonical form so the set is a
/// cheap key for concurrent aggregator tables. Duplicate keys are not a
/// defined input; when the input repeats a key, the first occurrence wins
/// and the rest are dropped.
#[derive(Clone, Debug)]
pub struct LabelSet {
    labels: Vec<KeyValue>,
    hash: u64,
}

impl LabelSet {
    /// Canonicalize the given pairs into a label set.
    pub fn new<T>(labels: T) -> Self
    where
        T: IntoIterator<Item = KeyValue>,
    {
        let mut labels = labels.into_iter().collect::<Vec<_>>();
        labels.sort_by(|a, b| a.key.cmp(&b.key));
        labels.dedup_by(|a, b| a.key.eq(&b.key));

        let mut hasher = FnvHasher::default();
        labels.hash(&mut hasher);

        LabelSet {
            labels,
            hash: hasher.finish(),
        }
    }

    /// The number of labels in the set.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the set of labels is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over the label pairs in canonical (key-sorted) order.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// The value recorded for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&StringValue> {
        self.labels
            .binary_search_by(|kv| kv.key.as_str().cmp(key))
            .ok()
            .map(|idx| &self.labels[idx].value)
    }
}

impl PartialEq for LabelSet {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl Eq for LabelSet {}

impl Hash for LabelSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash)
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        LabelSet::new(std::iter::empty())
    }
}

impl From<&[KeyValue]> for LabelSet {
    fn from(labels: &[KeyValue]) -> Self {
        LabelSet::new(labels.iter().cloned())
    }
}

impl FromIterator<KeyValue> for LabelSet {
    fn from_iter<T: IntoIterator<Item = KeyValue>>(iter: T) -> Self {
        LabelSet::new(iter)
    }
}

/// An iterator over the entries of a `LabelSet`.
#[derive(Debug)]
pub struct Iter<'a>(slice::Iter<'a, KeyValue>);

impl<'a> Iterator for Iter<'a> {
    type Item = &'a KeyValue;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a KeyValue;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter(self.labels.iter())
    }
}
