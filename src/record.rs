// Identity and timestamp contract for storable records

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Core trait that any storable record must implement
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Timestamp when this record was last updated (milliseconds since epoch)
    fn updated_at(&self) -> i64;

    /// Refresh the update timestamp after a mutation
    fn touch(&mut self, now: i64);
}

/// One stored element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry<T> {
    Record(T),
    /// Element that did not decode as `T`; written back exactly as read
    Unreadable(Value),
}

impl<T: Record> Entry<T> {
    /// The record id, or the raw `"id"` string of an unreadable element
    pub fn id(&self) -> Option<&str> {
        match self {
            Entry::Record(record) => Some(record.id()),
            Entry::Unreadable(value) => value.get("id").and_then(Value::as_str),
        }
    }
}

/// Records in storage order, alongside any stored elements that could not be read
///
/// Unreadable elements keep their position so a rewrite of the collection
/// never drops them.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: Record> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Entry::Record).collect(),
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unreadable_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Unreadable(_)))
            .count()
    }

    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Record(record) => Some(record),
            Entry::Unreadable(_) => None,
        })
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().filter_map(|e| match e {
            Entry::Record(record) => Some(record),
            Entry::Unreadable(_) => None,
        })
    }

    pub fn into_records(self) -> Vec<T> {
        self.entries
            .into_iter()
            .filter_map(|e| match e {
                Entry::Record(record) => Some(record),
                Entry::Unreadable(_) => None,
            })
            .collect()
    }

    /// Every id present, readable or not
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(Entry::id)
    }

    pub fn push(&mut self, record: T) {
        self.entries.push(Entry::Record(record));
    }

    pub fn push_unreadable(&mut self, value: Value) {
        self.entries.push(Entry::Unreadable(value));
    }

    /// Replace the element with the same id in place, or append the record
    ///
    /// Returns true when an existing element was replaced.
    pub fn upsert(&mut self, record: T) -> bool {
        match self.entries.iter().position(|e| e.id() == Some(record.id())) {
            Some(index) => {
                self.entries[index] = Entry::Record(record);
                true
            }
            None => {
                self.push(record);
                false
            }
        }
    }

    /// Remove every element with the given id; returns true if anything was removed
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != Some(id));
        self.entries.len() != before
    }
}
