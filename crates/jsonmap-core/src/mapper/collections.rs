//! Container shapes the mapper knows how to walk.
//!
//! [`Sequence`] covers ordered and set-like containers (encoded as arrays);
//! [`Keyed`] covers string-keyed maps (encoded as objects). Hash-based
//! containers are read out in sorted order so encoded text does not depend
//! on hasher state.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use indexmap::IndexMap;

/// A container of items encoded as an array.
pub trait Sequence: Default + Send + Sync + 'static {
    type Item;

    /// Items in encoding order.
    fn items(&self) -> Vec<&Self::Item>;

    fn from_items(items: Vec<Self::Item>) -> Self;
}

impl<V: Send + Sync + 'static> Sequence for Vec<V> {
    type Item = V;

    fn items(&self) -> Vec<&V> {
        self.iter().collect()
    }

    fn from_items(items: Vec<V>) -> Self {
        items
    }
}

impl<V: Send + Sync + 'static> Sequence for VecDeque<V> {
    type Item = V;

    fn items(&self) -> Vec<&V> {
        self.iter().collect()
    }

    fn from_items(items: Vec<V>) -> Self {
        items.into()
    }
}

impl<V: Ord + Send + Sync + 'static> Sequence for BTreeSet<V> {
    type Item = V;

    fn items(&self) -> Vec<&V> {
        self.iter().collect()
    }

    fn from_items(items: Vec<V>) -> Self {
        items.into_iter().collect()
    }
}

impl<V: Eq + Hash + Ord + Send + Sync + 'static> Sequence for HashSet<V> {
    type Item = V;

    fn items(&self) -> Vec<&V> {
        let mut items: Vec<&V> = self.iter().collect();
        items.sort();
        items
    }

    fn from_items(items: Vec<V>) -> Self {
        items.into_iter().collect()
    }
}

/// A string-keyed map encoded as an object.
pub trait Keyed: Default + Send + Sync + 'static {
    type Item;

    /// Entries in encoding order.
    fn entries(&self) -> Vec<(&str, &Self::Item)>;

    fn from_entries(entries: Vec<(String, Self::Item)>) -> Self;
}

impl<V: Send + Sync + 'static> Keyed for BTreeMap<String, V> {
    type Item = V;

    fn entries(&self) -> Vec<(&str, &V)> {
        self.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    fn from_entries(entries: Vec<(String, V)>) -> Self {
        entries.into_iter().collect()
    }
}

impl<V: Send + Sync + 'static> Keyed for HashMap<String, V> {
    type Item = V;

    fn entries(&self) -> Vec<(&str, &V)> {
        let mut entries: Vec<(&str, &V)> = self.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    fn from_entries(entries: Vec<(String, V)>) -> Self {
        entries.into_iter().collect()
    }
}

impl<V: Send + Sync + 'static> Keyed for IndexMap<String, V> {
    type Item = V;

    fn entries(&self) -> Vec<(&str, &V)> {
        self.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    fn from_entries(entries: Vec<(String, V)>) -> Self {
        entries.into_iter().collect()
    }
}
