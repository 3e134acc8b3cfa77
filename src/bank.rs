//! Item-parameter collections consumed by estimation and selection.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::ItemParameters;

/// Keyed access to item parameters by id.
pub trait ItemLookup {
    fn item(&self, id: &str) -> Option<&ItemParameters>;
}

impl ItemLookup for HashMap<String, ItemParameters> {
    fn item(&self, id: &str) -> Option<&ItemParameters> {
        self.get(id)
    }
}

impl ItemLookup for BTreeMap<String, ItemParameters> {
    fn item(&self, id: &str) -> Option<&ItemParameters> {
        self.get(id)
    }
}

impl<T: ItemLookup + ?Sized> ItemLookup for &T {
    fn item(&self, id: &str) -> Option<&ItemParameters> {
        (**self).item(id)
    }
}

/// Insertion-ordered mapping from item id to parameters.
///
/// Iteration follows insertion order, which is what makes item selection
/// deterministic on ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, ItemParameters)>", into = "Vec<(String, ItemParameters)>")]
pub struct ItemBank {
    entries: Vec<(String, ItemParameters)>,
    index: HashMap<String, usize>,
}

impl ItemBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert an item, returning the previous parameters if the id existed.
    /// A replaced item keeps its position.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        params: ItemParameters,
    ) -> Option<ItemParameters> {
        let id = id.into();
        if let Some(&pos) = self.index.get(&id) {
            return Some(std::mem::replace(&mut self.entries[pos].1, params));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, params));
        None
    }

    pub fn get(&self, id: &str) -> Option<&ItemParameters> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &ItemParameters)> {
        self.entries.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn ids(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }
}

impl ItemLookup for ItemBank {
    fn item(&self, id: &str) -> Option<&ItemParameters> {
        self.get(id)
    }
}

impl<K: Into<String>> FromIterator<(K, ItemParameters)> for ItemBank {
    fn from_iter<I: IntoIterator<Item = (K, ItemParameters)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut bank = ItemBank::with_capacity(iter.size_hint().0);
        for (id, params) in iter {
            bank.insert(id, params);
        }
        bank
    }
}

impl From<Vec<(String, ItemParameters)>> for ItemBank {
    fn from(entries: Vec<(String, ItemParameters)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<ItemBank> for Vec<(String, ItemParameters)> {
    fn from(bank: ItemBank) -> Self {
        bank.entries
    }
}

impl<'a> IntoIterator for &'a ItemBank {
    type Item = (&'a str, &'a ItemParameters);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a ItemParameters)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_follows_insertion_order() {
        let bank: ItemBank = [
            ("z", ItemParameters::rasch(0.0)),
            ("a", ItemParameters::rasch(1.0)),
            ("m", ItemParameters::rasch(-1.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(bank.ids().collect::<Vec<_>>(), ["z", "a", "m"]);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut bank = ItemBank::new();
        bank.insert("a", ItemParameters::rasch(0.0));
        bank.insert("b", ItemParameters::rasch(1.0));
        let old = bank.insert("a", ItemParameters::rasch(2.0));

        assert_eq!(old, Some(ItemParameters::rasch(0.0)));
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.ids().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(bank.get("a").unwrap().difficulty, 2.0);
    }

    #[test]
    fn lookup_through_hashmap_and_bank() {
        let mut map = HashMap::new();
        map.insert("q".to_string(), ItemParameters::rasch(0.3));
        let bank: ItemBank = map.clone().into_iter().collect();

        assert_eq!(map.item("q"), bank.item("q"));
        assert!(bank.item("missing").is_none());
    }

    #[test]
    fn serde_preserves_order() {
        let bank: ItemBank = [("b", ItemParameters::rasch(0.0)), ("a", ItemParameters::rasch(1.0))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&bank).unwrap();
        let back: ItemBank = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ids().collect::<Vec<_>>(), ["b", "a"]);
        assert!(back.contains("a"));
    }
}
