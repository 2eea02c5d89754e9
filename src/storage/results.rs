//! Accumulated fan lists, keyed by film name

use crate::model::Associate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Mapping from film name to the fans collected for it
///
/// Lists only ever grow: appending merges with whatever an earlier run
/// recorded for the same film.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultStore {
    entries: BTreeMap<String, Vec<Associate>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fans recorded for `name`, if the film has been processed
    pub fn get(&self, name: &str) -> Option<&[Associate]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of films with an entry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fan records across all films
    pub fn total_associates(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Appends `fans` to the list for `name`, creating it if needed
    ///
    /// With `dedupe`, fans whose `(identifier, entity_slug)` is already listed
    /// for this film are dropped. Returns the number of records added.
    pub fn append(&mut self, name: &str, fans: Vec<Associate>, dedupe: bool) -> usize {
        let list = self.entries.entry(name.to_string()).or_default();

        if !dedupe {
            let added = fans.len();
            list.extend(fans);
            return added;
        }

        let mut seen: HashSet<(String, String)> = list
            .iter()
            .map(|fan| (fan.identifier.clone(), fan.entity_slug.clone()))
            .collect();
        let before = list.len();
        for fan in fans {
            if seen.insert((fan.identifier.clone(), fan.entity_slug.clone())) {
                list.push(fan);
            }
        }
        list.len() - before
    }
}
