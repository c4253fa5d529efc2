//! Variable ledger: the working set of resolved variables for one resolution.
//!
//! The ledger holds at most one [`VariableRecord`] per name. Writes go through
//! [`Ledger::merge`], which applies the override rule:
//!
//! 1. Unseen name: insert, capturing the default when the write is a default.
//! 2. Incoming tier has higher precedence: replace value, tier and source,
//!    keeping any captured default.
//! 3. Incoming write is a default and none is captured yet: capture it only.
//! 4. Otherwise: no change (first writer within a tier keeps its value).

use crate::types::Priority;
use serde::Serialize;
use std::collections::BTreeMap;

/// One resolved variable with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableRecord {
    pub name: String,
    /// Currently winning value.
    pub value: String,
    /// Tier that produced `value`.
    pub source_priority: Priority,
    /// File or component that produced `value`.
    pub source_id: String,
    /// First step-tier default seen for this name. Never cleared once set.
    pub default_value: Option<String>,
}

impl VariableRecord {
    /// True when a higher tier moved the value away from its step default.
    pub fn is_overridden(&self) -> bool {
        match self.default_value {
            Some(ref default) => {
                self.value != *default && self.source_priority < Priority::Step
            }
            None => false,
        }
    }
}

/// Outcome of a single [`Ledger::merge`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Overrode,
    DefaultCaptured,
    Ignored,
}

/// Map of variable name to its current record, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: BTreeMap<String, VariableRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one declaration into the ledger.
    pub fn merge(
        &mut self,
        name: &str,
        value: &str,
        priority: Priority,
        source_id: &str,
        is_default: bool,
    ) -> MergeOutcome {
        let Some(existing) = self.records.get_mut(name) else {
            self.records.insert(
                name.to_string(),
                VariableRecord {
                    name: name.to_string(),
                    value: value.to_string(),
                    source_priority: priority,
                    source_id: source_id.to_string(),
                    default_value: is_default.then(|| value.to_string()),
                },
            );
            return MergeOutcome::Inserted;
        };

        if existing.source_priority > priority {
            existing.value = value.to_string();
            existing.source_priority = priority;
            existing.source_id = source_id.to_string();
            MergeOutcome::Overrode
        } else if is_default && existing.default_value.is_none() {
            existing.default_value = Some(value.to_string());
            MergeOutcome::DefaultCaptured
        } else {
            MergeOutcome::Ignored
        }
    }

    pub fn get(&self, name: &str) -> Option<&VariableRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableRecord> {
        self.records.values()
    }

    /// Number of records whose value diverged from their step default.
    pub fn overridden_count(&self) -> usize {
        self.iter().filter(|r| r.is_overridden()).count()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a VariableRecord;
    type IntoIter = std::collections::btree_map::Values<'a, String, VariableRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
