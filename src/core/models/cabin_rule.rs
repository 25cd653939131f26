//! Cabin-type conditional requirements
//!
//! Each cabin type activates extra fields, photo slots and modules on top of
//! the base schema. The table is plain data: adding a cabin type never needs
//! a code change.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Extra requirements activated by one cabin type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalItems {
    /// Field names that become mandatory
    #[serde(default)]
    pub fields: BTreeSet<String>,
    /// Photo slot names that become mandatory
    #[serde(default)]
    pub photos: BTreeSet<String>,
    /// Module types that become mandatory
    #[serde(default)]
    pub modules: BTreeSet<String>,
}

impl ConditionalItems {
    /// No extra requirements
    #[must_use]
    pub const fn none() -> Self {
        Self {
            fields: BTreeSet::new(),
            photos: BTreeSet::new(),
            modules: BTreeSet::new(),
        }
    }

    /// Whether nothing extra is required
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.photos.is_empty() && self.modules.is_empty()
    }
}

/// Mapping from cabin-type value to its extra requirements
///
/// Keys are unique by construction, so each cabin type has exactly one rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CabinRuleTable {
    rules: BTreeMap<String, ConditionalItems>,
}

impl CabinRuleTable {
    /// Empty table
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Add or replace the rule for a cabin type
    #[must_use]
    pub fn with_rule(mut self, cabin_type: &str, items: ConditionalItems) -> Self {
        self.rules.insert(cabin_type.to_string(), items);
        self
    }

    /// Exact-match lookup
    #[must_use]
    pub fn get(&self, cabin_type: &str) -> Option<&ConditionalItems> {
        self.rules.get(cabin_type)
    }

    /// Iterate rules in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConditionalItems)> {
        self.rules.iter()
    }

    /// Number of cabin types
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
