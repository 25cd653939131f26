//! Conditional rule resolution
//!
//! Turns the current cabin-type selection into the extra requirements it
//! activates.

use crate::core::models::{CabinRuleTable, ConditionalItems};

/// Resolves cabin-type values against a rule table
#[derive(Debug, Clone, Copy)]
pub struct ConditionalRuleResolver<'a> {
    table: &'a CabinRuleTable,
}

impl<'a> ConditionalRuleResolver<'a> {
    /// Create a resolver over a rule table
    #[must_use]
    pub const fn new(table: &'a CabinRuleTable) -> Self {
        Self { table }
    }

    /// Extra requirements for a cabin-type value
    ///
    /// Exact match only. Unknown, empty or absent values resolve to no extra
    /// requirements; this never fails.
    #[must_use]
    pub fn resolve(&self, cabin_type: Option<&str>) -> ConditionalItems {
        cabin_type
            .filter(|value| !value.is_empty())
            .and_then(|value| self.table.get(value))
            .cloned()
            .unwrap_or_else(ConditionalItems::none)
    }
}
