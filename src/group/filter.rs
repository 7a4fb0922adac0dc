//! Name filters for group membership.
//!
//! A filter string holds one or more regular expressions separated by a
//! backtick. Patterns are applied in declaration order and that order
//! decides the order of the resulting backend list.

use std::collections::HashSet;

use fancy_regex::Regex;

use crate::backend::BackendRef;
use crate::error::GroupError;

/// Separator between patterns in a filter string.
pub const FILTER_SEPARATOR: char = '`';

/// Ordered, compiled filter patterns.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    patterns: Vec<Regex>,
}

impl FilterSet {
    /// Compile `filter`. An empty string yields an empty set.
    pub fn parse(filter: &str) -> Result<Self, GroupError> {
        if filter.is_empty() {
            return Ok(Self::default());
        }

        let patterns = filter
            .split(FILTER_SEPARATOR)
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| GroupError::InvalidFilter {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Keep backends matched by any pattern, grouped by pattern order.
    /// The first occurrence of a name wins.
    pub fn select(&self, backends: &[BackendRef]) -> Vec<BackendRef> {
        let mut seen = HashSet::new();
        self.collect_matches(backends, &mut seen)
    }

    /// Like [`select`](Self::select), then append every unmatched backend
    /// in its original relative order.
    pub fn select_then_rest(&self, backends: &[BackendRef]) -> Vec<BackendRef> {
        let mut seen = HashSet::new();
        let mut selected = self.collect_matches(backends, &mut seen);
        for backend in backends {
            if seen.insert(backend.name().to_string()) {
                selected.push(backend.clone());
            }
        }
        selected
    }

    fn collect_matches(
        &self,
        backends: &[BackendRef],
        seen: &mut HashSet<String>,
    ) -> Vec<BackendRef> {
        let mut selected = Vec::new();
        for pattern in &self.patterns {
            for backend in backends {
                let name = backend.name();
                // A match that hits the backtrack limit counts as no match.
                let matched = pattern.is_match(name).unwrap_or(false);
                if matched && !seen.contains(name) {
                    seen.insert(name.to_string());
                    selected.push(backend.clone());
                }
            }
        }
        selected
    }
}
