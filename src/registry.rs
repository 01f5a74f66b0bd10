//! Argument registry
//!
//! Owns every [`ArgSpec`] in definition order and indexes it by both
//! short and long name. The name maps hold [`ArgId`] handles into the
//! owning arena rather than the specs themselves, so each spec has
//! exactly one owner and both maps always agree.

use std::collections::HashMap;

use crate::argument::{ArgSpec, DefinitionError};

/// Stable handle to a registered argument
///
/// Handles are only minted by [`ArgRegistry::register`] and are only
/// meaningful for the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgId(usize);

/// Ordered store of argument definitions, indexed by both names
#[derive(Debug, Default)]
pub struct ArgRegistry {
    specs: Vec<ArgSpec>,
    by_short: HashMap<String, ArgId>,
    by_long: HashMap<String, ArgId>,
}

impl ArgRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, rejecting duplicates of either name
    ///
    /// The duplicate check runs before any mutation, so a rejected spec
    /// leaves the arena and both maps untouched.
    pub fn register(&mut self, spec: ArgSpec) -> Result<ArgId, DefinitionError> {
        if self.by_short.contains_key(spec.short_name())
            || self.by_long.contains_key(spec.long_name())
        {
            return Err(DefinitionError::Duplicate {
                short: spec.short_name().to_string(),
                long: spec.long_name().to_string(),
            });
        }

        let id = ArgId(self.specs.len());
        self.by_short.insert(spec.short_name().to_string(), id);
        self.by_long.insert(spec.long_name().to_string(), id);
        self.specs.push(spec);

        Ok(id)
    }

    /// Find an argument by name, dispatching on the prefix
    ///
    /// Names starting with `--` search the long name map, everything
    /// else the short name map. `None` lets callers tell "not defined"
    /// apart from "defined but not supplied".
    pub fn lookup(&self, name: &str) -> Option<ArgId> {
        if name.starts_with("--") {
            self.by_long.get(name).copied()
        } else {
            self.by_short.get(name).copied()
        }
    }

    /// Access a spec by handle
    pub fn spec(&self, id: ArgId) -> &ArgSpec {
        &self.specs[id.0]
    }

    pub(crate) fn spec_mut(&mut self, id: ArgId) -> &mut ArgSpec {
        &mut self.specs[id.0]
    }

    /// All specs in definition order
    pub fn specs(&self) -> impl Iterator<Item = &ArgSpec> + '_ {
        self.specs.iter()
    }

    /// Number of registered arguments
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Clear every value slot back to absent
    pub(crate) fn reset_values(&mut self) {
        for spec in &mut self.specs {
            spec.clear_value();
        }
    }
}
