//! Scope keys and the configuration objects attached to them.
//!
//! A [`ScopeKey`] says *where* in the build hierarchy an object applies; a
//! [`ConfigurationObject`] is the sparse bag of values it contributes. Objects
//! are immutable once registered.

use std::fmt;

use toml::{Table, Value};

use crate::error::ScopefigError;
use crate::overrides;

/// Where a configuration object applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeKey {
    /// Applies to every variant, lowest priority.
    Base,
    /// Values given on the command line, highest priority.
    CommandLineOverride,
    /// A single variant, e.g. `freeRelease`.
    Variant(String),
    /// A product flavor, e.g. `free`.
    Flavor(String),
    /// A flavor dimension, e.g. `tier`.
    Dimension(String),
    /// A build type, e.g. `release`.
    BuildType(String),
}

impl ScopeKey {
    /// The object name used when a scope's object is created from its key alone.
    pub fn default_name(&self) -> &str {
        match self {
            ScopeKey::Base => "base",
            ScopeKey::CommandLineOverride => "cli",
            ScopeKey::Variant(name)
            | ScopeKey::Flavor(name)
            | ScopeKey::Dimension(name)
            | ScopeKey::BuildType(name) => name,
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKey::Base => write!(f, "base"),
            ScopeKey::CommandLineOverride => write!(f, "cli"),
            ScopeKey::Variant(name) => write!(f, "variant:{name}"),
            ScopeKey::Flavor(name) => write!(f, "flavor:{name}"),
            ScopeKey::Dimension(name) => write!(f, "dimension:{name}"),
            ScopeKey::BuildType(name) => write!(f, "build-type:{name}"),
        }
    }
}

/// A level of the hierarchy that must resolve to at most one override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeLevel {
    Flavor,
    Dimension,
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeLevel::Flavor => write!(f, "flavor"),
            ScopeLevel::Dimension => write!(f, "dimension"),
        }
    }
}

/// A named, sparse set of configuration values.
///
/// Every field is independently present or absent. Nested sections are
/// nested tables, addressed with dotted keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationObject {
    name: String,
    values: Table,
}

impl ConfigurationObject {
    /// An object with no fields set.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_values(name, Table::new())
    }

    pub fn with_values(name: impl Into<String>, values: Table) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Parse an object from a TOML document.
    pub fn from_toml_str(name: impl Into<String>, content: &str) -> Result<Self, ScopefigError> {
        let name = name.into();
        let values: Table = toml::from_str(content).map_err(|e| ScopefigError::ParseError {
            path: format!("<{name}>").into(),
            source: e,
        })?;
        Ok(Self { name, values })
    }

    /// Build an object from dotted `(key, value)` pairs; later pairs win.
    pub fn from_entries(
        name: impl Into<String>,
        entries: &[(String, Value)],
    ) -> Result<Self, ScopefigError> {
        Ok(Self::with_values(name, overrides::overrides_to_table(entries)?))
    }

    /// Set a dotted key, builder style.
    pub fn set(mut self, dotted_key: &str, value: impl Into<Value>) -> Result<Self, ScopefigError> {
        overrides::set_nested(&mut self.values, dotted_key, value.into())?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &Table {
        &self.values
    }

    /// The value at a dotted key, if this object sets it.
    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        overrides::table_get(&self.values, dotted_key)
    }

    pub fn is_set(&self, dotted_key: &str) -> bool {
        self.get(dotted_key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
