//! The scope registry: one configuration object per [`ScopeKey`].
//!
//! Pure key-value storage, no ordering semantics. The registry is populated
//! first and then only read, so resolution for many variants can share it
//! (`&ScopeRegistry` is `Send + Sync`).

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use confique::Config;
use serde::{Deserialize, Serialize};
use toml::Value;

use crate::error::ScopefigError;
use crate::overrides;
use crate::scope::{ConfigurationObject, ScopeKey};
use crate::validate;

/// Configuration objects keyed by scope, for schema `C`.
pub struct ScopeRegistry<C: Config> {
    objects: BTreeMap<ScopeKey, Arc<ConfigurationObject>>,
    strict: bool,
    _schema: PhantomData<fn() -> C>,
}

impl<C: Config> fmt::Debug for ScopeRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeRegistry")
            .field("objects", &self.objects)
            .field("strict", &self.strict)
            .finish()
    }
}

impl<C: Config> Default for ScopeRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Config> ScopeRegistry<C> {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            strict: true,
            _schema: PhantomData,
        }
    }

    /// Enable or disable strict mode (default: `true`).
    ///
    /// In strict mode, registering an object that sets keys outside the schema
    /// fails. Lenient registries keep such keys; the merger never reads them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Register `object` under `key`.
    ///
    /// Fails with [`ScopefigError::DuplicateScope`] if `key` already has an object.
    pub fn register(&mut self, key: ScopeKey, object: ConfigurationObject) -> Result<(), ScopefigError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        if self.strict {
            validate::validate_values::<C>(object.values(), &key.to_string(), |_| None)?;
        }
        self.insert(key, Arc::new(object))
    }

    /// Register an already shared object, so one object can serve several scopes.
    pub fn register_shared(
        &mut self,
        key: ScopeKey,
        object: Arc<ConfigurationObject>,
    ) -> Result<(), ScopefigError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        if self.strict {
            validate::validate_values::<C>(object.values(), &key.to_string(), |_| None)?;
        }
        self.insert(key, object)
    }

    /// Register the command-line override scope from dotted `(key, value)` pairs.
    pub fn register_command_line(&mut self, entries: &[(String, Value)]) -> Result<(), ScopefigError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        let key = ScopeKey::CommandLineOverride;
        let object = ConfigurationObject::from_entries(key.default_name(), entries)?;
        self.register(key, object)
    }

    /// Register the command-line override scope from any serializable source.
    ///
    /// See [`overrides::overrides_from`]: `None` values and non-schema fields
    /// are skipped.
    pub fn register_command_line_from<S: Serialize>(&mut self, source: &S) -> Result<(), ScopefigError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        let entries = overrides::overrides_from(&C::META, source)?;
        self.register_command_line(&entries)
    }

    /// Insert without schema validation; callers validate first.
    ///
    /// Object names are unique across the registry: the same object may sit
    /// under several keys, a different object with a taken name may not.
    pub(crate) fn insert(
        &mut self,
        key: ScopeKey,
        object: Arc<ConfigurationObject>,
    ) -> Result<(), ScopefigError> {
        if let Some(existing) = self.objects.get(&key) {
            return Err(ScopefigError::DuplicateScope {
                key,
                existing: existing.name().to_string(),
                attempted: object.name().to_string(),
            });
        }
        if let Some((holder, _)) = self
            .objects
            .iter()
            .find(|(_, other)| other.name() == object.name() && !Arc::ptr_eq(other, &object))
        {
            return Err(ScopefigError::DuplicateName {
                name: object.name().to_string(),
                existing: holder.clone(),
                attempted: key,
            });
        }

        tracing::debug!(scope = %key, object = object.name(), "registered scope");
        self.objects.insert(key, object);
        Ok(())
    }

    /// The object registered under `key`, if any. Never fails.
    pub fn lookup(&self, key: &ScopeKey) -> Option<&Arc<ConfigurationObject>> {
        self.objects.get(key)
    }

    pub fn contains(&self, key: &ScopeKey) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All registered scopes, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ScopeKey, &Arc<ConfigurationObject>)> {
        self.objects.iter()
    }
}
