//! Registration keys and at-most-once registration of shared operations.
//!
//! Several variants may each ask for the same cross-cutting operation (say,
//! committing the edit for one application). [`build_task_key`] gives every
//! such request the same key, and [`TaskRegistry::register_shared`] creates
//! the operation on first request and hands the same handle to everyone after.
//!
//! Per-variant operations register in strict mode instead, where a second
//! request for a key is a [`ScopefigError::DuplicateRegistration`].

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::ScopefigError;

/// Word that replaces each `.` in an identifier.
pub const SEPARATOR_TOKEN: &str = "Dot";

/// Prefix of the shared per-application commit operation.
pub const COMMIT_EDIT_PREFIX: &str = "commitEditFor";

/// Group assigned to described operations.
pub const PLUGIN_GROUP: &str = "Publishing";

/// Derive a registration key: split `identifier` on `.`, capitalize each
/// segment, join with `"Dot"`, and prepend `prefix`.
///
/// `build_task_key("commitEditFor", "com.example.app")` is
/// `"commitEditForComDotExampleDotApp"`.
pub fn build_task_key(prefix: &str, identifier: &str) -> String {
    let body = identifier
        .split('.')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(SEPARATOR_TOKEN);
    format!("{prefix}{body}")
}

/// Uppercase the first character, leaving the rest as is.
pub(crate) fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Name, description and group of a registered operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub group: Option<&'static str>,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            group: None,
        }
    }

    /// Set the description. The operation joins [`PLUGIN_GROUP`] only when
    /// the description is not blank.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.group = if description.trim().is_empty() {
            None
        } else {
            Some(PLUGIN_GROUP)
        };
        self.description = Some(description);
        self
    }
}

/// Outcome of a registration: whether this call created the entry.
#[derive(Debug)]
pub enum Registration<T> {
    Created(Arc<T>),
    Existing(Arc<T>),
}

impl<T> Registration<T> {
    pub fn handle(&self) -> &Arc<T> {
        match self {
            Registration::Created(handle) | Registration::Existing(handle) => handle,
        }
    }

    pub fn into_handle(self) -> Arc<T> {
        match self {
            Registration::Created(handle) | Registration::Existing(handle) => handle,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created(_))
    }
}

/// Shared registry of operations, keyed by name. Safe to use from many threads.
#[derive(Debug)]
pub struct TaskRegistry<T> {
    entries: DashMap<String, Arc<T>>,
}

impl<T> Default for TaskRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Look up `key`, creating it from `factory` if absent, in one atomic step.
    ///
    /// When the key exists, tolerant mode (`strict == false`) returns the
    /// existing handle and strict mode fails. `factory` runs at most once per
    /// key and must not touch this registry.
    pub fn register_shared<F>(
        &self,
        key: &str,
        factory: F,
        strict: bool,
    ) -> Result<Registration<T>, ScopefigError>
    where
        F: FnOnce() -> T,
    {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(existing) => {
                if strict {
                    return Err(ScopefigError::DuplicateRegistration { key: key.into() });
                }
                tracing::debug!(key, "reusing registered operation");
                Ok(Registration::Existing(Arc::clone(existing.get())))
            }
            Entry::Vacant(slot) => {
                let handle = Arc::new(factory());
                slot.insert(Arc::clone(&handle));
                tracing::debug!(key, "registered operation");
                Ok(Registration::Created(handle))
            }
        }
    }

    /// Strict registration: fails if `key` already exists.
    pub fn register<F>(&self, key: &str, factory: F) -> Result<Arc<T>, ScopefigError>
    where
        F: FnOnce() -> T,
    {
        self.register_shared(key, factory, true)
            .map(Registration::into_handle)
    }

    pub fn lookup(&self, key: &str) -> Option<Arc<T>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Get or create the commit operation shared by every variant of `app_id`.
pub fn commit_edit_task<T, F>(
    registry: &TaskRegistry<T>,
    app_id: &str,
    factory: F,
) -> Result<Arc<T>, ScopefigError>
where
    F: FnOnce(TaskDescriptor) -> T,
{
    let name = build_task_key(COMMIT_EDIT_PREFIX, app_id);
    let descriptor = TaskDescriptor::new(name.clone());
    registry
        .register_shared(&name, || factory(descriptor), false)
        .map(Registration::into_handle)
}
