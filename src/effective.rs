//! The merge result for one variant, and ways to inspect it.

use std::fmt;
use std::marker::PhantomData;

use confique::Config;
use serde::Deserialize;
use toml::{Table, Value};

use crate::error::ScopefigError;
use crate::identity::Identity;
use crate::overrides;
use crate::schema;

/// One variant's merged configuration.
///
/// Each schema field is either resolved to a single value or unset. Which
/// scope a value came from is not kept; the [`Identity`] records only how
/// specific the most specific contributing scope was.
pub struct EffectiveConfiguration<C: Config> {
    identity: Identity,
    values: Table,
    _schema: PhantomData<fn() -> C>,
}

impl<C: Config> Clone for EffectiveConfiguration<C> {
    fn clone(&self) -> Self {
        Self::new(self.identity, self.values.clone())
    }
}

impl<C: Config> fmt::Debug for EffectiveConfiguration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveConfiguration")
            .field("identity", &self.identity)
            .field("values", &self.values)
            .finish()
    }
}

impl<C: Config> EffectiveConfiguration<C> {
    pub(crate) fn new(identity: Identity, values: Table) -> Self {
        Self {
            identity,
            values,
            _schema: PhantomData,
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Shorthand for `identity().priority()`.
    pub fn priority(&self) -> u32 {
        self.identity.priority()
    }

    /// Resolved values; unset fields are absent.
    pub fn values(&self) -> &Table {
        &self.values
    }

    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        overrides::table_get(&self.values, dotted_key)
    }

    pub fn is_set(&self, dotted_key: &str) -> bool {
        self.get(dotted_key).is_some()
    }

    /// Apply schema defaults and produce the typed config.
    ///
    /// Fields unset in every scope take their `#[config(default)]`; a required
    /// field with neither fails with [`ScopefigError::ConfigError`].
    pub fn load(&self) -> Result<C, ScopefigError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        let layer: C::Layer = Value::Table(self.values.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ScopefigError::InvalidValue {
                key: "<merged>".into(),
                reason: e.to_string(),
            })?;

        C::builder()
            .preloaded(layer)
            .load()
            .map_err(ScopefigError::from)
    }

    /// Every schema key with its resolved value, in declaration order.
    pub fn listing(&self) -> Listing {
        let entries = schema::leaf_keys(&C::META)
            .into_iter()
            .map(|key| {
                let display = match self.get(&key) {
                    Some(v) => format_value(v),
                    None => NOT_SET.to_string(),
                };
                (key, display)
            })
            .collect();
        Listing { entries }
    }

    /// A single key's resolved value together with its schema documentation.
    pub fn describe(&self, dotted_key: &str) -> Result<FieldReport, ScopefigError> {
        let doc = schema::lookup_doc(&C::META, dotted_key)
            .ok_or_else(|| ScopefigError::KeyNotFound(dotted_key.into()))?;
        Ok(FieldReport {
            key: dotted_key.into(),
            value: self.get(dotted_key).map(format_value),
            doc,
        })
    }
}

const NOT_SET: &str = "<not set>";

/// All schema keys and their display values.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub entries: Vec<(String, String)>,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{key} = {value}")?;
        }
        Ok(())
    }
}

/// One key's value and doc comment.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldReport {
    pub key: String,
    pub value: Option<String>,
    pub doc: Vec<String>,
}

impl fmt::Display for FieldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.doc {
            writeln!(f, "# {}", line.trim())?;
        }
        write!(
            f,
            "{} = {}",
            self.key,
            self.value.as_deref().unwrap_or(NOT_SET)
        )
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) | Value::Table(_) => value.to_string(),
    }
}
