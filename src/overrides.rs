//! Dotted-key overrides and the table plumbing shared by every scope.
//!
//! Each `("promote.from_track", Value)` pair is expanded into the nested table
//! structure that configuration objects store, so a command-line override and
//! a manifest section end up with the same shape.

use std::collections::HashSet;

use confique::meta::Meta;
use serde::Serialize;
use toml::{Table, Value};

use crate::error::ScopefigError;
use crate::schema;

/// Convert dotted-key overrides into a nested `toml::Table`.
///
/// `("promote.from_track", Value::String("beta"))` becomes
/// `{promote = {from_track = "beta"}}`.
///
/// If multiple entries target the same key, the last one wins.
pub fn overrides_to_table(entries: &[(String, Value)]) -> Result<Table, ScopefigError> {
    let mut table = Table::new();
    for (dotted_key, value) in entries {
        set_nested(&mut table, dotted_key, value.clone())?;
    }
    Ok(table)
}

/// Set `dotted_key` inside `table`, creating intermediate tables as needed.
///
/// Fails when an intermediate segment already holds a non-table value.
pub fn set_nested(table: &mut Table, dotted_key: &str, value: Value) -> Result<(), ScopefigError> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((path, leaf)) => (Some(path), leaf),
        None => (None, dotted_key),
    };
    if leaf.is_empty() {
        return Err(ScopefigError::InvalidValue {
            key: dotted_key.into(),
            reason: "empty key segment".into(),
        });
    }

    let mut current = table;
    if let Some(path) = path {
        for segment in path.split('.') {
            let entry = current
                .entry(segment)
                .or_insert_with(|| Value::Table(Table::new()));
            current = match entry {
                Value::Table(sub) => sub,
                other => {
                    return Err(ScopefigError::InvalidValue {
                        key: dotted_key.into(),
                        reason: format!(
                            "'{segment}' is already set to a {} value",
                            other.type_str()
                        ),
                    });
                }
            };
        }
    }

    current.insert(leaf.to_string(), value);
    Ok(())
}

/// Navigate a `toml::Table` by dotted key path (e.g. `"promote.from_track"`).
pub fn table_get<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let tbl = match path {
        Some(path) => {
            let mut current = table;
            for segment in path.split('.') {
                current = current.get(segment)?.as_table()?;
            }
            current
        }
        None => table,
    };

    tbl.get(leaf)
}

/// Parse a `KEY=VALUE` assignment as given on a command line.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), ScopefigError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(ScopefigError::InvalidValue {
            key: raw.into(),
            reason: "expected KEY=VALUE".into(),
        });
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(ScopefigError::InvalidValue {
            key: raw.into(),
            reason: "missing key before '='".into(),
        });
    }
    Ok((key.to_string(), parse_value(value.trim())))
}

/// Parse a raw string into a typed TOML value.
/// Tries: bool → integer → float → string.
pub fn parse_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    // Require a dot so "NaN" / "inf" stay strings.
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
    {
        return Value::Float(f);
    }
    Value::String(s.to_string())
}

/// Collect overrides from any serializable source, auto-matching by field name.
///
/// `source` is serialized to a table; absent (`None`) values never appear and
/// keys that are not schema fields are dropped, so a whole clap struct can be
/// passed in without filtering its non-config arguments first.
pub fn overrides_from<S: Serialize>(
    meta: &Meta,
    source: &S,
) -> Result<Vec<(String, Value)>, ScopefigError> {
    let table = match Value::try_from(source) {
        Ok(Value::Table(table)) => table,
        Ok(other) => {
            return Err(ScopefigError::InvalidValue {
                key: "<overrides>".into(),
                reason: format!("expected a struct or map, got a {}", other.type_str()),
            });
        }
        Err(e) => {
            return Err(ScopefigError::InvalidValue {
                key: "<overrides>".into(),
                reason: e.to_string(),
            });
        }
    };

    let valid: HashSet<String> = schema::leaf_keys(meta).into_iter().collect();
    let mut pairs = Vec::new();
    flatten_into(&table, "", &mut pairs);
    pairs.retain(|(key, _)| valid.contains(key));
    Ok(pairs)
}

fn flatten_into(table: &Table, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(sub) => flatten_into(sub, &dotted, out),
            other => out.push((dotted, other.clone())),
        }
    }
}
