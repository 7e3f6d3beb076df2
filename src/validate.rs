//! Strict-mode validation: detect keys a configuration object sets that the
//! schema does not define.
//!
//! Uses `serde_ignored` to deserialize an object's values into `C::Layer`
//! (all-optional fields) and capture any keys the layer doesn't consume. Type
//! mismatches surface here too, before the object ever reaches a merge.

use confique::Config;
use serde::Deserialize;
use toml::{Table, Value};

use crate::error::ScopefigError;

/// Return the dotted paths of every key in `values` unknown to config type `C`.
pub fn unknown_keys<C: Config>(values: &Table) -> Result<Vec<String>, toml::de::Error>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let mut unknown: Vec<String> = Vec::new();
    let _layer: C::Layer = serde_ignored::deserialize(Value::Table(values.clone()), |path| {
        unknown.push(path.to_string());
    })?;
    Ok(unknown)
}

/// Validate an object's values against `C`, naming `scope` in any error.
///
/// `locate` maps an unknown dotted key to a line number when the values came
/// from a document; pass `|_| None` otherwise.
pub fn validate_values<C: Config>(
    values: &Table,
    scope: &str,
    locate: impl Fn(&str) -> Option<usize>,
) -> Result<(), ScopefigError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let unknown = unknown_keys::<C>(values).map_err(|e| ScopefigError::InvalidValue {
        key: scope.into(),
        reason: e.to_string(),
    })?;

    if unknown.is_empty() {
        return Ok(());
    }

    let errors: Vec<ScopefigError> = unknown
        .into_iter()
        .map(|key| {
            let line = locate(&key);
            ScopefigError::UnknownKey {
                key,
                scope: scope.into(),
                line,
            }
        })
        .collect();

    Err(ScopefigError::UnknownKeys(errors))
}

/// Find the 1-indexed line number for a key in TOML content.
///
/// For a dotted key like `"flavor.free.typo"`, tracks the current `[section]`
/// header while scanning and only matches the leaf key when inside the
/// correct section.
///
/// Best effort: handles standard `[section]` headers and bare key assignments,
/// not quoted keys or inline tables.
pub fn find_key_line(content: &str, dotted_key: &str) -> Option<usize> {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let (leaf, expected_section) = segments.split_last()?;

    let mut current_section: Vec<String> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            let header = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            current_section = header.split('.').map(|s| s.trim().to_string()).collect();
            continue;
        }

        let in_right_section = expected_section.len() == current_section.len()
            && expected_section
                .iter()
                .zip(&current_section)
                .all(|(a, b)| *a == b);

        if in_right_section
            && let Some(after_key) = trimmed.strip_prefix(leaf)
            && after_key.trim_start().starts_with('=')
        {
            return Some(i + 1);
        }
    }
    None
}
