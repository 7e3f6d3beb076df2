//! Declarative scope manifests.
//!
//! A manifest is a TOML document with one section per scope:
//!
//! ```toml
//! [base]
//! track = "internal"
//!
//! [build_type.release]
//! track = "production"
//!
//! [flavor.free]
//! track = "beta"
//!
//! [dimension.tier]
//! update_priority = 2
//!
//! [variant.freeRelease]
//! release_status = "draft"
//!
//! [cli]
//! user_fraction = 0.1
//! ```
//!
//! Each object is named after its scope key (`base`, `cli`, `flavor:free`,
//! `build-type:release`), so a variant and a build type may share a name.
//! In strict mode, unknown keys are reported with their line in the manifest.

use std::path::Path;
use std::sync::Arc;

use confique::Config;
use serde::Deserialize;
use toml::{Table, Value};

use crate::error::ScopefigError;
use crate::registry::ScopeRegistry;
use crate::scope::{ConfigurationObject, ScopeKey};
use crate::validate;

/// Top-level section names a manifest may use.
pub const SECTIONS: &[&str] = &["base", "cli", "variant", "flavor", "dimension", "build_type"];

/// Read and parse a manifest file.
pub fn load_manifest<C: Config>(path: &Path, strict: bool) -> Result<ScopeRegistry<C>, ScopefigError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let content = std::fs::read_to_string(path).map_err(|e| ScopefigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_manifest(&content, path, strict)
}

/// Parse manifest `content`; `path` is only used in error messages.
pub fn parse_manifest<C: Config>(
    content: &str,
    path: &Path,
    strict: bool,
) -> Result<ScopeRegistry<C>, ScopefigError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let document: Table = toml::from_str(content).map_err(|e| ScopefigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut registry = ScopeRegistry::new().strict(strict);
    for (section, value) in document {
        for (key, values, prefix) in section_scopes(&section, value, path)? {
            if strict {
                validate::validate_values::<C>(&values, &key.to_string(), |unknown| {
                    validate::find_key_line(content, &format!("{prefix}.{unknown}"))
                })?;
            }
            let object = ConfigurationObject::with_values(key.to_string(), values);
            registry.insert(key, Arc::new(object))?;
        }
    }
    Ok(registry)
}

/// Expand one top-level section into `(key, values, dotted section path)` triples.
fn section_scopes(
    section: &str,
    value: Value,
    path: &Path,
) -> Result<Vec<(ScopeKey, Table, String)>, ScopefigError> {
    let table = expect_table(section, value)?;
    let make: fn(String) -> ScopeKey = match section {
        "base" => return Ok(vec![(ScopeKey::Base, table, section.to_string())]),
        "cli" => {
            return Ok(vec![(
                ScopeKey::CommandLineOverride,
                table,
                section.to_string(),
            )]);
        }
        "variant" => ScopeKey::Variant,
        "flavor" => ScopeKey::Flavor,
        "dimension" => ScopeKey::Dimension,
        "build_type" => ScopeKey::BuildType,
        other => {
            return Err(ScopefigError::UnknownSection {
                section: other.into(),
                path: path.to_path_buf(),
            });
        }
    };

    table
        .into_iter()
        .map(|(name, values)| {
            let dotted = format!("{section}.{name}");
            let values = expect_table(&dotted, values)?;
            Ok((make(name), values, dotted))
        })
        .collect()
}

fn expect_table(key: &str, value: Value) -> Result<Table, ScopefigError> {
    match value {
        Value::Table(table) => Ok(table),
        other => Err(ScopefigError::InvalidValue {
            key: key.into(),
            reason: format!("expected a table, got a {}", other.type_str()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::PublishConfig;
    use crate::resolve::resolve_effective_configuration;
    use crate::variant::Variant;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
[base]
track = "internal"
update_priority = 1

[build_type.release]
track = "production"
release_status = "completed"

[flavor.free]
track = "beta"

[dimension.tier]
update_priority = 2

[variant.freeRelease]
release_status = "draft"

[cli]
user_fraction = 0.1
"#;

    fn path() -> PathBuf {
        PathBuf::from("/project/scopes.toml")
    }

    #[test]
    fn every_section_kind_registers() {
        let registry = parse_manifest::<PublishConfig>(MANIFEST, &path(), true).unwrap();
        assert_eq!(registry.len(), 6);
        assert!(registry.contains(&ScopeKey::Base));
        assert!(registry.contains(&ScopeKey::CommandLineOverride));
        assert!(registry.contains(&ScopeKey::Variant("freeRelease".into())));
        assert!(registry.contains(&ScopeKey::Flavor("free".into())));
        assert!(registry.contains(&ScopeKey::Dimension("tier".into())));
        assert!(registry.contains(&ScopeKey::BuildType("release".into())));
        assert_eq!(
            registry
                .lookup(&ScopeKey::BuildType("release".into()))
                .unwrap()
                .name(),
            "build-type:release"
        );
    }

    #[test]
    fn variant_and_build_type_with_same_name_both_contribute() {
        let content = "[variant.release]\ntrack = \"beta\"\n\n[build_type.release]\nrelease_status = \"completed\"\n";
        let registry = parse_manifest::<PublishConfig>(content, &path(), true).unwrap();
        let variant = Variant::new("release").build_type("release");
        let effective = resolve_effective_configuration(&variant, &registry).unwrap();
        assert_eq!(effective.get("track").unwrap().as_str(), Some("beta"));
        assert_eq!(
            effective.get("release_status").unwrap().as_str(),
            Some("completed")
        );
        assert_eq!(effective.priority(), 0);
    }

    #[test]
    fn manifest_resolves_end_to_end() {
        let registry = parse_manifest::<PublishConfig>(MANIFEST, &path(), true).unwrap();
        let variant = Variant::new("freeRelease")
            .build_type("release")
            .flavor("tier", "free");
        let effective = resolve_effective_configuration(&variant, &registry).unwrap();
        let config = effective.load().unwrap();
        assert_eq!(config.track, "beta");
        assert_eq!(config.release_status.as_deref(), Some("draft"));
        assert_eq!(config.update_priority, 2);
        assert_eq!(config.user_fraction, Some(0.1));
    }

    #[test]
    fn strict_reports_unknown_key_with_line() {
        let content = "[base]\ntrack = \"internal\"\n\n[flavor.free]\ntrak = \"beta\"\n";
        let err = parse_manifest::<PublishConfig>(content, &path(), true).unwrap_err();
        match err {
            ScopefigError::UnknownKeys(keys) => match &keys[0] {
                ScopefigError::UnknownKey { key, scope, line } => {
                    assert_eq!(key, "trak");
                    assert_eq!(scope, "flavor:free");
                    assert_eq!(*line, Some(5));
                }
                other => panic!("Expected UnknownKey, got {other:?}"),
            },
            other => panic!("Expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn strict_reports_nested_unknown_key_line() {
        let content = "[base]\ntrack = \"internal\"\n\n[base.promote]\ntypo = 1\n";
        let err = parse_manifest::<PublishConfig>(content, &path(), true).unwrap_err();
        match err {
            ScopefigError::UnknownKeys(keys) => {
                assert!(matches!(
                    &keys[0],
                    ScopefigError::UnknownKey { key, line: Some(5), .. } if key == "promote.typo"
                ));
            }
            other => panic!("Expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn lenient_accepts_unknown_key() {
        let content = "[base]\ntrak = \"beta\"\n";
        let registry = parse_manifest::<PublishConfig>(content, &path(), false).unwrap();
        assert!(!registry.is_strict());
        assert!(registry.lookup(&ScopeKey::Base).unwrap().is_set("trak"));
    }

    #[test]
    fn unknown_section_is_rejected() {
        let content = "[flavour.free]\ntrack = \"beta\"\n";
        let err = parse_manifest::<PublishConfig>(content, &path(), true).unwrap_err();
        assert!(matches!(err, ScopefigError::UnknownSection { section, .. } if section == "flavour"));
    }

    #[test]
    fn non_table_scope_is_invalid() {
        let content = "[flavor]\nfree = \"beta\"\n";
        let err = parse_manifest::<PublishConfig>(content, &path(), true).unwrap_err();
        assert!(matches!(err, ScopefigError::InvalidValue { key, .. } if key == "flavor.free"));
    }

    #[test]
    fn parse_error_includes_path() {
        let err = parse_manifest::<PublishConfig>("[base\n", &path(), true).unwrap_err();
        assert!(matches!(err, ScopefigError::ParseError { .. }));
        assert!(err.to_string().contains("scopes.toml"));
    }

    #[test]
    fn empty_manifest_is_empty_registry() {
        let registry = parse_manifest::<PublishConfig>("", &path(), true).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("scopes.toml");
        fs::write(&file, MANIFEST).unwrap();
        let registry = load_manifest::<PublishConfig>(&file, true).unwrap();
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("missing.toml");
        let err = load_manifest::<PublishConfig>(&file, true).unwrap_err();
        assert!(matches!(err, ScopefigError::IoError { path, .. } if path == file));
    }
}
