use std::path::PathBuf;
use thiserror::Error;

use crate::scope::{ScopeKey, ScopeLevel};

#[derive(Debug, Error)]
pub enum ScopefigError {
    #[error("Scope {key} already has configuration '{existing}' (cannot register '{attempted}')")]
    DuplicateScope {
        key: ScopeKey,
        existing: String,
        attempted: String,
    },

    #[error(
        "Configuration '{name}' is already registered under {existing} (cannot register another object with that name under {attempted})"
    )]
    DuplicateName {
        name: String,
        existing: ScopeKey,
        attempted: ScopeKey,
    },

    #[error(
        "Variant '{variant}' matches more than one {level} override: {}",
        .scopes.join(", ")
    )]
    AmbiguousScope {
        variant: String,
        level: ScopeLevel,
        scopes: Vec<String>,
    },

    #[error("Variant '{name}' was given twice with different build types or flavors")]
    ConflictingVariant { name: String },

    #[error("Registration '{key}' already exists")]
    DuplicateRegistration { key: String },

    #[error("Unknown key '{key}' in scope '{scope}'{}", line_suffix(.line))]
    UnknownKey {
        key: String,
        scope: String,
        line: Option<usize>,
    },

    #[error("Unknown keys in configuration")]
    UnknownKeys(Vec<ScopefigError>),

    #[error("Unknown section '{section}' in {path}: expected one of {}", crate::manifest::SECTIONS.join(", "))]
    UnknownSection { section: String, path: PathBuf },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" (line {line})"),
        None => String::new(),
    }
}
