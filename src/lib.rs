//! Hierarchical, per-variant configuration resolution. Register sparse
//! configuration objects on build scopes, name a variant, and get back one
//! merged configuration.
//!
//! A build produces many variants: every combination of a build type
//! (`debug`, `release`) with one flavor per flavor dimension (`free`/`paid`,
//! `staging`/`prod`). Settings can be attached to any of those scopes, to the
//! whole build, or to the command line. Scopefig decides, field by field,
//! which of them a given variant actually sees.
//!
//! ```ignore
//! let mut registry = ScopeRegistry::<PublishConfig>::new();
//! registry.register(ScopeKey::Base, ConfigurationObject::from_toml_str("base", base_toml)?)?;
//! registry.register(ScopeKey::BuildType("release".into()), release)?;
//!
//! let variant = Variant::new("freeRelease").build_type("release").flavor("tier", "free");
//! let config: PublishConfig = resolve_effective_configuration(&variant, &registry)?.load()?;
//! ```
//!
//! # Design: struct as schema
//!
//! The schema is a user struct deriving confique's `Config`. Its leaf fields
//! are the keys the merger walks; `#[config(nested)]` sections become dotted
//! keys (`promote.commit`). Doc comments feed
//! [`EffectiveConfiguration::describe`], and `#[config(default)]` values are
//! applied by [`EffectiveConfiguration::load`] only after merging, so a
//! default never masks a value set in a less specific scope.
//!
//! # Scope precedence
//!
//! ```text
//! Command line          ScopeKey::CommandLineOverride
//!        ↓ falls through to
//! Variant               ScopeKey::Variant("freeRelease")
//!        ↓
//! Flavor                ScopeKey::Flavor("free")
//!        ↓
//! Flavor dimension      ScopeKey::Dimension("tier")
//!        ↓
//! Build type            ScopeKey::BuildType("release")
//!        ↓
//! Base                  ScopeKey::Base
//! ```
//!
//! Every object is **sparse**. A field set higher up is never overridden by a
//! lower scope; a field unset higher up is filled from the first lower scope
//! that sets it. A field no scope sets stays unset in the
//! [`EffectiveConfiguration`].
//!
//! A variant with several flavors must match at most one flavor object and at
//! most one dimension object. Two matches at the same level is a
//! [`ScopefigError::AmbiguousScope`] naming the variant and every conflicting
//! scope; scopefig never picks one silently.
//!
//! # Identities
//!
//! Each merge tags its result with an [`Identity`]: the specificity of the
//! most specific non-command-line scope that applied (0 for a variant object,
//! 4 for base only) plus a UUID nonce. Consumers holding only the merged
//! result can recover how specific it is. The nonce source is injectable
//! ([`IdentityAssigner::sequential`]) for deterministic tests.
//!
//! # Shared operations
//!
//! [`build_task_key`] turns a dotted application id into a stable
//! registration key (`commitEditForComDotExampleDotApp`). [`TaskRegistry`]
//! registers by key atomically: tolerant registration hands every caller the
//! same handle, strict registration rejects the second request.
//!
//! # Strict mode
//!
//! Strict mode is **on by default**. Registering an object that sets a key
//! the schema does not define fails with the scope and key name; objects
//! loaded from a [manifest](parse_manifest) also carry the line number:
//!
//! ```text
//! Unknown key 'trak' in scope 'flavor:free' (line 5)
//! ```
//!
//! Turn it off with [`ScopeRegistry::strict`] to keep such keys; the merger
//! ignores them.
//!
//! # Command-line overrides
//!
//! The command-line scope sits above every other scope and applies to every
//! variant. Build it from dotted pairs
//! ([`register_command_line`](ScopeRegistry::register_command_line)), from
//! any serializable struct
//! ([`register_command_line_from`](ScopeRegistry::register_command_line_from)),
//! or, with the `clap` feature, from repeatable `--set KEY=VALUE` flags via
//! `OverrideArgs`.
//!
//! # Logging
//!
//! Scopefig emits [`tracing`](https://docs.rs/tracing) events (`debug!` for
//! registrations, resolutions and merges, `trace!` per merge intermediate) and
//! never installs a subscriber.
//!
//! # Error handling
//!
//! All fallible operations return [`ScopefigError`]. Errors are fatal for the
//! variant or registration at hand and name the scopes and keys involved.

pub mod error;
pub mod identity;
pub mod manifest;
pub mod overrides;
pub mod priority;
pub mod schema;
pub mod scope;
pub mod task;
pub mod validate;
pub mod variant;

#[cfg(feature = "clap")]
mod cli;
mod effective;
mod merge;
mod registry;
mod resolve;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::OverrideArgs;
pub use effective::{EffectiveConfiguration, FieldReport, Listing};
pub use error::ScopefigError;
pub use identity::{Identity, IdentityAssigner, NonceSource, RandomNonce, SequentialNonce};
pub use manifest::{load_manifest, parse_manifest};
pub use merge::ExtensionMerger;
pub use priority::{PriorityList, ScopeCandidates, resolve_candidates, resolve_priority};
pub use registry::ScopeRegistry;
pub use resolve::{Resolver, resolve_effective_configuration};
pub use scope::{ConfigurationObject, ScopeKey, ScopeLevel};
pub use task::{Registration, TaskDescriptor, TaskRegistry, build_task_key, commit_edit_task};
pub use variant::Variant;
