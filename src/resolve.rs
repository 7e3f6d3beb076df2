//! Resolution pipeline: variant → priority list → merged configuration.
//!
//! No I/O happens here; the registry is populated beforehand and only read.
//! Steps:
//!
//! 1. Look up the candidate scopes for the variant, rejecting ambiguity
//! 2. Order and deduplicate them into a priority list
//! 3. Merge field by field, most specific first
//! 4. Optionally apply schema defaults ([`Resolver::load`])

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use confique::Config;
use serde::Deserialize;

use crate::effective::EffectiveConfiguration;
use crate::error::ScopefigError;
use crate::identity::IdentityAssigner;
use crate::merge::ExtensionMerger;
use crate::priority;
use crate::registry::ScopeRegistry;
use crate::variant::Variant;

/// Compute the effective configuration of `variant` against `registry`.
///
/// Uses random identities; see [`Resolver`] to inject a nonce source.
pub fn resolve_effective_configuration<C: Config>(
    variant: &Variant,
    registry: &ScopeRegistry<C>,
) -> Result<EffectiveConfiguration<C>, ScopefigError> {
    resolve_with(variant, registry, &ExtensionMerger::default())
}

fn resolve_with<C: Config>(
    variant: &Variant,
    registry: &ScopeRegistry<C>,
    merger: &ExtensionMerger<C>,
) -> Result<EffectiveConfiguration<C>, ScopefigError> {
    let candidates = priority::resolve_candidates(variant, registry)?;
    tracing::debug!(
        variant = variant.name(),
        priority = candidates.priority(),
        "resolving variant"
    );
    merger.merge(&candidates)
}

/// Owns a populated registry and resolves variants against it.
pub struct Resolver<C: Config> {
    registry: ScopeRegistry<C>,
    merger: ExtensionMerger<C>,
}

impl<C: Config> Resolver<C> {
    pub fn new(registry: ScopeRegistry<C>) -> Self {
        Self {
            registry,
            merger: ExtensionMerger::default(),
        }
    }

    /// Replace the identity source (default: random UUID nonces).
    pub fn with_identities(mut self, identities: IdentityAssigner) -> Self {
        self.merger = ExtensionMerger::new(identities);
        self
    }

    pub fn registry(&self) -> &ScopeRegistry<C> {
        &self.registry
    }

    /// Resolve one variant. Side-effect free; repeat calls give field-equal results.
    pub fn resolve(&self, variant: &Variant) -> Result<EffectiveConfiguration<C>, ScopefigError> {
        resolve_with(variant, &self.registry, &self.merger)
    }

    /// Resolve one variant and apply schema defaults.
    pub fn load(&self, variant: &Variant) -> Result<C, ScopefigError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        self.resolve(variant)?.load()
    }

    /// Resolve each distinct variant name once, keyed by name.
    ///
    /// Repeating an identical descriptor is fine; a different descriptor
    /// under a name already seen fails with
    /// [`ScopefigError::ConflictingVariant`]. The first variant that fails
    /// aborts the batch with its error.
    pub fn resolve_all<'v>(
        &self,
        variants: impl IntoIterator<Item = &'v Variant>,
    ) -> Result<BTreeMap<String, EffectiveConfiguration<C>>, ScopefigError> {
        let mut seen: BTreeMap<&'v str, &'v Variant> = BTreeMap::new();
        let mut resolved = BTreeMap::new();
        for variant in variants {
            match seen.entry(variant.name()) {
                Entry::Occupied(first) => {
                    if *first.get() != variant {
                        return Err(ScopefigError::ConflictingVariant {
                            name: variant.name().to_string(),
                        });
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(variant);
                    resolved.insert(variant.name().to_string(), self.resolve(variant)?);
                }
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{PublishConfig, full_registry, object};
    use crate::scope::ScopeKey;
    use crate::scope::ScopeLevel;

    fn free_release() -> Variant {
        Variant::new("freeRelease")
            .build_type("release")
            .flavor("tier", "free")
    }

    #[test]
    fn base_and_variant_field_precedence() {
        let mut registry = ScopeRegistry::<PublishConfig>::new();
        registry
            .register(
                ScopeKey::Base,
                object("base", "update_priority = 1\nuser_fraction = 0.2\n"),
            )
            .unwrap();
        registry
            .register(
                ScopeKey::Variant("debug".into()),
                object("debug", "update_priority = 9\n"),
            )
            .unwrap();
        let effective =
            resolve_effective_configuration(&Variant::new("debug"), &registry).unwrap();
        assert_eq!(effective.get("update_priority").unwrap().as_integer(), Some(9));
        assert_eq!(effective.get("user_fraction").unwrap().as_float(), Some(0.2));
    }

    #[test]
    fn well_formed_registry_resolves() {
        let registry = full_registry();
        let effective = resolve_effective_configuration(&free_release(), &registry).unwrap();
        assert_eq!(effective.get("track").unwrap().as_str(), Some("beta"));
        assert_eq!(effective.priority(), 0);
    }

    #[test]
    fn ambiguity_propagates_unchanged() {
        let mut registry = full_registry();
        registry
            .register(ScopeKey::Flavor("staging".into()), object("staging", ""))
            .unwrap();
        let variant = free_release().flavor("env", "staging");
        let err = resolve_effective_configuration(&variant, &registry).unwrap_err();
        assert!(matches!(
            err,
            ScopefigError::AmbiguousScope {
                level: ScopeLevel::Flavor,
                ..
            }
        ));
    }

    #[test]
    fn resolving_twice_is_field_equal() {
        let resolver = Resolver::new(full_registry());
        let a = resolver.resolve(&free_release()).unwrap();
        let b = resolver.resolve(&free_release()).unwrap();
        assert_eq!(a.values(), b.values());
    }

    #[test]
    fn injected_identities_are_deterministic() {
        let a = Resolver::new(full_registry()).with_identities(IdentityAssigner::sequential(0));
        let b = Resolver::new(full_registry()).with_identities(IdentityAssigner::sequential(0));
        assert_eq!(
            a.resolve(&free_release()).unwrap().identity(),
            b.resolve(&free_release()).unwrap().identity()
        );
    }

    #[test]
    fn load_applies_defaults() {
        let resolver = Resolver::new(full_registry());
        let config = resolver.load(&free_release()).unwrap();
        assert_eq!(config.track, "beta");
        assert_eq!(config.release_status.as_deref(), Some("draft"));
        assert_eq!(config.update_priority, 2);
        assert!(!config.default_to_app_bundles);
        assert!(!config.promote.commit);
    }

    #[test]
    fn resolve_all_dedups_by_name() {
        let resolver = Resolver::new(full_registry());
        let debug = Variant::new("freeDebug")
            .build_type("debug")
            .flavor("tier", "free");
        let variants = [free_release(), debug, free_release()];
        let all = resolver.resolve_all(&variants).unwrap();
        assert_eq!(
            all.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["freeDebug", "freeRelease"]
        );
        assert_eq!(all["freeDebug"].get("track").unwrap().as_str(), Some("beta"));
        assert!(all["freeDebug"].get("release_status").is_none());
    }

    #[test]
    fn resolve_all_aborts_on_first_error() {
        let mut registry = full_registry();
        registry
            .register(ScopeKey::Dimension("env".into()), object("env", ""))
            .unwrap();
        let resolver = Resolver::new(registry);
        let broken = Variant::new("freeStagingRelease")
            .build_type("release")
            .flavor("tier", "free")
            .flavor("env", "staging");
        let result = resolver.resolve_all([&free_release(), &broken]);
        match result {
            Err(ScopefigError::AmbiguousScope { variant, level, .. }) => {
                assert_eq!(variant, "freeStagingRelease");
                assert_eq!(level, ScopeLevel::Dimension);
            }
            other => panic!("Expected AmbiguousScope, got {other:?}"),
        }
    }

    #[test]
    fn resolve_all_rejects_different_descriptor_under_same_name() {
        let resolver = Resolver::new(full_registry());
        let other = Variant::new("freeRelease").build_type("debug");
        let result = resolver.resolve_all([&free_release(), &other]);
        assert!(matches!(
            result,
            Err(ScopefigError::ConflictingVariant { name }) if name == "freeRelease"
        ));
    }

    #[test]
    fn no_shared_key_never_duplicates_scope() {
        let kinds: [fn(&str) -> ScopeKey; 4] = [
            |n| ScopeKey::Variant(n.into()),
            |n| ScopeKey::Flavor(n.into()),
            |n| ScopeKey::Dimension(n.into()),
            |n| ScopeKey::BuildType(n.into()),
        ];
        let mut registry = ScopeRegistry::<PublishConfig>::new();
        registry.register(ScopeKey::Base, object("base", "update_priority = 1\n")).unwrap();
        registry.register_command_line(&[]).unwrap();
        // Every kind keyed by the same two names; object names follow the key.
        for name in ["release", "free"] {
            for kind in kinds {
                let key = kind(name);
                let scoped = object(&key.to_string(), "track = \"beta\"\n");
                registry.register(key, scoped).unwrap();
            }
        }
        assert_eq!(registry.len(), 10);

        let variants = [
            Variant::new("release").build_type("release"),
            Variant::new("free").build_type("free").flavor("free", "free"),
            Variant::new("freeRelease").build_type("release").flavor("release", "free"),
            Variant::new("debug").build_type("debug"),
            Variant::new("paidDebug").build_type("debug").flavor("tier", "paid"),
        ];
        for variant in &variants {
            let effective = resolve_effective_configuration(variant, &registry).unwrap();
            assert_eq!(effective.get("update_priority").unwrap().as_integer(), Some(1));
        }
    }

    #[test]
    fn concurrent_resolution_shares_registry() {
        let resolver = Resolver::new(full_registry());
        let variants = vec![
            free_release(),
            Variant::new("freeDebug").build_type("debug").flavor("tier", "free"),
            Variant::new("paidRelease").build_type("release").flavor("tier", "paid"),
        ];
        let expected: Vec<_> = variants
            .iter()
            .map(|v| resolver.resolve(v).unwrap().values().clone())
            .collect();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let resolver = &resolver;
                    let variants = &variants;
                    s.spawn(move || {
                        variants
                            .iter()
                            .map(|v| resolver.resolve(v).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                let results = handle.join().unwrap();
                for (result, expected) in results.iter().zip(&expected) {
                    assert_eq!(result.values(), expected);
                }
            }
        });
    }
}
