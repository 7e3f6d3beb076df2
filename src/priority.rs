//! Priority resolution: which scopes apply to a variant, most specific first.
//!
//! ```text
//! CommandLineOverride     always first when present
//! Variant(name)
//! Flavor(f)               at most one of the variant's flavors
//! Dimension(d)            at most one of the variant's dimensions
//! BuildType(t)
//! Base                    always last when present
//! ```
//!
//! Absent scopes are dropped and the rest deduplicated by object name, keeping
//! the first (highest-priority) occurrence.

use std::sync::Arc;

use confique::Config;

use crate::error::ScopefigError;
use crate::registry::ScopeRegistry;
use crate::scope::{ConfigurationObject, ScopeKey, ScopeLevel};
use crate::variant::Variant;

/// Number of slots below the command-line slot. Also the rank reported when
/// none of them is filled.
pub const SCOPED_SLOTS: u32 = 5;

/// The six candidate slots for one variant, before dedup.
#[derive(Debug, Clone, Default)]
pub struct ScopeCandidates<'r> {
    pub command_line: Option<&'r Arc<ConfigurationObject>>,
    pub variant: Option<&'r Arc<ConfigurationObject>>,
    pub flavor: Option<&'r Arc<ConfigurationObject>>,
    pub dimension: Option<&'r Arc<ConfigurationObject>>,
    pub build_type: Option<&'r Arc<ConfigurationObject>>,
    pub base: Option<&'r Arc<ConfigurationObject>>,
}

impl<'r> ScopeCandidates<'r> {
    /// Slots in priority order, most specific first.
    pub fn slots(&self) -> [Option<&'r Arc<ConfigurationObject>>; 6] {
        [
            self.command_line,
            self.variant,
            self.flavor,
            self.dimension,
            self.build_type,
            self.base,
        ]
    }

    /// Rank of the most specific filled slot below the command line:
    /// 0 = variant, 1 = flavor, 2 = dimension, 3 = build type, 4 = base.
    ///
    /// Slots are positional, so the rank does not depend on whether a
    /// command-line override exists. With no filled slot it is
    /// [`SCOPED_SLOTS`].
    pub fn priority(&self) -> u32 {
        self.slots()[1..]
            .iter()
            .position(Option::is_some)
            .map_or(SCOPED_SLOTS, |i| i as u32)
    }

    /// Filled slots, deduplicated by name.
    pub fn priority_list(&self) -> PriorityList<'r> {
        PriorityList::from_ordered(self.slots().into_iter().flatten())
    }
}

/// Configuration objects in priority order, unique by name.
#[derive(Debug, Clone, Default)]
pub struct PriorityList<'r> {
    objects: Vec<&'r Arc<ConfigurationObject>>,
}

impl<'r> PriorityList<'r> {
    /// Keep the first occurrence of each name, preserving order.
    pub fn from_ordered(objects: impl IntoIterator<Item = &'r Arc<ConfigurationObject>>) -> Self {
        let mut kept: Vec<&'r Arc<ConfigurationObject>> = Vec::new();
        for object in objects {
            if !kept.iter().any(|k| k.name() == object.name()) {
                kept.push(object);
            }
        }
        Self { objects: kept }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'r Arc<ConfigurationObject>> + '_ {
        self.objects.iter().copied()
    }

    pub fn names(&self) -> Vec<&'r str> {
        self.objects.iter().map(|o| o.name()).collect()
    }
}

/// Look up every candidate slot for `variant`.
///
/// Fails with [`ScopefigError::AmbiguousScope`] when the variant's flavors (or
/// dimensions) match more than one distinct registered object.
pub fn resolve_candidates<'r, C: Config>(
    variant: &Variant,
    registry: &'r ScopeRegistry<C>,
) -> Result<ScopeCandidates<'r>, ScopefigError> {
    let flavor = single_match(
        variant,
        registry,
        ScopeLevel::Flavor,
        variant
            .product_flavors()
            .iter()
            .map(|(_, flavor)| ScopeKey::Flavor(flavor.clone())),
    )?;
    let dimension = single_match(
        variant,
        registry,
        ScopeLevel::Dimension,
        variant
            .product_flavors()
            .iter()
            .map(|(dimension, _)| ScopeKey::Dimension(dimension.clone())),
    )?;

    Ok(ScopeCandidates {
        command_line: registry.lookup(&ScopeKey::CommandLineOverride),
        variant: registry.lookup(&ScopeKey::Variant(variant.name().to_string())),
        flavor,
        dimension,
        build_type: variant
            .build_type_name()
            .and_then(|t| registry.lookup(&ScopeKey::BuildType(t.to_string()))),
        base: registry.lookup(&ScopeKey::Base),
    })
}

/// The variant's priority list. Deterministic for a given registry and variant.
pub fn resolve_priority<'r, C: Config>(
    variant: &Variant,
    registry: &'r ScopeRegistry<C>,
) -> Result<PriorityList<'r>, ScopefigError> {
    Ok(resolve_candidates(variant, registry)?.priority_list())
}

fn single_match<'r, C: Config>(
    variant: &Variant,
    registry: &'r ScopeRegistry<C>,
    level: ScopeLevel,
    keys: impl Iterator<Item = ScopeKey>,
) -> Result<Option<&'r Arc<ConfigurationObject>>, ScopefigError> {
    let mut matches: Vec<(ScopeKey, &'r Arc<ConfigurationObject>)> = Vec::new();
    for key in keys {
        if let Some(object) = registry.lookup(&key)
            && !matches.iter().any(|(_, m)| m.name() == object.name())
        {
            matches.push((key, object));
        }
    }

    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(matches[0].1)),
        _ => Err(ScopefigError::AmbiguousScope {
            variant: variant.name().to_string(),
            level,
            scopes: matches.iter().map(|(key, _)| key.to_string()).collect(),
        }),
    }
}
