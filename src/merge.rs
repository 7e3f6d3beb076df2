//! Field-level merge of a priority list into one effective configuration.
//!
//! For every leaf field of the schema, the first object in the priority list
//! that sets it supplies the value. Lower-priority objects fill gaps and never
//! override a field set higher up. Fields no object sets stay unset.

use std::marker::PhantomData;

use confique::Config;
use toml::Table;

use crate::effective::EffectiveConfiguration;
use crate::error::ScopefigError;
use crate::identity::{Identity, IdentityAssigner};
use crate::overrides;
use crate::priority::ScopeCandidates;
use crate::schema;
use crate::scope::ConfigurationObject;

/// A synthetic stand-in for one source object during a single merge pass.
///
/// Carries the priority-encoding identity; dropped when the merge returns.
#[derive(Debug)]
struct MergeIntermediate<'a> {
    original: &'a ConfigurationObject,
    identity: Identity,
}

/// Merges priority lists for schema `C`.
pub struct ExtensionMerger<C: Config> {
    identities: IdentityAssigner,
    _schema: PhantomData<fn() -> C>,
}

impl<C: Config> Default for ExtensionMerger<C> {
    fn default() -> Self {
        Self::new(IdentityAssigner::default())
    }
}

impl<C: Config> Clone for ExtensionMerger<C> {
    fn clone(&self) -> Self {
        Self::new(self.identities.clone())
    }
}

impl<C: Config> ExtensionMerger<C> {
    pub fn new(identities: IdentityAssigner) -> Self {
        Self {
            identities,
            _schema: PhantomData,
        }
    }

    /// Merge the candidates for one variant.
    ///
    /// The priority list is the deduplicated candidate slots; the encoded
    /// priority comes from the slots before dedup.
    pub fn merge(&self, candidates: &ScopeCandidates<'_>) -> Result<EffectiveConfiguration<C>, ScopefigError> {
        let priority = candidates.priority();
        let list = candidates.priority_list();

        let intermediates: Vec<MergeIntermediate<'_>> = list
            .iter()
            .map(|object| {
                let intermediate = MergeIntermediate {
                    original: object.as_ref(),
                    identity: self.identities.assign(priority),
                };
                tracing::trace!(
                    object = intermediate.original.name(),
                    identity = %intermediate.identity,
                    "synthesized merge intermediate"
                );
                intermediate
            })
            .collect();

        let mut values = Table::new();
        let mut set_fields = 0usize;
        for key in schema::leaf_keys(&C::META) {
            let winner = intermediates
                .iter()
                .find_map(|i| i.original.get(&key));
            if let Some(value) = winner {
                overrides::set_nested(&mut values, &key, value.clone())?;
                set_fields += 1;
            }
        }

        let identity = match intermediates.first() {
            Some(top) => top.identity,
            None => self.identities.assign(priority),
        };

        tracing::debug!(
            %identity,
            sources = ?list.names(),
            set_fields,
            "merged configuration"
        );

        Ok(EffectiveConfiguration::new(identity, values))
    }
}
