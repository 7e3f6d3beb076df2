//! Identities for merge intermediates.
//!
//! An [`Identity`] pairs a priority rank with a nonce. The rank is recoverable
//! from the identity alone (see [`Identity::priority`]); the nonce only keeps
//! identities unique when several merges run at once and carries no ordering.
//!
//! The nonce source is injected through [`NonceSource`] so tests can use a
//! deterministic sequence instead of random UUIDs.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::error::ScopefigError;

/// Produces nonces. Must be safe to call from many threads at once.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> Uuid;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn next_nonce(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Counts up from a starting value; deterministic, still unique per source.
#[derive(Debug, Default)]
pub struct SequentialNonce {
    next: AtomicU64,
}

impl SequentialNonce {
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl NonceSource for SequentialNonce {
    fn next_nonce(&self) -> Uuid {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Uuid::from_u128(u128::from(n))
    }
}

/// Priority rank plus a uniqueness nonce. Renders as `<priority>:<nonce>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    priority: u32,
    nonce: Uuid,
}

impl Identity {
    pub fn new(priority: u32, nonce: Uuid) -> Self {
        Self { priority, nonce }
    }

    /// Zero-based rank: lower is more specific.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn nonce(&self) -> Uuid {
        self.nonce
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.priority, self.nonce)
    }
}

impl FromStr for Identity {
    type Err = ScopefigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ScopefigError::InvalidValue {
            key: s.into(),
            reason,
        };
        let (priority, nonce) = s
            .split_once(':')
            .ok_or_else(|| invalid("expected <priority>:<nonce>".into()))?;
        let priority = priority
            .parse::<u32>()
            .map_err(|e| invalid(format!("bad priority: {e}")))?;
        let nonce = Uuid::parse_str(nonce).map_err(|e| invalid(format!("bad nonce: {e}")))?;
        Ok(Self { priority, nonce })
    }
}

/// Hands out identities for a given priority.
#[derive(Clone)]
pub struct IdentityAssigner {
    source: Arc<dyn NonceSource>,
}

impl Default for IdentityAssigner {
    fn default() -> Self {
        Self::new(RandomNonce)
    }
}

impl fmt::Debug for IdentityAssigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityAssigner").finish_non_exhaustive()
    }
}

impl IdentityAssigner {
    pub fn new(source: impl NonceSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Deterministic identities, counting nonces up from `start`.
    pub fn sequential(start: u64) -> Self {
        Self::new(SequentialNonce::starting_at(start))
    }

    pub fn assign(&self, priority: u32) -> Identity {
        Identity::new(priority, self.source.next_nonce())
    }
}
