//! Short identifier generation
//!
//! A short id is a fixed-length random token drawn from a URL-safe alphabet.
//! It is both the primary key of a stored bin and the public reference handed
//! back to clients, so it must not be sequential or otherwise guessable.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lowercase, uppercase and digits: 62 symbols, none of which need escaping in a URL
pub const DEFAULT_SHORT_ID_CHARSET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 62^8 ~= 2.18e14 possible identifiers
pub const DEFAULT_SHORT_ID_LENGTH: usize = 8;

/// A generated short identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(String);

impl ShortId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ShortId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ShortId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShortIdSpecError {
    #[error("short id length must be at least 1")]
    ZeroLength,
    #[error("short id charset must not be empty")]
    EmptyCharset,
    #[error("short id charset contains a symbol that is not URL-safe: {0:?}")]
    InvalidSymbol(char),
    #[error("short id charset contains {0:?} more than once")]
    DuplicateSymbol(char),
}

/// Shape of the identifiers a generator produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortIdSpec {
    /// Number of symbols in every identifier
    pub length: usize,
    /// Alphabet every symbol is drawn from
    pub charset: String,
}

impl Default for ShortIdSpec {
    fn default() -> Self {
        Self {
            length: DEFAULT_SHORT_ID_LENGTH,
            charset: DEFAULT_SHORT_ID_CHARSET.to_string(),
        }
    }
}

impl ShortIdSpec {
    /// Build a spec, rejecting alphabets that would produce unusable ids
    pub fn new(length: usize, charset: impl Into<String>) -> Result<Self, ShortIdSpecError> {
        let spec = Self {
            length,
            charset: charset.into(),
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check for a non-empty, URL-safe alphabet without repeats.
    ///
    /// Repeated symbols would skew the per-position distribution, so they are
    /// rejected rather than silently deduplicated.
    pub fn validate(&self) -> Result<(), ShortIdSpecError> {
        if self.length == 0 {
            return Err(ShortIdSpecError::ZeroLength);
        }
        if self.charset.is_empty() {
            return Err(ShortIdSpecError::EmptyCharset);
        }

        let mut seen = Vec::with_capacity(self.charset.len());
        for c in self.charset.chars() {
            if !c.is_ascii_alphanumeric() {
                return Err(ShortIdSpecError::InvalidSymbol(c));
            }
            if seen.contains(&c) {
                return Err(ShortIdSpecError::DuplicateSymbol(c));
            }
            seen.push(c);
        }

        Ok(())
    }

    /* Getters */

    /// Whether `candidate` could have been produced under this spec.
    ///
    /// Purely syntactic: says nothing about whether the id was ever stored.
    pub fn is_well_formed(&self, candidate: &str) -> bool {
        candidate.len() == self.length
            && candidate
                .bytes()
                .all(|b| self.charset.as_bytes().contains(&b))
    }

    /// Number of distinct identifiers, or `None` if it overflows a u128
    pub fn keyspace(&self) -> Option<u128> {
        let base = self.charset.chars().count() as u128;
        let exp = u32::try_from(self.length).ok()?;
        base.checked_pow(exp)
    }
}

/// Source of candidate identifiers.
///
/// Generators are pure: they never look at storage, so a candidate may
/// already be taken. Detecting that is the store's job and retrying is the
/// caller's.
pub trait IdGenerator: Send + Sync + 'static {
    /// Produce the next candidate identifier
    fn generate(&self) -> ShortId;

    /// The shape of the identifiers this generator produces
    fn spec(&self) -> &ShortIdSpec;
}

/// Uniform random generator backed by the calling thread's RNG.
///
/// Each call draws from `rand::rng()`, which is thread-local and
/// cryptographically seeded, so a single generator can be shared across
/// tasks without a lock.
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    spec: ShortIdSpec,
    alphabet: Vec<u8>,
}

impl RandomIdGenerator {
    pub fn new(spec: ShortIdSpec) -> Result<Self, ShortIdSpecError> {
        spec.validate()?;
        let alphabet = spec.charset.as_bytes().to_vec();
        Ok(Self { spec, alphabet })
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        let spec = ShortIdSpec::default();
        let alphabet = spec.charset.as_bytes().to_vec();
        Self { spec, alphabet }
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> ShortId {
        let mut rng = rand::rng();
        let id: String = (0..self.spec.length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())] as char)
            .collect();
        ShortId(id)
    }

    fn spec(&self) -> &ShortIdSpec {
        &self.spec
    }
}

/// Generator that replays a fixed list of candidates before falling back to
/// random generation.
///
/// Used to reproduce collisions deterministically, e.g. when checking that a
/// caller retries after the store rejects a duplicate id.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    queued: Mutex<VecDeque<ShortId>>,
    fallback: RandomIdGenerator,
}

impl SequenceIdGenerator {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ShortId>,
    {
        Self {
            queued: Mutex::new(ids.into_iter().map(Into::into).collect()),
            fallback: RandomIdGenerator::default(),
        }
    }

    /// Number of scripted candidates not yet handed out
    pub fn remaining(&self) -> usize {
        self.queued.lock().map(|q| q.len()).unwrap_or(0)
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn generate(&self) -> ShortId {
        let next = match self.queued.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.unwrap_or_else(|| self.fallback.generate())
    }

    fn spec(&self) -> &ShortIdSpec {
        self.fallback.spec()
    }
}
