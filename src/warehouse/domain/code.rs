//! Human-readable task codes of the form `PREFIX-YYMMDD-XXXXX`.

use super::WarehouseDomainError;
use chrono::{DateTime, NaiveDate, Utc};
use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters a code suffix is drawn from.
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 5;
const DATE_FORMAT: &str = "%y%m%d";

/// Unique, immutable task code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskCode(String);

impl TaskCode {
    /// Parses and validates a task code.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseDomainError::InvalidTaskCode`] when the value is not
    /// an uppercase alphanumeric prefix, a `YYMMDD` date and a five character
    /// uppercase alphanumeric suffix joined by dashes.
    pub fn new(value: impl Into<String>) -> Result<Self, WarehouseDomainError> {
        let raw = value.into();
        let mut segments = raw.split('-');
        let prefix = segments.next().unwrap_or_default();
        let date = segments.next().unwrap_or_default();
        let suffix = segments.next().unwrap_or_default();
        let is_valid = is_valid_prefix(prefix)
            && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
            && date.len() == 6
            && suffix.len() == SUFFIX_LEN
            && suffix.bytes().all(|byte| SUFFIX_ALPHABET.contains(&byte))
            && segments.next().is_none();

        if !is_valid {
            return Err(WarehouseDomainError::InvalidTaskCode(raw));
        }
        Ok(Self(raw))
    }

    /// Generates a code for a task created at `created_at`.
    ///
    /// The prefix is expected to have been validated with
    /// [`is_valid_prefix`].
    #[must_use]
    pub fn generate(prefix: &str, created_at: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .filter_map(|_| SUFFIX_ALPHABET.choose(rng).copied().map(char::from))
            .collect();
        Self(format!(
            "{prefix}-{}-{suffix}",
            created_at.format(DATE_FORMAT)
        ))
    }

    /// Returns the code as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` when `prefix` is a non-empty uppercase alphanumeric string.
#[must_use]
pub fn is_valid_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix
            .bytes()
            .all(|byte| byte.is_ascii_uppercase() || byte.is_ascii_digit())
}

impl TryFrom<String> for TaskCode {
    type Error = WarehouseDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskCode> for String {
    fn from(code: TaskCode) -> Self {
        code.0
    }
}

impl AsRef<str> for TaskCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh task codes.
pub trait TaskCodeSource: Send + Sync {
    /// Returns a new candidate code for a task created at `created_at`.
    fn next_code(&self, prefix: &str, created_at: DateTime<Utc>) -> TaskCode;
}

/// Code source drawing suffixes from the thread-local random generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTaskCodeSource;

impl TaskCodeSource for RandomTaskCodeSource {
    fn next_code(&self, prefix: &str, created_at: DateTime<Utc>) -> TaskCode {
        TaskCode::generate(prefix, created_at, &mut rand::rng())
    }
}
