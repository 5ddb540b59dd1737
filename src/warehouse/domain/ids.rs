//! Identifier and validated scalar types for the warehouse task domain.

use super::WarehouseDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! surrogate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns [`WarehouseDomainError::InvalidIdentifier`] when the
            /// value is zero or negative.
            pub const fn new(value: i64) -> Result<Self, WarehouseDomainError> {
                if value <= 0 {
                    return Err(WarehouseDomainError::InvalidIdentifier(value));
                }
                Ok(Self(value))
            }

            /// Returns the underlying numeric value.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

surrogate_id!(
    /// Store-assigned identifier of a warehouse task.
    TaskId
);

surrogate_id!(
    /// Store-assigned identifier of an action log entry.
    ActionLogId
);

surrogate_id!(
    /// Identifier of the shop a task fulfils orders for.
    ShopId
);

/// Task urgency from 1 (lowest) to 5 (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    /// Lowest accepted priority.
    pub const MIN: u8 = 1;
    /// Highest accepted priority.
    pub const MAX: u8 = 5;
    /// Priority assigned when the caller does not specify one.
    pub const DEFAULT: Self = Self(3);

    /// Creates a validated priority.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseDomainError::InvalidPriority`] when the value lies
    /// outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, WarehouseDomainError> {
        u8::try_from(value)
            .ok()
            .filter(|candidate| (Self::MIN..=Self::MAX).contains(candidate))
            .map(Self)
            .ok_or(WarehouseDomainError::InvalidPriority(value))
    }

    /// Returns the numeric priority.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Priority {
    type Error = WarehouseDomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        Self::from(priority.0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text identity of the person or system acting on a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Operator(String);

impl Operator {
    /// Creates a validated operator identity.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseDomainError::EmptyOperator`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, WarehouseDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WarehouseDomainError::EmptyOperator);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the operator identity as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Operator {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
