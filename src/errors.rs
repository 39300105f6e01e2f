//! Unified error types for the stock ledger.
//!
//! Every rejected operation carries enough structure to explain why it was
//! rejected. [`Error::kind`] collapses the variants into the small taxonomy
//! callers branch on.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A part, location or alias could not be resolved.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record that was looked up (`"part"`, `"location"`, ...)
        entity: &'static str,
        /// The key that failed to resolve
        key: String,
    },

    /// The part is constrained to another location.
    #[error(
        "Part {part_number} is fixed to location {fixed_location}; refusing to move stock at {requested_location}"
    )]
    FixedLocationConflict {
        /// Part being moved
        part_number: String,
        /// Barcode of the part's fixed location
        fixed_location: String,
        /// Barcode the caller asked for
        requested_location: String,
    },

    /// An outbound movement asked for more than the location holds.
    #[error(
        "Insufficient stock for {part_number} at {location}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        /// Part being moved
        part_number: String,
        /// Barcode of the location
        location: String,
        /// Quantity currently at the location
        available: i64,
        /// Quantity the caller asked for
        requested: i64,
    },

    /// Backend failure. Never retried by the ledger.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// The import payload could not be read as a table.
    #[error("Import error: {message}")]
    Import {
        /// Description of the problem
        message: String,
    },

    /// The notifier failed to deliver an alert.
    #[error("Notification error: {message}")]
    Notify {
        /// Description of the problem
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Self::Import {
            message: value.to_string(),
        }
    }
}

/// Coarse classification of [`Error`] used at the operation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing/malformed input
    Validation,
    /// Unknown part, location or alias
    NotFound,
    /// Fixed-location mismatch
    PolicyViolation,
    /// Not enough stock for an outbound movement
    InsufficientStock,
    /// Backend, configuration, I/O or transport failure
    Storage,
}

impl ErrorKind {
    /// HTTP-style status code for this class of failure.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation | Self::InsufficientStock => 400,
            Self::NotFound => 404,
            Self::PolicyViolation => 409,
            Self::Storage => 500,
        }
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::Import { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::FixedLocationConflict { .. } => ErrorKind::PolicyViolation,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::Database(_) | Self::Config { .. } | Self::Notify { .. } | Self::Io(_) => {
                ErrorKind::Storage
            }
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_names_quantities() {
        let err = Error::InsufficientStock {
            part_number: "TAN-1".to_string(),
            location: "A1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert!(err.to_string().contains("available 3, requested 5"));
    }

    #[test]
    fn test_error_kinds_map_to_status_codes() {
        assert_eq!(Error::validation("x").kind().status_code(), 400);
        assert_eq!(Error::not_found("part", "X").kind().status_code(), 404);
        let conflict = Error::FixedLocationConflict {
            part_number: "X".to_string(),
            fixed_location: "A".to_string(),
            requested_location: "B".to_string(),
        };
        assert_eq!(conflict.kind(), ErrorKind::PolicyViolation);
        assert_eq!(conflict.kind().status_code(), 409);
        let db = Error::from(sea_orm::DbErr::Custom("boom".to_string()));
        assert_eq!(db.kind(), ErrorKind::Storage);
    }
}
