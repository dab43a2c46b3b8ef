//! Unified error types and result handling.
//!
//! Every core operation returns [`Result`]. The HTTP layer turns these variants into
//! status codes (see `api::error`), so variants describe *what* went wrong in domain
//! terms rather than how it will be rendered.

use sea_orm::DbErr;
use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, rejected before any state is touched
    #[error("Validation failed: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A lifecycle event that is not allowed from the current status
    #[error("Cannot {event} from status '{from}': {reason}")]
    InvalidTransition {
        /// Status the entity was in
        from: String,
        /// Event that was attempted
        event: String,
        /// Why the guard rejected it
        reason: String,
    },

    /// A referenced entity does not exist (or belongs to another property)
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity kind, e.g. `"reservation"`
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// No room or table could be claimed for the requirement
    #[error("No {resource} available for {requirement}")]
    ResourceUnavailable {
        /// `"room"` or `"table"`
        resource: &'static str,
        /// Human-readable requirement (room type, party size)
        requirement: String,
    },

    /// The folio has been locked and accepts no further line items
    #[error("Folio {folio_id} is locked")]
    FolioLocked {
        /// ID of the locked folio
        folio_id: i64,
    },

    /// The rate plan's cancellation policy is referenced by an active reservation
    #[error("Rate plan {rate_plan_id} is referenced by active reservations")]
    PolicyInUse {
        /// ID of the rate plan
        rate_plan_id: i64,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Details about the configuration problem
        message: String,
    },

    /// Database error surfaced by `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O error (config files, listener sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidTransition {
            from: "checked_in".to_string(),
            event: "check_out".to_string(),
            reason: "balance due 407000".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot check_out from status 'checked_in': balance due 407000"
        );

        let err = Error::not_found("reservation", 42);
        assert_eq!(err.to_string(), "reservation '42' not found");

        let err = Error::ResourceUnavailable {
            resource: "room",
            requirement: "room type 3".to_string(),
        };
        assert_eq!(err.to_string(), "No room available for room type 3");
    }
}
