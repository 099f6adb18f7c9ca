//! Unified error types for the logistics engine.
//!
//! Every fallible operation returns [`Result`]. Persistence failures surface as
//! [`Error::Database`] and are never retried here; the calling job owns retry.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or was invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any failure reading aggregates or writing cache rows
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A service event type outside delivery, service and pickup
    #[error("Unsupported event type: '{event_type}'")]
    UnsupportedEventType {
        /// The raw event type text
        event_type: String,
    },

    /// Malformed or inverted date bounds
    #[error("Invalid date range: '{start}' .. '{end}'")]
    InvalidDateRange {
        /// Raw start bound
        start: String,
        /// Raw end bound
        end: String,
    },

    /// A stored enumerated column held text we do not recognise
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue {
        /// Which enumeration was being parsed (e.g. "order status")
        kind: &'static str,
        /// The offending text
        value: String,
    },

    /// Service event lookup failed
    #[error("Service event not found: {id}")]
    ServiceEventNotFound {
        /// Requested service event ID
        id: i64,
    },

    /// Order lookup failed
    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Requested order ID
        id: i64,
    },

    /// Location lookup failed
    #[error("Location not found: {id}")]
    LocationNotFound {
        /// Requested location ID
        id: i64,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
