//! Error types for the ODSS client.
//!
//! This module contains the configuration and validation errors returned
//! while building a [`ClientConfig`](crate::ClientConfig) or OAuth2 scheme
//! settings.
//!
//! # Error Handling
//!
//! Every configuration constructor returns `Result<T, ConfigError>` so that
//! invalid values are rejected before any request is made.
//!
//! # Example
//!
//! ```rust
//! use odss_client::{BaseUri, ConfigError};
//!
//! let result = BaseUri::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyBaseUri)));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URI template cannot be empty.
    #[error("Base URI cannot be empty. Please provide a URI template such as 'https://host/api/v{{version}}'.")]
    EmptyBaseUri,

    /// OAuth2 client ID cannot be empty.
    #[error("Client ID cannot be empty. Please provide the OAuth2 client ID registered for this application.")]
    EmptyClientId,

    /// OAuth2 client secret cannot be empty.
    #[error("Client secret cannot be empty. Omit the secret for public clients instead.")]
    EmptyClientSecret,

    /// A URI setting could not be parsed.
    #[error("Invalid URI '{uri}' for '{field}'.")]
    InvalidUri {
        /// The setting the URI was provided for.
        field: &'static str,
        /// The invalid URI that was provided.
        uri: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
