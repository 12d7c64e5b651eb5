//! OAuth2 error types.

use thiserror::Error;

use crate::clients::HttpError;
use crate::error::ConfigError;

/// Errors that can occur while acquiring or refreshing OAuth2 tokens.
///
/// # Example
///
/// ```rust
/// use odss_client::auth::oauth2::OAuthError;
///
/// let error = OAuthError::StateMismatch {
///     expected: "abc123".to_string(),
///     received: "xyz789".to_string(),
/// };
/// assert!(error.to_string().contains("abc123"));
/// ```
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The OAuth2 settings are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The token endpoint could not be reached.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The token endpoint answered with an error.
    #[error("Token request failed with status {status}: {error}{}", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    TokenRequestFailed {
        /// The HTTP status code of the response.
        status: u16,
        /// The OAuth2 error code, or the raw body when none was given.
        error: String,
        /// The `error_description`, if any.
        description: Option<String>,
    },

    /// The authorization server redirected back with an error.
    #[error("Authorization denied: {error}")]
    AuthorizationDenied {
        /// The OAuth2 error code.
        error: String,
        /// The `error_description`, if any.
        description: Option<String>,
    },

    /// The redirect did not carry the expected state.
    #[error("OAuth state mismatch: expected '{expected}', received '{received}'")]
    StateMismatch {
        /// The state the flow was started with.
        expected: String,
        /// The state found in the redirect.
        received: String,
    },

    /// The redirect URI could not be used.
    #[error("Invalid redirect: {reason}")]
    InvalidRedirect {
        /// Why the redirect was rejected.
        reason: String,
    },

    /// A token response lacked a required field.
    #[error("Token response is missing '{field}'")]
    MissingField {
        /// The missing field.
        field: &'static str,
    },

    /// A refresh was requested for a token without a refresh token.
    #[error("Token has no refresh token")]
    NoRefreshToken,
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
