//! Random `state` values for authorization redirects.

use rand::distributions::Alphanumeric;
use rand::Rng;

const STATE_LENGTH: usize = 15;

/// Returns a fresh alphanumeric state value.
pub(crate) fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Checks the state received in a redirect against the expected one.
pub(crate) fn verify_state(
    expected: Option<&str>,
    received: Option<&str>,
) -> Result<(), super::OAuthError> {
    match expected {
        Some(expected) if received != Some(expected) => Err(super::OAuthError::StateMismatch {
            expected: expected.to_string(),
            received: received.unwrap_or_default().to_string(),
        }),
        _ => Ok(()),
    }
}
