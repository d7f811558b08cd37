//! Reconnect decisions.
//!
//! Pure functions over the error taxonomy, kept apart from the transport loop
//! so they can be tested directly.

use crate::error::ClientError;

/// Check if the transport should stop for good based on the error type.
///
/// # Returns
///
/// `true` if retrying cannot succeed (the credential was rejected, or the
/// client is misconfigured), `false` otherwise
pub fn should_stop_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::Unauthorized(_) | ClientError::Config(_)
    )
}

/// Check if the transport should keep reconnecting with normal backoff.
///
/// # Arguments
///
/// * `error` - The error that ended the last attempt
/// * `consecutive_failures` - Failures since the last successful open, including this one
/// * `max_failures` - Failures after which live delivery is reported as lost
///
/// # Returns
///
/// `true` if another regular attempt should be scheduled, `false` if the
/// transport should stop or fall back to degraded retries
pub fn should_attempt_reconnect(
    error: &ClientError,
    consecutive_failures: u32,
    max_failures: u32,
) -> bool {
    if should_stop_immediately(error) {
        return false;
    }

    consecutive_failures < max_failures
}
