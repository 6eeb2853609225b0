//! Retry with exponential backoff for fetch operations

use std::time::Duration;

use crate::fetch::FetchError;

/// Exponential backoff: 2^attempt seconds (2s, 4s, 8s, ...)
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt))
}

/// Retry a fallible fetch operation with exponential backoff.
///
/// On retryable errors, logs the failure, sleeps, and retries up to
/// `max_retries` additional attempts. Returns `Ok(T)` on first success,
/// or the final `Err` on exhaustion / non-retryable error.
pub fn retry_with_backoff<T>(
    label: &str,
    max_retries: u32,
    mut attempt_fn: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                log::debug!("{label}: attempt {attempt}/{max_retries} failed: {e}, retrying...");
                std::thread::sleep(backoff_duration(attempt));
            }
            Err(e) => {
                log::debug!("{label}: failed permanently: {e}");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retryable_err() -> FetchError {
        FetchError::Http {
            status: Some(500),
            message: "server error".to_string(),
        }
    }

    fn permanent_err() -> FetchError {
        FetchError::Http {
            status: Some(404),
            message: "not found".to_string(),
        }
    }

    #[test]
    fn backoff_exponential() {
        assert_eq!(backoff_duration(1), Duration::from_secs(2));
        assert_eq!(backoff_duration(2), Duration::from_secs(4));
        assert_eq!(backoff_duration(3), Duration::from_secs(8));
    }

    #[test]
    fn succeeds_first_try() {
        let result = retry_with_backoff("t", 1, || Ok::<_, FetchError>(42));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn retries_then_succeeds() {
        let mut calls = 0;
        let result = retry_with_backoff("t", 1, || {
            calls += 1;
            if calls < 2 { Err(retryable_err()) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn gives_up_after_max_retries() {
        let mut calls = 0;
        let result = retry_with_backoff("t", 1, || {
            calls += 1;
            Err::<(), _>(retryable_err())
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn permanent_error_not_retried() {
        let mut calls = 0;
        let result = retry_with_backoff("t", 3, || {
            calls += 1;
            Err::<(), _>(permanent_err())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
