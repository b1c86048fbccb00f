//! Retry with exponential back-off and jitter for supplier requests.
//!
//! Transient failures (429, network errors, 5xx) are retried. Everything
//! else, including auth failures and unparseable bodies, is returned on the
//! first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::error::SupplierError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
pub(crate) fn is_retriable(err: &SupplierError) -> bool {
    match err {
        SupplierError::RateLimited { .. } | SupplierError::Http(_) => true,
        SupplierError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt   |
/// |---------|-----------------------------|
/// | 1       | 500 ms x 2^0 +/- 25 % jitter |
/// | 2       | 500 ms x 2^1 +/- 25 % jitter |
/// | 3       | 500 ms x 2^2 +/- 25 % jitter |
///
/// A 429 carrying `Retry-After` waits at least that long. Delays are capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SupplierError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SupplierError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let floor_ms = match &err {
                    SupplierError::RateLimited {
                        retry_after_secs, ..
                    } => retry_after_secs.saturating_mul(1000),
                    _ => 0,
                };
                let capped = computed.max(floor_ms).min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient supplier error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn server_error() -> SupplierError {
        SupplierError::UnexpectedStatus {
            status: 503,
            url: "https://api.example.com/".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, SupplierError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(server_error())
                } else {
                    Ok::<u32, SupplierError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, SupplierError>(server_error())
            }
        })
        .await;
        // max_retries=2 → 3 total attempts
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(SupplierError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, SupplierError>(SupplierError::UnexpectedStatus {
                    status: 403,
                    url: "https://api.example.com/".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }

    #[test]
    fn auth_and_parse_errors_are_not_retriable() {
        let e = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(!is_retriable(&SupplierError::Deserialize {
            context: "test".to_owned(),
            source: e,
        }));
        assert!(!is_retriable(&SupplierError::Auth {
            supplier: "nb".to_owned(),
            reason: "bad password".to_owned(),
        }));
        assert!(!is_retriable(&SupplierError::NotFound {
            url: "https://api.example.com/item/1".to_owned(),
        }));
        assert!(is_retriable(&SupplierError::RateLimited {
            supplier: "elit".to_owned(),
            retry_after_secs: 0,
        }));
    }
}
