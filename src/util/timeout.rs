//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::{GatekitError, Result};

/// Wrap a future with a timeout. Errors from the inner future pass through
/// untouched; only elapsed time maps to `RequestTimeout`.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(GatekitError::RequestTimeout(duration.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_bound() {
        let out = with_timeout(Duration::from_millis(200), async { Ok(23) }).await;
        assert_eq!(out.unwrap(), 23);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_bound_maps_to_request_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        };
        let out = with_timeout(Duration::from_millis(100), slow).await;
        assert!(matches!(out, Err(GatekitError::RequestTimeout(100))));
    }

    #[tokio::test]
    async fn inner_error_passes_through() {
        let failing = async { Err::<(), _>(GatekitError::RequestFailed("boom".into())) };
        let out = with_timeout(Duration::from_secs(1), failing).await;
        assert!(matches!(out, Err(GatekitError::RequestFailed(_))));
    }
}
