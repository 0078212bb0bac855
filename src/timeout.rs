//! Timeout Helpers
//!
//! Wraps async operations that have no built-in request timeout (child
//! processes, multi-request scans) so they fail with a
//! [`SchemaGenError::Timeout`] instead of hanging.

use std::future::Future;
use std::time::Duration;

use crate::types::{Result, SchemaGenError};

/// Execute an async operation with a timeout
///
/// ```ignore
/// let status = with_timeout(
///     Duration::from_secs(60),
///     async { run_dot(&source).await },
///     "graphviz render",
/// ).await?;
/// ```
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(SchemaGenError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, SchemaGenError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, SchemaGenError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result, Err(SchemaGenError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: Result<()> = with_timeout(
            Duration::from_secs(1),
            async { Err(SchemaGenError::Render("boom".to_string())) },
            "failing operation",
        )
        .await;
        assert!(matches!(result, Err(SchemaGenError::Render(_))));
    }
}
