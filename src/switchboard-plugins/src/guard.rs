//! Deadline and panic isolation around plugin calls.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::{PluginError, Result};

/// The plugin entry point being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginOperation {
    Activate,
    Deactivate,
    Execute,
}

impl fmt::Display for PluginOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activate => write!(f, "activate"),
            Self::Deactivate => write!(f, "deactivate"),
            Self::Execute => write!(f, "execute"),
        }
    }
}

/// Run a plugin future with an optional deadline, converting panics and
/// timeouts into [`PluginError`]s.
///
/// `timeout` of `None` waits indefinitely.
pub async fn guarded<T, F>(
    plugin_id: &str,
    operation: PluginOperation,
    timeout: Option<Duration>,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let future = AssertUnwindSafe(future).catch_unwind();

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, future).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    plugin = plugin_id,
                    %operation,
                    "Plugin call exceeded deadline of {}ms",
                    limit.as_millis()
                );
                return Err(PluginError::Timeout {
                    plugin: plugin_id.to_string(),
                    operation,
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                });
            }
        },
        None => future.await,
    };

    outcome.unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(plugin = plugin_id, %operation, "Plugin panicked: {}", message);
        Err(PluginError::Panicked {
            plugin: plugin_id.to_string(),
            operation,
            message,
        })
    })
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_success() {
        let value = guarded("p", PluginOperation::Execute, None, async { Ok(7) }).await;
        assert_eq!(value.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_passes_through_error() {
        let result: Result<()> = guarded("p", PluginOperation::Execute, None, async {
            Err(PluginError::execution_error("p", "boom"))
        })
        .await;
        assert!(matches!(result, Err(PluginError::ExecutionError { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let result: Result<()> = guarded(
            "slow",
            PluginOperation::Activate,
            Some(Duration::from_millis(20)),
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            },
        )
        .await;

        match result {
            Err(PluginError::Timeout {
                plugin,
                operation,
                timeout_ms,
            }) => {
                assert_eq!(plugin, "slow");
                assert_eq!(operation, PluginOperation::Activate);
                assert_eq!(timeout_ms, 20);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    fn explode() -> Result<()> {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let result = guarded("bad", PluginOperation::Execute, None, async { explode() }).await;

        match result {
            Err(PluginError::Panicked { message, .. }) => assert_eq!(message, "kaboom"),
            other => panic!("expected panic error, got {other:?}"),
        }
    }

    #[test]
    fn test_panic_message_formats() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
