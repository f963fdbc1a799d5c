//! EVM contract helpers.
pub mod bytecode;
pub mod classify;
pub mod introspection;

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Outcome of a bounded best-effort call.
#[derive(Debug, PartialEq)]
pub enum CallOutcome<T> {
    Ok(T),
    TimedOut,
    Failed(String),
}

impl<T> CallOutcome<T> {
    /// Value of a successful call, logging failures under `label`.
    pub fn or_log(self, label: &str) -> Option<T> {
        match self {
            CallOutcome::Ok(value) => Some(value),
            CallOutcome::TimedOut => {
                tracing::warn!("{label} timed out");
                None
            }
            CallOutcome::Failed(reason) => {
                tracing::warn!("{label} failed: {reason}");
                None
            }
        }
    }
}

/// Runs `op`, giving up after `timeout`.
pub async fn try_call<T, E, F>(op: F, timeout: Duration) -> CallOutcome<T>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, op).await {
        Ok(Ok(value)) => CallOutcome::Ok(value),
        Ok(Err(err)) => CallOutcome::Failed(err.to_string()),
        Err(_) => CallOutcome::TimedOut,
    }
}
