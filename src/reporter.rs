use async_trait::async_trait;

use crate::error::CacheError;

/// Where and for which key a reported failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Operation that failed, e.g. `"app_cache.get"`.
    pub context: &'static str,
    /// Cache key the operation was working on.
    pub key: String,
}

impl ErrorContext {
    pub fn new(context: &'static str, key: impl Into<String>) -> Self {
        ErrorContext {
            context,
            key: key.into(),
        }
    }
}

/// Receives foreground fetch failures before they are returned to the caller.
///
/// Background refresh failures are not reported here; they are only logged.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, error: &CacheError, context: &ErrorContext);
}

/// Reporter that logs through `tracing` and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

#[async_trait]
impl ErrorReporter for TracingReporter {
    async fn report(&self, error: &CacheError, context: &ErrorContext) {
        tracing::error!(context = context.context, key = %context.key, error = %error, "cache fetch failed");
    }
}
