//! Redacting logging façade.
//!
//! [`SafeLogger`] exposes the four severities of a [`LogSink`] and runs the
//! context payload through a [`Redactor`] before forwarding it. The message
//! string and the error are forwarded untouched. Each façade call produces
//! exactly one sink call, synchronously, on the calling thread.

use std::error::Error as StdError;
use std::sync::Arc;

use serde_json::Value;

use crate::redactor::Redactor;

/// Underlying log destination. Calls are fire-and-forget.
pub trait LogSink {
    fn info(&self, message: &str, context: Option<&Value>);

    fn warn(&self, message: &str, context: Option<&Value>);

    fn error(
        &self,
        message: &str,
        context: Option<&Value>,
        error: Option<&(dyn StdError + 'static)>,
    );

    fn debug(&self, message: &str, context: Option<&Value>);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn info(&self, message: &str, context: Option<&Value>) {
        (**self).info(message, context);
    }

    fn warn(&self, message: &str, context: Option<&Value>) {
        (**self).warn(message, context);
    }

    fn error(
        &self,
        message: &str,
        context: Option<&Value>,
        error: Option<&(dyn StdError + 'static)>,
    ) {
        (**self).error(message, context, error);
    }

    fn debug(&self, message: &str, context: Option<&Value>) {
        (**self).debug(message, context);
    }
}

/// Default sink: emits `tracing` events with the context as a JSON field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str, context: Option<&Value>) {
        match context {
            Some(context) => tracing::info!(context = %context, "{message}"),
            None => tracing::info!("{message}"),
        }
    }

    fn warn(&self, message: &str, context: Option<&Value>) {
        match context {
            Some(context) => tracing::warn!(context = %context, "{message}"),
            None => tracing::warn!("{message}"),
        }
    }

    fn error(
        &self,
        message: &str,
        context: Option<&Value>,
        error: Option<&(dyn StdError + 'static)>,
    ) {
        match (context, error) {
            (Some(context), Some(error)) => {
                tracing::error!(context = %context, error = %error, "{message}")
            }
            (Some(context), None) => tracing::error!(context = %context, "{message}"),
            (None, Some(error)) => tracing::error!(error = %error, "{message}"),
            (None, None) => tracing::error!("{message}"),
        }
    }

    fn debug(&self, message: &str, context: Option<&Value>) {
        match context {
            Some(context) => tracing::debug!(context = %context, "{message}"),
            None => tracing::debug!("{message}"),
        }
    }
}

/// Logging façade that redacts context payloads before they reach the sink.
///
/// Holds no mutable state; cloning or creating several instances is fine.
#[derive(Debug, Clone)]
pub struct SafeLogger<S = TracingSink> {
    sink: S,
    redactor: Redactor,
}

impl<S: LogSink> SafeLogger<S> {
    /// Wrap `sink` using the process-wide default policy.
    pub fn new(sink: S) -> Self {
        Self::with_redactor(sink, Redactor::default())
    }

    pub fn with_redactor(sink: S, redactor: Redactor) -> Self {
        Self { sink, redactor }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn info(&self, message: &str, context: Option<&Value>) {
        let context = self.sanitize(context);
        self.sink.info(message, context.as_ref());
    }

    pub fn warn(&self, message: &str, context: Option<&Value>) {
        let context = self.sanitize(context);
        self.sink.warn(message, context.as_ref());
    }

    pub fn error(
        &self,
        message: &str,
        context: Option<&Value>,
        error: Option<&(dyn StdError + 'static)>,
    ) {
        let context = self.sanitize(context);
        self.sink.error(message, context.as_ref(), error);
    }

    pub fn debug(&self, message: &str, context: Option<&Value>) {
        let context = self.sanitize(context);
        self.sink.debug(message, context.as_ref());
    }

    fn sanitize(&self, context: Option<&Value>) -> Option<Value> {
        context.map(|value| self.redactor.redact(value))
    }
}

/// Safe logger over the `tracing` sink with the default policy.
pub fn create_safe_logger() -> SafeLogger<TracingSink> {
    SafeLogger::new(TracingSink)
}
