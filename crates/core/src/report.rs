//! Error reporting collaborator
//!
//! Generators, validators and services never surface failures by panicking or
//! by propagating store errors to the UI layer. They hand them to an
//! [`ErrorReporter`], which turns them into a user-facing message.

use crate::error::{DashError, StoreErrorKind};
use std::sync::Mutex;

// ============================================================================
// ErrorContext
// ============================================================================

/// Where an error happened and what to show when nothing better is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Short description of the operation, e.g. "fetching table definition for orders"
    pub context: String,

    /// Message shown when the error carries no message of its own
    pub fallback_message: String,
}

impl ErrorContext {
    /// Create a new context
    pub fn new(context: impl Into<String>, fallback_message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            fallback_message: fallback_message.into(),
        }
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("operation", "An unexpected error occurred")
    }
}

// ============================================================================
// UserMessage
// ============================================================================

/// A classified, user-facing error notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub title: String,
    pub description: String,
}

/// Classify an error into the message a user should see
pub fn classify(error: &DashError, ctx: &ErrorContext) -> UserMessage {
    match error.store_kind() {
        Some(StoreErrorKind::PermissionDenied) => UserMessage {
            title: "Access Denied".to_string(),
            description: format!(
                "You don't have permission to perform this {}. Please contact your administrator.",
                ctx.context
            ),
        },
        Some(StoreErrorKind::NotFound) => UserMessage {
            title: "Database Error".to_string(),
            description: "The requested resource could not be found. Please contact support."
                .to_string(),
        },
        Some(StoreErrorKind::Connection) => UserMessage {
            title: "Connection Error".to_string(),
            description: "Unable to connect to the database. Please try again later.".to_string(),
        },
        Some(StoreErrorKind::Other) => {
            let message = error.to_string();
            UserMessage {
                title: format!("Error During {}", ctx.context),
                description: if message.trim().is_empty() {
                    ctx.fallback_message.clone()
                } else {
                    message
                },
            }
        }
        // Errors raised outside the store are internal details
        None => UserMessage {
            title: format!("Error During {}", ctx.context),
            description: ctx.fallback_message.clone(),
        },
    }
}

// ============================================================================
// ErrorReporter
// ============================================================================

/// Sink for failures that must not reach the caller as errors.
///
/// Implementations must not panic.
pub trait ErrorReporter: Send + Sync {
    /// Report one failure
    fn report(&self, error: &DashError, ctx: &ErrorContext);
}

/// Reporter that logs classified messages through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &DashError, ctx: &ErrorContext) {
        let message = classify(error, ctx);
        tracing::error!(
            context = %ctx.context,
            code = error.code().unwrap_or("-"),
            "{}: {} ({})",
            message.title,
            message.description,
            error
        );
    }
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _error: &DashError, _ctx: &ErrorContext) {}
}

/// One captured report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Rendered error
    pub error: String,
    pub context: ErrorContext,
    pub message: UserMessage,
}

/// Reporter that keeps every report in memory
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<Report>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn reports(&self) -> Vec<Report> {
        match self.reports.lock() {
            Ok(reports) => reports.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.reports().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, error: &DashError, ctx: &ErrorContext) {
        let report = Report {
            error: error.to_string(),
            context: ctx.clone(),
            message: classify(error, ctx),
        };
        match self.reports.lock() {
            Ok(mut reports) => reports.push(report),
            Err(poisoned) => poisoned.into_inner().push(report),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> ErrorContext {
        ErrorContext::new("loading orders", "Failed to load orders.")
    }

    #[test]
    fn test_classify_permission_denied() {
        let msg = classify(&DashError::store("PGRST116", "no rows"), &ctx());
        assert_eq!(msg.title, "Access Denied");
        assert!(msg.description.contains("loading orders"));
    }

    #[test]
    fn test_classify_not_found_and_connection() {
        let msg = classify(&DashError::TableNotFound("orders".into()), &ctx());
        assert_eq!(msg.title, "Database Error");

        let msg = classify(&DashError::Connection("refused".into()), &ctx());
        assert_eq!(msg.title, "Connection Error");
    }

    #[test]
    fn test_classify_other_store_error_uses_message() {
        let msg = classify(&DashError::store("23505", "duplicate key value"), &ctx());
        assert_eq!(
            msg,
            UserMessage {
                title: "Error During loading orders".to_string(),
                description: "duplicate key value".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_empty_store_message_falls_back() {
        let err = DashError::Store {
            code: None,
            message: String::new(),
        };
        assert_eq!(classify(&err, &ctx()).description, "Failed to load orders.");
    }

    #[test]
    fn test_classify_non_store_error_uses_fallback() {
        let msg = classify(&DashError::EmptyColumns("orders".into()), &ctx());
        assert_eq!(msg.description, "Failed to load orders.");
    }

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingReporter::new();
        assert!(reporter.is_empty());

        reporter.report(&DashError::Connection("refused".into()), &ctx());
        reporter.report(&DashError::internal("boom"), &ErrorContext::default());

        let reports = reporter.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].message.title, "Connection Error");
        assert_eq!(reports[1].context.context, "operation");
        assert_eq!(reports[1].error, "Internal error: boom");
    }

    #[test]
    fn test_tracing_reporter_does_not_panic() {
        TracingReporter.report(&DashError::store("42P01", "missing"), &ctx());
        NoopReporter.report(&DashError::internal("ignored"), &ctx());
    }
}
