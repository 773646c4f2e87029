//! Unified error types for tether.
//!
//! This module provides the error types shared by the core engine and the
//! controllers built on top of it. Configuration-file errors live in
//! tether-runtime.

use std::time::Duration;

use thiserror::Error;

// =============================================================================
// API Errors
// =============================================================================

/// Errors reported by the host chat SDK.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The target message no longer exists or is not visible.
    #[error("unknown message: {0}")]
    UnknownMessage(String),

    /// The target channel no longer exists or is not visible.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// The bot lacks a permission required for the call.
    #[error("missing permission: {0}")]
    MissingPermissions(String),

    /// The platform rate limited the call.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// How long the platform asked us to wait.
        retry_after: Duration,
    },

    /// The interaction token expired before it was acknowledged.
    #[error("interaction expired")]
    InteractionExpired,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Returns `true` when the target message or channel is gone.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::UnknownMessage(_) | Self::UnknownChannel(_))
    }

    /// Creates an [`ApiError::Other`].
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

// =============================================================================
// Scheduler Errors
// =============================================================================

/// Errors that can occur while scheduling expiry tasks.
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// No tokio runtime is available to host the scheduler worker.
    #[error("no tokio runtime available for the scheduler worker")]
    NoRuntime,
}

// =============================================================================
// Tether Errors
// =============================================================================

/// Errors raised when attaching or driving interactivity.
///
/// Configuration and state errors are returned synchronously, before any call
/// is made to the chat platform.
#[derive(Debug, Error)]
pub enum TetherError {
    /// A page could not be built from the given content.
    #[error("invalid page content: {0}")]
    InvalidPage(String),

    /// More controls were requested than the platform allows on one message.
    #[error("too many controls: {count} requested, at most {max} allowed")]
    TooManyControls {
        /// Number of controls requested.
        count: usize,
        /// Platform limit.
        max: usize,
    },

    /// Two options were combined in a way that has no meaning.
    #[error("conflicting options: {0}")]
    ConflictingOptions(String),

    /// A pressed control has no mapping and the policy asks for an error.
    #[error("no action mapped to control '{0}'")]
    MissingControl(String),

    /// No [`Tether`](crate::Tether) has been activated yet.
    #[error("interactivity is not activated")]
    NotActivated,

    /// A controller was given no pages.
    #[error("at least one page is required")]
    EmptyPages,

    /// The chat platform rejected a call.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The expiry scheduler could not accept a task.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl TetherError {
    /// Creates a conflicting-options error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConflictingOptions(msg.into())
    }

    /// Creates an invalid-page error.
    pub fn invalid_page(msg: impl Into<String>) -> Self {
        Self::InvalidPage(msg.into())
    }
}

/// A boxed error returned by registered callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for host SDK calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Result type for tether operations.
pub type TetherResult<T> = Result<T, TetherError>;
