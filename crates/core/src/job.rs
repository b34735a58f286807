// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job outcomes

use std::fmt;
use std::sync::Arc;

/// Error attached to a failed outcome; shared so results stay cloneable
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Outcome of one unit of work
#[derive(Clone, Debug)]
pub enum JobResult {
    Success {
        message: Option<String>,
    },
    Failed {
        message: String,
        cause: Option<SharedError>,
    },
    Cancelled,
}

impl JobResult {
    pub fn success() -> Self {
        Self::Success { message: None }
    }

    pub fn success_with(message: impl Into<String>) -> Self {
        Self::Success {
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            cause: None,
        }
    }

    pub fn failed_with<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failed {
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message } => message.as_deref(),
            Self::Failed { message, .. } => Some(message),
            Self::Cancelled => None,
        }
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { message: None } => write!(f, "success"),
            Self::Success {
                message: Some(message),
            } => write!(f, "success: {message}"),
            Self::Failed {
                message,
                cause: None,
            } => write!(f, "failed: {message}"),
            Self::Failed {
                message,
                cause: Some(cause),
            } => write!(f, "failed: {message} ({cause})"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
