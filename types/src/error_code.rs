//! Failure classification codes.
//!
//! Every [`Failure`](crate::Failure) carries one of these. Producers pick the
//! most specific code that applies; [`ErrorCode::Unknown`] is the default.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    #[default]
    Unknown,
    ValidationFailed,
    InsufficientBalance,
    WorkerNotFound,
    ProjectNotFound,
    AdvanceNotFound,
    PaymentNotFound,
    UserNotFound,
    InvalidAmount,
    InvalidDateRange,
    OperationCancelled,
    StorageError,
    AlreadySettled,
    AlreadyPaid,
    AlreadyVoided,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::InsufficientBalance,
        ErrorCode::WorkerNotFound,
        ErrorCode::ProjectNotFound,
        ErrorCode::AdvanceNotFound,
        ErrorCode::PaymentNotFound,
        ErrorCode::UserNotFound,
        ErrorCode::InvalidAmount,
        ErrorCode::InvalidDateRange,
        ErrorCode::OperationCancelled,
        ErrorCode::StorageError,
        ErrorCode::AlreadySettled,
        ErrorCode::AlreadyPaid,
        ErrorCode::AlreadyVoided,
    ];

    /// Stable identifier, identical to the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Unknown => "unknown",
            ErrorCode::ValidationFailed => "validation_failed",
            ErrorCode::InsufficientBalance => "insufficient_balance",
            ErrorCode::WorkerNotFound => "worker_not_found",
            ErrorCode::ProjectNotFound => "project_not_found",
            ErrorCode::AdvanceNotFound => "advance_not_found",
            ErrorCode::PaymentNotFound => "payment_not_found",
            ErrorCode::UserNotFound => "user_not_found",
            ErrorCode::InvalidAmount => "invalid_amount",
            ErrorCode::InvalidDateRange => "invalid_date_range",
            ErrorCode::OperationCancelled => "operation_cancelled",
            ErrorCode::StorageError => "storage_error",
            ErrorCode::AlreadySettled => "already_settled",
            ErrorCode::AlreadyPaid => "already_paid",
            ErrorCode::AlreadyVoided => "already_voided",
        }
    }

    /// Parse a stable identifier back into a code.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_str() == s)
    }

    /// True for the "entity does not exist" family.
    #[must_use]
    pub const fn is_not_found(self) -> bool {
        matches!(
            self,
            ErrorCode::WorkerNotFound
                | ErrorCode::ProjectNotFound
                | ErrorCode::AdvanceNotFound
                | ErrorCode::PaymentNotFound
                | ErrorCode::UserNotFound
        )
    }

    /// True when the entity is already in a terminal state.
    #[must_use]
    pub const fn is_conflict(self) -> bool {
        matches!(
            self,
            ErrorCode::AlreadySettled | ErrorCode::AlreadyPaid | ErrorCode::AlreadyVoided
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
