//! Tri-state outcome of a data-layer operation.
//!
//! A [`Resource`] is either a value, a [`Failure`] carrying a diagnostic, or
//! [`Resource::Pending`] while the operation is still running. Failures are
//! plain data: [`Resource::map`] and [`combine`] forward them untouched, and
//! the only way back into `?`-style propagation is [`Resource::into_result`].

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::ErrorCode;

/// Opaque underlying error attached to a [`Failure`].
///
/// Shared so that a `Failure` stays `Clone` and can cross task boundaries.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Diagnostic payload of [`Resource::Failure`].
#[derive(Debug, Clone)]
pub struct Failure {
    message: String,
    cause: Option<Cause>,
    code: ErrorCode,
}

impl Failure {
    /// A failure with the given message, no cause and [`ErrorCode::Unknown`].
    ///
    /// The message is taken as-is; an empty string is accepted.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
            code: ErrorCode::Unknown,
        }
    }

    /// Wrap an error, using its `Display` output as the message.
    pub fn from_error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            cause: Some(Arc::new(err)),
            code: ErrorCode::Unknown,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    #[must_use]
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    #[must_use]
    pub fn with_shared_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Convert into the error returned by [`Resource::into_result`].
    #[must_use]
    pub fn into_error(self) -> ResourceError {
        ResourceError::Failed {
            message: self.message,
            code: self.code,
            cause: self.cause,
        }
    }
}

impl PartialEq for Failure {
    fn eq(&self, other: &Self) -> bool {
        let same_cause = match (&self.cause, &other.cause) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.message == other.message && self.code == other.code && same_cause
    }
}

impl Eq for Failure {}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Error produced when a non-success [`Resource`] is forced into a `Result`.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// The resource was a [`Failure`]; message, code and cause are preserved.
    #[error("{message}")]
    Failed {
        message: String,
        code: ErrorCode,
        #[source]
        cause: Option<Cause>,
    },
    /// The resource was still [`Resource::Pending`].
    #[error("operation has not completed yet")]
    NotCompleted,
}

impl ResourceError {
    /// Classification of the original failure, `None` for [`ResourceError::NotCompleted`].
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            ResourceError::Failed { code, .. } => Some(*code),
            ResourceError::NotCompleted => None,
        }
    }

    #[must_use]
    pub const fn is_not_completed(&self) -> bool {
        matches!(self, ResourceError::NotCompleted)
    }
}

impl From<Failure> for ResourceError {
    fn from(failure: Failure) -> Self {
        failure.into_error()
    }
}

/// Outcome of an operation: succeeded, failed, or not finished yet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a Resource may hold a Failure that should be handled"]
pub enum Resource<T> {
    Success(T),
    Failure(Failure),
    Pending,
}

impl<T> Resource<T> {
    pub const fn success(value: T) -> Self {
        Resource::Success(value)
    }

    /// Failure with [`ErrorCode::Unknown`] and no cause.
    pub fn error(message: impl Into<String>) -> Self {
        Resource::Failure(Failure::new(message))
    }

    pub fn error_with(message: impl Into<String>, cause: Option<Cause>, code: ErrorCode) -> Self {
        let failure = Failure::new(message).with_code(code);
        Resource::Failure(match cause {
            Some(cause) => failure.with_shared_cause(cause),
            None => failure,
        })
    }

    pub const fn pending() -> Self {
        Resource::Pending
    }

    /// Wrap a std `Result`, classifying any error as [`ErrorCode::Unknown`].
    pub fn from_result<E>(result: Result<T, E>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from_result_with_code(result, ErrorCode::Unknown)
    }

    pub fn from_result_with_code<E>(result: Result<T, E>, code: ErrorCode) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        match result {
            Ok(value) => Resource::Success(value),
            Err(err) => Resource::Failure(Failure::from_error(err).with_code(code)),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Resource::Failure(_))
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Resource::Pending)
    }

    /// The payload if successful, otherwise `None`.
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Resource::Success(value) => Some(value),
            Resource::Failure(_) | Resource::Pending => None,
        }
    }

    #[must_use]
    pub const fn value_ref(&self) -> Option<&T> {
        match self {
            Resource::Success(value) => Some(value),
            Resource::Failure(_) | Resource::Pending => None,
        }
    }

    pub fn value_or(self, fallback: T) -> T {
        match self {
            Resource::Success(value) => value,
            Resource::Failure(_) | Resource::Pending => fallback,
        }
    }

    pub fn value_or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Resource::Success(value) => value,
            Resource::Failure(_) | Resource::Pending => fallback(),
        }
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Resource::Failure(failure) => Some(failure),
            Resource::Success(_) | Resource::Pending => None,
        }
    }

    /// Leave the tri-state model for `?`-based propagation.
    ///
    /// This is the only conversion that turns a failure into an `Err`.
    /// A pending resource yields [`ResourceError::NotCompleted`], which is
    /// distinct from any converted [`Failure`].
    pub fn into_result(self) -> Result<T, ResourceError> {
        match self {
            Resource::Success(value) => Ok(value),
            Resource::Failure(failure) => Err(failure.into_error()),
            Resource::Pending => Err(ResourceError::NotCompleted),
        }
    }

    /// Transform the payload. Failure and Pending pass through and `transform`
    /// is not called.
    pub fn map<U>(self, transform: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Resource::Success(value) => Resource::Success(transform(value)),
            Resource::Failure(failure) => Resource::Failure(failure),
            Resource::Pending => Resource::Pending,
        }
    }

    /// Consume the resource by calling exactly one of the handlers.
    pub fn fold<R>(
        self,
        on_success: impl FnOnce(T) -> R,
        on_failure: impl FnOnce(Failure) -> R,
        on_pending: impl FnOnce() -> R,
    ) -> R {
        match self {
            Resource::Success(value) => on_success(value),
            Resource::Failure(failure) => on_failure(failure),
            Resource::Pending => on_pending(),
        }
    }

    pub fn on_success(self, action: impl FnOnce(&T)) -> Self {
        if let Resource::Success(value) = &self {
            action(value);
        }
        self
    }

    pub fn on_failure(self, action: impl FnOnce(&Failure)) -> Self {
        if let Resource::Failure(failure) = &self {
            action(failure);
        }
        self
    }

    /// Method form of [`combine`].
    pub fn zip_with<U, R>(
        self,
        other: Resource<U>,
        transform: impl FnOnce(T, U) -> R,
    ) -> Resource<R> {
        combine(self, other, transform)
    }
}

impl<T, E> From<Result<T, E>> for Resource<T>
where
    E: StdError + Send + Sync + 'static,
{
    fn from(result: Result<T, E>) -> Self {
        Resource::from_result(result)
    }
}

impl<T> From<Failure> for Resource<T> {
    fn from(failure: Failure) -> Self {
        Resource::Failure(failure)
    }
}

/// Merge two independent outcomes.
///
/// Precedence is Failure, then Pending, then Success. When both sides failed
/// the first one is returned.
pub fn combine<A, B, R>(
    first: Resource<A>,
    second: Resource<B>,
    transform: impl FnOnce(A, B) -> R,
) -> Resource<R> {
    match (first, second) {
        (Resource::Failure(failure), _) | (_, Resource::Failure(failure)) => {
            Resource::Failure(failure)
        }
        (Resource::Pending, _) | (_, Resource::Pending) => Resource::Pending,
        (Resource::Success(a), Resource::Success(b)) => Resource::Success(transform(a, b)),
    }
}
