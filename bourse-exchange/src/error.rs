//! Unified exchange error taxonomy.
//!
//! Every adapter classifies transport failures and exchange rejections
//! into these variants. Messages carry the adapter id as prefix followed
//! by the exchange's own text.

use bourse_domain::DomainError;
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Errors raised by exchange clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// A required argument was not supplied
    #[error("{0}")]
    ArgumentsRequired(String),

    /// Order parameters were rejected
    #[error("{0}")]
    InvalidOrder(String),

    /// Order does not exist
    #[error("{0}")]
    OrderNotFound(String),

    /// Balance too low for the requested action
    #[error("{0}")]
    InsufficientFunds(String),

    /// Rate limited or temporarily banned
    #[error("{0}")]
    DDoSProtection(String),

    /// Missing or rejected credentials
    #[error("{0}")]
    Authentication(String),

    /// Credentials lack the required permission
    #[error("{0}")]
    PermissionDenied(String),

    /// Malformed request
    #[error("{0}")]
    BadRequest(String),

    /// Unknown or invalid symbol
    #[error("{0}")]
    BadSymbol(String),

    /// Timestamp outside the accepted window
    #[error("{0}")]
    InvalidNonce(String),

    /// Exchange down or under maintenance
    #[error("{0}")]
    ExchangeNotAvailable(String),

    /// Operation not offered for this market type
    #[error("{0}")]
    NotSupported(String),

    /// Deposit address failed validation
    #[error("{0}")]
    InvalidAddress(String),

    /// Response could not be decoded
    #[error("{0}")]
    BadResponse(String),

    /// Connection-level failure
    #[error("{0}")]
    Network(String),

    /// Request did not complete in time
    #[error("{0}")]
    RequestTimeout(String),

    /// Any other exchange rejection
    #[error("{0}")]
    Exchange(String),
}

/// Error classification without the message.
///
/// Adapters keep their code tables in terms of kinds and build the error
/// with [`ErrorKind::into_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum ErrorKind {
    ArgumentsRequired,
    InvalidOrder,
    OrderNotFound,
    InsufficientFunds,
    DDoSProtection,
    Authentication,
    PermissionDenied,
    BadRequest,
    BadSymbol,
    InvalidNonce,
    ExchangeNotAvailable,
    NotSupported,
    InvalidAddress,
    BadResponse,
    Network,
    RequestTimeout,
    Exchange,
}

impl ErrorKind {
    /// Attach a message.
    pub fn into_error(self, message: impl Into<String>) -> ExchangeError {
        let message = message.into();
        match self {
            ErrorKind::ArgumentsRequired => ExchangeError::ArgumentsRequired(message),
            ErrorKind::InvalidOrder => ExchangeError::InvalidOrder(message),
            ErrorKind::OrderNotFound => ExchangeError::OrderNotFound(message),
            ErrorKind::InsufficientFunds => ExchangeError::InsufficientFunds(message),
            ErrorKind::DDoSProtection => ExchangeError::DDoSProtection(message),
            ErrorKind::Authentication => ExchangeError::Authentication(message),
            ErrorKind::PermissionDenied => ExchangeError::PermissionDenied(message),
            ErrorKind::BadRequest => ExchangeError::BadRequest(message),
            ErrorKind::BadSymbol => ExchangeError::BadSymbol(message),
            ErrorKind::InvalidNonce => ExchangeError::InvalidNonce(message),
            ErrorKind::ExchangeNotAvailable => ExchangeError::ExchangeNotAvailable(message),
            ErrorKind::NotSupported => ExchangeError::NotSupported(message),
            ErrorKind::InvalidAddress => ExchangeError::InvalidAddress(message),
            ErrorKind::BadResponse => ExchangeError::BadResponse(message),
            ErrorKind::Network => ExchangeError::Network(message),
            ErrorKind::RequestTimeout => ExchangeError::RequestTimeout(message),
            ErrorKind::Exchange => ExchangeError::Exchange(message),
        }
    }

    /// Classification of a bare HTTP error status.
    ///
    /// Used when an error response carries no body the adapter can read.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 | 407 | 511 => ErrorKind::Authentication,
            403 => ErrorKind::PermissionDenied,
            418 | 429 => ErrorKind::DDoSProtection,
            408 | 504 => ErrorKind::RequestTimeout,
            404 | 409 | 500 | 502 | 503 | 520..=530 => ErrorKind::ExchangeNotAvailable,
            _ => ErrorKind::Exchange,
        }
    }
}

impl ExchangeError {
    /// The classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExchangeError::ArgumentsRequired(_) => ErrorKind::ArgumentsRequired,
            ExchangeError::InvalidOrder(_) => ErrorKind::InvalidOrder,
            ExchangeError::OrderNotFound(_) => ErrorKind::OrderNotFound,
            ExchangeError::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            ExchangeError::DDoSProtection(_) => ErrorKind::DDoSProtection,
            ExchangeError::Authentication(_) => ErrorKind::Authentication,
            ExchangeError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ExchangeError::BadRequest(_) => ErrorKind::BadRequest,
            ExchangeError::BadSymbol(_) => ErrorKind::BadSymbol,
            ExchangeError::InvalidNonce(_) => ErrorKind::InvalidNonce,
            ExchangeError::ExchangeNotAvailable(_) => ErrorKind::ExchangeNotAvailable,
            ExchangeError::NotSupported(_) => ErrorKind::NotSupported,
            ExchangeError::InvalidAddress(_) => ErrorKind::InvalidAddress,
            ExchangeError::BadResponse(_) => ErrorKind::BadResponse,
            ExchangeError::Network(_) => ErrorKind::Network,
            ExchangeError::RequestTimeout(_) => ErrorKind::RequestTimeout,
            ExchangeError::Exchange(_) => ErrorKind::Exchange,
        }
    }

    /// Failures of the connection or a temporary exchange condition.
    ///
    /// The client never retries; callers decide whether to.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Network
                | ErrorKind::RequestTimeout
                | ErrorKind::DDoSProtection
                | ErrorKind::ExchangeNotAvailable
        )
    }
}

impl From<DomainError> for ExchangeError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidSymbol(_) => ExchangeError::BadSymbol(err.to_string()),
            DomainError::InvalidOrderSide(_) | DomainError::InvalidOrderType(_) => {
                ExchangeError::InvalidOrder(err.to_string())
            },
            DomainError::AmountOverflow(_) => ExchangeError::BadResponse(err.to_string()),
            _ => ExchangeError::BadRequest(err.to_string()),
        }
    }
}

/// Result type for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
