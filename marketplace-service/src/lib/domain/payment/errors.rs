use thiserror::Error;

/// Error for PaymentId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentIdError {
    #[error("Payment ID is empty")]
    Empty,

    #[error("Payment ID too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for Amount validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount must be a positive integer, got {0}")]
    NotPositive(i64),
}

/// Error for PaymentReference validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Reference is empty")]
    Empty,

    #[error("Reference too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for payment status names
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("Unknown payment status: {0}")]
    Unknown(String),

    #[error("Status '{0}' is not terminal")]
    NotTerminal(String),
}

/// Top-level error for all payment-related operations
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    #[error("Invalid payment ID: {0}")]
    InvalidPaymentId(#[from] PaymentIdError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Invalid reference: {0}")]
    InvalidReference(#[from] ReferenceError),

    #[error("Invalid status: {0}")]
    InvalidStatus(#[from] StatusError),

    #[error("Amount {actual} is below the minimum of {minimum}")]
    AmountBelowMinimum { minimum: i64, actual: i64 },

    #[error("Amount {actual} does not cover the price of {price}")]
    AmountBelowPrice { price: i64, actual: i64 },

    #[error("Nothing to pay for: {0}")]
    PurposeNotFound(String),

    #[error("Payment not found: {0}")]
    NotFound(String),

    // Webhook rejections
    #[error("Webhook secret is not configured")]
    WebhookSecretMissing,

    #[error("Webhook signature is invalid")]
    SignatureInvalid,

    #[error("Malformed webhook: {0}")]
    MalformedWebhook(String),

    #[error("Unsupported provider status: {0}")]
    UnsupportedStatus(String),

    // Infrastructure errors
    #[error("Payment store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
