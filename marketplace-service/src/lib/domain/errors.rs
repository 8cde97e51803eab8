use thiserror::Error;

/// Failure to hand a payment event to the broker. Logged by the payment
/// service; never returned to webhook callers.
#[derive(Debug, Clone, Error)]
pub enum EventPublisherError {
    #[error("Payment event could not be encoded: {0}")]
    SerializationFailed(String),

    #[error("Payment event was not accepted by the broker: {0}")]
    PublishFailed(String),
}
