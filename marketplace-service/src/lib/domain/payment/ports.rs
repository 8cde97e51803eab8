use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::events::PaymentFailedEvent;
use super::events::PaymentSettledEvent;
use super::models::CreatePaymentCommand;
use super::models::PaymentId;
use super::models::PaymentPurpose;
use super::models::PaymentRequest;
use super::models::PurposeQuote;
use super::models::TerminalStatus;
use super::models::TransitionOutcome;
use super::models::WebhookAck;
use crate::domain::errors::EventPublisherError;
use crate::domain::user::models::UserId;
use crate::payment::errors::PaymentError;

/// Port for the QRIS payment lifecycle.
#[async_trait]
pub trait PaymentServicePort: Send + Sync + 'static {
    /// Create a pending payment request valid for the configured window.
    ///
    /// Without an explicit reference one is derived from the purpose and the
    /// service clock.
    ///
    /// # Errors
    /// * `AmountBelowMinimum` - Amount under the configured minimum
    /// * `PurposeNotFound` - The course or project cannot be paid for
    /// * `AmountBelowPrice` - Amount under the course price
    /// * `InvalidReference` - Neither a reference nor a purpose was given
    /// * `Unavailable` / `DatabaseError` - Store failure
    async fn create_payment_request(
        &self,
        command: CreatePaymentCommand,
    ) -> Result<PaymentRequest, PaymentError>;

    /// Current state of a payment, expiring it first when overdue.
    ///
    /// # Errors
    /// * `NotFound` - Unknown payment id
    async fn get_status(&self, id: &PaymentId) -> Result<PaymentRequest, PaymentError>;

    /// Verify, parse and apply a provider callback.
    ///
    /// # Arguments
    /// * `raw_body` - Request body exactly as received
    /// * `signature` - Hex HMAC from the `X-Signature` header
    ///
    /// # Errors
    /// * `SignatureInvalid` - Signature missing or wrong; nothing is parsed
    /// * `MalformedWebhook` / `UnsupportedStatus` - Body rejected
    /// * `Unavailable` / `DatabaseError` - Store failure
    async fn handle_webhook(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookAck, PaymentError>;

    /// Expire every overdue pending payment. Returns how many moved.
    async fn sweep_expired(&self) -> Result<usize, PaymentError>;

    /// Retry events owed by settled or failed payments whose publication
    /// was never confirmed. Returns how many were delivered.
    async fn redeliver_events(&self) -> Result<usize, PaymentError>;

    /// Drive a payment as if the provider had called back.
    ///
    /// # Errors
    /// * `NotFound` - Unknown payment id
    async fn simulate_provider_callback(
        &self,
        id: &PaymentId,
        status: TerminalStatus,
    ) -> Result<PaymentRequest, PaymentError>;
}

/// Storage for payment requests.
///
/// Every status write is a single atomic compare-and-set from `pending`.
#[async_trait]
pub trait PaymentStore: Send + Sync + 'static {
    /// Store a new pending payment.
    async fn insert(&self, payment: PaymentRequest) -> Result<PaymentRequest, PaymentError>;

    /// Retrieve payment by identifier.
    ///
    /// # Returns
    /// Optional payment (None if not found)
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentRequest>, PaymentError>;

    /// Move a payment from `pending` to `target`.
    ///
    /// # Returns
    /// * `None` - Unknown payment id
    /// * `Applied` - This call performed the transition
    /// * `AlreadyTerminal` - Another transition won earlier; record unchanged
    async fn transition_from_pending(
        &self,
        id: &PaymentId,
        target: TerminalStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<TransitionOutcome>, PaymentError>;

    /// Expire every pending payment whose `expires_at <= now`.
    ///
    /// # Returns
    /// Payments this call expired
    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<Vec<PaymentRequest>, PaymentError>;

    /// Whether `payer` has a `paid` payment for `purpose` of at least
    /// `at_least`.
    async fn has_paid(
        &self,
        payer: UserId,
        purpose: PaymentPurpose,
        at_least: i64,
    ) -> Result<bool, PaymentError>;

    /// Record that the event owed by a terminal payment reached the broker.
    async fn mark_event_published(
        &self,
        id: &PaymentId,
        at: DateTime<Utc>,
    ) -> Result<(), PaymentError>;

    /// Paid or failed payments whose event is not yet recorded as published,
    /// oldest first.
    async fn find_undelivered(&self, limit: i64) -> Result<Vec<PaymentRequest>, PaymentError>;
}

/// Looks up what a payment purpose costs.
#[async_trait]
pub trait PurposeCatalog: Send + Sync + 'static {
    /// # Returns
    /// * `None` - No payable course or project behind `purpose`
    async fn quote(&self, purpose: PaymentPurpose) -> Result<Option<PurposeQuote>, PaymentError>;
}

/// Port for publishing payment events to the event bus.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    async fn publish_payment_settled(
        &self,
        event: &PaymentSettledEvent,
    ) -> Result<(), EventPublisherError>;

    async fn publish_payment_failed(
        &self,
        event: &PaymentFailedEvent,
    ) -> Result<(), EventPublisherError>;
}
