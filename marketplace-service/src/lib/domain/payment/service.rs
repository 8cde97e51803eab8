use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::events::PaymentFailedEvent;
use super::events::PaymentSettledEvent;
use super::models::CreatePaymentCommand;
use super::models::PaymentId;
use super::models::PaymentReference;
use super::models::PaymentRequest;
use super::models::PaymentStatus;
use super::models::PurposeQuote;
use super::models::TerminalStatus;
use super::models::TransitionOutcome;
use super::models::WebhookAck;
use super::qris;
use super::qris::MerchantProfile;
use super::webhook;
use super::webhook::NotificationStatus;
use super::webhook::WebhookVerifier;
use crate::domain::clock::Clock;
use crate::payment::errors::PaymentError;
use crate::payment::errors::ReferenceError;
use crate::payment::ports::EventPublisher;
use crate::payment::ports::PaymentServicePort;
use crate::payment::ports::PaymentStore;
use crate::payment::ports::PurposeCatalog;

/// Upper bound on owed events retried per redelivery pass.
const REDELIVERY_BATCH: i64 = 100;

/// Tunables for payment creation.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub merchant: MerchantProfile,
    pub expiry: Duration,
    pub minimum_amount: i64,
}

/// QRIS payment lifecycle.
///
/// Every status change goes through [`PaymentStore::transition_from_pending`],
/// so a payment settles or fails at most once. The event that transition owes
/// stays marked as undelivered on the payment record until the broker accepts
/// it; replayed webhooks and [`PaymentServicePort::redeliver_events`] retry it.
pub struct PaymentService<PS, PC, EP, C>
where
    PS: PaymentStore,
    PC: PurposeCatalog,
    EP: EventPublisher,
    C: Clock,
{
    store: Arc<PS>,
    catalog: Arc<PC>,
    event_publisher: Arc<EP>,
    clock: Arc<C>,
    verifier: WebhookVerifier,
    settings: PaymentSettings,
}

impl<PS, PC, EP, C> PaymentService<PS, PC, EP, C>
where
    PS: PaymentStore,
    PC: PurposeCatalog,
    EP: EventPublisher,
    C: Clock,
{
    /// Create a new payment service.
    ///
    /// # Arguments
    /// * `store` - Payment storage
    /// * `catalog` - Prices of courses and projects being paid for
    /// * `event_publisher` - Settlement event sink
    /// * `clock` - Time source for creation and expiry
    /// * `verifier` - Webhook signature verifier
    /// * `settings` - Merchant profile, expiry window and minimum amount
    pub fn new(
        store: Arc<PS>,
        catalog: Arc<PC>,
        event_publisher: Arc<EP>,
        clock: Arc<C>,
        verifier: WebhookVerifier,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            event_publisher,
            clock,
            verifier,
            settings,
        }
    }

    async fn apply_transition(
        &self,
        id: &PaymentId,
        target: TerminalStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<TransitionOutcome>, PaymentError> {
        let outcome = self.store.transition_from_pending(id, target, at).await?;

        match &outcome {
            Some(TransitionOutcome::Applied(payment)) => {
                tracing::info!(
                    payment_id = %payment.id,
                    status = %payment.status,
                    "Payment transitioned"
                );
                self.deliver_event(payment).await;
            }
            Some(TransitionOutcome::AlreadyTerminal(payment)) if payment.owes_event() => {
                tracing::info!(
                    payment_id = %payment.id,
                    status = %payment.status,
                    "Retrying unconfirmed payment event"
                );
                self.deliver_event(payment).await;
            }
            _ => {}
        }

        Ok(outcome)
    }

    /// Publish the event owed by `payment` and record the delivery.
    ///
    /// Returns whether the broker accepted the event.
    async fn deliver_event(&self, payment: &PaymentRequest) -> bool {
        let published = match payment.status {
            PaymentStatus::Paid => {
                self.event_publisher
                    .publish_payment_settled(&PaymentSettledEvent::new(payment))
                    .await
            }
            PaymentStatus::Failed => {
                self.event_publisher
                    .publish_payment_failed(&PaymentFailedEvent::new(payment))
                    .await
            }
            PaymentStatus::Pending | PaymentStatus::Expired => return false,
        };

        if let Err(e) = published {
            tracing::error!(
                payment_id = %payment.id,
                status = %payment.status,
                error = %e,
                "Failed to publish payment event, left for redelivery"
            );
            return false;
        }

        if let Err(e) = self
            .store
            .mark_event_published(&payment.id, self.clock.now())
            .await
        {
            tracing::warn!(
                payment_id = %payment.id,
                error = %e,
                "Payment event published but not recorded, it may be sent again"
            );
        }

        true
    }

    async fn check_purpose(&self, command: &CreatePaymentCommand) -> Result<(), PaymentError> {
        let Some(purpose) = command.purpose else {
            return Ok(());
        };

        let quote = self.catalog.quote(purpose).await?.ok_or_else(|| {
            PaymentError::PurposeNotFound(format!("{} {}", purpose.kind(), purpose.target_id()))
        })?;

        match quote {
            PurposeQuote::Fixed(price) if command.amount.value() < price => {
                Err(PaymentError::AmountBelowPrice {
                    price,
                    actual: command.amount.value(),
                })
            }
            PurposeQuote::Fixed(_) | PurposeQuote::Open => Ok(()),
        }
    }
}

#[async_trait]
impl<PS, PC, EP, C> PaymentServicePort for PaymentService<PS, PC, EP, C>
where
    PS: PaymentStore,
    PC: PurposeCatalog,
    EP: EventPublisher,
    C: Clock,
{
    async fn create_payment_request(
        &self,
        command: CreatePaymentCommand,
    ) -> Result<PaymentRequest, PaymentError> {
        if command.amount.value() < self.settings.minimum_amount {
            return Err(PaymentError::AmountBelowMinimum {
                minimum: self.settings.minimum_amount,
                actual: command.amount.value(),
            });
        }

        let now = self.clock.now();
        let reference = match (&command.reference, &command.purpose) {
            (Some(reference), _) => reference.clone(),
            (None, Some(purpose)) => PaymentReference::for_purpose(purpose, now),
            (None, None) => return Err(ReferenceError::Empty.into()),
        };

        self.check_purpose(&command).await?;

        let payment = PaymentRequest {
            id: PaymentId::generate(now),
            qris_string: qris::build_payload(&self.settings.merchant, command.amount, &reference),
            amount: command.amount,
            reference,
            payer_id: command.payer_id,
            purpose: command.purpose,
            status: PaymentStatus::Pending,
            created_at: now,
            expires_at: now + self.settings.expiry,
            updated_at: now,
            event_published_at: None,
        };

        let created = self.store.insert(payment).await?;

        tracing::info!(
            payment_id = %created.id,
            amount = created.amount.value(),
            reference = %created.reference,
            "Payment request created"
        );

        Ok(created)
    }

    async fn get_status(&self, id: &PaymentId) -> Result<PaymentRequest, PaymentError> {
        let payment = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(PaymentError::NotFound(id.to_string()))?;

        let now = self.clock.now();
        if !payment.is_overdue(now) {
            return Ok(payment);
        }

        self.apply_transition(id, TerminalStatus::Expired, now)
            .await?
            .map(TransitionOutcome::into_payment)
            .ok_or(PaymentError::NotFound(id.to_string()))
    }

    async fn handle_webhook(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookAck, PaymentError> {
        if let Err(e) = self.verifier.verify(raw_body, signature) {
            tracing::warn!("Rejected payment webhook with invalid signature");
            return Err(e);
        }

        let notification = webhook::parse_notification(raw_body).map_err(|e| {
            tracing::warn!(error = %e, "Rejected malformed payment webhook");
            e
        })?;

        let target = match notification.status {
            NotificationStatus::Terminal(target) => target,
            NotificationStatus::Pending => {
                let current = self.store.find_by_id(&notification.payment_id).await?;
                return Ok(WebhookAck {
                    payment_id: notification.payment_id,
                    status: current.map(|p| p.status),
                    applied: false,
                });
            }
        };

        let now = self.clock.now();
        match self
            .apply_transition(&notification.payment_id, target, now)
            .await?
        {
            Some(outcome) => {
                if !outcome.is_applied() {
                    tracing::debug!(
                        payment_id = %notification.payment_id,
                        status = %outcome.payment().status,
                        "Webhook replay on terminal payment"
                    );
                }
                Ok(WebhookAck {
                    payment_id: notification.payment_id,
                    status: Some(outcome.payment().status),
                    applied: outcome.is_applied(),
                })
            }
            None => {
                tracing::warn!(
                    payment_id = %notification.payment_id,
                    "Webhook for unknown payment acknowledged"
                );
                Ok(WebhookAck {
                    payment_id: notification.payment_id,
                    status: None,
                    applied: false,
                })
            }
        }
    }

    async fn sweep_expired(&self) -> Result<usize, PaymentError> {
        let expired = self.store.expire_overdue(self.clock.now()).await?;

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Expired overdue payments");
        }

        Ok(expired.len())
    }

    async fn redeliver_events(&self) -> Result<usize, PaymentError> {
        let owed = self.store.find_undelivered(REDELIVERY_BATCH).await?;

        let mut delivered = 0;
        for payment in &owed {
            if self.deliver_event(payment).await {
                delivered += 1;
            }
        }

        if !owed.is_empty() {
            tracing::info!(owed = owed.len(), delivered, "Redelivered payment events");
        }

        Ok(delivered)
    }

    async fn simulate_provider_callback(
        &self,
        id: &PaymentId,
        status: TerminalStatus,
    ) -> Result<PaymentRequest, PaymentError> {
        tracing::info!(payment_id = %id, status = %status, "Simulating provider callback");

        self.apply_transition(id, status, self.clock.now())
            .await?
            .map(TransitionOutcome::into_payment)
            .ok_or(PaymentError::NotFound(id.to_string()))
    }
}
