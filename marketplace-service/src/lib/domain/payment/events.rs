use chrono::DateTime;
use chrono::Utc;

use super::models::PaymentId;
use super::models::PaymentPurpose;
use super::models::PaymentRequest;
use crate::domain::user::models::UserId;

/// Owed once a payment wins the `pending -> paid` transition.
///
/// Delivery is at-least-once; `event_id` is the payment id, so consumers can
/// drop redeliveries.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSettledEvent {
    pub event_id: String,
    pub payment_id: PaymentId,
    pub amount: i64,
    pub reference: String,
    pub payer_id: Option<UserId>,
    pub purpose: Option<PaymentPurpose>,
    pub settled_at: DateTime<Utc>,
}

impl PaymentSettledEvent {
    pub fn new(payment: &PaymentRequest) -> Self {
        Self {
            event_id: payment.id.to_string(),
            payment_id: payment.id.clone(),
            amount: payment.amount.value(),
            reference: payment.reference.as_str().to_string(),
            payer_id: payment.payer_id,
            purpose: payment.purpose,
            settled_at: payment.updated_at,
        }
    }
}

/// Owed once a payment wins the `pending -> failed` transition.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFailedEvent {
    pub event_id: String,
    pub payment_id: PaymentId,
    pub reference: String,
    pub payer_id: Option<UserId>,
    pub failed_at: DateTime<Utc>,
}

impl PaymentFailedEvent {
    pub fn new(payment: &PaymentRequest) -> Self {
        Self {
            event_id: payment.id.to_string(),
            payment_id: payment.id.clone(),
            reference: payment.reference.as_str().to_string(),
            payer_id: payment.payer_id,
            failed_at: payment.updated_at,
        }
    }
}
