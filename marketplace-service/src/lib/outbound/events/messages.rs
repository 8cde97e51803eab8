use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::payment::events::PaymentFailedEvent;
use crate::domain::payment::events::PaymentSettledEvent;
use crate::domain::payment::models::PaymentPurpose;

/// Serializable envelope for all payment events.
///
/// Infrastructure representation for event publishing (Kafka, etc.).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PaymentEventMessage {
    PaymentSettled(PaymentSettledMessage),
    PaymentFailed(PaymentFailedMessage),
}

/// What a payment was for, as carried on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurposeMessage {
    pub kind: String,
    pub id: i32,
}

impl From<PaymentPurpose> for PurposeMessage {
    fn from(purpose: PaymentPurpose) -> Self {
        Self {
            kind: purpose.kind().to_string(),
            id: purpose.target_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSettledMessage {
    pub event_id: String,
    pub payment_id: String,
    pub amount: i64,
    pub reference: String,
    pub payer_id: Option<i32>,
    pub purpose: Option<PurposeMessage>,
    pub settled_at: DateTime<Utc>,
}

impl From<&PaymentSettledEvent> for PaymentSettledMessage {
    fn from(event: &PaymentSettledEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            payment_id: event.payment_id.to_string(),
            amount: event.amount,
            reference: event.reference.clone(),
            payer_id: event.payer_id.map(|id| id.as_i32()),
            purpose: event.purpose.map(PurposeMessage::from),
            settled_at: event.settled_at,
        }
    }
}

impl From<&PaymentSettledEvent> for PaymentEventMessage {
    fn from(event: &PaymentSettledEvent) -> Self {
        PaymentEventMessage::PaymentSettled(PaymentSettledMessage::from(event))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentFailedMessage {
    pub event_id: String,
    pub payment_id: String,
    pub reference: String,
    pub payer_id: Option<i32>,
    pub failed_at: DateTime<Utc>,
}

impl From<&PaymentFailedEvent> for PaymentFailedMessage {
    fn from(event: &PaymentFailedEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            payment_id: event.payment_id.to_string(),
            reference: event.reference.clone(),
            payer_id: event.payer_id.map(|id| id.as_i32()),
            failed_at: event.failed_at,
        }
    }
}

impl From<&PaymentFailedEvent> for PaymentEventMessage {
    fn from(event: &PaymentFailedEvent) -> Self {
        PaymentEventMessage::PaymentFailed(PaymentFailedMessage::from(event))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::course::models::CourseId;
    use crate::domain::payment::models::PaymentId;
    use crate::domain::user::models::UserId;

    #[test]
    fn test_settled_message_is_tagged() {
        let event = PaymentSettledEvent {
            event_id: "evt-1".to_string(),
            payment_id: PaymentId::from_string("qris_1_abc").unwrap(),
            amount: 50000,
            reference: "COURSE_3_1".to_string(),
            payer_id: Some(UserId(5)),
            purpose: Some(PaymentPurpose::Course(CourseId(3))),
            settled_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(PaymentEventMessage::from(&event)).unwrap();

        assert_eq!(json["event_type"], "payment_settled");
        assert_eq!(json["payment_id"], "qris_1_abc");
        assert_eq!(json["purpose"]["kind"], "course");
        assert_eq!(json["purpose"]["id"], 3);
        assert_eq!(json["payer_id"], 5);
    }
}
