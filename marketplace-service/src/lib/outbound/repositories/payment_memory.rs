use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::payment::models::PaymentId;
use crate::domain::payment::models::PaymentPurpose;
use crate::domain::payment::models::PaymentRequest;
use crate::domain::payment::models::PaymentStatus;
use crate::domain::payment::models::TerminalStatus;
use crate::domain::payment::models::TransitionOutcome;
use crate::domain::user::models::UserId;
use crate::payment::errors::PaymentError;
use crate::payment::ports::PaymentStore;

/// Process-local payment store.
///
/// Transitions run while holding the entry's shard lock, which makes the
/// check-then-write from `pending` atomic per payment. Contents are lost on
/// restart.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    payments: DashMap<PaymentId, PaymentRequest>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: PaymentRequest) -> Result<PaymentRequest, PaymentError> {
        match self.payments.entry(payment.id.clone()) {
            Entry::Occupied(_) => Err(PaymentError::DatabaseError(format!(
                "duplicate payment id {}",
                payment.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(payment.clone());
                Ok(payment)
            }
        }
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentRequest>, PaymentError> {
        Ok(self.payments.get(id).map(|entry| entry.value().clone()))
    }

    async fn transition_from_pending(
        &self,
        id: &PaymentId,
        target: TerminalStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<TransitionOutcome>, PaymentError> {
        let Some(mut entry) = self.payments.get_mut(id) else {
            return Ok(None);
        };

        let payment = entry.value_mut();
        if payment.status.is_terminal() {
            return Ok(Some(TransitionOutcome::AlreadyTerminal(payment.clone())));
        }

        payment.status = target.into();
        payment.updated_at = at;
        Ok(Some(TransitionOutcome::Applied(payment.clone())))
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<Vec<PaymentRequest>, PaymentError> {
        let mut expired = Vec::new();

        for mut entry in self.payments.iter_mut() {
            let payment = entry.value_mut();
            if payment.is_overdue(now) {
                payment.status = PaymentStatus::Expired;
                payment.updated_at = now;
                expired.push(payment.clone());
            }
        }

        Ok(expired)
    }

    async fn has_paid(
        &self,
        payer: UserId,
        purpose: PaymentPurpose,
        at_least: i64,
    ) -> Result<bool, PaymentError> {
        Ok(self.payments.iter().any(|entry| {
            let payment = entry.value();
            payment.status == PaymentStatus::Paid
                && payment.payer_id == Some(payer)
                && payment.purpose == Some(purpose)
                && payment.amount.value() >= at_least
        }))
    }

    async fn mark_event_published(
        &self,
        id: &PaymentId,
        at: DateTime<Utc>,
    ) -> Result<(), PaymentError> {
        let mut entry = self
            .payments
            .get_mut(id)
            .ok_or_else(|| PaymentError::NotFound(id.to_string()))?;

        let payment = entry.value_mut();
        if payment.event_published_at.is_none() {
            payment.event_published_at = Some(at);
        }
        Ok(())
    }

    async fn find_undelivered(&self, limit: i64) -> Result<Vec<PaymentRequest>, PaymentError> {
        let mut owed: Vec<PaymentRequest> = self
            .payments
            .iter()
            .filter(|entry| entry.value().owes_event())
            .map(|entry| entry.value().clone())
            .collect();

        owed.sort_by_key(|payment| payment.updated_at);
        owed.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(owed)
    }
}
