use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::domain::payment::ports::PaymentServicePort;

/// Periodic payment upkeep until `cancel` fires.
///
/// Each tick expires overdue pending payments and retries events that
/// settled or failed payments still owe. Reads already expire lazily; the
/// sweep only keeps unread rows from lingering in `pending`.
pub fn spawn_payment_sweeper(
    payment_service: Arc<dyn PaymentServicePort>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = every.as_secs(), "Payment sweeper started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match payment_service.sweep_expired().await {
                        Ok(0) => {}
                        Ok(count) => tracing::debug!(count, "Sweep expired payments"),
                        Err(e) => tracing::error!(error = %e, "Payment expiry sweep failed"),
                    }
                    if let Err(e) = payment_service.redeliver_events().await {
                        tracing::error!(error = %e, "Payment event redelivery failed");
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }

        tracing::info!("Payment sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::payment::models::CreatePaymentCommand;
    use crate::domain::payment::models::PaymentId;
    use crate::domain::payment::models::PaymentRequest;
    use crate::domain::payment::models::TerminalStatus;
    use crate::domain::payment::models::WebhookAck;
    use crate::payment::errors::PaymentError;

    #[derive(Default)]
    struct CountingSweeps {
        sweeps: AtomicUsize,
        redeliveries: AtomicUsize,
    }

    #[async_trait]
    impl PaymentServicePort for CountingSweeps {
        async fn create_payment_request(
            &self,
            _command: CreatePaymentCommand,
        ) -> Result<PaymentRequest, PaymentError> {
            unimplemented!()
        }

        async fn get_status(&self, _id: &PaymentId) -> Result<PaymentRequest, PaymentError> {
            unimplemented!()
        }

        async fn handle_webhook(
            &self,
            _raw_body: &[u8],
            _signature: Option<&str>,
        ) -> Result<WebhookAck, PaymentError> {
            unimplemented!()
        }

        async fn sweep_expired(&self) -> Result<usize, PaymentError> {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn redeliver_events(&self) -> Result<usize, PaymentError> {
            self.redeliveries.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn simulate_provider_callback(
            &self,
            _id: &PaymentId,
            _status: TerminalStatus,
        ) -> Result<PaymentRequest, PaymentError> {
            unimplemented!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_ticks_until_cancelled() {
        let service = Arc::new(CountingSweeps::default());
        let cancel = CancellationToken::new();

        let handle = spawn_payment_sweeper(
            service.clone(),
            Duration::from_secs(60),
            cancel.clone(),
        );

        tokio::time::sleep(Duration::from_secs(150)).await;
        cancel.cancel();
        handle.await.unwrap();

        // Ticks at 0s, 60s and 120s.
        assert_eq!(service.sweeps.load(Ordering::SeqCst), 3);
        assert_eq!(service.redeliveries.load(Ordering::SeqCst), 3);
    }
}
