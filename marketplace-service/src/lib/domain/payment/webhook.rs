use hmac::Hmac;
use hmac::Mac;
use serde::Deserialize;
use sha2::Sha256;

use super::models::PaymentId;
use super::models::TerminalStatus;
use crate::payment::errors::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer/verifier for provider callbacks.
///
/// Signatures are lowercase hex over the raw request body.
#[derive(Clone)]
pub struct WebhookVerifier {
    mac: HmacSha256,
}

impl WebhookVerifier {
    /// # Errors
    /// * `WebhookSecretMissing` - Secret is empty
    pub fn new(secret: &[u8]) -> Result<Self, PaymentError> {
        if secret.is_empty() {
            return Err(PaymentError::WebhookSecretMissing);
        }
        let mac =
            HmacSha256::new_from_slice(secret).map_err(|_| PaymentError::WebhookSecretMissing)?;
        Ok(Self { mac })
    }

    /// Hex signature of `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of `signature` against `body`.
    ///
    /// # Errors
    /// * `SignatureInvalid` - Missing, non-hex or mismatching signature
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<(), PaymentError> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(PaymentError::SignatureInvalid)?;
        let expected = hex::decode(signature).map_err(|_| PaymentError::SignatureInvalid)?;

        let mut mac = self.mac.clone();
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| PaymentError::SignatureInvalid)
    }
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookVerifier(***)")
    }
}

/// Status carried by a provider notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    /// Provider still waiting; acknowledged without a transition.
    Pending,
    Terminal(TerminalStatus),
}

/// Parsed provider callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderNotification {
    pub payment_id: PaymentId,
    pub status: NotificationStatus,
}

#[derive(Debug, Deserialize)]
struct RawNotification {
    #[serde(rename = "paymentId")]
    payment_id: Option<String>,
    id: Option<String>,
    reference: Option<String>,
    status: Option<String>,
    #[serde(rename = "paymentStatus")]
    payment_status: Option<String>,
}

fn first_present(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// Parse a verified webhook body.
///
/// The payment id is read from `paymentId`, then `id`, then `reference`; the
/// status from `status`, then `paymentStatus`.
///
/// # Errors
/// * `MalformedWebhook` - Body is not a JSON object or lacks id/status
/// * `UnsupportedStatus` - Status word is not in the provider map
pub fn parse_notification(body: &[u8]) -> Result<ProviderNotification, PaymentError> {
    let raw: RawNotification = serde_json::from_slice(body)
        .map_err(|e| PaymentError::MalformedWebhook(e.to_string()))?;

    let id = first_present([raw.payment_id, raw.id, raw.reference])
        .ok_or_else(|| PaymentError::MalformedWebhook("missing payment id".to_string()))?;
    let payment_id = PaymentId::from_string(&id)?;

    let status_word = first_present([raw.status, raw.payment_status, None])
        .ok_or_else(|| PaymentError::MalformedWebhook("missing status".to_string()))?;

    let status = if status_word.trim().eq_ignore_ascii_case("pending") {
        NotificationStatus::Pending
    } else {
        TerminalStatus::from_provider(&status_word)
            .map(NotificationStatus::Terminal)
            .ok_or(PaymentError::UnsupportedStatus(status_word))?
    };

    Ok(ProviderNotification { payment_id, status })
}
