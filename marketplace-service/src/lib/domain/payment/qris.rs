use super::models::Amount;
use super::models::PaymentReference;

/// Merchant identity embedded in every payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantProfile {
    pub merchant_id: String,
    pub merchant_name: String,
}

/// Build the scannable QRIS payload string.
///
/// Development stand-in for a provider-issued payload: fixed EMV tags around
/// the merchant id, zero-padded amount and the first six characters of the
/// reference. No CRC is computed.
pub fn build_payload(
    merchant: &MerchantProfile,
    amount: Amount,
    reference: &PaymentReference,
) -> String {
    let reference_prefix: String = reference.as_str().chars().take(6).collect();

    let mut payload = String::with_capacity(128);
    payload.push_str("000201");
    payload.push_str("010211");
    payload.push_str("0216");
    payload.push_str(&merchant.merchant_id);
    payload.push_str("0304");
    payload.push_str(&format!("{:0>4}", amount.value()));
    payload.push_str("0406");
    payload.push_str(&reference_prefix);
    payload.push_str("52040000");
    payload.push_str("5303360");
    payload.push_str("5802ID");
    payload.push_str("5919");
    payload.push_str(&merchant.merchant_name);
    payload.push_str("6017Jakarta");
    payload.push_str("610512345");
    payload.push_str("6304");
    payload
}
