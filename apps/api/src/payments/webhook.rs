//! Stripe webhook signature verification and event decoding.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("malformed Stripe-Signature header")]
    MalformedHeader,

    #[error("signature timestamp outside tolerance")]
    Expired,

    #[error("no matching v1 signature")]
    NoMatch,
}

/// A Stripe event envelope. `data.object` stays untyped; handlers pick
/// the fields they need.
#[derive(Debug, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: Value,
}

/// Checks `Stripe-Signature: t=<unix>,v1=<hex>[,v1=<hex>...]` against
/// HMAC-SHA256(secret, "<t>.<payload>").
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }
    if now.abs_diff(timestamp) > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        return Err(WebhookError::Expired);
    }

    let matched = signatures.iter().any(|sig| {
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(sig).is_ok()
    });

    if matched {
        Ok(())
    } else {
        Err(WebhookError::NoMatch)
    }
}

#[cfg(test)]
pub(crate) fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_valid_signature() {
        let header = sign(PAYLOAD, SECRET, NOW);
        assert_eq!(verify_signature(PAYLOAD, &header, SECRET, NOW + 10), Ok(()));
    }

    #[test]
    fn test_any_v1_may_match() {
        let good = sign(PAYLOAD, SECRET, NOW);
        let v1 = good.split("v1=").nth(1).unwrap();
        let header = format!("t={NOW},v1={},v0=legacy,v1={v1}", "00".repeat(32));
        assert_eq!(verify_signature(PAYLOAD, &header, SECRET, NOW), Ok(()));
    }

    #[test]
    fn test_tampered_payload() {
        let header = sign(PAYLOAD, SECRET, NOW);
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, NOW),
            Err(WebhookError::NoMatch)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let header = sign(PAYLOAD, "whsec_other", NOW);
        assert_eq!(
            verify_signature(PAYLOAD, &header, SECRET, NOW),
            Err(WebhookError::NoMatch)
        );
    }

    #[test]
    fn test_stale_timestamp() {
        let header = sign(PAYLOAD, SECRET, NOW);
        assert_eq!(
            verify_signature(PAYLOAD, &header, SECRET, NOW + SIGNATURE_TOLERANCE_SECS + 1),
            Err(WebhookError::Expired)
        );
    }

    #[test]
    fn test_extreme_timestamps_are_expired() {
        for t in [i64::MIN, i64::MAX, -1] {
            let header = format!("t={t},v1=00");
            assert_eq!(
                verify_signature(PAYLOAD, &header, SECRET, NOW),
                Err(WebhookError::Expired),
                "{header}"
            );
        }
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["", "garbage", "t=abc,v1=00", "t=1700000000", "v1=00"] {
            assert_eq!(
                verify_signature(PAYLOAD, header, SECRET, NOW),
                Err(WebhookError::MalformedHeader),
                "{header}"
            );
        }
    }

    #[test]
    fn test_event_decodes() {
        let event: Event = serde_json::from_str(
            r#"{"id":"evt_1","type":"checkout.session.completed",
                "data":{"object":{"id":"cs_1","payment_status":"paid"}}}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.data.object["payment_status"], "paid");
    }
}
