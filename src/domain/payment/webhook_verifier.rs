//! Stripe webhook signature verification.
//!
//! Stripe signs `"{t}.{payload}"` with HMAC-SHA256 using the endpoint secret
//! and sends `Stripe-Signature: t=<unix>,v1=<hex>[,v1=<hex>...]`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Maximum allowed age for webhook events (5 minutes).
pub const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("Webhook signature does not match")]
    InvalidSignature,

    #[error("Webhook timestamp is outside the tolerance window")]
    TimestampOutOfRange,

    #[error("Webhook timestamp is in the future")]
    InvalidTimestamp,

    #[error("Malformed webhook: {0}")]
    ParseError(String),
}

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// All `v1` signatures; Stripe sends several while a secret is rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses `t=<timestamp>,v1=<signature>[,...]`. Unknown keys (such as
    /// the legacy `v0`) are ignored.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("missing v1 signature".to_string()));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier for Stripe webhook signatures.
#[derive(Clone)]
pub struct StripeWebhookVerifier {
    secret: Vec<u8>,
}

impl StripeWebhookVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Verifies `signature_header` against `payload` at the current time.
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), WebhookError> {
        self.verify_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    /// Verifies against an explicit clock, in Unix seconds.
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        let age = now
            .checked_sub(header.timestamp)
            .ok_or(WebhookError::TimestampOutOfRange)?;
        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        let expected = self.compute_signature(header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if matched {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }

    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Builds a valid `Stripe-Signature` header for `payload`; used by the
    /// mock provider and by tests that post signed webhooks.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> String {
        match self.compute_signature(timestamp, payload) {
            Ok(signature) => format!("t={},v1={}", timestamp, hex::encode(signature)),
            Err(_) => format!("t={}", timestamp),
        }
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";
    const NOW: i64 = 1_700_000_000;

    fn verifier() -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(TEST_SECRET)
    }

    #[test]
    fn parse_header_collects_every_v1() {
        let header = format!("t=1234567890,v1={},v1={},v0={}", "a".repeat(64), "b".repeat(64), "c".repeat(64));
        let parsed = SignatureHeader::parse(&header).unwrap();
        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.v1_signatures.len(), 2);
    }

    #[test]
    fn parse_header_missing_parts_fails() {
        assert!(matches!(
            SignatureHeader::parse(&format!("v1={}", "a".repeat(64))),
            Err(WebhookError::ParseError(_))
        ));
        assert!(matches!(
            SignatureHeader::parse("t=1234567890"),
            Err(WebhookError::ParseError(_))
        ));
        assert!(matches!(
            SignatureHeader::parse("garbage"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn accepts_its_own_signature() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = verifier().sign(payload, NOW);
        assert_eq!(verifier().verify_at(payload, &header, NOW + 10), Ok(()));
    }

    #[test]
    fn rejects_tampered_payload() {
        let header = verifier().sign(br#"{"amount":100}"#, NOW);
        assert_eq!(
            verifier().verify_at(br#"{"amount":999}"#, &header, NOW),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn rejects_other_secret() {
        let payload = b"{}";
        let header = StripeWebhookVerifier::new("whsec_other").sign(payload, NOW);
        assert_eq!(
            verifier().verify_at(payload, &header, NOW),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        let signature = "a".repeat(64);
        assert_eq!(
            verifier().verify_at(b"{}", &format!("t={},v1={}", i64::MIN, signature), NOW),
            Err(WebhookError::TimestampOutOfRange)
        );
        assert_eq!(
            verifier().verify_at(b"{}", &format!("t={},v1={}", i64::MAX, signature), NOW),
            Err(WebhookError::InvalidTimestamp)
        );
    }

    #[test]
    fn rejects_stale_and_future_events() {
        let payload = b"{}";
        let header = verifier().sign(payload, NOW);
        assert_eq!(
            verifier().verify_at(payload, &header, NOW + MAX_EVENT_AGE_SECS + 1),
            Err(WebhookError::TimestampOutOfRange)
        );
        assert_eq!(
            verifier().verify_at(payload, &header, NOW - MAX_CLOCK_SKEW_SECS - 1),
            Err(WebhookError::InvalidTimestamp)
        );
        assert_eq!(
            verifier().verify_at(payload, &header, NOW + MAX_EVENT_AGE_SECS),
            Ok(())
        );
    }
}
