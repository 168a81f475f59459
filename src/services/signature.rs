// src/services/signature.rs

//! Webhook signature verification (HMAC-SHA256).
//!
//! The provider signs `"{timestamp}." + raw_payload` with the shared webhook
//! secret and sends `t=<unix_ts>,v1=<hex_mac>` in the signature header. The
//! raw request bytes must be what is verified here; re-serialized JSON will
//! not match byte-for-byte.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Reject events whose timestamp is further than this from now, to prevent
/// replay of captured notifications.
const REPLAY_WINDOW_SECS: i64 = 300;

pub fn verify_signature(payload: &[u8], sig_header: &str, secret: &str) -> Result<()> {
  let mut timestamp = "";
  let mut signature = "";
  for part in sig_header.split(',') {
    if let Some(t) = part.strip_prefix("t=") {
      timestamp = t;
    } else if let Some(v) = part.strip_prefix("v1=") {
      signature = v;
    }
  }

  if timestamp.is_empty() || signature.is_empty() {
    return Err(AppError::SignatureInvalid("malformed signature header".to_string()));
  }

  let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
    .map_err(|_| AppError::SignatureInvalid("HMAC key error".to_string()))?;
  mac.update(timestamp.as_bytes());
  mac.update(b".");
  mac.update(payload);

  // Decode hex signature and use constant-time comparison via verify_slice
  let sig_bytes =
    hex::decode(signature).map_err(|_| AppError::SignatureInvalid("signature is not valid hex".to_string()))?;
  mac
    .verify_slice(&sig_bytes)
    .map_err(|_| AppError::SignatureInvalid("signature mismatch".to_string()))?;

  let ts: i64 = timestamp
    .parse()
    .map_err(|_| AppError::SignatureInvalid("invalid timestamp".to_string()))?;
  let now = chrono::Utc::now().timestamp();
  if (now - ts).abs() > REPLAY_WINDOW_SECS {
    return Err(AppError::SignatureInvalid("timestamp outside replay window".to_string()));
  }

  Ok(())
}

/// Produce a `t=,v1=` header for `payload` at `timestamp`. Counterpart of
/// `verify_signature`, used by tests and local webhook simulation.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
  let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
  mac.update(timestamp.to_string().as_bytes());
  mac.update(b".");
  mac.update(payload);
  let digest = mac.finalize().into_bytes();
  format!("t={},v1={}", timestamp, hex::encode(digest))
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "whsec_test_secret";

  #[test]
  fn valid_signature_verifies() {
    let payload = br#"{"type":"checkout.session.completed"}"#;
    let header = sign_payload(payload, SECRET, chrono::Utc::now().timestamp());
    verify_signature(payload, &header, SECRET).unwrap();
  }

  #[test]
  fn tampered_payload_is_rejected() {
    let payload = br#"{"amount":100}"#;
    let header = sign_payload(payload, SECRET, chrono::Utc::now().timestamp());
    let err = verify_signature(br#"{"amount":999}"#, &header, SECRET).unwrap_err();
    assert!(matches!(err, AppError::SignatureInvalid(_)));
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let payload = b"payload";
    let header = sign_payload(payload, "other_secret", chrono::Utc::now().timestamp());
    assert!(verify_signature(payload, &header, SECRET).is_err());
  }

  #[test]
  fn malformed_header_is_rejected() {
    assert!(verify_signature(b"x", "", SECRET).is_err());
    assert!(verify_signature(b"x", "t=123", SECRET).is_err());
    assert!(verify_signature(b"x", "v1=abcd", SECRET).is_err());
    assert!(verify_signature(b"x", "t=123,v1=not-hex", SECRET).is_err());
  }

  #[test]
  fn stale_timestamp_is_rejected() {
    let payload = b"payload";
    let stale = chrono::Utc::now().timestamp() - REPLAY_WINDOW_SECS - 10;
    let header = sign_payload(payload, SECRET, stale);
    let err = verify_signature(payload, &header, SECRET).unwrap_err();
    assert!(matches!(err, AppError::SignatureInvalid(_)));
  }
}
