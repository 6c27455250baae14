//! Webhook signature verification and event parsing.
//!
//! The signature header has the form `t=<unix seconds>,v1=<hex>[,v1=<hex>]`.
//! Each `v1` value is an HMAC-SHA256 of `"{t}.{raw body}"` keyed with the
//! endpoint's webhook secret.

use std::time::Duration;

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use serde::Deserialize;
use sha2::Sha256;

use crate::payments::{GatewayEvent, PaymentIntent, WebhookError};

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Default allowed clock drift between the provider and this server.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

const PAYMENT_INTENT_EVENT_PREFIX: &str = "payment_intent.";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,

    #[serde(rename = "type")]
    kind: String,

    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

/// Verify `header` against `payload` and parse the event.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: Duration,
    now: Timestamp,
) -> Result<GatewayEvent, WebhookError> {
    verify_signature(payload, header, secret, tolerance, now)?;

    parse_event(payload)
}

/// Check the signature header for `payload`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: Duration,
    now: Timestamp,
) -> Result<(), WebhookError> {
    if header.trim().is_empty() {
        return Err(WebhookError::MissingHeader);
    }

    let parsed = parse_header(header)?;

    let drift = now.as_second().abs_diff(parsed.timestamp);

    if drift > tolerance.as_secs() {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    let mac = signed_payload_mac(payload, parsed.timestamp, secret)?;

    let matched = parsed
        .signatures
        .iter()
        .any(|signature| mac.clone().verify_slice(signature).is_ok());

    if matched {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Build a signature header for `payload`, as the provider would send it.
pub fn signature_header(
    payload: &[u8],
    secret: &str,
    timestamp: i64,
) -> Result<String, WebhookError> {
    let digest = signed_payload_mac(payload, timestamp, secret)?
        .finalize()
        .into_bytes();

    Ok(format!("t={timestamp},v1={}", hex::encode(digest)))
}

fn signed_payload_mac(
    payload: &[u8],
    timestamp: i64,
    secret: &str,
) -> Result<HmacSha256, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::InvalidSecret)?;

    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    Ok(mac)
}

fn parse_header(header: &str) -> Result<SignatureHeader, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };

        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| WebhookError::MalformedHeader)?,
                );
            }
            // Undecodable entries can never match; skip them.
            "v1" => {
                if let Ok(signature) = hex::decode(value) {
                    signatures.push(signature);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;

    if signatures.is_empty() {
        return Err(WebhookError::SignatureMismatch);
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn parse_event(payload: &[u8]) -> Result<GatewayEvent, WebhookError> {
    let raw: RawEvent = serde_json::from_slice(payload).map_err(WebhookError::InvalidPayload)?;

    if !raw.kind.starts_with(PAYMENT_INTENT_EVENT_PREFIX) {
        return Ok(GatewayEvent::Other {
            id: raw.id,
            kind: raw.kind,
        });
    }

    let intent: PaymentIntent =
        serde_json::from_value(raw.data.object).map_err(WebhookError::InvalidPayload)?;

    Ok(GatewayEvent::PaymentIntent {
        id: raw.id,
        kind: raw.kind,
        intent,
    })
}
