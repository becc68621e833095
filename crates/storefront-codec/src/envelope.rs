//! Envelope tokens: typed, timestamped, reversible, not confidential.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::transform;
use crate::CodecError;

/// Discriminator carried in every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadType {
    Product,
    Package,
    Items,
    Cart,
}

impl PayloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadType::Product => "product",
            PayloadType::Package => "package",
            PayloadType::Items => "items",
            PayloadType::Cart => "cart",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{type, data, timestamp}` wrapper around a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "type")]
    pub kind: PayloadType,
    pub data: T,
    /// Creation time, Unix epoch milliseconds.
    pub timestamp: i64,
}

impl<T> Envelope<T> {
    /// Milliseconds elapsed between creation and `now_ms`.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp)
    }
}

/// Encodes payloads as envelope tokens.
///
/// Stateless apart from the clock, which only stamps new envelopes and
/// measures age in [`EnvelopeCodec::validate`].
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCodec<C = SystemClock> {
    clock: C,
}

impl EnvelopeCodec<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> EnvelopeCodec<C> {
    /// Use a different time source.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Wrap `payload` in an envelope and encode it.
    pub fn encode<T: Serialize + ?Sized>(
        &self,
        kind: PayloadType,
        payload: &T,
    ) -> Result<String, CodecError> {
        let envelope = Envelope {
            kind,
            data: payload,
            timestamp: self.clock.now_ms(),
        };
        let json = serde_json::to_vec(&envelope)?;
        Ok(transform::to_url_safe(&json))
    }

    /// Decode a token, reporting why it failed.
    ///
    /// `type` and `timestamp` must be present and non-null. `data` must be
    /// present but may be null.
    pub fn try_decode(&self, token: &str) -> Result<Envelope<Value>, CodecError> {
        let bytes = transform::from_base64(token)?;
        let text = String::from_utf8(bytes).map_err(|_| CodecError::NotText)?;
        let mut raw: Value = serde_json::from_str(&text)?;

        let kind = serde_json::from_value(required(&mut raw, "type")?)?;
        let timestamp = serde_json::from_value(required(&mut raw, "timestamp")?)?;
        let data = match raw.get_mut("data") {
            Some(data) => data.take(),
            None => return Err(CodecError::MissingField("data")),
        };

        Ok(Envelope {
            kind,
            data,
            timestamp,
        })
    }

    /// Decode a token. Malformed input yields `None`.
    pub fn decode(&self, token: &str) -> Option<Envelope<Value>> {
        self.try_decode(token)
            .map_err(|e| debug!(error = %e, "rejecting envelope token"))
            .ok()
    }

    /// Decode a token whose envelope must carry `kind`, reading the payload
    /// as `T`.
    pub fn try_decode_as<T: DeserializeOwned>(
        &self,
        token: &str,
        kind: PayloadType,
    ) -> Result<T, CodecError> {
        let envelope = self.try_decode(token)?;
        if envelope.kind != kind {
            return Err(CodecError::TypeMismatch {
                expected: kind.as_str(),
                found: envelope.kind.to_string(),
            });
        }
        Ok(serde_json::from_value(envelope.data)?)
    }

    pub fn decode_as<T: DeserializeOwned>(&self, token: &str, kind: PayloadType) -> Option<T> {
        self.try_decode_as(token, kind)
            .map_err(|e| debug!(error = %e, expected = %kind, "rejecting envelope token"))
            .ok()
    }

    /// Check that a token decodes to a complete envelope, optionally no
    /// older than `max_age_ms`.
    ///
    /// Null `data` counts as missing here. Never panics.
    pub fn validate(&self, token: &str, max_age_ms: Option<i64>) -> bool {
        self.try_validate(token, max_age_ms)
            .map_err(|e| debug!(error = %e, "envelope failed validation"))
            .is_ok()
    }

    /// Like [`validate`](Self::validate), returning the reason a token
    /// was rejected.
    pub fn try_validate(&self, token: &str, max_age_ms: Option<i64>) -> Result<(), CodecError> {
        let envelope = self.try_decode(token)?;
        if envelope.data.is_null() {
            return Err(CodecError::MissingField("data"));
        }
        if let Some(max_age_ms) = max_age_ms {
            let age_ms = envelope.age_ms(self.clock.now_ms());
            if age_ms > max_age_ms {
                return Err(CodecError::Expired { age_ms, max_age_ms });
            }
        }
        Ok(())
    }

    pub fn encode_product<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, CodecError> {
        self.encode(PayloadType::Product, payload)
    }

    pub fn decode_product<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        self.decode_as(token, PayloadType::Product)
    }

    pub fn encode_package<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, CodecError> {
        self.encode(PayloadType::Package, payload)
    }

    pub fn decode_package<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        self.decode_as(token, PayloadType::Package)
    }

    /// Encode a heterogeneous list of rows.
    pub fn encode_items<T: Serialize>(&self, items: &[T]) -> Result<String, CodecError> {
        self.encode(PayloadType::Items, items)
    }

    pub fn decode_items<T: DeserializeOwned>(&self, token: &str) -> Option<Vec<T>> {
        self.decode_as(token, PayloadType::Items)
    }

    /// Encode a full cart snapshot.
    pub fn encode_cart<T: Serialize + ?Sized>(&self, cart: &T) -> Result<String, CodecError> {
        self.encode(PayloadType::Cart, cart)
    }

    pub fn decode_cart<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        self.decode_as(token, PayloadType::Cart)
    }
}

fn required(raw: &mut Value, field: &'static str) -> Result<Value, CodecError> {
    match raw.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Err(CodecError::MissingField(field)),
        Some(value) => Ok(value),
    }
}
