//! Sending requests and normalising their outcome.
//!
//! # Design
//! `Dispatcher` performs exactly one transport call per `send` and maps the
//! result into a [`Payload`] or a [`SpigetError`]. Transport errors and
//! non-2xx statuses both become `SpigetError::Communication`; the transport's
//! own error type never reaches the caller.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::endpoint::DecodeMode;
use crate::error::SpigetError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// A successfully decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Raw(Vec<u8>),
}

impl Payload {
    /// The JSON value, or the raw body parsed as JSON.
    pub fn into_json(self) -> Result<Value, SpigetError> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Raw(bytes) => parse_json(&bytes),
        }
    }

    /// Body bytes; a JSON payload is re-serialised.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Raw(bytes) => bytes,
            Payload::Json(value) => value.to_string().into_bytes(),
        }
    }

    /// Deserialize into a typed value.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, SpigetError> {
        Ok(serde_json::from_value(self.into_json()?)?)
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn send(&self, request: &HttpRequest, mode: DecodeMode) -> Result<Payload, SpigetError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.transport.send(request).map_err(|err| {
            tracing::debug!(url = %request.url, error = %err, "transport failure");
            SpigetError::from(err)
        })?;

        tracing::debug!(url = %request.url, status = response.status, "received response");
        check_status(&response)?;
        tracing::trace!(bytes = response.body.len(), ?mode, "decoding body");

        match mode {
            DecodeMode::Json => parse_json(&response.body).map(Payload::Json),
            DecodeMode::Raw => Ok(Payload::Raw(response.body)),
        }
    }
}

/// Reject any status outside `200..300`.
fn check_status(response: &HttpResponse) -> Result<(), SpigetError> {
    if response.is_success() {
        return Ok(());
    }
    Err(SpigetError::status(response.status, &response.body_text()))
}

/// Empty bodies decode to `null`; some write endpoints answer 2xx with no content.
fn parse_json(body: &[u8]) -> Result<Value, SpigetError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}
