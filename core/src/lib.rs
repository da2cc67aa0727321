//! Blocking client for the Spiget plugin catalog API (`https://api.spiget.org/v2`).
//!
//! # Overview
//! Every operation flows through the same pipeline: the endpoint table
//! supplies a method, path template and decode mode; `RequestBuilder`
//! resolves it into a plain-data `HttpRequest`; `Dispatcher` sends it through
//! the injected `Transport` and turns the response into a `Payload` or a
//! `SpigetError`.
//!
//! # Design
//! - The transport is injected at construction. `UreqTransport` (feature
//!   `ureq`, on by default) is provided; tests use in-memory transports.
//! - Path parameters are percent-encoded per segment; query strings and form
//!   bodies use `application/x-www-form-urlencoded` in insertion order.
//! - Any status outside `200..300` and any transport failure is a
//!   `SpigetError::Communication`; callers inspect `SpigetError::code`.
//! - Download endpoints return raw bytes, everything else JSON.
//!
//! ```no_run
//! use spiget_core::{QueryParams, SpigetClient, UreqTransport};
//!
//! let client = SpigetClient::new(UreqTransport::new()).with_user_agent("my-panel/1.0");
//! let hits = client.resource_search("worldedit", &QueryParams::new().with("size", 5))?;
//! let jar = client.resource_version_download("1234", None, &QueryParams::new())?;
//! println!("{} hits, {} bytes", hits.as_array().map_or(0, Vec::len), jar.len());
//! # Ok::<(), spiget_core::SpigetError>(())
//! ```

pub mod client;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod query;
pub mod request;
pub mod transport;
pub mod types;

pub use client::{SpigetClient, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, LATEST_VERSION};
pub use dispatch::{Dispatcher, Payload};
pub use endpoint::{BodyEncoding, DecodeMode, Endpoint, EndpointSpec, Segment};
pub use error::{SpigetError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{QueryParams, QueryValue};
pub use request::RequestBuilder;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
