//! The catalog client.
//!
//! # Design
//! `SpigetClient` pairs a [`RequestBuilder`] (base URL + User-Agent) with a
//! [`Dispatcher`] around the injected transport. It holds no mutable state,
//! so one instance can serve concurrent callers when the transport allows it.
//! Every named operation is a thin wrapper over [`SpigetClient::call`], which
//! resolves the endpoint's template from the table in [`crate::endpoint`].

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dispatch::{Dispatcher, Payload};
use crate::endpoint::{BodyEncoding, Endpoint, Segment};
use crate::error::SpigetError;
use crate::http::HttpRequest;
use crate::query::QueryParams;
use crate::request::{encode_segment, RequestBuilder};
use crate::transport::Transport;

pub const DEFAULT_BASE_URL: &str = "https://api.spiget.org/v2";
pub const DEFAULT_USER_AGENT: &str = "GamePanelio_Spiget_API_Library";
/// Version segment used when a download names no version.
pub const LATEST_VERSION: &str = "latest";

#[derive(Debug, Clone)]
pub struct SpigetClient<T> {
    builder: RequestBuilder,
    dispatcher: Dispatcher<T>,
}

#[cfg(feature = "ureq")]
impl Default for SpigetClient<crate::transport::UreqTransport> {
    fn default() -> Self {
        Self::new(crate::transport::UreqTransport::new())
    }
}

impl<T: Transport> SpigetClient<T> {
    /// Client for the public catalog with the default User-Agent.
    pub fn new(transport: T) -> Self {
        Self {
            builder: RequestBuilder::new(DEFAULT_BASE_URL, DEFAULT_USER_AGENT),
            dispatcher: Dispatcher::new(transport),
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.builder = RequestBuilder::new(self.builder.base_url(), user_agent);
        self
    }

    /// Point the client at another deployment, e.g. `http://127.0.0.1:3000/v2`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.builder = RequestBuilder::new(base_url, self.builder.user_agent());
        self
    }

    pub fn base_url(&self) -> &str {
        self.builder.base_url()
    }

    pub fn user_agent(&self) -> &str {
        self.builder.user_agent()
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    /// Resolve `endpoint` into a request without sending it.
    ///
    /// For form-body endpoints `params` becomes the body; otherwise it is the
    /// query string.
    pub fn prepare(
        &self,
        endpoint: Endpoint,
        path_params: &[&str],
        params: &QueryParams,
    ) -> Result<HttpRequest, SpigetError> {
        let spec = endpoint.spec();
        let expected = spec.param_count();
        if path_params.len() != expected {
            return Err(SpigetError::PathParameters {
                endpoint,
                expected,
                got: path_params.len(),
            });
        }

        let mut values = path_params.iter();
        let segments: Vec<Cow<'_, str>> = spec
            .template
            .iter()
            .filter_map(|segment| match segment {
                Segment::Literal(lit) => Some(Cow::Borrowed(*lit)),
                Segment::Param(_) => values.next().map(|v| encode_segment(v)),
            })
            .collect();

        let request = match spec.body {
            BodyEncoding::None => self.builder.assemble(spec.method, &segments[..], params, None),
            BodyEncoding::Form => {
                self.builder
                    .assemble(spec.method, &segments[..], &QueryParams::new(), Some(params))
            }
        };
        Ok(request)
    }

    /// Send one request for `endpoint` and decode it per the endpoint's mode.
    pub fn call(
        &self,
        endpoint: Endpoint,
        path_params: &[&str],
        params: &QueryParams,
    ) -> Result<Payload, SpigetError> {
        let request = self.prepare(endpoint, path_params, params)?;
        self.dispatcher.send(&request, endpoint.spec().decode)
    }

    /// [`call`](Self::call), deserialized into `D`.
    pub fn fetch<D: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path_params: &[&str],
        params: &QueryParams,
    ) -> Result<D, SpigetError> {
        self.call(endpoint, path_params, params)?.decode()
    }

    fn json(
        &self,
        endpoint: Endpoint,
        path_params: &[&str],
        params: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.call(endpoint, path_params, params)?.into_json()
    }

    fn raw(
        &self,
        endpoint: Endpoint,
        path_params: &[&str],
        params: &QueryParams,
    ) -> Result<Vec<u8>, SpigetError> {
        Ok(self.call(endpoint, path_params, params)?.into_bytes())
    }

    // ---------------------------------------------------------------------
    // Authors
    // ---------------------------------------------------------------------

    pub fn author_list(&self, query: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::AuthorList, &[], query)
    }

    pub fn author_details(&self, author: &str, query: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::AuthorDetails, &[author], query)
    }

    pub fn author_resources(
        &self,
        author: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::AuthorResources, &[author], query)
    }

    pub fn author_reviews(&self, author: &str, query: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::AuthorReviews, &[author], query)
    }

    // ---------------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------------

    pub fn category_list(&self, query: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::CategoryList, &[], query)
    }

    pub fn category_details(
        &self,
        category: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::CategoryDetails, &[category], query)
    }

    pub fn category_resources(
        &self,
        category: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::CategoryResources, &[category], query)
    }

    // ---------------------------------------------------------------------
    // Resources
    // ---------------------------------------------------------------------

    pub fn resource_list(&self, query: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::ResourceList, &[], query)
    }

    pub fn new_resources(&self, query: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::NewResources, &[], query)
    }

    /// `versions` is a comma separated list, e.g. `1.20,1.21`.
    pub fn resources_for_versions(
        &self,
        versions: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::ResourcesForVersions, &[versions], query)
    }

    pub fn resource_details(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::ResourceDetails, &[resource], query)
    }

    pub fn resource_author(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::ResourceAuthor, &[resource], query)
    }

    /// Download the current file of a resource. The body is returned as-is.
    pub fn resource_download(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Vec<u8>, SpigetError> {
        self.raw(Endpoint::ResourceDownload, &[resource], query)
    }

    pub fn resource_reviews(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::ResourceReviews, &[resource], query)
    }

    pub fn resource_updates(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::ResourceUpdates, &[resource], query)
    }

    pub fn resource_versions(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::ResourceVersions, &[resource], query)
    }

    /// Download a specific version; `None` downloads [`LATEST_VERSION`].
    pub fn resource_version_download(
        &self,
        resource: &str,
        version: Option<&str>,
        query: &QueryParams,
    ) -> Result<Vec<u8>, SpigetError> {
        let version = version.unwrap_or(LATEST_VERSION);
        self.raw(Endpoint::ResourceVersionDownload, &[resource, version], query)
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    pub fn author_search(&self, query: &str, params: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::AuthorSearch, &[query], params)
    }

    pub fn resource_search(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::ResourceSearch, &[query], params)
    }

    // ---------------------------------------------------------------------
    // Status & webhooks
    // ---------------------------------------------------------------------

    pub fn api_status(&self, query: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::ApiStatus, &[], query)
    }

    pub fn webhook_events(&self, query: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::WebhookEvents, &[], query)
    }

    pub fn webhook_status(&self, id: &str, query: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::WebhookStatus, &[id], query)
    }

    /// Register a webhook. `form` is sent as the form-encoded body.
    pub fn register_webhook(&self, form: &QueryParams) -> Result<Value, SpigetError> {
        self.json(Endpoint::RegisterWebhook, &[], form)
    }

    pub fn delete_webhook(
        &self,
        id: &str,
        secret: &str,
        query: &QueryParams,
    ) -> Result<Value, SpigetError> {
        self.json(Endpoint::DeleteWebhook, &[id, secret], query)
    }
}
