//! Endpoint table for the catalog API.
//!
//! # Design
//! Every operation is one [`Endpoint`] variant mapped to a `'static`
//! [`EndpointSpec`]. The client never hard-codes paths; it resolves a
//! template against caller-supplied parameters and lets the table entry decide
//! the method, body encoding and decode mode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;

/// One component of a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Emitted verbatim.
    Literal(&'static str),
    /// Filled from the caller's path parameters, in order, and percent-encoded.
    Param(&'static str),
}

/// How the request body is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// No body; parameters go to the query string.
    None,
    /// Parameters are sent as an `application/x-www-form-urlencoded` body.
    Form,
}

/// How a successful response body is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    Json,
    Raw,
}

/// Immutable description of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSpec {
    pub method: HttpMethod,
    pub template: &'static [Segment],
    pub body: BodyEncoding,
    pub decode: DecodeMode,
}

impl EndpointSpec {
    const fn get(template: &'static [Segment]) -> Self {
        Self {
            method: HttpMethod::Get,
            template,
            body: BodyEncoding::None,
            decode: DecodeMode::Json,
        }
    }

    const fn download(template: &'static [Segment]) -> Self {
        Self {
            decode: DecodeMode::Raw,
            ..Self::get(template)
        }
    }

    /// Number of [`Segment::Param`] entries in the template.
    pub fn param_count(&self) -> usize {
        self.template
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count()
    }

    /// Names of the template parameters, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.template.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(*name),
            Segment::Literal(_) => None,
        })
    }

    /// Template rendered with `{name}` placeholders, e.g. `authors/{author}`.
    pub fn template_string(&self) -> String {
        self.template
            .iter()
            .map(|s| match s {
                Segment::Literal(lit) => (*lit).to_string(),
                Segment::Param(name) => format!("{{{name}}}"),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Every operation the catalog exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    AuthorList,
    AuthorDetails,
    AuthorResources,
    AuthorReviews,
    CategoryList,
    CategoryDetails,
    CategoryResources,
    ResourceList,
    NewResources,
    ResourcesForVersions,
    ResourceDetails,
    ResourceAuthor,
    ResourceDownload,
    ResourceReviews,
    ResourceUpdates,
    ResourceVersions,
    ResourceVersionDownload,
    AuthorSearch,
    ResourceSearch,
    ApiStatus,
    WebhookEvents,
    WebhookStatus,
    RegisterWebhook,
    DeleteWebhook,
}

use self::Segment::{Literal as L, Param as P};

const AUTHOR_LIST: EndpointSpec = EndpointSpec::get(&[L("authors")]);
const AUTHOR_DETAILS: EndpointSpec = EndpointSpec::get(&[L("authors"), P("author")]);
const AUTHOR_RESOURCES: EndpointSpec =
    EndpointSpec::get(&[L("authors"), P("author"), L("resources")]);
const AUTHOR_REVIEWS: EndpointSpec = EndpointSpec::get(&[L("authors"), P("author"), L("reviews")]);
const CATEGORY_LIST: EndpointSpec = EndpointSpec::get(&[L("categories")]);
const CATEGORY_DETAILS: EndpointSpec = EndpointSpec::get(&[L("categories"), P("category")]);
const CATEGORY_RESOURCES: EndpointSpec =
    EndpointSpec::get(&[L("categories"), P("category"), L("resources")]);
const RESOURCE_LIST: EndpointSpec = EndpointSpec::get(&[L("resources")]);
const NEW_RESOURCES: EndpointSpec = EndpointSpec::get(&[L("resources"), L("new")]);
const RESOURCES_FOR_VERSIONS: EndpointSpec = EndpointSpec::get(&[
    L("resources"),
    L("for"),
    L("versions"),
    P("versions"),
]);
const RESOURCE_DETAILS: EndpointSpec = EndpointSpec::get(&[L("resources"), P("resource")]);
const RESOURCE_AUTHOR: EndpointSpec =
    EndpointSpec::get(&[L("resources"), P("resource"), L("author")]);
const RESOURCE_DOWNLOAD: EndpointSpec =
    EndpointSpec::download(&[L("resources"), P("resource"), L("download")]);
const RESOURCE_REVIEWS: EndpointSpec =
    EndpointSpec::get(&[L("resources"), P("resource"), L("reviews")]);
const RESOURCE_UPDATES: EndpointSpec =
    EndpointSpec::get(&[L("resources"), P("resource"), L("updates")]);
const RESOURCE_VERSIONS: EndpointSpec =
    EndpointSpec::get(&[L("resources"), P("resource"), L("versions")]);
const RESOURCE_VERSION_DOWNLOAD: EndpointSpec = EndpointSpec::download(&[
    L("resources"),
    P("resource"),
    L("versions"),
    P("version"),
    L("download"),
]);
const AUTHOR_SEARCH: EndpointSpec = EndpointSpec::get(&[L("search"), L("authors"), P("query")]);
const RESOURCE_SEARCH: EndpointSpec =
    EndpointSpec::get(&[L("search"), L("resources"), P("query")]);
const API_STATUS: EndpointSpec = EndpointSpec::get(&[L("status")]);
const WEBHOOK_EVENTS: EndpointSpec = EndpointSpec::get(&[L("webhook"), L("events")]);
const WEBHOOK_STATUS: EndpointSpec = EndpointSpec::get(&[L("webhook"), L("status"), P("id")]);
const REGISTER_WEBHOOK: EndpointSpec = EndpointSpec {
    method: HttpMethod::Post,
    template: &[L("webhook"), L("register")],
    body: BodyEncoding::Form,
    decode: DecodeMode::Json,
};
const DELETE_WEBHOOK: EndpointSpec = EndpointSpec {
    method: HttpMethod::Delete,
    template: &[L("webhook"), L("delete"), P("id"), P("secret")],
    body: BodyEncoding::None,
    decode: DecodeMode::Json,
};

impl Endpoint {
    pub const ALL: [Endpoint; 24] = [
        Endpoint::AuthorList,
        Endpoint::AuthorDetails,
        Endpoint::AuthorResources,
        Endpoint::AuthorReviews,
        Endpoint::CategoryList,
        Endpoint::CategoryDetails,
        Endpoint::CategoryResources,
        Endpoint::ResourceList,
        Endpoint::NewResources,
        Endpoint::ResourcesForVersions,
        Endpoint::ResourceDetails,
        Endpoint::ResourceAuthor,
        Endpoint::ResourceDownload,
        Endpoint::ResourceReviews,
        Endpoint::ResourceUpdates,
        Endpoint::ResourceVersions,
        Endpoint::ResourceVersionDownload,
        Endpoint::AuthorSearch,
        Endpoint::ResourceSearch,
        Endpoint::ApiStatus,
        Endpoint::WebhookEvents,
        Endpoint::WebhookStatus,
        Endpoint::RegisterWebhook,
        Endpoint::DeleteWebhook,
    ];

    pub fn spec(self) -> &'static EndpointSpec {
        match self {
            Endpoint::AuthorList => &AUTHOR_LIST,
            Endpoint::AuthorDetails => &AUTHOR_DETAILS,
            Endpoint::AuthorResources => &AUTHOR_RESOURCES,
            Endpoint::AuthorReviews => &AUTHOR_REVIEWS,
            Endpoint::CategoryList => &CATEGORY_LIST,
            Endpoint::CategoryDetails => &CATEGORY_DETAILS,
            Endpoint::CategoryResources => &CATEGORY_RESOURCES,
            Endpoint::ResourceList => &RESOURCE_LIST,
            Endpoint::NewResources => &NEW_RESOURCES,
            Endpoint::ResourcesForVersions => &RESOURCES_FOR_VERSIONS,
            Endpoint::ResourceDetails => &RESOURCE_DETAILS,
            Endpoint::ResourceAuthor => &RESOURCE_AUTHOR,
            Endpoint::ResourceDownload => &RESOURCE_DOWNLOAD,
            Endpoint::ResourceReviews => &RESOURCE_REVIEWS,
            Endpoint::ResourceUpdates => &RESOURCE_UPDATES,
            Endpoint::ResourceVersions => &RESOURCE_VERSIONS,
            Endpoint::ResourceVersionDownload => &RESOURCE_VERSION_DOWNLOAD,
            Endpoint::AuthorSearch => &AUTHOR_SEARCH,
            Endpoint::ResourceSearch => &RESOURCE_SEARCH,
            Endpoint::ApiStatus => &API_STATUS,
            Endpoint::WebhookEvents => &WEBHOOK_EVENTS,
            Endpoint::WebhookStatus => &WEBHOOK_STATUS,
            Endpoint::RegisterWebhook => &REGISTER_WEBHOOK,
            Endpoint::DeleteWebhook => &DELETE_WEBHOOK,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.spec();
        write!(f, "{} {}", spec.method, spec.template_string())
    }
}
