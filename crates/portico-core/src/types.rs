// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-scoped types shared by the gateway and controllers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One inbound request and the response being built for it.
///
/// Created by the gateway for every request and dropped once the response
/// has been written. Controllers only ever touch the response body, and only
/// through [`RequestContext::set_body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Per-request identifier, echoed back in the `x-request-id` header.
    pub request_id: String,
    /// HTTP method of the inbound request.
    pub method: String,
    /// Request path as seen by the gateway.
    pub path: String,
    body: Option<String>,
}

impl RequestContext {
    /// Create a context with no response body set.
    pub fn new(
        request_id: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into(),
            path: path.into(),
            body: None,
        }
    }

    /// Assign the response body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    /// The response body, or `None` if no handler has set one.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Move the response body out of the context.
    pub fn take_body(&mut self) -> Option<String> {
        self.body.take()
    }
}

/// How a string response body is serialized onto the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseFormat {
    /// `text/plain; charset=utf-8`, body sent as-is.
    #[default]
    Text,
    /// `application/json`, body encoded as a JSON string.
    Json,
}

impl ResponseFormat {
    /// The `Content-Type` header value for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text/plain; charset=utf-8",
            ResponseFormat::Json => "application/json",
        }
    }
}
