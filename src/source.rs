//! Metadata source seam
//!
//! Every stage that fetches takes a [`MetadataSource`] by reference. The HTTP
//! implementation is [`crate::client::MetadataClient`]; [`InMemorySource`]
//! serves canned documents for tests and offline runs.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

use crate::error::{CodegenError, Result};
use crate::schema::{AlpsDocument, ProfileDocument, SchemaDocument};

/// Read-only accessor for the three metadata documents
#[allow(async_fn_in_trait)]
pub trait MetadataSource {
    /// Fetch the profile (links) document
    async fn fetch_profile(&self) -> Result<ProfileDocument>;

    /// Fetch `href` as `application/schema+json`
    async fn fetch_schema(&self, href: &str) -> Result<SchemaDocument>;

    /// Fetch `href` as `application/alps+json`
    async fn fetch_alps(&self, href: &str) -> Result<AlpsDocument>;

    /// URL relative hrefs are resolved against, if any
    fn base_url(&self) -> Option<Url> {
        None
    }
}

/// Serves documents from memory, keyed by href.
///
/// Unknown hrefs answer like a server would: HTTP 404.
#[derive(Debug, Default)]
pub struct InMemorySource {
    profile: Option<Value>,
    schemas: HashMap<String, Value>,
    alps: HashMap<String, Value>,
    requests: Mutex<Vec<String>>,
}

impl InMemorySource {
    pub fn new(profile: Value) -> Self {
        Self {
            profile: Some(profile),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, href: impl Into<String>, schema: Value) -> Self {
        self.schemas.insert(href.into(), schema);
        self
    }

    pub fn with_alps(mut self, href: impl Into<String>, alps: Value) -> Self {
        self.alps.insert(href.into(), alps);
        self
    }

    /// Requests served so far, as `kind href`, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, kind: &str, href: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(format!("{} {}", kind, href));
        }
    }
}

fn not_found(href: &str) -> CodegenError {
    CodegenError::Http {
        url: href.to_string(),
        status: 404,
    }
}

impl MetadataSource for InMemorySource {
    async fn fetch_profile(&self) -> Result<ProfileDocument> {
        self.record("profile", "");
        let profile = self.profile.clone().ok_or_else(|| not_found("profile"))?;
        Ok(serde_json::from_value(profile)?)
    }

    async fn fetch_schema(&self, href: &str) -> Result<SchemaDocument> {
        self.record("schema", href);
        let schema = self.schemas.get(href).cloned().ok_or_else(|| not_found(href))?;
        Ok(serde_json::from_value(schema)?)
    }

    async fn fetch_alps(&self, href: &str) -> Result<AlpsDocument> {
        self.record("alps", href);
        let alps = self.alps.get(href).cloned().ok_or_else(|| not_found(href))?;
        Ok(serde_json::from_value(alps)?)
    }
}
