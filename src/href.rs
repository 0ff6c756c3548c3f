//! Href comparison policy
//!
//! The profile, schema and ALPS documents are fetched independently, so the
//! same entity can be spelled differently across them (trailing slash, host
//! casing, explicit default port). Every href comparison in the pipeline goes
//! through an [`HrefMatcher`].

use serde::{Deserialize, Serialize};
use url::Url;

/// How hrefs are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HrefPolicy {
    /// Byte equality
    Exact,
    /// URL-normalized equality (relative hrefs joined onto the base, scheme and
    /// host lower-cased, default port dropped, trailing `/` removed)
    #[default]
    Normalized,
}

/// Produces comparison keys for hrefs under a policy
#[derive(Debug, Clone)]
pub struct HrefMatcher {
    policy: HrefPolicy,
    base: Option<Url>,
}

impl HrefMatcher {
    pub fn new(policy: HrefPolicy, base: Option<Url>) -> Self {
        Self { policy, base }
    }

    pub fn exact() -> Self {
        Self::new(HrefPolicy::Exact, None)
    }

    pub fn policy(&self) -> HrefPolicy {
        self.policy
    }

    /// Comparison key for `href`
    pub fn key(&self, href: &str) -> String {
        match self.policy {
            HrefPolicy::Exact => href.to_string(),
            HrefPolicy::Normalized => {
                let parsed = match &self.base {
                    Some(base) => base.join(href),
                    None => Url::parse(href),
                };
                match parsed {
                    Ok(url) => trim_trailing_slash(url.as_str()),
                    Err(_) => trim_trailing_slash(href),
                }
            }
        }
    }

    /// Whether two hrefs name the same resource under this policy
    pub fn same(&self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }
}

impl Default for HrefMatcher {
    fn default() -> Self {
        Self::new(HrefPolicy::default(), None)
    }
}

fn trim_trailing_slash(href: &str) -> String {
    let trimmed = href.trim_end_matches('/');
    if trimmed.is_empty() {
        href.to_string()
    } else {
        trimmed.to_string()
    }
}
