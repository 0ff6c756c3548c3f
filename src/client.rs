//! Metadata Client
//!
//! Authenticated HTTP accessor for the profile, schema and ALPS documents.
//! One client is built per run; credentials (a bearer token, basic
//! credentials or a session cookie) live inside it until the process exits.

use reqwest::header::ACCEPT;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::{AuthConfig, ServerConfig};
use crate::error::{CodegenError, Result};
use crate::schema::{AlpsDocument, ProfileDocument, SchemaDocument};
use crate::source::MetadataSource;

pub const HAL_JSON: &str = "application/hal+json";
pub const SCHEMA_JSON: &str = "application/schema+json";
pub const ALPS_JSON: &str = "application/alps+json";

/// Credentials attached to every request after startup
#[derive(Debug, Clone)]
enum Credentials {
    /// Nothing, or a session cookie held by the cookie store
    Session,
    Bearer(String),
    Basic { username: String, password: String },
}

/// HTTP implementation of [`MetadataSource`]
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    profile_url: Url,
    credentials: Credentials,
}

impl MetadataClient {
    /// Build the client and perform any credential exchange.
    ///
    /// Fails with [`CodegenError::Authentication`] when the exchange is
    /// rejected; there is no retry.
    pub async fn connect(server: &ServerConfig, auth: &AuthConfig) -> Result<Self> {
        let profile_url = parse_url(&server.profile_url)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(server.timeout_secs))
            .user_agent(server.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        let credentials = match auth {
            AuthConfig::None => Credentials::Session,
            AuthConfig::Bearer { token } => Credentials::Bearer(token.clone()),
            AuthConfig::Basic { username, password } => Credentials::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            AuthConfig::OauthPassword {
                token_url,
                client_id,
                client_secret,
                username,
                password,
            } => {
                let token = exchange_password_grant(
                    &http,
                    token_url,
                    client_id,
                    client_secret.as_deref(),
                    username,
                    password,
                )
                .await?;
                Credentials::Bearer(token)
            }
            AuthConfig::FormLogin {
                login_url,
                username,
                password,
            } => {
                form_login(&http, login_url, username, password).await?;
                Credentials::Session
            }
        };

        info!(profile = %profile_url, "metadata client ready");

        Ok(Self {
            http,
            profile_url,
            credentials,
        })
    }

    fn resolve(&self, href: &str) -> Result<Url> {
        self.profile_url
            .join(href)
            .map_err(|source| CodegenError::InvalidUrl {
                url: href.to_string(),
                source,
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::Session => request,
            Credentials::Bearer(token) => request.bearer_auth(token),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, accept: &'static str) -> Result<T> {
        debug!(%url, accept, "GET");
        let request = self.authorize(self.http.get(url.clone()).header(ACCEPT, accept));
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CodegenError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl MetadataSource for MetadataClient {
    async fn fetch_profile(&self) -> Result<ProfileDocument> {
        match self.get_json(self.profile_url.clone(), HAL_JSON).await {
            Err(CodegenError::Http {
                url,
                status: status @ (401 | 403),
            }) => Err(CodegenError::Authentication(format!(
                "{} rejected the session (HTTP {})",
                url, status
            ))),
            other => other,
        }
    }

    async fn fetch_schema(&self, href: &str) -> Result<SchemaDocument> {
        let url = self.resolve(href)?;
        self.get_json(url, SCHEMA_JSON).await
    }

    async fn fetch_alps(&self, href: &str) -> Result<AlpsDocument> {
        let url = self.resolve(href)?;
        self.get_json(url, ALPS_JSON).await
    }

    fn base_url(&self) -> Option<Url> {
        Some(self.profile_url.clone())
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|source| CodegenError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// OAuth2 resource-owner password grant
async fn exchange_password_grant(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: Option<&str>,
    username: &str,
    password: &str,
) -> Result<String> {
    let mut form = vec![
        ("grant_type", "password"),
        ("username", username),
        ("password", password),
        ("client_id", client_id),
    ];
    if let Some(secret) = client_secret {
        form.push(("client_secret", secret));
    }

    let response = http
        .post(token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| {
            CodegenError::Authentication(format!("token request to {} failed: {}", token_url, e))
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CodegenError::Authentication(format!(
            "token endpoint {} returned HTTP {}",
            token_url,
            status.as_u16()
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| CodegenError::Authentication(format!("unreadable token response: {}", e)))?;

    token
        .access_token
        .ok_or_else(|| {
            CodegenError::Authentication("token response carried no access_token".to_string())
        })
}

/// Form login; the session cookie ends up in the client's cookie store
async fn form_login(
    http: &reqwest::Client,
    login_url: &str,
    username: &str,
    password: &str,
) -> Result<()> {
    let response = http
        .post(login_url)
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .map_err(|e| {
            CodegenError::Authentication(format!("login request to {} failed: {}", login_url, e))
        })?;

    let status = response.status();
    // Spring Security answers a bad login with a redirect to `/login?error`
    let rejected = response.url().query_pairs().any(|(key, _)| key == "error");
    if !status.is_success() || rejected {
        return Err(CodegenError::Authentication(format!(
            "login at {} was rejected (HTTP {})",
            login_url,
            status.as_u16()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_config(mock: &MockServer) -> ServerConfig {
        ServerConfig {
            profile_url: format!("{}/api/profile", mock.uri()),
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_profile_sends_hal_accept() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .and(header("accept", HAL_JSON))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_links": {
                    "self": {"href": "/api/profile"},
                    "books": {"href": "/api/profile/books"}
                }
            })))
            .mount(&mock_server)
            .await;

        let client = MetadataClient::connect(&server_config(&mock_server), &AuthConfig::None)
            .await
            .unwrap();
        let profile = client.fetch_profile().await.unwrap();
        assert_eq!(profile.links.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_schema_and_alps_use_distinct_media_types() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/profile/books"))
            .and(header("accept", SCHEMA_JSON))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"title": "Book", "type": "object"})),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/profile/books"))
            .and(header("accept", ALPS_JSON))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"alps": {"descriptor": []}})),
            )
            .mount(&mock_server)
            .await;

        let client = MetadataClient::connect(&server_config(&mock_server), &AuthConfig::None)
            .await
            .unwrap();

        // relative href resolved against the profile URL
        let schema = client.fetch_schema("/api/profile/books").await.unwrap();
        assert_eq!(schema.title.as_deref(), Some("Book"));
        let alps = client.fetch_alps("/api/profile/books").await.unwrap();
        assert!(alps.alps.descriptor.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/profile/widgets"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = MetadataClient::connect(&server_config(&mock_server), &AuthConfig::None)
            .await
            .unwrap();
        let err = client.fetch_schema("/api/profile/widgets").await.unwrap_err();
        assert!(matches!(err, CodegenError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unauthorized_profile_is_authentication_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = MetadataClient::connect(&server_config(&mock_server), &AuthConfig::None)
            .await
            .unwrap();
        let err = client.fetch_profile().await.unwrap_err();
        assert!(matches!(err, CodegenError::Authentication(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_links": {}})))
            .mount(&mock_server)
            .await;

        let auth = AuthConfig::Bearer { token: "abc123".into() };
        let client = MetadataClient::connect(&server_config(&mock_server), &auth).await.unwrap();
        assert!(client.fetch_profile().await.is_ok());
    }

    #[tokio::test]
    async fn test_basic_credentials_are_sent() {
        let mock_server = MockServer::start().await;
        // admin:secret
        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_links": {}})))
            .mount(&mock_server)
            .await;

        let auth = AuthConfig::Basic {
            username: "admin".into(),
            password: "secret".into(),
        };
        let client = MetadataClient::connect(&server_config(&mock_server), &auth).await.unwrap();
        assert!(client.fetch_profile().await.is_ok());
    }

    #[tokio::test]
    async fn test_oauth_password_grant_token_is_used() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-1", "token_type": "bearer"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_links": {}})))
            .mount(&mock_server)
            .await;

        let auth = AuthConfig::OauthPassword {
            token_url: format!("{}/oauth/token", mock_server.uri()),
            client_id: "web".into(),
            client_secret: None,
            username: "admin".into(),
            password: "secret".into(),
        };
        let client = MetadataClient::connect(&server_config(&mock_server), &auth).await.unwrap();
        assert!(client.fetch_profile().await.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_token_exchange_is_authentication_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&mock_server)
            .await;

        let auth = AuthConfig::OauthPassword {
            token_url: format!("{}/oauth/token", mock_server.uri()),
            client_id: "web".into(),
            client_secret: Some("shh".into()),
            username: "admin".into(),
            password: "wrong".into(),
        };
        let err = MetadataClient::connect(&server_config(&mock_server), &auth)
            .await
            .unwrap_err();
        assert!(matches!(err, CodegenError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_form_login_session_cookie_is_kept() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "SESSION=abc; Path=/"),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .and(header("cookie", "SESSION=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_links": {}})))
            .mount(&mock_server)
            .await;

        let auth = AuthConfig::FormLogin {
            login_url: format!("{}/login", mock_server.uri()),
            username: "admin".into(),
            password: "secret".into(),
        };
        let client = MetadataClient::connect(&server_config(&mock_server), &auth).await.unwrap();
        assert!(client.fetch_profile().await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_profile_url() {
        let server = ServerConfig {
            profile_url: "not a url".into(),
            ..ServerConfig::default()
        };
        let err = MetadataClient::connect(&server, &AuthConfig::None).await.unwrap_err();
        assert!(matches!(err, CodegenError::InvalidUrl { .. }));
    }
}
