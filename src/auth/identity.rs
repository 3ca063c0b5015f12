//! Password-method token issuer for identity endpoints.
//!
//! This module provides [`PasswordIssuer`], a ready-made [`Reauthenticator`]
//! that obtains tokens by posting user credentials to an identity service's
//! `auth/tokens` resource.
//!
//! # Token Issue Flow
//!
//! 1. `POST {identity}/auth/tokens` with a password-method document, optionally
//!    scoped to a project
//! 2. The issued token is read from the `X-Subject-Token` response header
//! 3. Expiry and scope are read from the `token` object in the response body
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudplane::auth::identity::PasswordIssuer;
//! use cloudplane::{EndpointUrl, Session};
//!
//! let issuer = PasswordIssuer::builder()
//!     .identity_endpoint(EndpointUrl::new("https://keystone.example.com/v3")?)
//!     .username("demo")
//!     .password("secret")
//!     .project("demo-project")
//!     .build()?;
//!
//! let session = Session::unauthenticated(issuer);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::session::{ReauthFuture, Reauthenticator};
use crate::auth::{AuthError, Token};
use crate::config::EndpointUrl;
use crate::error::ConfigError;

/// Response header carrying the issued token.
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

const DEFAULT_DOMAIN: &str = "Default";

#[derive(Serialize)]
struct IssueRequest<'a> {
    auth: AuthDocument<'a>,
}

#[derive(Serialize)]
struct AuthDocument<'a> {
    identity: Identity<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<Scope<'a>>,
}

#[derive(Serialize)]
struct Identity<'a> {
    methods: [&'a str; 1],
    password: PasswordMethod<'a>,
}

#[derive(Serialize)]
struct PasswordMethod<'a> {
    user: User<'a>,
}

#[derive(Serialize)]
struct User<'a> {
    name: &'a str,
    password: &'a str,
    domain: NamedRef<'a>,
}

#[derive(Serialize)]
struct Scope<'a> {
    project: ProjectRef<'a>,
}

#[derive(Serialize)]
struct ProjectRef<'a> {
    name: &'a str,
    domain: NamedRef<'a>,
}

#[derive(Serialize)]
struct NamedRef<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct IssueResponse {
    token: IssuedToken,
}

#[derive(Deserialize)]
struct IssuedToken {
    expires_at: Option<DateTime<Utc>>,
    project: Option<IssuedProject>,
}

#[derive(Deserialize)]
struct IssuedProject {
    name: String,
}

/// Issues tokens with the password authentication method.
///
/// Owns its own `reqwest::Client` so that token issuance never goes through
/// the session it refreshes.
#[derive(Clone)]
pub struct PasswordIssuer {
    client: reqwest::Client,
    identity_endpoint: EndpointUrl,
    username: String,
    password: String,
    user_domain: String,
    project: Option<String>,
    project_domain: String,
}

impl PasswordIssuer {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> PasswordIssuerBuilder {
        PasswordIssuerBuilder::default()
    }

    /// Returns the identity endpoint tokens are requested from.
    #[must_use]
    pub const fn identity_endpoint(&self) -> &EndpointUrl {
        &self.identity_endpoint
    }

    /// Requests a new token from the identity service.
    ///
    /// # Errors
    ///
    /// - [`AuthError::IssuerUnreachable`] if the request could not be sent
    /// - [`AuthError::IssuerRejected`] for any non-2xx answer
    /// - [`AuthError::InvalidIssuerResponse`] if the token header or body is missing
    pub async fn issue(&self) -> Result<Token, AuthError> {
        let url = self.identity_endpoint.join("auth/tokens");
        let body = IssueRequest {
            auth: AuthDocument {
                identity: Identity {
                    methods: ["password"],
                    password: PasswordMethod {
                        user: User {
                            name: &self.username,
                            password: &self.password,
                            domain: NamedRef {
                                name: &self.user_domain,
                            },
                        },
                    },
                },
                scope: self.project.as_deref().map(|name| Scope {
                    project: ProjectRef {
                        name,
                        domain: NamedRef {
                            name: &self.project_domain,
                        },
                    },
                }),
            },
        };

        tracing::debug!(url = %url, user = %self.username, "Requesting token");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::IssuerUnreachable {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::IssuerRejected { status, message });
        }

        let id = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .ok_or_else(|| AuthError::InvalidIssuerResponse {
                reason: format!("missing {SUBJECT_TOKEN_HEADER} header"),
            })?;

        let issued: IssueResponse =
            response
                .json()
                .await
                .map_err(|e| AuthError::InvalidIssuerResponse {
                    reason: format!("Failed to parse token response: {e}"),
                })?;

        let mut token = Token::new(id);
        token.expires_at = issued.token.expires_at;
        token.scope = issued.token.project.map(|p| p.name);
        Ok(token)
    }
}

impl Reauthenticator for PasswordIssuer {
    fn reauthenticate(&self) -> ReauthFuture<'_> {
        Box::pin(self.issue())
    }
}

impl fmt::Debug for PasswordIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordIssuer")
            .field("identity_endpoint", &self.identity_endpoint)
            .field("username", &self.username)
            .field("password", &"*****")
            .field("user_domain", &self.user_domain)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PasswordIssuer`].
///
/// `identity_endpoint`, `username` and `password` are required. Domains
/// default to `Default`.
#[derive(Default)]
pub struct PasswordIssuerBuilder {
    client: Option<reqwest::Client>,
    identity_endpoint: Option<EndpointUrl>,
    username: Option<String>,
    password: Option<String>,
    user_domain: Option<String>,
    project: Option<String>,
    project_domain: Option<String>,
}

impl PasswordIssuerBuilder {
    /// Sets the identity endpoint, e.g. `https://keystone.example.com/v3`.
    #[must_use]
    pub fn identity_endpoint(mut self, endpoint: EndpointUrl) -> Self {
        self.identity_endpoint = Some(endpoint);
        self
    }

    /// Sets the user name.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the domain the user belongs to.
    #[must_use]
    pub fn user_domain(mut self, domain: impl Into<String>) -> Self {
        self.user_domain = Some(domain.into());
        self
    }

    /// Scopes issued tokens to a project.
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the domain of the scoped project.
    #[must_use]
    pub fn project_domain(mut self, domain: impl Into<String>) -> Self {
        self.project_domain = Some(domain.into());
        self
    }

    /// Uses a caller-supplied transport instead of a new one.
    #[must_use]
    pub fn transport(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the issuer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if a required field is unset.
    pub fn build(self) -> Result<PasswordIssuer, ConfigError> {
        let identity_endpoint = self
            .identity_endpoint
            .ok_or(ConfigError::MissingRequiredField {
                field: "identity_endpoint",
            })?;
        let username = self
            .username
            .ok_or(ConfigError::MissingRequiredField { field: "username" })?;
        let password = self
            .password
            .ok_or(ConfigError::MissingRequiredField { field: "password" })?;

        Ok(PasswordIssuer {
            client: self.client.unwrap_or_default(),
            identity_endpoint,
            username,
            password,
            user_domain: self.user_domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            project: self.project,
            project_domain: self
                .project_domain
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
        })
    }
}
