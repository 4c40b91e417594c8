//! Session context and the HTTP transport seam.
//!
//! The search endpoint only returns results for a client that has already
//! visited the main page in the same cookie session. The session is therefore
//! an explicit value: the main-page fetch produces it, and every later request
//! that should ride on it has to be handed it.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use url::Url;

use crate::portal::errors::PortalError;
use crate::utils::fmt_duration;

/// A cookie jar shared by every request made within one portal session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    jar: Arc<Jar>,
}

impl SessionContext {
    /// A fresh session with no cookies.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying jar, for wiring into an HTTP client.
    pub fn jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    /// Store a `Set-Cookie` style value as if `url` had returned it.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        self.jar.add_cookie_str(cookie, url);
    }

    /// The `Cookie` header this session would send to `url`, if any.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }

    /// Whether the session holds at least one cookie applicable to `url`.
    pub fn is_established_for(&self, url: &Url) -> bool {
        self.cookie_header(url).is_some_and(|c| !c.is_empty())
    }
}

/// Performs a GET and returns the body along with the session it ran in.
///
/// When `session` is `None` the request runs in a brand new session, which is
/// returned so the caller can continue it. Cookies set by the response land in
/// the returned session.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &Url,
        session: Option<&SessionContext>,
    ) -> Result<(String, SessionContext), PortalError>;
}

/// [`Transport`] backed by `reqwest`, with one client per session jar.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &Url,
        session: Option<&SessionContext>,
    ) -> Result<(String, SessionContext), PortalError> {
        let session = session.cloned().unwrap_or_default();

        let http = reqwest::Client::builder()
            .cookie_provider(session.jar())
            .user_agent(&self.user_agent)
            .build()?;

        let start = Instant::now();
        let response = http.get(url.clone()).send().await?.error_for_status()?;
        let status = response.status();
        let body = response.text().await?;

        debug!(
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            duration = fmt_duration(start.elapsed()),
            "GET completed"
        );

        Ok((body, session))
    }
}
