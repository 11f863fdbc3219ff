//! HTTP transport for the chat endpoint.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{ChatReply, ChatRequest, ChatTransport, error_description};
use crate::config::AppConfig;
use crate::cookie::CookieJar;
use crate::error::{Error, Result};

/// JSON-over-HTTP transport with CSRF handling.
///
/// # Example
///
/// ```rust,no_run
/// use chat_widget::transport::{ChatRequest, ChatTransport, HttpTransport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new("http://localhost:8000", "/api/chat/")?
///     .with_cookies("csrftoken=XYZ");
///
/// let reply = transport
///     .send(&ChatRequest { message: "Hello!".into() })
///     .await?;
/// println!("{}", reply.response);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    page_url: Url,
    chat_url: Url,
    http: reqwest::Client,
    csrf_cookie: String,
    csrf_header: String,
    cookies: RwLock<CookieJar>,
}

impl HttpTransport {
    /// Create a transport for `chat_path` under `base_url`.
    ///
    /// Defaults to the `csrftoken` cookie echoed in an `X-CSRFToken` header.
    pub fn new(base_url: impl AsRef<str>, chat_path: &str) -> Result<Self> {
        Self::with_client(base_url, chat_path, reqwest::Client::new())
    }

    /// Create a transport with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        chat_path: &str,
        http: reqwest::Client,
    ) -> Result<Self> {
        let page_url = Url::parse(base_url.as_ref())?;
        let chat_url = page_url.join(chat_path)?;
        Ok(Self {
            page_url,
            chat_url,
            http,
            csrf_cookie: "csrftoken".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            cookies: RwLock::new(CookieJar::new()),
        })
    }

    /// Build a transport from loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(
            Self::new(&config.endpoint.base_url, &config.endpoint.chat_path)?
                .with_csrf_names(&config.csrf.cookie_name, &config.csrf.header_name)
                .with_cookies(&config.csrf.cookies),
        )
    }

    /// Override the CSRF cookie and header names.
    #[must_use]
    pub fn with_csrf_names(mut self, cookie: &str, header: &str) -> Self {
        self.csrf_cookie = cookie.to_string();
        self.csrf_header = header.to_string();
        self
    }

    /// Seed the cookie jar from a `"k=v; k2=v2"` string.
    #[must_use]
    pub fn with_cookies(self, cookie_string: &str) -> Self {
        Self {
            cookies: RwLock::new(CookieJar::parse(cookie_string)),
            ..self
        }
    }

    /// URL the chat POST goes to.
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    /// Current CSRF token, if the jar has one.
    pub fn csrf_token(&self) -> Option<String> {
        self.jar().get(&self.csrf_cookie)
    }

    /// Snapshot of the cookie jar.
    pub fn cookies(&self) -> CookieJar {
        self.jar().clone()
    }

    /// Fetch the page once so the server can issue its cookies.
    ///
    /// Returns whether a CSRF token is available afterwards.
    pub async fn bootstrap(&self) -> Result<bool> {
        let response = self
            .http
            .get(self.page_url.clone())
            .headers(self.cookie_headers())
            .send()
            .await?;
        self.absorb(response.headers());

        let found = self.csrf_token().is_some();
        debug!(
            name: "chat.csrf.bootstrap",
            url = %self.page_url,
            status = response.status().as_u16(),
            token_found = found,
            "Fetched page for cookies"
        );
        Ok(found)
    }

    fn jar(&self) -> std::sync::RwLockReadGuard<'_, CookieJar> {
        self.cookies
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn cookie_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let cookie_string = self.jar().cookie_string();
        if !cookie_string.is_empty() {
            match cookie_string.parse() {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(err) => {
                    warn!(
                        name: "chat.cookie.invalid",
                        error = %err,
                        cookies = self.jar().len(),
                        "Cookie jar is not a valid header value; sending without cookies"
                    );
                }
            }
        }
        headers
    }

    fn absorb(&self, headers: &HeaderMap) {
        let mut jar = self
            .cookies
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for value in headers.get_all(SET_COOKIE) {
            if let Ok(value) = value.to_str() {
                jar.absorb_set_cookie(value);
            }
        }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
        let mut builder = self
            .http
            .post(self.chat_url.clone())
            .headers(self.cookie_headers())
            .json(request);

        match self.csrf_token() {
            Some(token) => builder = builder.header(self.csrf_header.as_str(), token),
            None => warn!(
                name: "chat.csrf.missing",
                cookie = %self.csrf_cookie,
                "No CSRF cookie; sending without token header"
            ),
        }

        let response = builder.send().await?;
        self.absorb(response.headers());

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            Ok(serde_json::from_slice(&body)?)
        } else {
            let value: Value = serde_json::from_slice(&body)?;
            Err(Error::Api {
                status: status.as_u16(),
                message: error_description(&value),
            })
        }
    }
}
