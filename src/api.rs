// API client module: the `Transport` seam the command shell talks through,
// plus a small blocking HTTP implementation of it.

use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::model::{Credentials, Session};

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "user_info";

/// Result of a successful `/registration` or `/authentication` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthReply {
    pub token: String,
    pub body: Vec<u8>,
}

/// Everything the shell needs from the network.
///
/// `get` and `post` attach the session token as the [`SESSION_COOKIE`]
/// cookie and merge the caller's headers. Any non-2xx answer is an error.
pub trait Transport {
    fn register(&self, credentials: &Credentials) -> Result<AuthReply>;

    fn authenticate(&self, credentials: &Credentials) -> Result<AuthReply>;

    fn get(&self, session: &Session, path: &str, headers: HeaderMap) -> Result<Vec<u8>>;

    fn post(
        &self,
        session: &Session,
        path: &str,
        body: &serde_json::Value,
        headers: HeaderMap,
    ) -> Result<Vec<u8>>;

    /// Unauthenticated liveness probe. Returns the status line.
    fn ping(&self) -> Result<String>;
}

/// Blocking `reqwest` transport bound to one server base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    progress: bool,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        // The cookie jar stays off: the session token is sent explicitly
        // from the caller's `Session`.
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            progress: false,
        })
    }

    /// Show a spinner on the terminal while a request is in flight.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    }

    fn send(&self, path: &str, request: RequestBuilder) -> Result<Response> {
        let spinner = self.spinner(path);
        let result = request.send();
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let response = result.map_err(|source| ClientError::Transport {
            path: path.to_string(),
            source,
        })?;
        debug!(path, status = %response.status(), "response received");
        Ok(response)
    }

    /// Post credentials and pull the session token out of `Set-Cookie`.
    fn establish(&self, path: &str, credentials: &Credentials) -> Result<AuthReply> {
        let request = self.client.post(self.url(path)).json(credentials);
        let response = self.send(path, request)?;

        let token = response
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string());
        let status = response.status();
        let body = read_body(path, response)?;

        if !status.is_success() {
            return Err(ClientError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        let token = token.ok_or_else(|| ClientError::MissingCookie(SESSION_COOKIE.to_string()))?;
        Ok(AuthReply { token, body })
    }

    fn with_session(session: &Session, mut headers: HeaderMap) -> Result<HeaderMap> {
        let cookie = format!("{}={}", SESSION_COOKIE, session.token());
        let value = HeaderValue::from_str(&cookie).map_err(|e| ClientError::Header {
            name: COOKIE.to_string(),
            reason: e.to_string(),
        })?;
        headers.insert(COOKIE, value);
        Ok(headers)
    }
}

impl Transport for HttpTransport {
    fn register(&self, credentials: &Credentials) -> Result<AuthReply> {
        self.establish("registration", credentials)
    }

    fn authenticate(&self, credentials: &Credentials) -> Result<AuthReply> {
        self.establish("authentication", credentials)
    }

    fn get(&self, session: &Session, path: &str, headers: HeaderMap) -> Result<Vec<u8>> {
        let headers = Self::with_session(session, headers)?;
        let request = self.client.get(self.url(path)).headers(headers);
        let response = self.send(path, request)?;
        checked_body(path, response)
    }

    fn post(
        &self,
        session: &Session,
        path: &str,
        body: &serde_json::Value,
        headers: HeaderMap,
    ) -> Result<Vec<u8>> {
        let mut headers = Self::with_session(session, headers)?;
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let payload = serde_json::to_vec(body).map_err(ClientError::Encode)?;
        let request = self.client.post(self.url(path)).headers(headers).body(payload);
        let response = self.send(path, request)?;
        checked_body(path, response)
    }

    fn ping(&self) -> Result<String> {
        let request = self.client.get(self.url("ping"));
        let response = self.send("ping", request)?;
        Ok(status_line(response.status()))
    }
}

fn read_body(path: &str, response: Response) -> Result<Vec<u8>> {
    response
        .bytes()
        .map(|bytes| bytes.to_vec())
        .map_err(|source| ClientError::Transport {
            path: path.to_string(),
            source,
        })
}

/// Body of a data call, or the matching error for a non-2xx status.
fn checked_body(path: &str, response: Response) -> Result<Vec<u8>> {
    let status = response.status();
    let body = read_body(path, response)?;
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized {
            path: path.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ClientError::Status {
            path: path.to_string(),
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body)
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
