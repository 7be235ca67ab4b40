//! [`AutomationSurface`] over the W3C WebDriver HTTP protocol.
//!
//! Works against chromedriver (the capabilities request Chrome) and any
//! Selenium endpoint that forwards to it. One [`WebDriverSurface`] owns
//! exactly one browser session.

mod error;
mod protocol;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use mapscout_core::ScrapeConfig;
use reqwest::{Client, Method, Url};
use serde_json::{json, Value};

pub use error::WebDriverError;
pub use protocol::ElementRef;

use crate::error::SurfaceError;
use crate::surface::AutomationSurface;

/// A live WebDriver session.
///
/// Use [`WebDriverSurface::connect`] with a [`ScrapeConfig`] or
/// [`WebDriverSurface::connect_to`] to point at a specific driver (a mock
/// server in tests).
#[derive(Debug)]
pub struct WebDriverSurface {
    client: Client,
    base_url: Url,
    session_id: String,
    /// Viewport point the pointer was last moved to; wheel scrolls start
    /// there.
    pointer: Mutex<Option<(i64, i64)>>,
    closed: AtomicBool,
}

impl WebDriverSurface {
    /// Starts a browser session on the driver named by `config.webdriver_url`.
    ///
    /// # Errors
    ///
    /// See [`WebDriverSurface::connect_to`].
    pub async fn connect(config: &ScrapeConfig) -> Result<Self, WebDriverError> {
        Self::connect_to(
            &config.webdriver_url,
            config.headless,
            config.webdriver_timeout_secs,
        )
        .await
    }

    /// Starts a browser session on the driver at `base_url`.
    ///
    /// # Errors
    ///
    /// - [`WebDriverError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`WebDriverError::Http`] if the driver is unreachable.
    /// - [`WebDriverError::SessionNotCreated`] if the driver refuses.
    /// - [`WebDriverError::Protocol`] if the reply carries no session id.
    pub async fn connect_to(
        base_url: &str,
        headless: bool,
        timeout_secs: u64,
    ) -> Result<Self, WebDriverError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Exactly one trailing slash, so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| WebDriverError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        let session_url = base
            .join("session")
            .map_err(|e| WebDriverError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        let response = client
            .post(session_url)
            .json(&protocol::new_session(headless))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| WebDriverError::Protocol(format!("HTTP {status}: {e}")))?;

        if let Some(err) = protocol::classify_error(&body) {
            let (SurfaceError::Session(detail) | SurfaceError::Operation(detail)) = err;
            return Err(WebDriverError::SessionNotCreated(detail));
        }
        if !status.is_success() {
            return Err(WebDriverError::Protocol(format!("HTTP {status}: {text}")));
        }

        let session_id = body
            .get("value")
            .and_then(|v| v.get("sessionId"))
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Protocol(format!("no sessionId in {body}")))?
            .to_owned();

        tracing::info!(session_id = %session_id, headless, "webdriver session started");

        Ok(Self {
            client,
            base_url: base,
            session_id,
            pointer: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn session_url(&self, path: &str) -> Result<Url, SurfaceError> {
        let relative = if path.is_empty() {
            format!("session/{}", self.session_id)
        } else {
            format!("session/{}/{path}", self.session_id)
        };
        self.base_url
            .join(&relative)
            .map_err(|e| SurfaceError::Operation(format!("bad command path '{relative}': {e}")))
    }

    /// Sends one command and returns the `value` member of the reply.
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, SurfaceError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SurfaceError::Session("session already closed".to_string()));
        }
        self.send(method, path, body).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, SurfaceError> {
        let url = self.session_url(path)?;
        tracing::debug!(%method, path, "webdriver command");

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        let parsed: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                SurfaceError::Operation(format!("HTTP {status}: unreadable response: {e}"))
            })?
        };

        if let Some(err) = protocol::classify_error(&parsed) {
            return Err(err);
        }
        if !status.is_success() {
            return Err(SurfaceError::Operation(format!("HTTP {status}: {text}")));
        }

        Ok(match parsed {
            Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
            other => other,
        })
    }

    async fn get(&self, path: &str) -> Result<Value, SurfaceError> {
        self.command(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, SurfaceError> {
        self.command(Method::POST, path, Some(body)).await
    }

    fn pointer(&self) -> Option<(i64, i64)> {
        *self.pointer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_pointer(&self, position: (i64, i64)) {
        *self.pointer.lock().unwrap_or_else(PoisonError::into_inner) = Some(position);
    }
}

/// Timeouts cost one call; any other transport failure means the driver is
/// gone.
fn transport_error(err: reqwest::Error) -> SurfaceError {
    if err.is_timeout() {
        SurfaceError::Operation(format!("request timed out: {err}"))
    } else {
        SurfaceError::Session(format!("transport failure: {err}"))
    }
}

fn xpath_query(selector: &str) -> Value {
    json!({ "using": "xpath", "value": selector })
}

impl AutomationSurface for WebDriverSurface {
    type Element = ElementRef;

    async fn navigate(&self, url: &str) -> Result<(), SurfaceError> {
        self.post("url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SurfaceError> {
        let value = self.get("url").await?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| SurfaceError::Operation(format!("expected URL string, got {value}")))
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), SurfaceError> {
        let target = self
            .find_all(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SurfaceError::Operation(format!("no such element: {selector}")))?;
        self.post(&format!("element/{}/clear", target.id()), json!({}))
            .await?;
        self.post(
            &format!("element/{}/value", target.id()),
            json!({ "text": text }),
        )
        .await?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), SurfaceError> {
        let code = protocol::key_code(key)?;
        self.post("actions", protocol::key_press(&code)).await?;
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize, SurfaceError> {
        Ok(self.find_all(selector).await?.len())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>, SurfaceError> {
        let value = self.post("elements", xpath_query(selector)).await?;
        protocol::element_list(&value)
    }

    async fn find_within(
        &self,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Vec<ElementRef>, SurfaceError> {
        let value = self
            .post(
                &format!("element/{}/elements", element.id()),
                xpath_query(selector),
            )
            .await?;
        protocol::element_list(&value)
    }

    async fn inner_text(&self, element: &ElementRef) -> Result<String, SurfaceError> {
        let value = self.get(&format!("element/{}/text", element.id())).await?;
        Ok(value.as_str().unwrap_or_default().to_owned())
    }

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, SurfaceError> {
        let value = self
            .get(&format!("element/{}/attribute/{name}", element.id()))
            .await?;
        Ok(value.as_str().map(str::to_owned))
    }

    async fn scroll(&self, delta_x: i64, delta_y: i64) -> Result<(), SurfaceError> {
        self.post(
            "actions",
            protocol::wheel_scroll(self.pointer(), delta_x, delta_y),
        )
        .await?;
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<(), SurfaceError> {
        self.post(&format!("element/{}/click", element.id()), json!({}))
            .await?;
        Ok(())
    }

    async fn hover(&self, element: &ElementRef) -> Result<(), SurfaceError> {
        self.post("actions", protocol::pointer_move(element))
            .await?;

        // Wheel scrolls start from where the pointer landed, which stays put
        // while the feed moves under it.
        match self.get(&format!("element/{}/rect", element.id())).await {
            Ok(rect) => match protocol::rect_centre(&rect) {
                Some(position) => self.set_pointer(position),
                None => tracing::warn!(%rect, "unusable element rect; scrolling from the corner"),
            },
            Err(err) if err.is_session() => return Err(err),
            Err(err) => tracing::warn!(error = %err, "could not read element rect"),
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), SurfaceError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.send(Method::DELETE, "", None).await?;
        tracing::info!(session_id = %self.session_id, "webdriver session closed");
        Ok(())
    }
}
