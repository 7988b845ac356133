use crate::error::MineSkinError;
use crate::response::{ApiError, SkinResponse};
use crate::SkinVariant;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

const DEFAULT_API_URL: &str = "https://api.mineskin.org";
const USER_AGENT: &str = "LibsDisguises";

/// Connect and read budget for a single API call.
const HTTP_TIMEOUT: Duration = Duration::from_secs(19);

/// Cooldown assumed when the server does not advertise one.
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Safety margin added on top of whatever the server asked for.
const COOLDOWN_MARGIN: Duration = Duration::from_secs(1);

/// What a request was built from; decides which error category a 400 or a
/// transport timeout falls into.
#[derive(Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Url,
    File,
    User,
}

enum Payload {
    Url(String),
    File { name: String, bytes: Vec<u8> },
}

/// Client for the MineSkin generate endpoints.
///
/// All generate calls go through a single-flight lock: at most one request is
/// on the wire per client instance, and each call sleeps out the cooldown the
/// previous response advertised before sending. Share one instance (behind an
/// `Arc`) across tasks; waiters suspend on the lock in whatever order the
/// runtime grants it.
pub struct MineSkinClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    debugging: bool,
    request_timeout: Duration,
    flight: Mutex<()>,
    next_request_at: std::sync::Mutex<Instant>,
}

impl MineSkinClient {
    /// Client against the public `api.mineskin.org` instance.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL)
    }

    /// Client against a different instance (self-hosted MineSkin, or a mock
    /// server in tests). Trailing slashes are stripped.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: None,
            debugging: false,
            request_timeout: HTTP_TIMEOUT,
            flight: Mutex::new(()),
            next_request_at: std::sync::Mutex::new(Instant::now()),
        }
    }

    /// Override the per-request time budget (19s by default).
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Attach a MineSkin API key; it is sent as a `key=` query parameter on
    /// every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn set_api_key(&mut self, key: Option<String>) {
        self.api_key = key;
    }

    pub fn is_debugging(&self) -> bool {
        self.debugging
    }

    /// Enable per-request debug logging (request source, status codes, raw
    /// bodies) through the `log` facade.
    pub fn set_debugging(&mut self, debugging: bool) {
        self.debugging = debugging;
    }

    /// True while a request is executing (or a caller is sleeping out the
    /// cooldown inside the lock).
    pub fn is_busy(&self) -> bool {
        self.flight.try_lock().is_err()
    }

    /// Ceiling of the remaining cooldown in seconds, 0 if none.
    pub fn seconds_until_next_request(&self) -> u64 {
        let at = *self.next_request_at.lock().unwrap();
        let now = Instant::now();

        if at <= now {
            return 0;
        }

        (at - now).as_secs_f64().ceil() as u64
    }

    /// Generate a skin from an image the service fetches itself.
    pub async fn generate_from_url(
        &self,
        url: impl Into<String>,
        variant: SkinVariant,
    ) -> Result<SkinResponse, MineSkinError> {
        self.submit(Payload::Url(url.into()), variant).await
    }

    /// Generate a skin by uploading a PNG from disk.
    pub async fn generate_from_file(
        &self,
        path: impl AsRef<Path>,
        variant: SkinVariant,
    ) -> Result<SkinResponse, MineSkinError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "skin.png".to_string());

        self.submit(Payload::File { name, bytes }, variant).await
    }

    /// Generate a skin from an existing Minecraft account's current texture.
    ///
    /// A 400 from the service maps to [`MineSkinError::InvalidUuid`]; other
    /// failures map to the same categories as the image paths.
    pub async fn generate_from_uuid(
        &self,
        uuid: Uuid,
        variant: SkinVariant,
    ) -> Result<SkinResponse, MineSkinError> {
        let _guard = self.flight.lock().await;

        self.trace(format_args!("grabbing a skin for account {uuid}"));
        self.pause_for_cooldown().await;

        let mut cooldown = DEFAULT_COOLDOWN;
        let result = self.fetch_user(uuid, variant, &mut cooldown).await;
        // Stored on every exit path, like the lock release.
        self.store_cooldown(cooldown);
        result
    }

    async fn submit(
        &self,
        payload: Payload,
        variant: SkinVariant,
    ) -> Result<SkinResponse, MineSkinError> {
        let _guard = self.flight.lock().await;

        match &payload {
            Payload::Url(url) => self.trace(format_args!("grabbing a skin from url '{url}'")),
            Payload::File { name, .. } => {
                self.trace(format_args!("grabbing a skin from file '{name}'"))
            }
        }

        if self.api_key.is_some() {
            self.trace(format_args!("using a MineSkin api key"));
        }

        self.pause_for_cooldown().await;

        let mut cooldown = DEFAULT_COOLDOWN;
        let result = self.post_generate(payload, variant, &mut cooldown).await;
        self.store_cooldown(cooldown);
        result
    }

    async fn post_generate(
        &self,
        payload: Payload,
        variant: SkinVariant,
        cooldown: &mut Duration,
    ) -> Result<SkinResponse, MineSkinError> {
        let (path, kind) = match &payload {
            Payload::Url(_) => ("/generate/url", RequestKind::Url),
            Payload::File { .. } => ("/generate/upload", RequestKind::File),
        };

        let mut form = Form::new().text("visibility", "1");

        form = match payload {
            Payload::Url(url) => form.text("url", url),
            Payload::File { name, bytes } => form.part(
                "file",
                Part::bytes(bytes).file_name(name).mime_str("image/png")?,
            ),
        };

        if variant == SkinVariant::Slim {
            form = form.text("model", "slim");
        }

        let mut request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("User-Agent", USER_AGENT)
            .timeout(self.request_timeout)
            .multipart(form);

        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        self.dispatch(request, kind, cooldown).await
    }

    async fn fetch_user(
        &self,
        uuid: Uuid,
        variant: SkinVariant,
        cooldown: &mut Duration,
    ) -> Result<SkinResponse, MineSkinError> {
        let mut request = self
            .http
            .get(format!("{}/generate/user/:{}", self.base_url, uuid))
            .header("User-Agent", USER_AGENT)
            .timeout(self.request_timeout);

        if variant == SkinVariant::Slim {
            request = request.query(&[("model", "slim")]);
        }

        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        self.dispatch(request, RequestKind::User, cooldown).await
    }

    /// Send the request and map the response onto the error categories.
    /// On success, `cooldown` is replaced with whatever delay the server
    /// advertised for the next call.
    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        kind: RequestKind,
        cooldown: &mut Duration,
    ) -> Result<SkinResponse, MineSkinError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Err(self.transport_error(err, kind)),
        };

        let status = response.status();
        self.trace(format_args!("received status code: {}", status.as_u16()));

        match status.as_u16() {
            500 => {
                let body = response.text().await.unwrap_or_default();
                self.trace(format_args!("received error: {body}"));

                match serde_json::from_str::<ApiError>(&body) {
                    Ok(api) => Err(categorize_api_error(api)),
                    Err(err) => {
                        warn!("[MineSkin] undecodable error body: {err}");
                        Err(MineSkinError::Failed(format!(
                            "undecodable error response: {body}"
                        )))
                    }
                }
            }
            400 => Err(match kind {
                RequestKind::Url => MineSkinError::BadUrl,
                RequestKind::File => MineSkinError::BadFile,
                RequestKind::User => MineSkinError::InvalidUuid,
            }),
            429 => Err(MineSkinError::TooFast),
            code @ (524 | 408 | 504 | 599) => {
                if self.api_key.is_some() && code == 504 {
                    Err(MineSkinError::ApiKeyTimeout)
                } else {
                    Err(MineSkinError::Timeout)
                }
            }
            _ if status.is_success() => {
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(err) => return Err(self.transport_error(err, kind)),
                };

                self.trace(format_args!("received: {body}"));

                let skin: SkinResponse = serde_json::from_str(&body).map_err(|err| {
                    warn!("[MineSkin] undecodable response body: {err}");
                    MineSkinError::Failed(format!("undecodable response: {err}"))
                })?;

                *cooldown = skin
                    .next_request
                    .map(advertised_cooldown)
                    .unwrap_or(DEFAULT_COOLDOWN);

                Ok(skin)
            }
            other => {
                warn!("[MineSkin] unexpected status {other} from the skin service");
                Err(MineSkinError::Failed(format!("unexpected status {status}")))
            }
        }
    }

    fn transport_error(&self, err: reqwest::Error, kind: RequestKind) -> MineSkinError {
        if err.is_timeout() {
            self.trace(format_args!("request timed out: {err}"));

            return match kind {
                RequestKind::Url => MineSkinError::ImageTimeout,
                RequestKind::File | RequestKind::User => MineSkinError::Timeout,
            };
        }

        warn!("[MineSkin] failed to reach the skin service: {err}");
        MineSkinError::Request(err)
    }

    async fn pause_for_cooldown(&self) {
        let wait = {
            let at = *self.next_request_at.lock().unwrap();
            at.saturating_duration_since(Instant::now())
        };

        if !wait.is_zero() {
            self.trace(format_args!(
                "sleeping for {}ms before calling the API due to a recent request",
                wait.as_millis()
            ));
            tokio::time::sleep(wait).await;
        }
    }

    fn store_cooldown(&self, cooldown: Duration) {
        *self.next_request_at.lock().unwrap() = Instant::now() + cooldown + COOLDOWN_MARGIN;
    }

    fn trace(&self, args: std::fmt::Arguments<'_>) {
        if self.debugging {
            debug!("[MineSkin] {args}");
        }
    }
}

impl Default for MineSkinClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map the embedded code of a 500 body onto an error category.
fn categorize_api_error(api: ApiError) -> MineSkinError {
    match api.code {
        403 => MineSkinError::Forbidden { code: api.code },
        404 => MineSkinError::NotFound { code: api.code },
        408 | 504 | 599 => MineSkinError::ServiceTimeout { code: api.code },
        _ => MineSkinError::ImageProcessing {
            code: api.code,
            message: api.error,
        },
    }
}

/// Advertised `nextRequest` values come straight off the wire; reject
/// anything that would not make a valid `Duration`. Values too large for a
/// `Duration` fall back to the default cooldown instead of being trusted.
fn advertised_cooldown(seconds: f64) -> Duration {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Duration::ZERO;
    }

    Duration::try_from_secs_f64(seconds).unwrap_or(DEFAULT_COOLDOWN)
}
