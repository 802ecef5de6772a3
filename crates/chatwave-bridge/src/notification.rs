//! # Notification interception
//!
//! The page's notification constructor is replaced with a shim. The shim
//! pulls title, body and icon out of the call, hands the page a disabled
//! handle so its own notification never shows, and loads the icon in the
//! background. Once the icon is rasterized to a PNG data URL the payload is
//! sent to the native side. A failed icon load drops the notification.

use std::io::Cursor;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chatwave_core::{NotificationPayload, OutboundMessage};
use chatwave_dom::{NotificationHandle, NotificationRequest, Window};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use url::Url;

/// Errors from loading or converting a notification icon.
#[derive(Error, Debug)]
pub enum IconError {
    #[error("Invalid icon URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch icon: {0}")]
    Fetch(String),

    #[error("Icon request returned status {0}")]
    Status(u16),

    #[error("Failed to decode icon: {0}")]
    Decode(String),

    #[error("Failed to encode icon: {0}")]
    Encode(String),
}

impl From<reqwest::Error> for IconError {
    fn from(e: reqwest::Error) -> Self {
        IconError::Fetch(e.to_string())
    }
}

/// Loads raw icon bytes.
#[async_trait]
pub trait IconFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, IconError>;
}

/// Fetches icons over HTTP(S), decoding `data:` URLs in place.
pub struct HttpIconFetcher {
    client: reqwest::Client,
}

impl HttpIconFetcher {
    pub fn new(timeout: Duration) -> Result<Self, IconError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IconError::Fetch(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl IconFetcher for HttpIconFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, IconError> {
        if url.starts_with("data:") {
            return decode_data_url(url);
        }

        let parsed = Url::parse(url).map_err(|e| IconError::InvalidUrl(e.to_string()))?;
        debug!(url = %parsed, "Fetching notification icon");

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IconError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Decode a `data:[<mediatype>][;base64],<data>` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, IconError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| IconError::InvalidUrl("not a data URL".into()))?;
    let (metadata, data) = rest
        .split_once(',')
        .ok_or_else(|| IconError::InvalidUrl("Invalid data URL format".into()))?;

    if metadata.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| IconError::Decode(format!("Base64 decode error: {}", e)))
    } else {
        Ok(urlencoding::decode_binary(data.as_bytes()).into_owned())
    }
}

/// Decode an icon at its natural size and re-encode it as a PNG data URL.
pub fn rasterize(bytes: &[u8]) -> Result<String, IconError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| IconError::Decode(e.to_string()))?;
    let rgba = image::DynamicImage::ImageRgba8(decoded.to_rgba8());

    let mut png = Cursor::new(Vec::new());
    rgba.write_to(&mut png, image::ImageFormat::Png)
        .map_err(|e| IconError::Encode(e.to_string()))?;

    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png.into_inner())
    ))
}

/// File name of the icon: the last path segment, without the query.
///
/// Read from the raw string so the name matches the page's own `img src`
/// byte for byte. `data:` URLs have no name.
pub fn image_name_from_icon_url(icon: &str) -> String {
    if icon
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
    {
        return String::new();
    }

    let reference = icon.split(['?', '#']).next().unwrap_or_default();
    let path = match reference.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |start| &rest[start..]),
        None => reference,
    };
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Notification fields extracted from a constructor call, before the icon loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNotification {
    pub title: String,
    pub body: String,
    pub silent: bool,
    pub icon_url: String,
    pub image_name: String,
}

impl PendingNotification {
    fn into_payload(self, icon_data_url: String) -> NotificationPayload {
        NotificationPayload {
            title: self.title,
            body: self.body,
            silent: self.silent,
            icon_data_url,
            image_name: self.image_name,
        }
    }
}

/// Extract the payload fields. `None` when there is no icon to load.
pub fn intercept(request: &NotificationRequest) -> Option<PendingNotification> {
    let icon_url = request.options.icon.clone().filter(|icon| !icon.is_empty())?;
    Some(PendingNotification {
        title: request.title.to_text(),
        body: request
            .options
            .body
            .as_ref()
            .map(|body| body.to_text())
            .unwrap_or_default(),
        silent: request.options.silent,
        image_name: image_name_from_icon_url(&icon_url),
        icon_url,
    })
}

/// Load and rasterize the icon, then build the outbound message.
pub async fn complete(
    pending: PendingNotification,
    fetcher: &dyn IconFetcher,
) -> Result<OutboundMessage, IconError> {
    let bytes = fetcher.fetch(&pending.icon_url).await?;
    let icon_data_url = rasterize(&bytes)?;
    Ok(OutboundMessage::NotificationReady {
        payload: pending.into_payload(icon_data_url),
    })
}

/// Stands in for the page's notification constructor.
pub struct NotificationInterceptor {
    fetcher: Arc<dyn IconFetcher>,
    outbound: UnboundedSender<OutboundMessage>,
}

impl NotificationInterceptor {
    pub fn new(fetcher: Arc<dyn IconFetcher>, outbound: UnboundedSender<OutboundMessage>) -> Self {
        Self { fetcher, outbound }
    }

    /// Replace the window's constructor with this interceptor.
    pub fn install(self, window: &Window) {
        let interceptor = Rc::new(self);
        window.replace_notification_constructor(Rc::new(move |request: &NotificationRequest| {
            interceptor.handle(request)
        }));
        debug!("Notification constructor replaced");
    }

    /// Start loading the icon and hand the page a disabled handle.
    pub fn handle(&self, request: &NotificationRequest) -> NotificationHandle {
        let Some(pending) = intercept(request) else {
            warn!("Notification without icon dropped");
            return NotificationHandle::Disabled;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(icon = %pending.icon_url, "No runtime to load icon; notification dropped");
            return NotificationHandle::Disabled;
        };

        let fetcher = Arc::clone(&self.fetcher);
        let outbound = self.outbound.clone();
        runtime.spawn(async move {
            let icon_url = pending.icon_url.clone();
            match complete(pending, fetcher.as_ref()).await {
                Ok(message) => {
                    info!(icon = %icon_url, "Notification ready");
                    if outbound.send(message).is_err() {
                        debug!("Outbound channel closed");
                    }
                }
                Err(e) => warn!(icon = %icon_url, error = %e, "Icon load failed; notification dropped"),
            }
        });

        NotificationHandle::Disabled
    }
}
