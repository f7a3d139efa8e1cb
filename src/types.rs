use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identity of a user on the host social network.
///
/// This is a strongly-typed wrapper to avoid accidental mixing
/// of user fids with other numeric identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fid(pub u64);

/// Numeric identity of the client application a user enabled
/// notifications from. The client app may differ from the hosting
/// platform itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppFid(pub u64);

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AppFid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Fid {
    fn from(value: u64) -> Self {
        Fid(value)
    }
}

impl From<u64> for AppFid {
    fn from(value: u64) -> Self {
        AppFid(value)
    }
}

/// Credential issued by a hosting client when a user enables
/// notifications, scoped to one `(fid, appFid)` pair.
///
/// Owned exclusively by the credential store; the dispatcher only
/// reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCredential {
    /// Endpoint the hosting client accepts notification POSTs on.
    pub url: String,

    /// Opaque bearer token, passed back on every send.
    pub token: String,

    /// Seconds since the epoch at the last write.
    pub updated_at_secs: u64,
}

/// Message content for a single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,

    /// Deep link opened when the user taps the notification.
    /// Falls back to the configured app home URL when unset.
    pub target_url: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            target_url: None,
        }
    }

    /// Set a custom deep link for this notification.
    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }
}

/// Body POSTed to a hosting client's notification endpoint.
///
/// `notification_id` is freshly generated per send so the receiving end
/// can deduplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub notification_id: String,
    pub title: String,
    pub body: String,
    pub target_url: String,
    pub tokens: Vec<String>,
}

/// Envelope a hosting client answers with on a 2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    #[serde(default)]
    pub result: SendNotificationResult,
}

/// Per-token receipt lists. A token listed in `rate_limited_tokens`
/// was throttled even though the HTTP layer reported success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResult {
    #[serde(default)]
    pub successful_tokens: Vec<String>,
    #[serde(default)]
    pub invalid_tokens: Vec<String>,
    #[serde(default)]
    pub rate_limited_tokens: Vec<String>,
}
