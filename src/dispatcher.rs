use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use uuid::Uuid;

use crate::error::{FailureReason, SendOutcome};
use crate::store::CredentialStore;
use crate::types::{AppFid, Fid, Notification, NotificationPayload, SendNotificationResponse};

#[cfg(feature = "metrics")]
pub(crate) fn metric_inc(name: &'static str) {
    metrics::increment_counter!(name);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn metric_inc(_name: &'static str) {}

#[cfg(feature = "tracing")]
pub(crate) fn trace_event(message: &'static str) {
    tracing::info!(message);
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn trace_event(_message: &'static str) {}

/// Dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Display name of the mini app, used in welcome/reminder copy.
    pub app_name: String,

    /// Home URL of the mini app; the default deep link for
    /// notifications that do not carry their own `target_url`.
    pub home_url: String,

    /// Deadline for a single POST to a notification endpoint.
    pub request_timeout: Duration,

    /// Maximum number of in-flight sends during a fan-out.
    pub max_concurrent_sends: usize,
}

impl DispatcherConfig {
    /// Create a config with default transport settings.
    ///
    /// Defaults:
    /// - request_timeout: 10 seconds
    /// - max_concurrent_sends: 100
    pub fn new(app_name: impl Into<String>, home_url: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            home_url: home_url.into(),
            request_timeout: Duration::from_secs(10),
            max_concurrent_sends: 100,
        }
    }

    /// Set a custom deadline for delivery attempts.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the fan-out concurrency cap.
    pub fn with_max_concurrent_sends(mut self, max_concurrent_sends: usize) -> Self {
        self.max_concurrent_sends = max_concurrent_sends;
        self
    }
}

/// Sends notifications through stored credentials, one POST per call.
///
/// Every send is independent: no queue, no retries, no shared mutable
/// state beyond the credential store, which the dispatcher only reads.
/// Callers wanting retry or backoff layer it on top; keeping each call
/// single-shot keeps failure attribution simple.
pub struct Dispatcher {
    pub(crate) store: Arc<dyn CredentialStore>,
    http_client: reqwest::Client,
    pub(crate) config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn CredentialStore>, config: DispatcherConfig) -> Self {
        Self {
            store,
            http_client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Send one notification to one recipient.
    ///
    /// Makes exactly one outbound POST, and none at all when the
    /// recipient has no stored credential. All expected conditions come
    /// back as a [`SendOutcome`]; nothing escapes the call boundary.
    /// A `RateLimited` or `Failed` outcome leaves the credential
    /// untouched — only platform disable events delete credentials.
    pub async fn send(
        &self,
        fid: Fid,
        app_fid: AppFid,
        notification: &Notification,
    ) -> SendOutcome {
        let credential = match self.store.get(fid, app_fid).await {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                metric_inc("notify.send.no_token");
                return SendOutcome::NoToken;
            }
            Err(err) => {
                metric_inc("notify.send.failed");
                return SendOutcome::Failed(FailureReason::Store(err));
            }
        };

        let payload = self.build_payload(notification, &credential.token);

        let response = self
            .http_client
            .post(&credential.url)
            .timeout(self.config.request_timeout)
            .json(&payload)
            .send()
            .await;

        let outcome = match response {
            Ok(response) => classify_response(response, &credential.token).await,
            Err(err) if err.is_timeout() => SendOutcome::Failed(FailureReason::Timeout),
            Err(err) => SendOutcome::Failed(FailureReason::Network {
                detail: err.to_string(),
            }),
        };

        match &outcome {
            SendOutcome::Success => {
                metric_inc("notify.send.success");
                trace_event("notify.send.success");
            }
            SendOutcome::RateLimited => metric_inc("notify.send.rate_limited"),
            SendOutcome::Failed(_) => metric_inc("notify.send.failed"),
            SendOutcome::NoToken => {}
        }

        outcome
    }

    /// Fan one message out to many recipients.
    ///
    /// Pure composition of independent [`send`](Self::send) calls with
    /// bounded concurrency. No partial-batch atomicity and no ordering
    /// guarantee between recipients; one recipient's failure never
    /// affects another's delivery.
    pub async fn send_many(
        &self,
        recipients: &[(Fid, AppFid)],
        notification: &Notification,
    ) -> BatchReport {
        let sends = recipients
            .iter()
            .map(|&(fid, app_fid)| self.send(fid, app_fid, notification));

        let outcomes = futures::stream::iter(sends)
            .buffered(self.config.max_concurrent_sends.max(1))
            .collect::<Vec<_>>()
            .await;

        BatchReport::from_outcomes(outcomes)
    }

    fn build_payload(&self, notification: &Notification, token: &str) -> NotificationPayload {
        NotificationPayload {
            notification_id: Uuid::new_v4().to_string(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            target_url: notification
                .target_url
                .clone()
                .unwrap_or_else(|| self.config.home_url.clone()),
            tokens: vec![token.to_string()],
        }
    }
}

/// Single classification point for endpoint responses.
///
/// A 429 status means rate limiting regardless of the body. Any other
/// non-2xx status preserves status and body for diagnostics. A 2xx body
/// must parse as the receipt envelope; a sent token listed in
/// `rateLimitedTokens` downgrades an HTTP-level success to
/// `RateLimited`.
async fn classify_response(response: reqwest::Response, token: &str) -> SendOutcome {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return SendOutcome::RateLimited;
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            return SendOutcome::Failed(FailureReason::Network {
                detail: err.to_string(),
            })
        }
    };

    if !status.is_success() {
        return SendOutcome::Failed(FailureReason::Status {
            status: status.as_u16(),
            body,
        });
    }

    match serde_json::from_str::<SendNotificationResponse>(&body) {
        Ok(receipt)
            if receipt
                .result
                .rate_limited_tokens
                .iter()
                .any(|t| t == token) =>
        {
            SendOutcome::RateLimited
        }
        Ok(_) => SendOutcome::Success,
        Err(err) => SendOutcome::Failed(FailureReason::InvalidResponse {
            detail: err.to_string(),
        }),
    }
}

/// Aggregate result of a fan-out.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Per-recipient outcomes, in the order the recipients were given.
    pub outcomes: Vec<SendOutcome>,

    pub success: usize,

    /// Recipients that never opted in. Not failures.
    pub no_token: usize,

    pub rate_limited: usize,

    pub failed: usize,
}

impl BatchReport {
    fn from_outcomes(outcomes: Vec<SendOutcome>) -> Self {
        let mut report = Self {
            outcomes: Vec::new(),
            success: 0,
            no_token: 0,
            rate_limited: 0,
            failed: 0,
        };

        for outcome in &outcomes {
            match outcome {
                SendOutcome::Success => report.success += 1,
                SendOutcome::NoToken => report.no_token += 1,
                SendOutcome::RateLimited => report.rate_limited += 1,
                SendOutcome::Failed(_) => report.failed += 1,
            }
        }

        report.outcomes = outcomes;
        report
    }

    /// Number of recipients attempted.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}
