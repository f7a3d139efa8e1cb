//! Push-notification credential store and dispatcher for mini apps.
//!
//! This crate is the **server-side notification layer** of a
//! Farcaster/Base mini app: it remembers the per-user, per-client-app
//! credentials a hosting client issues when a user enables notifications,
//! and sends notifications through them, one POST at a time.
//!
//! ## Guarantees
//! - At most one credential per `(fid, appFid)` pair; last writer wins
//! - Exactly one outbound HTTP call per `send`, and none at all for a
//!   recipient with no stored credential
//! - Every send resolves to a closed outcome set; nothing panics across
//!   the public boundary
//! - "Credential absent" and "store unreachable" are never conflated
//!
//! ## Non-Guarantees
//! - No delivery retries or backoff (callers layer those on top)
//! - No ordering between concurrent sends, even to the same recipient
//! - The in-memory store does not survive restarts and is single-process
//!
//! Webhook signature verification is deliberately out of scope: callers
//! hand this crate *already verified* platform events.

mod dispatcher;
mod error;
mod game;
mod store;
mod types;
mod webhook;

#[cfg(feature = "redis")]
mod store_redis;

pub use dispatcher::{BatchReport, Dispatcher, DispatcherConfig};
pub use error::{FailureReason, SendOutcome, StoreError};
pub use game::{
    notify_achievement,
    notify_all,
    notify_construction_blocked,
    notify_daily_reminder,
    notify_facility_built,
    notify_resources_ready,
};
pub use store::{credential_key, CredentialStore, InMemoryStore};
pub use types::{
    AppFid,
    Fid,
    Notification,
    NotificationCredential,
    NotificationPayload,
    SendNotificationResponse,
    SendNotificationResult,
};
pub use webhook::{NotificationDetails, WebhookEvent};

#[cfg(feature = "redis")]
pub use store_redis::{select_store, KvConfig, RedisStore};
