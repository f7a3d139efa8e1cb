use serde::{Deserialize, Serialize};

use crate::dispatcher::{metric_inc, Dispatcher};
use crate::error::{SendOutcome, StoreError};
use crate::store::CredentialStore;
use crate::types::{AppFid, Fid, Notification};

/// Credential payload carried by platform lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDetails {
    pub url: String,
    pub token: String,
}

/// Platform lifecycle events, as delivered by the hosting client's
/// webhook after the caller has verified the event signature.
///
/// Serde shape matches the platform wire format, e.g.
/// `{"event":"notifications_enabled","notificationDetails":{...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WebhookEvent {
    /// The user added the mini app to their client. Carries credentials
    /// only when the client granted notification permission with the
    /// add.
    MiniappAdded {
        #[serde(
            rename = "notificationDetails",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        notification_details: Option<NotificationDetails>,
    },

    /// The user removed the mini app; its credential is revoked.
    MiniappRemoved,

    /// The user (re-)enabled notifications; always carries fresh
    /// credentials (token rotation overwrites in place).
    NotificationsEnabled {
        #[serde(rename = "notificationDetails")]
        notification_details: NotificationDetails,
    },

    /// The user disabled notifications; the credential is revoked.
    NotificationsDisabled,
}

impl Dispatcher {
    /// Apply a verified platform lifecycle event to the credential
    /// store, sending the welcome or confirmation notification where
    /// the platform flow expects one.
    ///
    /// Returns the outcome of that notification, or `None` for events
    /// that do not trigger one. A failed confirmation send does not
    /// undo the stored credential. This method trusts its caller:
    /// signature verification must happen before the event gets here.
    pub async fn apply_webhook_event(
        &self,
        fid: Fid,
        app_fid: AppFid,
        event: &WebhookEvent,
    ) -> Result<Option<SendOutcome>, StoreError> {
        match event {
            WebhookEvent::MiniappAdded {
                notification_details: Some(details),
            } => {
                self.store.set(fid, app_fid, &details.url, &details.token).await?;
                metric_inc("notify.credentials.stored");

                let welcome = Notification::new(
                    format!("Welcome to {}", self.config.app_name),
                    "Mini app is now added to your client",
                );
                Ok(Some(self.send(fid, app_fid, &welcome).await))
            }

            // Added without a notification grant: nothing to store yet.
            WebhookEvent::MiniappAdded {
                notification_details: None,
            } => Ok(None),

            WebhookEvent::NotificationsEnabled {
                notification_details,
            } => {
                self.store
                    .set(
                        fid,
                        app_fid,
                        &notification_details.url,
                        &notification_details.token,
                    )
                    .await?;
                metric_inc("notify.credentials.stored");

                let confirmation =
                    Notification::new("Ding ding ding", "Notifications are now enabled");
                Ok(Some(self.send(fid, app_fid, &confirmation).await))
            }

            WebhookEvent::MiniappRemoved | WebhookEvent::NotificationsDisabled => {
                self.store.delete(fid, app_fid).await?;
                metric_inc("notify.credentials.deleted");
                Ok(None)
            }
        }
    }
}
