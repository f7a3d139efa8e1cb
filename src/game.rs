//! Game-event notification triggers.
//!
//! Thin wrappers mapping domain events to notification copy. Call these
//! from game logic when the corresponding event fires; each one is a
//! single [`Dispatcher::send`] underneath and returns its outcome.

use crate::dispatcher::{BatchReport, Dispatcher};
use crate::error::SendOutcome;
use crate::types::{AppFid, Fid, Notification};

/// Notify a player that a facility finished construction.
pub async fn notify_facility_built(
    dispatcher: &Dispatcher,
    fid: Fid,
    app_fid: AppFid,
    facility_name: &str,
) -> SendOutcome {
    dispatcher
        .send(
            fid,
            app_fid,
            &Notification::new("🏗️ Building Complete", format!("Your {} is ready!", facility_name)),
        )
        .await
}

/// Notify a player that resources are ready to collect.
pub async fn notify_resources_ready(
    dispatcher: &Dispatcher,
    fid: Fid,
    app_fid: AppFid,
    resource_type: &str,
    amount: u64,
) -> SendOutcome {
    dispatcher
        .send(
            fid,
            app_fid,
            &Notification::new(
                "💎 Resources Ready",
                format!("Collect {} {} now!", amount, resource_type),
            ),
        )
        .await
}

/// Notify a player that construction is blocked.
pub async fn notify_construction_blocked(
    dispatcher: &Dispatcher,
    fid: Fid,
    app_fid: AppFid,
    reason: &str,
) -> SendOutcome {
    dispatcher
        .send(
            fid,
            app_fid,
            &Notification::new("⚠️ Construction Blocked", reason),
        )
        .await
}

/// Daily come-back reminder.
pub async fn notify_daily_reminder(
    dispatcher: &Dispatcher,
    fid: Fid,
    app_fid: AppFid,
) -> SendOutcome {
    dispatcher
        .send(
            fid,
            app_fid,
            &Notification::new(
                format!("🎮 Come back to {}!", dispatcher.config().app_name),
                "Your facilities need attention",
            ),
        )
        .await
}

/// Achievement unlocked.
pub async fn notify_achievement(
    dispatcher: &Dispatcher,
    fid: Fid,
    app_fid: AppFid,
    achievement_name: &str,
) -> SendOutcome {
    dispatcher
        .send(
            fid,
            app_fid,
            &Notification::new("🏆 Achievement Unlocked!", achievement_name),
        )
        .await
}

/// Broadcast one message to many players.
///
/// Useful for game updates or events. Recipients without a stored
/// credential are skipped and counted as `no_token`, not failures.
pub async fn notify_all(
    dispatcher: &Dispatcher,
    recipients: &[(Fid, AppFid)],
    title: &str,
    body: &str,
) -> BatchReport {
    dispatcher
        .send_many(recipients, &Notification::new(title, body))
        .await
}
