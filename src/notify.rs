//! Due-item notifications.
//!
//! The dispatcher fires at most one notification per minute-tick and stamps
//! the plan whether or not the platform actually showed anything.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

use crate::clock::Now;
use crate::types::{Plan, ScheduleItem};

/// Platform permission state for desktop notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Unsupported,
    #[default]
    Default,
    Denied,
    Granted,
}

impl NotificationPermission {
    /// What the platform can honour given the stored choice.
    pub fn effective(self) -> Self {
        if cfg!(feature = "desktop-notify") {
            self
        } else {
            NotificationPermission::Unsupported
        }
    }
}

impl fmt::Display for NotificationPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationPermission::Unsupported => "unsupported",
            NotificationPermission::Default => "default",
            NotificationPermission::Denied => "denied",
            NotificationPermission::Granted => "granted",
        };
        f.write_str(s)
    }
}

/// Result of one delivery attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    Unsupported,
    Denied,
    Failed(String),
}

pub trait Notifier {
    fn notify(&self, title: &str, body: &str) -> NotifyOutcome;
}

/// Desktop notifications through the host notification daemon.
#[derive(Clone, Copy, Debug)]
pub struct DesktopNotifier {
    permission: NotificationPermission,
}

impl DesktopNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            permission: permission.effective(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> NotifyOutcome {
        match self.permission {
            NotificationPermission::Granted => show_desktop(title, body),
            NotificationPermission::Unsupported => NotifyOutcome::Unsupported,
            NotificationPermission::Default | NotificationPermission::Denied => {
                NotifyOutcome::Denied
            }
        }
    }
}

#[cfg(feature = "desktop-notify")]
fn show_desktop(title: &str, body: &str) -> NotifyOutcome {
    match notify_rust::Notification::new()
        .summary(title)
        .body(body)
        .appname(crate::metadata::PKG_NAME)
        .show()
    {
        Ok(_) => NotifyOutcome::Delivered,
        Err(e) => NotifyOutcome::Failed(e.to_string()),
    }
}

#[cfg(not(feature = "desktop-notify"))]
fn show_desktop(_title: &str, _body: &str) -> NotifyOutcome {
    NotifyOutcome::Unsupported
}

/// Keeps every notification it is handed. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) -> NotifyOutcome {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((title.to_string(), body.to_string()));
        }
        NotifyOutcome::Delivered
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing is due this minute.
    Idle,
    /// This minute-tick already produced its notification.
    AlreadyNotified,
    Delivered { id: String },
    Skipped { id: String, outcome: NotifyOutcome },
}

pub fn notification_title(plan: &Plan) -> String {
    format!("{} 🦷", plan.character_name)
}

pub fn notification_body(item: &ScheduleItem) -> String {
    format!("{} TIME! TAP DONE ✅", item.title)
}

/// Checks the derived schedule for an item due now.
///
/// Returns the outcome and, when a new minute-tick was handled, the plan with
/// `last_notified_at_minute` stamped. Non-delivery is never retried.
pub fn dispatch_due(
    plan: &Plan,
    schedule: &[ScheduleItem],
    now: &Now,
    notifier: &dyn Notifier,
) -> (DispatchOutcome, Option<Plan>) {
    let Some(due) = schedule.iter().find(|item| item.mins == 0) else {
        return (DispatchOutcome::Idle, None);
    };

    let stamp = now.minute_stamp();
    if plan.last_notified_at_minute.as_deref() == Some(stamp.as_str()) {
        return (DispatchOutcome::AlreadyNotified, None);
    }

    let outcome = notifier.notify(&notification_title(plan), &notification_body(due));
    let result = match outcome {
        NotifyOutcome::Delivered => {
            tracing::info!(id = %due.id, %stamp, "due notification sent");
            DispatchOutcome::Delivered { id: due.id.clone() }
        }
        other => {
            tracing::debug!(id = %due.id, %stamp, outcome = ?other, "due notification skipped");
            DispatchOutcome::Skipped {
                id: due.id.clone(),
                outcome: other,
            }
        }
    };

    let stamped = Plan {
        last_notified_at_minute: Some(stamp),
        ..plan.clone()
    };
    (result, Some(stamped))
}
