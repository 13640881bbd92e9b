//! Push notifications
//!
//! Turns push events into notifications and tracks which ones are on screen.
//! Showing a notification with a tag that is already displayed replaces it.

use std::sync::Arc;

use smol::lock::Mutex;

use crate::config::NotificationConfig;

/// Push message from the backend
#[derive(Debug, Clone, Default)]
pub struct PushEvent {
    pub data: Option<Vec<u8>>,
}

impl PushEvent {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: Some(data.into()) }
    }

    pub fn empty() -> Self {
        Self { data: None }
    }

    /// Payload as text, with invalid UTF-8 replaced
    pub fn text(&self) -> Option<String> {
        self.data.as_ref().map(|d| String::from_utf8_lossy(d).into_owned())
    }
}

/// User clicked a displayed notification
#[derive(Debug, Clone)]
pub struct NotificationClickEvent {
    pub notification: Notification,
}

/// Notification identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

/// Presentation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub tag: String,
    pub require_interaction: bool,
}

impl NotificationOptions {
    /// Options for a push, falling back to the default body when it has no payload
    pub fn for_push(config: &NotificationConfig, event: &PushEvent) -> Self {
        Self {
            body: event.text().unwrap_or_else(|| config.default_body.clone()),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            tag: config.tag.clone(),
            require_interaction: config.require_interaction,
        }
    }
}

/// A displayed notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub options: NotificationOptions,
}

#[derive(Default)]
struct Shown {
    notifications: Vec<Notification>,
    next_id: u64,
}

/// Displayed notifications
#[derive(Clone, Default)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Shown>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn show(&self, title: &str, options: NotificationOptions) -> Notification {
        let mut shown = self.inner.lock().await;
        shown.next_id += 1;
        let notification = Notification {
            id: NotificationId(shown.next_id),
            title: title.to_string(),
            options,
        };

        let tag = &notification.options.tag;
        if !tag.is_empty() {
            shown.notifications.retain(|n| n.options.tag != *tag);
        }
        shown.notifications.push(notification.clone());
        notification
    }

    pub async fn close(&self, id: NotificationId) -> bool {
        let mut shown = self.inner.lock().await;
        let before = shown.notifications.len();
        shown.notifications.retain(|n| n.id != id);
        shown.notifications.len() != before
    }

    pub async fn shown(&self) -> Vec<Notification> {
        self.inner.lock().await.notifications.clone()
    }
}
