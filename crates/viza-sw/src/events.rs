//! Events delivered to the worker by its host

use viza_net::{Request, Response};

use crate::message::MessageEvent;
use crate::notification::{Notification, NotificationClickEvent, PushEvent};
use crate::sync::SyncEvent;

/// Every event the worker handles
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    /// An intercepted page request
    Fetch(Request),
    Message(MessageEvent),
    Push(PushEvent),
    NotificationClick(NotificationClickEvent),
    Sync(SyncEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Message,
    Push,
    NotificationClick,
    Sync,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Install => EventKind::Install,
            Event::Activate => EventKind::Activate,
            Event::Fetch(_) => EventKind::Fetch,
            Event::Message(_) => EventKind::Message,
            Event::Push(_) => EventKind::Push,
            Event::NotificationClick(_) => EventKind::NotificationClick,
            Event::Sync(_) => EventKind::Sync,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Message => "message",
            EventKind::Push => "push",
            EventKind::NotificationClick => "notificationclick",
            EventKind::Sync => "sync",
        };
        f.write_str(name)
    }
}

/// What handling an event produced
#[derive(Debug, Clone)]
pub enum EventOutcome {
    Completed,
    /// Answer for an intercepted request
    Respond(Response),
    /// Request was not intercepted; the host sends it to the network itself
    Passthrough,
    Notified(Notification),
    Synced(bool),
    /// Event carried nothing this worker acts on
    Ignored,
}
