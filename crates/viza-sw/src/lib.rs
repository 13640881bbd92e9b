//! Viza Offline Worker
//!
//! Caching proxy between the Viza lighting dashboard and its backend.
//! Static assets are served cache-first, API calls network-first with a
//! deadline, and the worker manages its cache versions, page control,
//! notifications and background sync.

pub mod background;
pub mod cache;
pub mod clients;
pub mod config;
mod error;
pub mod events;
pub mod lifecycle;
pub mod message;
pub mod notification;
pub mod router;
mod strategy;
pub mod sync;
mod worker;

pub use cache::{Cache, CacheStorage};
pub use clients::{Client, ClientId, Clients};
pub use config::{NotificationConfig, WorkerConfig, WorkerConfigBuilder};
pub use error::{CacheError, WorkerError};
pub use events::{Event, EventKind, EventOutcome};
pub use lifecycle::WorkerState;
pub use message::{Command, MessageEvent, Reply, ReplyPort};
pub use notification::{Notification, NotificationCenter, NotificationClickEvent, NotificationId, NotificationOptions, PushEvent};
pub use router::Route;
pub use strategy::{offline_json_response, offline_text_response};
pub use sync::SyncEvent;
pub use worker::{ServiceWorker, ServiceWorkerBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
