//! The caching proxy worker
//!
//! Owns the configuration and the host-side collaborators, and routes every
//! [`Event`] to its handler.

use std::sync::Arc;

use smol::lock::Mutex;
use viza_net::{Fetch, Method, Request, Response};

use crate::background::BackgroundTasks;
use crate::cache::CacheStorage;
use crate::clients::{ClientId, Clients};
use crate::config::WorkerConfig;
use crate::error::{CacheError, WorkerError};
use crate::events::{Event, EventOutcome};
use crate::lifecycle::{Lifecycle, WorkerState};
use crate::message::{Command, MessageEvent, Reply};
use crate::notification::{Notification, NotificationCenter, NotificationClickEvent, NotificationOptions, PushEvent};
use crate::router::{self, Route};
use crate::sync::{self, SyncEvent};

/// Offline caching worker for one dashboard origin
pub struct ServiceWorker<F> {
    config: Arc<WorkerConfig>,
    fetcher: F,
    caches: CacheStorage,
    clients: Clients,
    notifications: NotificationCenter,
    lifecycle: Mutex<Lifecycle>,
    background: BackgroundTasks,
}

/// Builder wiring a worker to its host's stores
pub struct ServiceWorkerBuilder<F> {
    fetcher: F,
    config: WorkerConfig,
    caches: Option<CacheStorage>,
    clients: Clients,
    notifications: NotificationCenter,
}

impl<F: Fetch> ServiceWorkerBuilder<F> {
    pub fn config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    /// Share existing cache storage, e.g. stores left by a previous version
    pub fn caches(mut self, caches: CacheStorage) -> Self {
        self.caches = Some(caches);
        self
    }

    pub fn clients(mut self, clients: Clients) -> Self {
        self.clients = clients;
        self
    }

    pub fn notifications(mut self, notifications: NotificationCenter) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn build(self) -> ServiceWorker<F> {
        let caches = self.caches
            .unwrap_or_else(|| CacheStorage::new(self.config.quota_bytes));
        ServiceWorker {
            config: Arc::new(self.config),
            fetcher: self.fetcher,
            caches,
            clients: self.clients,
            notifications: self.notifications,
            lifecycle: Mutex::new(Lifecycle::new()),
            background: BackgroundTasks::new(),
        }
    }
}

impl<F: Fetch> ServiceWorker<F> {
    pub fn builder(fetcher: F) -> ServiceWorkerBuilder<F> {
        ServiceWorkerBuilder {
            fetcher,
            config: WorkerConfig::default(),
            caches: None,
            clients: Clients::new(),
            notifications: NotificationCenter::new(),
        }
    }

    pub fn new(config: WorkerConfig, fetcher: F) -> Self {
        Self::builder(fetcher).config(config).build()
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn caches(&self) -> &CacheStorage {
        &self.caches
    }

    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub(crate) fn background(&self) -> &BackgroundTasks {
        &self.background
    }

    pub async fn state(&self) -> WorkerState {
        self.lifecycle.lock().await.state()
    }

    /// Wait for background cache writes started so far
    pub async fn settle(&self) {
        self.background.settle().await;
    }

    /// Route an event to its handler
    pub async fn dispatch(&self, event: Event) -> Result<EventOutcome, WorkerError> {
        tracing::debug!(kind = %event.kind(), "dispatching event");

        match event {
            Event::Install => {
                self.install().await?;
                Ok(EventOutcome::Completed)
            }
            Event::Activate => {
                self.activate().await?;
                Ok(EventOutcome::Completed)
            }
            Event::Fetch(request) => Ok(match self.handle_fetch(&request).await {
                Some(response) => EventOutcome::Respond(response),
                None => EventOutcome::Passthrough,
            }),
            Event::Message(message) => self.handle_message(&message).await,
            Event::Push(push) => Ok(EventOutcome::Notified(self.handle_push(&push).await)),
            Event::NotificationClick(click) => {
                self.handle_notification_click(&click).await?;
                Ok(EventOutcome::Completed)
            }
            Event::Sync(sync) => Ok(self.handle_sync(&sync).await),
        }
    }

    /// Install, then activate right away if skip-waiting was requested
    pub async fn start(&self) -> Result<(), WorkerError> {
        self.install().await?;
        let ready = self.lifecycle.lock().await.ready_to_activate();
        if ready {
            self.activate().await?;
        }
        Ok(())
    }

    /// Populate the static store with every configured asset, all or nothing
    pub async fn install(&self) -> Result<(), WorkerError> {
        self.lifecycle.lock().await.transition(WorkerState::Installing)?;
        tracing::info!(version = %self.config.version(), "installing");

        match self.precache().await {
            Ok(()) => {
                let mut lifecycle = self.lifecycle.lock().await;
                lifecycle.transition(WorkerState::Installed)?;
                lifecycle.request_skip_waiting();
                tracing::info!(assets = self.config.static_assets.len(), "installed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "install failed");
                self.lifecycle.lock().await.transition(WorkerState::Redundant)?;
                Err(WorkerError::Install(e))
            }
        }
    }

    async fn precache(&self) -> Result<(), CacheError> {
        let mut requests = Vec::with_capacity(self.config.static_assets.len());
        for path in &self.config.static_assets {
            let url = self.config.resolve(path).map_err(|e| CacheError::AddAll {
                url: path.clone(),
                reason: e.to_string(),
            })?;
            requests.push(Request::new(Method::Get, url));
        }

        let cache = self.caches.open(&self.config.static_cache).await;
        cache.add_all(&self.fetcher, &requests).await
    }

    /// Drop stale stores, then take control of every open page
    pub async fn activate(&self) -> Result<(), WorkerError> {
        self.lifecycle.lock().await.transition(WorkerState::Activating)?;
        tracing::info!("activating");

        for name in self.caches.keys().await {
            if !self.config.is_current_cache(&name) {
                tracing::info!(cache = %name, "removing stale cache");
                self.caches.delete(&name).await;
            }
        }

        self.lifecycle.lock().await.transition(WorkerState::Activated)?;
        let claimed = self.clients.claim().await;
        tracing::info!(claimed, "activated and controlling clients");
        Ok(())
    }

    /// Answer an intercepted request, or `None` to let it through untouched
    pub async fn handle_fetch(&self, request: &Request) -> Option<Response> {
        if !self.state().await.controls_pages() {
            return None;
        }

        match router::route(&self.config, request) {
            Route::Passthrough => None,
            Route::NetworkFirst => Some(self.network_first(request).await),
            Route::CacheFirst => Some(self.cache_first(request).await),
        }
    }

    pub async fn handle_message(&self, message: &MessageEvent) -> Result<EventOutcome, WorkerError> {
        let command = match message.command() {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(data = %message.data, error = %e, "ignoring message");
                return Ok(EventOutcome::Ignored);
            }
        };
        tracing::info!(command = command.as_str(), "message received");

        match command {
            Command::SkipWaiting => {
                let ready = {
                    let mut lifecycle = self.lifecycle.lock().await;
                    lifecycle.request_skip_waiting();
                    lifecycle.ready_to_activate()
                };
                if ready {
                    self.activate().await?;
                }
            }
            Command::ClearCache => {
                let removed = self.clear_caches().await;
                tracing::info!(removed, "caches cleared");
                message.reply(Reply::Cleared { success: true }).await;
            }
            Command::GetVersion => {
                message
                    .reply(Reply::Version { version: self.config.version().to_string() })
                    .await;
            }
        }
        Ok(EventOutcome::Completed)
    }

    /// Delete every store; returns how many were removed
    pub async fn clear_caches(&self) -> usize {
        let mut removed = 0;
        for name in self.caches.keys().await {
            if self.caches.delete(&name).await {
                removed += 1;
            }
        }
        removed
    }

    pub async fn handle_push(&self, push: &PushEvent) -> Notification {
        let settings = &self.config.notification;
        let options = NotificationOptions::for_push(settings, push);
        tracing::info!(body = %options.body, "showing push notification");
        self.notifications.show(&settings.title, options).await
    }

    /// Close the notification and bring the dashboard root to the front
    pub async fn handle_notification_click(&self, click: &NotificationClickEvent) -> Result<ClientId, WorkerError> {
        self.notifications.close(click.notification.id).await;
        let root = self.config.resolve(&self.config.root_page)?;
        Ok(self.clients.open_or_focus(root).await)
    }

    pub async fn handle_sync(&self, event: &SyncEvent) -> EventOutcome {
        tracing::info!(tag = %event.tag, "sync");
        if event.tag == self.config.sync_tag {
            EventOutcome::Synced(sync::sync_data().await)
        } else {
            EventOutcome::Ignored
        }
    }
}
