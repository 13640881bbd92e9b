//! Client pages
//!
//! The dashboard pages the worker can control, focus or open.

use std::sync::Arc;

use smol::lock::Mutex;
use url::Url;

/// Client page identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

/// An open page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: ClientId,
    pub url: Url,
    pub focused: bool,
    /// Whether the worker intercepts this page's requests
    pub controlled: bool,
}

#[derive(Default)]
struct ClientList {
    clients: Vec<Client>,
    next_id: u64,
}

impl ClientList {
    fn push(&mut self, url: Url, focused: bool, controlled: bool) -> ClientId {
        self.next_id += 1;
        let id = ClientId(self.next_id);
        self.clients.push(Client { id, url, focused, controlled });
        id
    }
}

/// Shared registry of open pages
#[derive(Clone, Default)]
pub struct Clients {
    inner: Arc<Mutex<ClientList>>,
}

impl Clients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page the user opened; it starts uncontrolled
    pub async fn add(&self, url: Url) -> ClientId {
        self.inner.lock().await.push(url, false, false)
    }

    pub async fn remove(&self, id: ClientId) -> bool {
        let mut list = self.inner.lock().await;
        let before = list.clients.len();
        list.clients.retain(|c| c.id != id);
        list.clients.len() != before
    }

    pub async fn get(&self, id: ClientId) -> Option<Client> {
        self.inner.lock().await.clients.iter().find(|c| c.id == id).cloned()
    }

    pub async fn all(&self) -> Vec<Client> {
        self.inner.lock().await.clients.clone()
    }

    /// Take control of every open page; returns how many changed hands
    pub async fn claim(&self) -> usize {
        let mut list = self.inner.lock().await;
        let mut claimed = 0;
        for client in list.clients.iter_mut().filter(|c| !c.controlled) {
            client.controlled = true;
            claimed += 1;
        }
        claimed
    }

    /// Focus a page already showing `url`, or open a new one
    pub async fn open_or_focus(&self, url: Url) -> ClientId {
        let mut list = self.inner.lock().await;
        let existing = list.clients.iter().position(|c| c.url == url);
        for client in list.clients.iter_mut() {
            client.focused = false;
        }
        match existing {
            Some(index) => {
                let client = &mut list.clients[index];
                client.focused = true;
                tracing::debug!(url = %client.url, "focusing existing client");
                client.id
            }
            None => {
                tracing::debug!(%url, "opening window");
                list.push(url, true, true)
            }
        }
    }
}
