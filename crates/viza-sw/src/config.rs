//! Worker configuration
//!
//! Compiled-in dashboard values, built once at startup and shared read-only.

use std::time::Duration;

use url::Url;

/// Static-asset store name; doubles as the worker version
pub const STATIC_CACHE: &str = "viza-iluminacao-v1.0.0";
/// Runtime store name
pub const RUNTIME_CACHE: &str = "viza-runtime-v1.0.0";

/// Assets that must be in the static store before the worker takes control
pub const STATIC_ASSETS: &[&str] = &[
    "/",
    "/static/manifest.json",
    "/static/images/Viza_Logo.png",
    "/static/images/Engemase_Logo.png",
    "/static/images/icon-192x192.png",
    "/static/images/icon-512x512.png",
];

/// Path prefixes served network-first
pub const API_PREFIXES: &[&str] = &[
    "/api/status",
    "/api/modo",
    "/api/brilho",
    "/api/modo_setor",
    "/api/brilho_setor",
    "/api/setpoint_lux_geral",
    "/api/setpoint_lux_setor",
    "/api/agendar_simples",
    "/api/listar_agendamentos",
    "/api/horario_atual",
    "/api/sincronizar_rtc",
];

pub const OFFLINE_PAGE: &str = "/offline.html";
pub const ROOT_PAGE: &str = "/";
pub const OFFLINE_MESSAGE: &str = "Sem conexão com o sistema";
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(3);
pub const SYNC_DATA_TAG: &str = "sync-data";
pub const DEFAULT_ORIGIN: &str = "http://localhost";
pub const DEFAULT_QUOTA: usize = 50 * 1024 * 1024;

/// How push notifications are presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub title: String,
    /// Body used when a push carries no payload
    pub default_body: String,
    pub icon: String,
    pub badge: String,
    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub vibrate: Vec<u32>,
    /// Deduplication tag
    pub tag: String,
    pub require_interaction: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Sistema Viza".into(),
            default_body: "Notificação do Sistema de Iluminação Viza".into(),
            icon: "/static/images/icon-192x192.png".into(),
            badge: "/static/images/icon-72x72.png".into(),
            vibrate: vec![200, 100, 200],
            tag: "viza-notification".into(),
            require_interaction: false,
        }
    }
}

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Origin of the dashboard; requests to any other origin pass through
    pub origin: Url,
    pub static_cache: String,
    pub runtime_cache: String,
    pub static_assets: Vec<String>,
    pub api_prefixes: Vec<String>,
    pub offline_page: String,
    /// Page opened or focused when a notification is clicked
    pub root_page: String,
    /// Deadline for network-first fetches
    pub network_timeout: Duration,
    /// Total bytes the cache storage may hold
    pub quota_bytes: usize,
    pub sync_tag: String,
    pub notification: NotificationConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let to_owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"),
            static_cache: STATIC_CACHE.into(),
            runtime_cache: RUNTIME_CACHE.into(),
            static_assets: to_owned(STATIC_ASSETS),
            api_prefixes: to_owned(API_PREFIXES),
            offline_page: OFFLINE_PAGE.into(),
            root_page: ROOT_PAGE.into(),
            network_timeout: NETWORK_TIMEOUT,
            quota_bytes: DEFAULT_QUOTA,
            sync_tag: SYNC_DATA_TAG.into(),
            notification: NotificationConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::new()
    }

    /// Version reported to pages
    pub fn version(&self) -> &str {
        &self.static_cache
    }

    pub fn is_api_path(&self, path: &str) -> bool {
        self.api_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Whether a store belongs to this worker version
    pub fn is_current_cache(&self, name: &str) -> bool {
        name == self.static_cache || name == self.runtime_cache
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    /// Resolve a configured path against the worker origin
    pub fn resolve(&self, path: &str) -> Result<Url, url::ParseError> {
        self.origin.join(path)
    }
}

/// Worker configuration builder
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: WorkerConfig::default(),
        }
    }

    pub fn origin(mut self, origin: Url) -> Self {
        self.config.origin = origin;
        self
    }

    pub fn cache_names(mut self, static_cache: &str, runtime_cache: &str) -> Self {
        self.config.static_cache = static_cache.to_string();
        self.config.runtime_cache = runtime_cache.to_string();
        self
    }

    pub fn static_assets(mut self, assets: &[&str]) -> Self {
        self.config.static_assets = assets.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn api_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.config.api_prefixes = prefixes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn offline_page(mut self, path: &str) -> Self {
        self.config.offline_page = path.to_string();
        self
    }

    pub fn network_timeout(mut self, timeout: Duration) -> Self {
        self.config.network_timeout = timeout;
        self
    }

    pub fn quota_bytes(mut self, quota: usize) -> Self {
        self.config.quota_bytes = quota;
        self
    }

    pub fn notification(mut self, notification: NotificationConfig) -> Self {
        self.config.notification = notification;
        self
    }

    pub fn build(self) -> WorkerConfig {
        self.config
    }
}

impl Default for WorkerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard() {
        let config = WorkerConfig::default();
        assert_eq!(config.version(), "viza-iluminacao-v1.0.0");
        assert_eq!(config.static_assets.len(), 6);
        assert_eq!(config.api_prefixes.len(), 11);
        assert_eq!(config.network_timeout, Duration::from_secs(3));
        assert_eq!(config.notification.vibrate, vec![200, 100, 200]);
    }

    #[test]
    fn test_api_prefix_matching() {
        let config = WorkerConfig::default();
        assert!(config.is_api_path("/api/status"));
        assert!(config.is_api_path("/api/brilho_setor/2"));
        assert!(config.is_api_path("/api/modo_setor"));
        assert!(!config.is_api_path("/api/reset_escravo"));
        assert!(!config.is_api_path("/static/manifest.json"));
        assert!(!config.is_api_path("/"));
    }

    #[test]
    fn test_current_cache_names() {
        let config = WorkerConfig::default();
        assert!(config.is_current_cache(STATIC_CACHE));
        assert!(config.is_current_cache(RUNTIME_CACHE));
        assert!(!config.is_current_cache("viza-iluminacao-v0.9.0"));
    }

    #[test]
    fn test_same_origin() {
        let config = WorkerConfig::builder()
            .origin(Url::parse("http://192.168.0.10").unwrap())
            .build();
        assert!(config.is_same_origin(&Url::parse("http://192.168.0.10/api/status").unwrap()));
        assert!(config.is_same_origin(&Url::parse("http://192.168.0.10:80/").unwrap()));
        assert!(!config.is_same_origin(&Url::parse("http://192.168.0.10:8080/").unwrap()));
        assert!(!config.is_same_origin(&Url::parse("https://fonts.example.com/a.css").unwrap()));
    }

    #[test]
    fn test_resolve() {
        let config = WorkerConfig::default();
        assert_eq!(config.resolve(OFFLINE_PAGE).unwrap().as_str(), "http://localhost/offline.html");
    }
}
