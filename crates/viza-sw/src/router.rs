//! Request routing

use viza_net::Request;

use crate::config::WorkerConfig;

/// How an intercepted request is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not ours: goes to the network untouched
    Passthrough,
    /// Live dashboard data
    NetworkFirst,
    /// Everything else on the dashboard origin
    CacheFirst,
}

pub fn route(config: &WorkerConfig, request: &Request) -> Route {
    if !config.is_same_origin(&request.url) {
        Route::Passthrough
    } else if config.is_api_path(request.url.path()) {
        Route::NetworkFirst
    } else {
        Route::CacheFirst
    }
}
