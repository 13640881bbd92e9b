//! Shared fixtures: a scripted in-memory network and a worker wired to it

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use viza_net::{Fetch, Method, NetError, Request, Response, Url};
use viza_sw::config::STATIC_ASSETS;
use viza_sw::{ServiceWorker, WorkerConfig};

pub const ORIGIN: &str = "http://viza.local";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

pub fn get(path: &str) -> Request {
    Request::get(&url(path)).unwrap()
}

#[derive(Clone)]
struct Scripted {
    outcome: Result<Response, NetError>,
    delay: Option<Duration>,
}

#[derive(Default)]
struct Script {
    routes: HashMap<String, Scripted>,
    calls: Vec<(Method, String)>,
    offline: bool,
}

/// In-memory network answering by URL path
#[derive(Clone, Default)]
pub struct ScriptedNet {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedNet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Network that serves every default static asset
    pub fn with_assets() -> Self {
        let net = Self::new();
        for path in STATIC_ASSETS {
            net.respond(path, Response::ok(format!("asset {}", path)));
        }
        net
    }

    pub fn respond(&self, path: &str, response: Response) {
        self.script(path, Ok(response), None);
    }

    pub fn respond_after(&self, path: &str, response: Response, delay: Duration) {
        self.script(path, Ok(response), Some(delay));
    }

    pub fn fail(&self, path: &str) {
        self.script(path, Err(NetError::Network("connection reset".into())), None);
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.inner.lock().unwrap().calls.iter().filter(|(_, p)| p == path).count()
    }

    fn script(&self, path: &str, outcome: Result<Response, NetError>, delay: Option<Duration>) {
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert(path.to_string(), Scripted { outcome, delay });
    }
}

impl Fetch for ScriptedNet {
    fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response, NetError>> + Send {
        let scripted = {
            let mut script = self.inner.lock().unwrap();
            script.calls.push((request.method, request.path().to_string()));
            if script.offline {
                None
            } else {
                script.routes.get(request.path()).cloned()
            }
        };

        async move {
            match scripted {
                Some(Scripted { outcome, delay }) => {
                    if let Some(delay) = delay {
                        smol::Timer::after(delay).await;
                    }
                    outcome
                }
                None => Err(NetError::Network("host unreachable".into())),
            }
        }
    }
}

pub fn config() -> WorkerConfig {
    WorkerConfig::builder()
        .origin(Url::parse(ORIGIN).unwrap())
        .network_timeout(Duration::from_millis(100))
        .build()
}

/// Worker that has been installed and activated
pub async fn active_worker(net: &ScriptedNet) -> ServiceWorker<ScriptedNet> {
    let worker = ServiceWorker::new(config(), net.clone());
    worker.start().await.unwrap();
    worker
}
