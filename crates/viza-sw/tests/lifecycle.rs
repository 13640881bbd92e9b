//! Install, activation, page messages and the peripheral events

mod common;

use common::*;
use viza_net::{Response, Url};
use viza_sw::config::{RUNTIME_CACHE, STATIC_ASSETS, STATIC_CACHE};
use viza_sw::{
    CacheError, CacheStorage, Clients, Command, Event, EventOutcome, MessageEvent,
    NotificationClickEvent, PushEvent, Reply, ServiceWorker, SyncEvent, WorkerError, WorkerState,
};

#[test]
fn test_start_installs_and_activates() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        let worker = active_worker(&net).await;

        assert_eq!(worker.state().await, WorkerState::Activated);
        let static_cache = worker.caches().open(STATIC_CACHE).await;
        assert_eq!(static_cache.keys().await.len(), STATIC_ASSETS.len());
        for path in STATIC_ASSETS {
            assert!(static_cache.match_request(&get(path)).await.is_some(), "{} not cached", path);
        }
    });
}

#[test]
fn test_install_is_all_or_nothing() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        net.respond("/static/images/Engemase_Logo.png", Response::new(404, "not found"));
        let worker = ServiceWorker::new(config(), net.clone());

        let err = worker.start().await.unwrap_err();
        assert!(matches!(err, WorkerError::Install(CacheError::AddAll { .. })));
        assert_eq!(worker.state().await, WorkerState::Redundant);
        assert!(worker.caches().match_request(&get("/")).await.is_none());

        // a redundant worker never intercepts
        let outcome = worker.dispatch(Event::Fetch(get("/"))).await.unwrap();
        assert!(matches!(outcome, EventOutcome::Passthrough));
    });
}

#[test]
fn test_install_fails_on_transport_error() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        net.fail("/static/manifest.json");
        let worker = ServiceWorker::new(config(), net.clone());

        let err = worker.dispatch(Event::Install).await.unwrap_err();
        assert!(matches!(err, WorkerError::Install(_)));
        assert_eq!(worker.state().await, WorkerState::Redundant);
    });
}

#[test]
fn test_activation_removes_stale_caches() {
    init_tracing();
    smol::block_on(async {
        let storage = CacheStorage::default();
        for name in ["viza-iluminacao-v0.9.0", "viza-runtime-v0.9.0", RUNTIME_CACHE, "outro-app"] {
            storage.open(name).await;
        }

        let net = ScriptedNet::with_assets();
        let worker = ServiceWorker::builder(net.clone())
            .config(config())
            .caches(storage.clone())
            .build();
        worker.start().await.unwrap();

        assert_eq!(storage.keys().await, vec![RUNTIME_CACHE.to_string(), STATIC_CACHE.to_string()]);
    });
}

#[test]
fn test_activation_claims_open_pages() {
    init_tracing();
    smol::block_on(async {
        let clients = Clients::new();
        let page = clients.add(Url::parse(&url("/")).unwrap()).await;
        assert!(!clients.get(page).await.unwrap().controlled);

        let net = ScriptedNet::with_assets();
        let worker = ServiceWorker::builder(net.clone())
            .config(config())
            .clients(clients.clone())
            .build();
        worker.start().await.unwrap();

        assert!(clients.get(page).await.unwrap().controlled);
    });
}

#[test]
fn test_skip_waiting_message_activates_installed_worker() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        let worker = ServiceWorker::new(config(), net.clone());
        worker.dispatch(Event::Install).await.unwrap();
        assert_eq!(worker.state().await, WorkerState::Installed);

        let message = MessageEvent::from_command(Command::SkipWaiting);
        let outcome = worker.dispatch(Event::Message(message)).await.unwrap();
        assert!(matches!(outcome, EventOutcome::Completed));
        assert_eq!(worker.state().await, WorkerState::Activated);
    });
}

#[test]
fn test_get_version_reply() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        let worker = active_worker(&net).await;
        let (port, replies) = smol::channel::unbounded();

        let message = MessageEvent::new(serde_json::json!({ "type": "GET_VERSION" })).with_port(port);
        worker.dispatch(Event::Message(message)).await.unwrap();

        let reply = replies.recv().await.unwrap();
        assert_eq!(reply, Reply::Version { version: "viza-iluminacao-v1.0.0".into() });
        assert_eq!(serde_json::to_value(&reply).unwrap(), serde_json::json!({ "version": "viza-iluminacao-v1.0.0" }));
    });
}

#[test]
fn test_clear_cache_reply() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        let worker = active_worker(&net).await;
        net.respond("/api/status", Response::ok("{}"));
        worker.dispatch(Event::Fetch(get("/api/status"))).await.unwrap();
        worker.settle().await;
        assert!(!worker.caches().keys().await.is_empty());

        let (port, replies) = smol::channel::unbounded();
        let message = MessageEvent::from_command(Command::ClearCache).with_port(port);
        worker.dispatch(Event::Message(message)).await.unwrap();

        assert_eq!(replies.recv().await.unwrap(), Reply::Cleared { success: true });
        assert!(worker.caches().keys().await.is_empty());
        assert_eq!(worker.caches().usage().await, 0);
    });
}

#[test]
fn test_clear_cache_without_port_still_clears() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        let worker = active_worker(&net).await;

        let message = MessageEvent::from_command(Command::ClearCache);
        worker.dispatch(Event::Message(message)).await.unwrap();
        assert!(worker.caches().keys().await.is_empty());
    });
}

#[test]
fn test_unknown_message_ignored() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        let worker = active_worker(&net).await;

        for data in [serde_json::json!({ "type": "RELOAD" }), serde_json::json!("SKIP_WAITING"), serde_json::json!(null)] {
            let outcome = worker.dispatch(Event::Message(MessageEvent::new(data))).await.unwrap();
            assert!(matches!(outcome, EventOutcome::Ignored));
        }
        assert_eq!(worker.caches().keys().await, vec![STATIC_CACHE.to_string()]);
    });
}

#[test]
fn test_push_shows_notification() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        let worker = active_worker(&net).await;

        let outcome = worker.dispatch(Event::Push(PushEvent::new("Agendamento executado"))).await.unwrap();
        let EventOutcome::Notified(notification) = outcome else {
            panic!("expected a notification");
        };
        assert_eq!(notification.title, "Sistema Viza");
        assert_eq!(notification.options.body, "Agendamento executado");
        assert_eq!(notification.options.icon, "/static/images/icon-192x192.png");
        assert_eq!(notification.options.badge, "/static/images/icon-72x72.png");
        assert_eq!(notification.options.vibrate, vec![200, 100, 200]);
        assert_eq!(notification.options.tag, "viza-notification");

        // same tag replaces the previous notification
        worker.dispatch(Event::Push(PushEvent::empty())).await.unwrap();
        let shown = worker.notifications().shown().await;
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].options.body, "Notificação do Sistema de Iluminação Viza");
    });
}

#[test]
fn test_notification_click_focuses_dashboard() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        let worker = active_worker(&net).await;
        let root = Url::parse(&url("/")).unwrap();

        let notification = worker.handle_push(&PushEvent::empty()).await;
        let click = NotificationClickEvent { notification };
        let opened = worker.handle_notification_click(&click).await.unwrap();
        assert!(worker.notifications().shown().await.is_empty());

        let page = worker.clients().get(opened).await.unwrap();
        assert_eq!(page.url, root);
        assert!(page.focused);

        // an open dashboard is focused rather than opened again
        let notification = worker.handle_push(&PushEvent::empty()).await;
        let again = worker.handle_notification_click(&NotificationClickEvent { notification }).await.unwrap();
        assert_eq!(again, opened);
        assert_eq!(worker.clients().all().await.len(), 1);
    });
}

#[test]
fn test_sync_event() {
    init_tracing();
    smol::block_on(async {
        let net = ScriptedNet::with_assets();
        let worker = active_worker(&net).await;

        let outcome = worker.dispatch(Event::Sync(SyncEvent::new("sync-data"))).await.unwrap();
        assert!(matches!(outcome, EventOutcome::Synced(true)));

        let outcome = worker.dispatch(Event::Sync(SyncEvent::new("outra-tag"))).await.unwrap();
        assert!(matches!(outcome, EventOutcome::Ignored));
    });
}
