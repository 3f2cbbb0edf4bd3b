//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use cache_gateway::cache::{CacheBackend, RedisStore};
use cache_gateway::config::{CacheConfig, GatewayConfig};
use cache_gateway::http::HttpServer;
use cache_gateway::lifecycle::{DrainOutcome, ShutdownCoordinator};
use cache_gateway::net::Listener;

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub coordinator: ShutdownCoordinator,
    trigger: Option<oneshot::Sender<()>>,
    handle: JoinHandle<DrainOutcome>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Deliver the termination signal without waiting for the drain.
    pub fn terminate(&mut self) {
        if let Some(trigger) = self.trigger.take() {
            let _ = trigger.send(());
        }
    }

    /// Terminate and wait for the drain outcome.
    pub async fn shutdown(mut self) -> DrainOutcome {
        self.terminate();
        self.handle.await.unwrap()
    }
}

pub async fn start_gateway(cache: CacheBackend, drain_timeout: Duration) -> TestGateway {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.compute.delay_ms = 20;
    config.shutdown.drain_timeout_secs = drain_timeout.as_secs().max(1);

    let coordinator = ShutdownCoordinator::new(drain_timeout);
    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config, cache, coordinator.clone());

    let (trigger, signal) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(listener, async {
        let _ = signal.await;
    }));

    TestGateway {
        addr,
        coordinator,
        trigger: Some(trigger),
        handle,
    }
}

/// A Redis store pointed at a port nobody listens on.
pub fn refused_redis() -> CacheBackend {
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);

    let config = CacheConfig {
        address: addr.to_string(),
        timeout_ms: 500,
        ..CacheConfig::default()
    };
    RedisStore::from_config(&config).unwrap().into()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until<F: Fn() -> bool>(condition: F, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Records the message of every WARN event.
#[derive(Clone, Default)]
pub struct WarningLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl WarningLog {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages().iter().filter(|m| m.contains(needle)).count()
    }
}

impl<S: Subscriber> Layer<S> for WarningLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut message = MessageField::default();
        event.record(&mut message);
        self.messages.lock().unwrap().push(message.0);
    }
}

#[derive(Default)]
struct MessageField(String);

impl Visit for MessageField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

/// Capture warnings on the current thread until the guard drops.
///
/// Pair with the default current-thread `#[tokio::test]` runtime so
/// spawned tasks log through the same subscriber.
pub fn capture_warnings() -> (WarningLog, tracing::subscriber::DefaultGuard) {
    let log = WarningLog::default();
    let guard = tracing_subscriber::registry().with(log.clone()).set_default();
    (log, guard)
}
