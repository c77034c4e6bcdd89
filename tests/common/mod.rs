//! Shared utilities for end-to-end tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hotmock::config;
use hotmock::http::MockServer;
use hotmock::reload::{self, ReloadController};
use hotmock::routing::{RouteTable, SharedRouteTable};
use hotmock::Shutdown;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A config directory plus a running server bound to an ephemeral port.
pub struct TestServer {
    pub dir: TempDir,
    pub addr: SocketAddr,
    pub routes: SharedRouteTable,
    pub shutdown: Shutdown,
}

impl TestServer {
    /// Write `files` into a fresh directory and start serving `api.json`.
    pub async fn start(files: &[(&str, serde_json::Value)], watch: bool) -> Self {
        let dir = TempDir::new().unwrap();
        for (name, value) in files {
            write_json(dir.path(), name, value);
        }

        let entry = dir.path().join("api.json");
        let config = config::load(&entry).unwrap();
        let routes = SharedRouteTable::new(RouteTable::build(&config));
        let shutdown = Shutdown::new();

        if watch {
            let controller = ReloadController::new(&entry, &config, routes.clone())
                .with_debounce(Duration::from_millis(50));
            reload::spawn(controller, shutdown.subscribe()).unwrap();
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = MockServer::new(routes.clone());
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            dir,
            addr,
            routes,
            shutdown,
        }
    }

    pub fn url(&self, target: &str) -> String {
        format!("http://{}{}", self.addr, target)
    }

    pub fn write(&self, name: &str, value: &serde_json::Value) -> PathBuf {
        write_json(self.dir.path(), name, value)
    }

    pub fn write_raw(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).unwrap();
    }

    /// Poll until the route table generation reaches `generation`.
    pub async fn wait_for_generation(&self, generation: u64) -> bool {
        for _ in 0..100 {
            if self.routes.generation() >= generation {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
