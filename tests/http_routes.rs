//! End-to-end tests of the HTTP surface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use remote_config_server::config::ServerConfig;
use remote_config_server::http::HttpServer;
use remote_config_server::lifecycle::Shutdown;
use remote_config_server::remote_config::ConfigStore;
use serde_json::{json, Value};

mod common;

const KEY: &str = "integration-key";

struct Running {
    addr: SocketAddr,
    store: Arc<ConfigStore>,
    client: reqwest::Client,
    _shutdown: Shutdown,
}

impl Running {
    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("http://{}{}", self.addr, path))
            .header(reqwest::header::AUTHORIZATION, KEY)
    }
}

async fn start(mut config: ServerConfig) -> Running {
    config.auth.key = KEY.to_string();

    let store = Arc::new(ConfigStore::from_config(&config).unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, store.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    Running {
        addr,
        store,
        client,
        _shutdown: shutdown,
    }
}

fn document(last_updated_at: u64) -> Value {
    json!({
        "lastUpdatedAt": last_updated_at,
        "files": [{
            "name": "catalog",
            "type": "json",
            "versions": {
                "*": { "location": { "url": "{file_server}/assets/catalog.json" } },
                "2.0.0": { "location": { "url": "{file_server}/assets/catalog-v2.json" } }
            }
        }]
    })
}

#[tokio::test]
async fn test_requests_without_key_are_rejected() {
    let host = common::start_asset_host().await;
    let server = start(common::config_for(&host)).await;

    let res = server
        .client
        .get(format!("http://{}/config/1.0.0", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = server
        .client
        .get(format!("http://{}/config/refresh", server.addr))
        .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", KEY))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    assert_eq!(host.document_hits(), 0);
}

#[tokio::test]
async fn test_lookup_before_load_is_unavailable() {
    let host = common::start_asset_host().await;
    let server = start(common::config_for(&host)).await;

    let res = server.get("/config/1.0.0").send().await.unwrap();
    assert_eq!(res.status(), 503);
}

#[tokio::test]
async fn test_refresh_then_lookup() {
    let host = common::start_asset_host().await;
    host.set_document(document(10));
    host.set_size("/assets/catalog.json", 100);
    host.set_size("/assets/catalog-v2.json", 200);
    let server = start(common::config_for(&host)).await;

    let res = server.get("/config/refresh").send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(server.store.is_initialized());

    let res = server.get("/config/2.0.0").send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["catalog"],
        json!({
            "location": { "url": format!("{}/assets/catalog-v2.json", host.base_url()) },
            "size": 200,
            "type": "json"
        })
    );

    let body: Value = server.get("/config/1.0.0").send().await.unwrap().json().await.unwrap();
    assert_eq!(body["catalog"]["size"], 100);
}

#[tokio::test]
async fn test_failed_refresh_reports_error_and_keeps_serving() {
    let host = common::start_asset_host().await;
    host.set_document(document(10));
    let server = start(common::config_for(&host)).await;

    assert_eq!(server.get("/config/refresh").send().await.unwrap().status(), 200);

    host.fail_document(502);
    assert_eq!(server.get("/config/refresh").send().await.unwrap().status(), 500);

    let res = server.get("/config/1.0.0").send().await.unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_refresh_outlasting_request_timeout_still_reports_500() {
    let host = common::start_asset_host().await;
    host.make_slow(common::DOCUMENT_PATH);

    let mut config = common::config_for(&host);
    config.refresh.document_timeout_secs = 1;
    config.refresh.max_attempts = 2;
    config.timeouts.request_secs = 1;
    let server = start(config).await;

    let res = server.get("/config/refresh").send().await.unwrap();
    assert_eq!(res.status(), 500);
    assert!(!server.store.is_initialized());
}

#[tokio::test]
async fn test_dev_assets_are_served_with_charset() {
    let host = common::start_asset_host().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), document(1).to_string()).unwrap();

    let mut config = common::config_for(&host);
    config.file_server.enabled = true;
    config.file_server.assets_dir = dir.path().to_path_buf();
    let server = start(config).await;

    let res = server.get("/assets/config.json").send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()[reqwest::header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );

    let res = server
        .client
        .get(format!("http://{}/assets/config.json", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
}
