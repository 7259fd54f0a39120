//! Shared utilities for integration testing.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Path the mock host serves the configuration document from.
pub const DOCUMENT_PATH: &str = "/assets/config.json";

#[derive(Default)]
struct HostState {
    document: String,
    document_status: u16,
    sizes: HashMap<String, u64>,
    slow: HashSet<String>,
    document_hits: u32,
}

/// Programmable asset host: serves the document on GET and answers HEAD
/// with a `Content-Length` for every registered asset path.
#[derive(Clone)]
pub struct AssetHost {
    pub addr: SocketAddr,
    state: Arc<Mutex<HostState>>,
}

#[allow(dead_code)]
impl AssetHost {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_document(&self, document: serde_json::Value) {
        let mut state = self.state.lock().unwrap();
        state.document = document.to_string();
        state.document_status = 200;
    }

    pub fn fail_document(&self, status: u16) {
        self.state.lock().unwrap().document_status = status;
    }

    pub fn set_size(&self, path: &str, size: u64) {
        self.state.lock().unwrap().sizes.insert(path.to_string(), size);
    }

    /// HEAD requests for `path` never answer in time.
    pub fn make_slow(&self, path: &str) {
        self.state.lock().unwrap().slow.insert(path.to_string());
    }

    pub fn document_hits(&self) -> u32 {
        self.state.lock().unwrap().document_hits
    }
}

/// Start an asset host on an ephemeral port.
pub async fn start_asset_host() -> AssetHost {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = AssetHost {
        addr: listener.local_addr().unwrap(),
        state: Arc::new(Mutex::new(HostState {
            document_status: 404,
            ..HostState::default()
        })),
    };

    let state = host.state.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let state = state.clone();
                    tokio::spawn(async move {
                        let _ = serve(socket, state).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    host
}

async fn serve(mut socket: TcpStream, state: Arc<Mutex<HostState>>) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let mut parts = head.lines().next().unwrap_or_default().split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let slow = state.lock().unwrap().slow.contains(&path);
    if slow {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }

    let response = {
        let mut state = state.lock().unwrap();
        match (method.as_str(), path.as_str()) {
            ("GET", DOCUMENT_PATH) => {
                state.document_hits += 1;
                if state.document_status == 200 {
                    format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        state.document.len(),
                        state.document
                    )
                } else {
                    status_only(state.document_status)
                }
            }
            ("HEAD", p) => match state.sizes.get(p) {
                Some(size) => format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    size
                ),
                None => status_only(404),
            },
            _ => status_only(404),
        }
    };

    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

fn status_only(status: u16) -> String {
    let status_text = match status {
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "500 Internal Server Error",
    };
    format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_text)
}

/// Settings pointing the store at `host`, with short timeouts.
#[allow(dead_code)]
pub fn config_for(host: &AssetHost) -> remote_config_server::ServerConfig {
    let mut config = remote_config_server::ServerConfig::default();
    config.file_server.base_url = host.base_url();
    config.refresh.size_timeout_secs = 1;
    config.refresh.document_timeout_secs = 2;
    config.refresh.max_attempts = 2;
    config.refresh.base_delay_ms = 10;
    config.refresh.max_delay_ms = 20;
    config
}
