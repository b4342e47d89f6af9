//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hoodie_proxy::config::{AssetConfig, GatewayConfig};
use hoodie_proxy::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request head captured by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A scripted response the mock backend replies with on every connection.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl MockResponse {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Start a mock backend that records request heads and replies with the
/// scripted response.
pub async fn start_mock_backend(
    response: MockResponse,
) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let response = response.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        if let Some(request) = read_request(&mut socket).await {
                            recorded.lock().unwrap().push(request);
                        }

                        let reason = match response.status {
                            200 => "OK",
                            201 => "Created",
                            401 => "Unauthorized",
                            404 => "Not Found",
                            500 => "Internal Server Error",
                            _ => "OK",
                        };
                        let mut head = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                            response.status,
                            reason,
                            response.body.len()
                        );
                        for (name, value) in &response.headers {
                            head.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        head.push_str("\r\n");

                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(response.body.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, requests)
}

/// Read and parse one HTTP/1.1 request head, then drain the body.
async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > 64 * 1024 {
            return None;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?;
    let mut parts = request_line.split(' ');
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = Vec::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let request = RecordedRequest {
        method,
        target,
        headers,
    };

    // Drain the body so the client finishes writing before we respond.
    if let Some(length) = request
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok())
    {
        let mut remaining = length.saturating_sub(buf.len() - head_end - 4);
        let mut body = [0u8; 4096];
        while remaining > 0 {
            let n = socket.read(&mut body[..remaining.min(4096)]).await.ok()?;
            if n == 0 {
                break;
            }
            remaining -= n;
        }
    }

    Some(request)
}

/// Static asset tree for a gateway under test.
pub struct TestAssets {
    // Held so the temp dir outlives the test.
    _dir: tempfile::TempDir,
    pub config: AssetConfig,
}

/// Lay out a minimal SPA, admin dashboard, and client bundles on disk.
pub fn test_assets() -> TestAssets {
    let dir = tempfile::tempdir().unwrap();
    let www = dir.path().join("www");
    let admin = dir.path().join("admin");
    let client = dir.path().join("client");
    std::fs::create_dir_all(&www).unwrap();
    std::fs::create_dir_all(&admin).unwrap();
    std::fs::create_dir_all(&client).unwrap();

    std::fs::write(
        www.join("index.html"),
        "<!doctype html>\n<html>\n<head><title>app shell</title></head>\n\
         <body data-role=\"app-shell\"><script src=\"/hoodie/bundle.js\"></script></body>\n\
         </html>\n",
    )
    .unwrap();
    std::fs::write(www.join("app.css"), "body { margin: 0; }\n").unwrap();
    std::fs::write(
        admin.join("index.html"),
        "<!doctype html><html><body data-role=\"admin-dashboard\"></body></html>\n",
    )
    .unwrap();
    std::fs::write(admin.join("admin.css"), ".dashboard { display: flex; }\n").unwrap();
    std::fs::write(client.join("bundle.js"), "window.app = { version: '1' };\n").unwrap();
    std::fs::write(client.join("bundle.min.js"), "window.app={version:'1'};\n").unwrap();

    let config = AssetConfig {
        www_dir: www,
        admin_dir: admin,
        bundle_js: client.join("bundle.js"),
        bundle_min_js: client.join("bundle.min.js"),
    };

    TestAssets { _dir: dir, config }
}

/// Build a gateway config pointing at the given assets and backend port.
pub fn gateway_config(assets: &TestAssets, backend_port: u16) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.assets = assets.config.clone();
    config.backend.hostname = "127.0.0.1".into();
    config.backend.port = backend_port;
    config
}

/// Spawn a gateway on an ephemeral port; returns its address and the
/// shutdown handle.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
