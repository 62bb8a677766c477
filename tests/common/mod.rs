//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use intercept_proxy::config::ProxyConfig;
use intercept_proxy::driver::{DriverRegistry, InterceptDriver};
use intercept_proxy::http::HttpServer;
use intercept_proxy::lifecycle::Shutdown;
use intercept_proxy::routing::RouteTable;

/// A request observed by a recording backend.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// Start a mock backend that records every request and answers with a
/// fixed status and body. Binds an ephemeral port and returns it.
pub async fn start_recording_backend(status: u16, body: &'static str) -> (SocketAddr, Recorded) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = recorded.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let sink = sink.clone();
                    tokio::spawn(async move {
                        handle_backend_connection(socket, sink, status, body).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, recorded)
}

async fn handle_backend_connection(
    mut socket: TcpStream,
    sink: Recorded,
    status: u16,
    body: &'static str,
) {
    if let Some(request) = read_request(&mut socket).await {
        sink.lock().unwrap().push(request);
    }

    let status_text = match status {
        200 => "200 OK",
        201 => "201 Created",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nX-Backend-Header: recorded\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Minimal HTTP/1.1 request reader: request line, headers, then a body
/// of exactly Content-Length bytes.
async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
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

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = Vec::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let content_length: usize = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0);

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Some(RecordedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

/// A proxy started for one test, with its driver still in hand.
#[allow(dead_code)]
pub struct TestProxy {
    pub addr: SocketAddr,
    pub server: Arc<HttpServer>,
    pub driver: InterceptDriver,
    pub registry: DriverRegistry,
    pub shutdown: Shutdown,
}

/// Start a proxy on an ephemeral port with the given routes attached.
pub async fn start_proxy(routes: &[(&str, String)]) -> TestProxy {
    let mut config = ProxyConfig::default();
    for (key, upstream) in routes {
        config.routes.insert((*key).to_string(), upstream.clone());
    }
    start_proxy_with_config(config).await
}

/// Start a proxy from a fully built configuration, for tests that tune
/// limits or other settings beyond the route table.
pub async fn start_proxy_with_config(config: ProxyConfig) -> TestProxy {
    let registry = DriverRegistry::new();
    let table = RouteTable::from_config(&config.routes).unwrap();
    let server = Arc::new(HttpServer::new(config));
    let driver = InterceptDriver::attach(&server, table, &registry).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let serving = server.clone();
    let app = driver.router();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = serving.run(app, listener, &server_shutdown).await;
    });

    wait_until_ready(addr).await;

    TestProxy {
        addr,
        server,
        driver,
        registry,
        shutdown,
    }
}

/// Write a raw HTTP/1.1 request and collect whatever the server sends
/// back. Tolerates a reset after the response, which happens when the
/// server answers without draining the request body.
#[allow(dead_code)]
pub async fn send_raw(addr: SocketAddr, request: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => response.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&response).to_string()
}

pub async fn wait_until_ready(addr: SocketAddr) {
    for _ in 0..100 {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("proxy did not become ready at {addr}");
}

/// A reqwest client that ignores environment proxies.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
