//! Minimal HTTP/1.1 responder for exercising the client against a real socket.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub(crate) struct StubServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Requests received so far (head and body, lossily decoded).
    pub fn requests(&self) -> Vec<String> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

/// Serve `body` with `status` to every connection after waiting `delay`.
pub(crate) async fn spawn_stub(status: u16, body: &'static str, delay: Duration) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen2 = seen.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let seen3 = seen2.clone();
            tokio::spawn(async move {
                let _ = respond(stream, status, body, delay, seen3).await;
            });
        }
    });

    StubServer {
        base_url: format!("http://{addr}"),
        seen,
    }
}

/// A base URL nothing listens on.
pub(crate) async fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn respond(
    mut stream: TcpStream,
    status: u16,
    body: &str,
    delay: Duration,
    seen: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let raw = read_request(&mut stream).await?;
    if let Ok(mut v) = seen.lock() {
        v.push(String::from_utf8_lossy(&raw).into_owned());
    }

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if request_complete(&buf) {
            return Ok(buf);
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(buf);
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
    let body = &buf[head_end + 4..];

    if head.contains("transfer-encoding: chunked") {
        return body.ends_with(b"0\r\n\r\n");
    }
    let length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body.len() >= length
}
