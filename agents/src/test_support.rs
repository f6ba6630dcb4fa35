//! Test-only helpers: fake generators, a temp project root, and a one-shot
//! loopback HTTP server.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::error::GenerationFailure;
use crate::io::backend::{GenerationRequest, Generator};
use crate::io::config::AgentsConfig;

/// Generator returning a fixed result for every request.
pub struct ScriptedGenerator {
    result: Result<String, GenerationFailure>,
}

impl ScriptedGenerator {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            result: Ok(text.into()),
        }
    }

    pub fn err(failure: GenerationFailure) -> Self {
        Self {
            result: Err(failure),
        }
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationFailure> {
        self.result.clone()
    }
}

/// Generator that records every request and answers with fixed text.
pub struct CapturingGenerator {
    response: String,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl CapturingGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl Generator for CapturingGenerator {
    fn name(&self) -> &str {
        "capturing"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        Ok(self.response.clone())
    }
}

/// Temporary project root with the default config.
pub struct TestWorkspace {
    temp: TempDir,
    config: AgentsConfig,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp: tempfile::tempdir().expect("tempdir"),
            config: AgentsConfig::default(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn config(&self) -> &AgentsConfig {
        &self.config
    }

    /// Write a context document into the configured context directory.
    pub fn with_context(self, name: &str, content: &str) -> Self {
        let path = self.config.context_dir.join(name);
        self.with_file(&path.to_string_lossy(), content)
    }

    /// Write `content` at `relative`, creating parent directories.
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, content).expect("write fixture");
        self
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve exactly one HTTP response on a loopback port.
///
/// Returns the base URL and a handle resolving to the raw request text
/// (headers and body) the server received.
pub async fn serve_once(
    status: u16,
    body: &str,
) -> std::io::Result<(String, JoinHandle<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let body = body.to_string();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            if status < 400 { "OK" } else { "Error" },
            body.len(),
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        stream.shutdown().await.ok();
        request
    });
    Ok((base_url, handle))
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.expect("read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(header_end) = find_header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}
