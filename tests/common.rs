#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use myqr_studio::exchange::{ExchangeError, PosterPayload, PosterTransport, TransportResponse};
use myqr_studio::form::LogoFile;
use myqr_studio::preview::{PreviewError, PreviewHandle, PreviewStore};
use parking_lot::Mutex;
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use uuid::Uuid;

pub type TransportResult = Result<TransportResponse, ExchangeError>;

pub fn pdf_response() -> TransportResponse {
    TransportResponse {
        status: 200,
        content_type: Some("application/pdf".to_string()),
        body: b"%PDF-1.7 poster".to_vec(),
    }
}

pub fn html_response() -> TransportResponse {
    TransportResponse {
        status: 200,
        content_type: Some("text/html; charset=utf-8".to_string()),
        body: b"<html>waking up</html>".to_vec(),
    }
}

enum Scripted {
    Ready(TransportResult),
    Gated(oneshot::Receiver<TransportResult>),
}

/// Mock implementation of PosterTransport for testing
///
/// Calls are counted when the request actually starts, not when the future is
/// created. Unscripted calls answer with a PDF.
#[derive(Default)]
pub struct MockTransport {
    calls: AtomicUsize,
    payloads: Mutex<Vec<PosterPayload>>,
    script: Mutex<VecDeque<Scripted>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, result: TransportResult) {
        self.script.lock().push_back(Scripted::Ready(result));
    }

    /// Queue a response that is only delivered when the returned sender fires.
    pub fn respond_later(&self) -> oneshot::Sender<TransportResult> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().push_back(Scripted::Gated(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<PosterPayload> {
        self.payloads.lock().clone()
    }
}

#[async_trait]
impl PosterTransport for MockTransport {
    async fn send(&self, payload: PosterPayload) -> TransportResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().push(payload);
        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ExchangeError::Unreachable("gate dropped".to_string()))),
            None => Ok(pdf_response()),
        }
    }
}

/// Preview store that only keeps books on create/revoke pairs.
#[derive(Default)]
pub struct CountingPreviewStore {
    created: AtomicUsize,
    revoked: AtomicUsize,
    live: Mutex<HashSet<Uuid>>,
    max_live: AtomicUsize,
    double_revokes: AtomicUsize,
}

impl CountingPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn revoked(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.lock().len()
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn double_revokes(&self) -> usize {
        self.double_revokes.load(Ordering::SeqCst)
    }
}

impl PreviewStore for CountingPreviewStore {
    fn create(&self, logo: &LogoFile) -> Result<PreviewHandle, PreviewError> {
        let id = Uuid::new_v4();
        self.created.fetch_add(1, Ordering::SeqCst);
        let mut live = self.live.lock();
        live.insert(id);
        self.max_live.fetch_max(live.len(), Ordering::SeqCst);
        Ok(PreviewHandle {
            id,
            locator: PathBuf::from(format!("mem://{}/{}", id, logo.file_name)),
            mime_type: logo.mime_type.clone(),
        })
    }

    fn revoke(&self, handle: &PreviewHandle) {
        self.revoked.fetch_add(1, Ordering::SeqCst);
        if !self.live.lock().remove(&handle.id) {
            self.double_revokes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Preview store whose allocations start failing after a set number of
/// successful creations. Bookkeeping is delegated to a `CountingPreviewStore`.
pub struct FailingPreviewStore {
    inner: CountingPreviewStore,
    successes_left: AtomicUsize,
    failures: AtomicUsize,
}

impl FailingPreviewStore {
    pub fn succeeding(times: usize) -> Self {
        Self {
            inner: CountingPreviewStore::new(),
            successes_left: AtomicUsize::new(times),
            failures: AtomicUsize::new(0),
        }
    }

    pub fn counts(&self) -> &CountingPreviewStore {
        &self.inner
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

impl PreviewStore for FailingPreviewStore {
    fn create(&self, logo: &LogoFile) -> Result<PreviewHandle, PreviewError> {
        let allowed = self
            .successes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if !allowed {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(PreviewError::Write(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.inner.create(logo)
    }

    fn revoke(&self, handle: &PreviewHandle) {
        self.inner.revoke(handle);
    }
}

pub fn logo(name: &str, byte: u8) -> LogoFile {
    LogoFile::new(name, "image/png", vec![0x89, 0x50, 0x4E, 0x47, byte])
}

/// What the local responder saw.
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Serve exactly one HTTP request on a random local port with a canned
/// response, handing back the request it received.
pub async fn spawn_responder(
    status: u16,
    content_type: &str,
    body: &[u8],
) -> (reqwest::Url, tokio::task::JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = reqwest::Url::parse(&format!("http://{}/generate-pdf", addr)).unwrap();

    let content_type = content_type.to_string();
    let body = body.to_vec();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;

        let head = format!(
            "HTTP/1.1 {} Test\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            content_type,
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.ok();
        captured
    });

    (url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let lower = head.to_ascii_lowercase();
    let content_length = lower
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok());
    let chunked = lower.contains("transfer-encoding: chunked");

    loop {
        let received = buf.len() - header_end;
        let done = match content_length {
            Some(len) => received >= len,
            None if chunked => buf.ends_with(b"0\r\n\r\n"),
            None => true,
        };
        if done {
            break;
        }
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    CapturedRequest {
        head,
        body: buf[header_end..].to_vec(),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
