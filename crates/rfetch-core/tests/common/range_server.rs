//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body. HEAD answers with Content-Length; GET with a
//! Range header answers 206. The first `drop_gets` GETs are closed without a
//! response and the next `truncate_gets` send only half of the promised body,
//! which lets tests drive the retry path against a real curl transport.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// Number of initial GETs closed without any response.
    pub drop_gets: usize,
    /// Number of GETs (after the dropped ones) cut off halfway through the body.
    pub truncate_gets: usize,
    /// If set, every request gets this status and an empty body.
    pub status_override: Option<u16>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            drop_gets: 0,
            truncate_gets: 0,
            status_override: None,
        }
    }
}

/// Handle to a running server.
#[derive(Debug, Clone)]
pub struct RangeServer {
    pub url: String,
    gets: Arc<AtomicUsize>,
}

impl RangeServer {
    /// Number of GET requests received so far.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body` at `/object.bin`.
/// The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let gets = Arc::new(AtomicUsize::new(0));
    let gets_in_server = Arc::clone(&gets);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let gets = Arc::clone(&gets_in_server);
            thread::spawn(move || handle(stream, &body, opts, &gets));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/object.bin", port),
        gets,
    }
}

fn handle(mut stream: TcpStream, body: &[u8], opts: RangeServerOptions, gets: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let (method, range) = parse_request(request);
    let total = body.len() as u64;

    if let Some(code) = opts.status_override {
        if method.eq_ignore_ascii_case("GET") {
            gets.fetch_add(1, Ordering::SeqCst);
        }
        let response = format!(
            "HTTP/1.1 {} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            code
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("HEAD") {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
        return;
    }

    let nth = gets.fetch_add(1, Ordering::SeqCst);
    if nth < opts.drop_gets {
        return;
    }
    let truncate = nth < opts.drop_gets + opts.truncate_gets;

    let (status, content_range, slice) = match range {
        Some((start, end_incl)) if opts.support_ranges => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start >= total || start > end_incl {
                ("416 Range Not Satisfiable", format!("bytes */{}", total), &body[0..0])
            } else {
                let slice = &body[start as usize..=end_incl as usize];
                (
                    "206 Partial Content",
                    format!("bytes {}-{}/{}", start, end_incl, total),
                    slice,
                )
            }
        }
        _ => (
            "200 OK",
            format!("bytes 0-{}/{}", total.saturating_sub(1), total),
            body,
        ),
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Range: {}\r\nConnection: close\r\n\r\n",
        status,
        slice.len(),
        content_range
    );
    let _ = stream.write_all(response.as_bytes());
    if truncate {
        let _ = stream.write_all(&slice[..slice.len() / 2]);
        return;
    }
    let _ = stream.write_all(slice);
}

/// Returns (method, optional (start, end_inclusive) for Range: bytes=X-Y).
fn parse_request(request: &str) -> (&str, Option<(u64, u64)>) {
    let mut method = "";
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if !name.trim().eq_ignore_ascii_case("range") {
                continue;
            }
            let value = value.trim();
            let Some(spec) = value.strip_prefix("bytes=") else {
                continue;
            };
            if let Some((a, b)) = spec.trim().split_once('-') {
                let start = a.trim().parse::<u64>().unwrap_or(0);
                let end = b.trim();
                let end_incl = if end.is_empty() {
                    u64::MAX
                } else {
                    end.parse::<u64>().unwrap_or(0)
                };
                range = Some((start, end_incl));
            }
        }
    }
    (method, range)
}
