//! Minimal HTTP/1.1 server serving a growable body, for integration tests.
//!
//! Responds to HEAD with Content-Length and Accept-Ranges: bytes; responds to
//! GET with Range with 206 Partial Content. The body can be appended to while
//! the server runs, like a log file being written.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

const NOT_ALLOWED: &[u8] = b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n";

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            support_ranges: true,
        }
    }
}

/// Handle to a running server. Clones share the same body and counters.
#[derive(Clone)]
pub struct RangeServer {
    pub url: String,
    body: Arc<Mutex<Vec<u8>>>,
    drop_next: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl RangeServer {
    /// Append bytes to the served resource.
    pub fn append(&self, data: &[u8]) {
        self.body.lock().unwrap().extend_from_slice(data);
    }

    /// Close the next `n` connections without answering.
    pub fn drop_next(&self, n: usize) {
        self.drop_next.store(n, Ordering::SeqCst);
    }

    /// Request lines seen so far, e.g. `"HEAD"` or `"GET bytes=0-4"`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `body`. The server runs
/// until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let server = RangeServer {
        url: format!("http://127.0.0.1:{}/app.log", port),
        body: Arc::new(Mutex::new(body)),
        drop_next: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let shared = server.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let server = shared.clone();
            thread::spawn(move || handle(stream, &server, opts));
        }
    });
    server
}

fn handle(mut stream: std::net::TcpStream, server: &RangeServer, opts: RangeServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, range) = parse_request(request);
    {
        let mut log = server.requests.lock().unwrap();
        match range {
            Some((a, b)) => log.push(format!("{} bytes={}-{}", method, a, b)),
            None => log.push(method.to_string()),
        }
    }
    if server
        .drop_next
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        return;
    }

    let body = server.body.lock().unwrap().clone();
    let total = body.len() as u64;
    if method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_allowed {
            let _ = stream.write_all(NOT_ALLOWED);
            return;
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\
             Accept-Ranges: bytes\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    if method.eq_ignore_ascii_case("GET") {
        let (status, slice) = match range {
            Some((start, end_incl)) if opts.support_ranges => {
                let end_excl = end_incl.saturating_add(1).min(total);
                if start >= end_excl {
                    ("416 Range Not Satisfiable", &body[0..0])
                } else {
                    ("206 Partial Content", &body[start as usize..end_excl as usize])
                }
            }
            _ => ("200 OK", &body[..]),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            slice.len()
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(slice);
        return;
    }
    let _ = stream.write_all(NOT_ALLOWED);
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
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                if value.to_lowercase().starts_with("bytes=") {
                    if let Some((a, b)) = value[6..].trim().split_once('-') {
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
        }
    }
    (method, range)
}
