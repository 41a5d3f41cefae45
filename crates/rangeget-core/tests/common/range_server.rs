//! Minimal HTTP/1.1 server that answers ranged GETs, for integration tests.
//!
//! Serves a single static body. `Range: bytes=a-b` gets 206 with
//! Content-Range; behavior can be bent to simulate unfriendly origins.
//! Every request's path, Range and User-Agent are recorded.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Path the 302 hop points at when `redirect` is on.
pub const MOVED_PATH: &str = "/moved/file.bin";

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, Range is ignored and every GET gets 200 with the full body.
    pub support_ranges: bool,
    /// If false, 206 responses carry no Content-Range header.
    pub send_content_range: bool,
    /// Ranged GETs starting at this offset get 500.
    pub fail_range_start: Option<u64>,
    /// Ranged GETs (other than the `0-0` probe) are cut this many bytes short.
    pub short_by: u64,
    /// Every request gets 404.
    pub not_found: bool,
    /// `/file.bin` answers 302 to `MOVED_PATH` with a junk body and a bogus
    /// Content-Range; the body is served from there.
    pub redirect: bool,
    /// The ranged GET starting at this offset is sent in 1 KiB chunks, 100 ms apart.
    pub trickle_range_start: Option<u64>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            send_content_range: true,
            fail_range_start: None,
            short_by: 0,
            not_found: false,
            redirect: false,
            trickle_range_start: None,
        }
    }
}

/// One request as the server received it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub range: Option<String>,
    pub user_agent: Option<String>,
}

/// Running server: its URL plus the log of requests it has answered.
pub struct RangeServer {
    pub url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl RangeServer {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `body`. Returns the URL
/// (e.g. "http://127.0.0.1:12345/file.bin"). The server runs until the process exits.
pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> String {
    spawn(body, opts).url
}

pub fn spawn(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &body, opts, &log));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/file.bin", port),
        seen,
    }
}

fn head(status: &str, content_length: usize, extra_headers: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        status, content_length, extra_headers
    )
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &str, payload: &[u8]) {
    let _ = stream.write_all(head(status, payload.len(), extra_headers).as_bytes());
    let _ = stream.write_all(payload);
}

/// Sends `payload` slowly; stops as soon as the client goes away.
fn respond_trickle(stream: &mut TcpStream, status: &str, extra_headers: &str, payload: &[u8]) {
    if stream
        .write_all(head(status, payload.len(), extra_headers).as_bytes())
        .is_err()
    {
        return;
    }
    for chunk in payload.chunks(1024) {
        if stream.write_all(chunk).and_then(|_| stream.flush()).is_err() {
            return;
        }
        thread::sleep(Duration::from_millis(100));
    }
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: RangeServerOptions,
    log: &Mutex<Vec<SeenRequest>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let req = parse_request(request);
    log.lock().unwrap().push(SeenRequest {
        path: req.path.to_string(),
        range: req.range_header.map(str::to_string),
        user_agent: req.user_agent.map(str::to_string),
    });

    if !req.method.eq_ignore_ascii_case("GET") {
        respond(&mut stream, "405 Method Not Allowed", "", b"");
        return;
    }
    if opts.not_found {
        respond(&mut stream, "404 Not Found", "", b"");
        return;
    }
    if opts.redirect && req.path != MOVED_PATH {
        let junk = [b'x'; 200];
        respond(
            &mut stream,
            "302 Found",
            &format!(
                "Location: {}\r\nContent-Range: bytes 0-0/999999\r\n",
                MOVED_PATH
            ),
            &junk,
        );
        return;
    }

    let total = body.len() as u64;
    let range = match req.range {
        Some(r) if opts.support_ranges => r,
        _ => {
            respond(&mut stream, "200 OK", "", body);
            return;
        }
    };
    let (start, end_incl) = range;
    if opts.fail_range_start == Some(start) {
        respond(&mut stream, "500 Internal Server Error", "", b"");
        return;
    }
    let end_incl = end_incl.min(total.saturating_sub(1));
    if start > end_incl {
        respond(
            &mut stream,
            "416 Range Not Satisfiable",
            &format!("Content-Range: bytes */{}\r\n", total),
            b"",
        );
        return;
    }

    let mut slice = &body[start as usize..=end_incl as usize];
    let is_probe = start == 0 && end_incl == 0;
    if !is_probe && opts.short_by > 0 {
        let keep = slice.len().saturating_sub(opts.short_by as usize);
        slice = &slice[..keep];
    }
    let content_range = if opts.send_content_range {
        format!("Content-Range: bytes {}-{}/{}\r\n", start, end_incl, total)
    } else {
        String::new()
    };
    if !is_probe && opts.trickle_range_start == Some(start) {
        respond_trickle(&mut stream, "206 Partial Content", &content_range, slice);
    } else {
        respond(&mut stream, "206 Partial Content", &content_range, slice);
    }
}

struct Request<'a> {
    method: &'a str,
    path: &'a str,
    range_header: Option<&'a str>,
    user_agent: Option<&'a str>,
    /// (start, end_inclusive) from `Range: bytes=X-Y`.
    range: Option<(u64, u64)>,
}

fn parse_request(request: &str) -> Request<'_> {
    let mut lines = request.lines();
    let mut request_line = lines.next().unwrap_or("").split_whitespace();
    let mut req = Request {
        method: request_line.next().unwrap_or(""),
        path: request_line.next().unwrap_or(""),
        range_header: None,
        user_agent: None,
        range: None,
    };
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("user-agent") {
            req.user_agent = Some(value);
        } else if name.eq_ignore_ascii_case("range") {
            req.range_header = Some(value);
            let bytes = value.strip_prefix("bytes=").unwrap_or("");
            if let Some((a, b)) = bytes.split_once('-') {
                let start = a.trim().parse::<u64>().unwrap_or(0);
                let end = b.trim().parse::<u64>().unwrap_or(u64::MAX);
                req.range = Some((start, end));
            }
        }
    }
    req
}
