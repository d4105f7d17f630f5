#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use docroot::config::Config;
use docroot::server::listener;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// A few bytes that look enough like a PNG, including bytes that are not UTF-8.
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0x00, 0xff, 0x10, 0x80];

pub const INDEX: &str = "<h1>home</h1>\n";
pub const DOCS_INDEX: &str = "<h1>docs</h1>\n";
pub const STYLE: &str = "body { color: red; }\n";
pub const SECRET: &str = "outside the root\n";

pub fn error_page(code: u16) -> String {
    format!("<h1>error {code}</h1>\n")
}

/// Throwaway document tree:
///
/// ```text
/// <dir>/public/index.html
/// <dir>/public/a.png
/// <dir>/public/style.css
/// <dir>/public/docs/index.html
/// <dir>/public/folder.css/        (a directory)
/// <dir>/err/{400,404,405,415}.html
/// <dir>/secret.html               (outside the root)
/// ```
pub struct Fixture {
    pub dir: PathBuf,
}

impl Fixture {
    pub fn new(name: &str) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "docroot-{}-{}-{}",
            name,
            std::process::id(),
            id
        ));
        std::fs::remove_dir_all(&dir).ok();

        let public = dir.join("public");
        let err = dir.join("err");
        std::fs::create_dir_all(public.join("docs")).unwrap();
        std::fs::create_dir_all(public.join("folder.css")).unwrap();
        std::fs::create_dir_all(&err).unwrap();

        std::fs::write(public.join("index.html"), INDEX).unwrap();
        std::fs::write(public.join("a.png"), PNG).unwrap();
        std::fs::write(public.join("style.css"), STYLE).unwrap();
        std::fs::write(public.join("docs").join("index.html"), DOCS_INDEX).unwrap();
        for code in [400, 404, 405, 415] {
            std::fs::write(err.join(format!("{code}.html")), error_page(code)).unwrap();
        }
        std::fs::write(dir.join("secret.html"), SECRET).unwrap();

        Self { dir }
    }

    pub fn public(&self) -> PathBuf {
        self.dir.join("public")
    }

    pub fn err(&self) -> PathBuf {
        self.dir.join("err")
    }

    pub fn config(&self) -> Config {
        Config {
            listen_addr: "127.0.0.1:0".to_string(),
            root_dir: self.public(),
            error_dir: self.err(),
            read_timeout_ms: 2_000,
            ..Config::default()
        }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

/// Binds on an ephemeral port and serves in the background.
pub fn start(cfg: Config) -> SocketAddr {
    let socket = listener::bind(&cfg).unwrap();
    let addr = socket.local_addr().unwrap();
    tokio::spawn(async move { listener::serve(socket, &cfg).await });
    addr
}

/// Reads until the server closes; a reset counts as the end.
pub async fn read_all(stream: &mut TcpStream) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => out.extend_from_slice(&buf[..n]),
        }
    }
    out
}

/// Sends raw bytes on a fresh connection and returns everything received.
pub async fn exchange(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    read_all(&mut stream).await
}

pub struct Parsed {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Parsed {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub fn parse(raw: &[u8]) -> Parsed {
    let end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = std::str::from_utf8(&raw[..end]).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_string();
    let headers = lines
        .map(|line| {
            let (k, v) = line.split_once(": ").unwrap();
            (k.to_string(), v.to_string())
        })
        .collect();

    Parsed {
        status_line,
        headers,
        body: raw[end + 4..].to_vec(),
    }
}
