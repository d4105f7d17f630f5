use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Config file consulted when `CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "docroot.yaml";

/// How response bodies are moved from the file to the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Kernel `sendfile` where the platform has it, copy loop elsewhere
    #[default]
    Auto,
    /// Always ask for `sendfile`
    Sendfile,
    /// Always use the userspace read/write loop
    Copy,
}

/// Server configuration.
///
/// Every field has a default, so an empty YAML document (or no file at all)
/// yields a working server on `0.0.0.0:8080` serving `./public`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to bind, e.g. "0.0.0.0:8080"
    pub listen_addr: String,
    /// Sandbox root that request targets are joined onto
    pub root_dir: PathBuf,
    /// Directory holding 400.html, 404.html, 405.html and 415.html
    pub error_dir: PathBuf,
    /// Pending connection queue length
    pub backlog: i32,
    /// Hard cap on bytes read for one request
    pub max_request_bytes: usize,
    /// Receive timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Connections serviced at the same time
    pub max_connections: usize,
    /// Refuse targets that resolve outside `root_dir`
    pub confine_to_root: bool,
    /// Body transfer strategy
    pub transfer: TransferMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            root_dir: PathBuf::from("./public"),
            error_dir: PathBuf::from("./err"),
            backlog: 10,
            max_request_bytes: 4096,
            read_timeout_ms: 10_000,
            max_connections: 1,
            confine_to_root: true,
            transfer: TransferMode::Auto,
        }
    }
}

impl Config {
    /// Loads configuration from the YAML file named by `CONFIG` (or
    /// `docroot.yaml`), then applies the `LISTEN`, `ROOT_DIR` and
    /// `ERROR_DIR` environment overrides.
    ///
    /// A missing file is not an error; an unreadable or invalid one is.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut cfg = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        // An empty document deserializes as unit, not as a map
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("LISTEN") {
            self.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("ROOT_DIR") {
            self.root_dir = PathBuf::from(root);
        }
        if let Ok(dir) = std::env::var("ERROR_DIR") {
            self.error_dir = PathBuf::from(dir);
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_connections == 0 {
            anyhow::bail!("max_connections must be at least 1");
        }
        if self.max_request_bytes == 0 {
            anyhow::bail!("max_request_bytes must be at least 1");
        }
        if self.backlog <= 0 {
            anyhow::bail!("backlog must be positive");
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
