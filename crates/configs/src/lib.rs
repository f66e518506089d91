use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

/// Default number of documents fetched by one list call.
pub const DEFAULT_LIST_CAP: i64 = 1000;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default)]
    pub min_pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_server_selection_timeout")]
    pub server_selection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            name: default_db_name(),
            collection: default_collection(),
            max_pool_size: default_max_pool_size(),
            min_pool_size: 0,
            connect_timeout_secs: default_connect_timeout(),
            server_selection_timeout_secs: default_server_selection_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_list_cap")]
    pub list_cap: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { list_cap: DEFAULT_LIST_CAP }
    }
}

fn default_db_name() -> String { "library".into() }
fn default_collection() -> String { "students".into() }
fn default_max_pool_size() -> u32 { 10 }
fn default_connect_timeout() -> u64 { 10 }
fn default_server_selection_timeout() -> u64 { 30 }
fn default_list_cap() -> i64 { DEFAULT_LIST_CAP }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// `Ok(None)` only when the file does not exist; read and parse errors are returned.
pub fn load_optional(path: &str) -> Result<Option<AppConfig>> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }
    load_from_file(path)
        .map(Some)
        .map_err(|e| e.context(format!("invalid config file {path}")))
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// config.toml 优先；文件不存在时退回到纯环境变量配置
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = load_optional(path)?.unwrap_or_else(Self::from_env);
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build a config from `SERVER_HOST`, `SERVER_PORT` and `DATABASE_URL` only.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.service.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        self.normalize_with(std::env::var("DATABASE_URL").ok());
    }

    /// 若 TOML 中未提供 URL，则使用给定的环境变量值
    pub fn normalize_with(&mut self, env_url: Option<String>) {
        if self.url.trim().is_empty() {
            if let Some(url) = env_url {
                self.url = url;
            }
        }
        self.url = self.url.trim().to_string();
    }

    pub fn is_memory(&self) -> bool {
        self.url.to_lowercase().starts_with("memory://")
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://") || lower.starts_with("memory://")) {
            return Err(anyhow!("database.url must start with mongodb://, mongodb+srv:// or memory://"));
        }
        if self.name.trim().is_empty() || self.collection.trim().is_empty() {
            return Err(anyhow!("database.name and database.collection must not be empty"));
        }
        if self.max_pool_size == 0 {
            return Err(anyhow!("database.max_pool_size must be >= 1"));
        }
        if self.min_pool_size > self.max_pool_size {
            return Err(anyhow!("database.min_pool_size must be <= max_pool_size"));
        }
        if self.connect_timeout_secs == 0 || self.server_selection_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.list_cap < 1 {
            return Err(anyhow!("service.list_cap must be >= 1"));
        }
        Ok(())
    }
}
