use std::path::PathBuf;

const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_DIST_DIR: &str = "dist";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got {0:?}")]
    BadPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Tour content (`pois.json`, `quizzes.json`) and images served under `/static`.
    pub assets_dir: PathBuf,
    /// Built frontend bundle.
    pub dist_dir: PathBuf,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::BadPort(raw)),
            },
            None => DEFAULT_PORT,
        };
        Ok(ServerConfig {
            assets_dir: lookup("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
            dist_dir: lookup("DIST_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR)),
            port,
        })
    }

    pub fn index_html(&self) -> PathBuf {
        self.dist_dir.join("index.html")
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
