use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub store: StoreConfig,
    pub export: ExportConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub namespace: String,
    pub mode: String,
    pub session_id: String,
    pub session_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            api: ApiConfig {
                base_url: normalize_base_url(
                    &env::var("SHEETCHAT_API_URL")
                        .unwrap_or_else(|_| "http://localhost:5000".to_string()),
                ),
            },
            store: StoreConfig {
                namespace: env::var("SHEETCHAT_STORE_NAMESPACE")
                    .unwrap_or_else(|_| "zpp".to_string()),
                mode: env::var("SHEETCHAT_MODE").unwrap_or_else(|_| "development".to_string()),
                session_id: env::var("SHEETCHAT_SESSION").unwrap_or_else(|_| "default".to_string()),
                session_dir: env::var("SHEETCHAT_SESSION_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| env::temp_dir().join("sheetchat").join("sessions")),
            },
            export: ExportConfig {
                dir: env::var("SHEETCHAT_EXPORT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(".")),
            },
            log: LogConfig {
                dir: env::var("SHEETCHAT_LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        dirs::data_local_dir()
                            .map(|d| d.join("sheetchat").join("logs"))
                            .unwrap_or_else(|| PathBuf::from("logs"))
                    }),
                filter: env::var("RUST_LOG").unwrap_or_else(|_| "sheetchat=info".to_string()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(mut self, api_url: Option<String>, session: Option<String>) -> Result<Self> {
        if let Some(url) = api_url {
            self.api.base_url = normalize_base_url(&url);
        }
        if let Some(session) = session {
            self.store.session_id = session;
        }
        self.validate()?;
        Ok(self)
    }

    /// Directory holding this session's persisted state
    pub fn session_path(&self) -> PathBuf {
        self.store.session_dir.join(&self.store.session_id)
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("SHEETCHAT_API_URL must not be empty");
        }
        if self.store.session_id.is_empty()
            || self.store.session_id.contains(['/', '\\'])
        {
            anyhow::bail!("Invalid session id: {:?}", self.store.session_id);
        }
        Ok(())
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
            },
            store: StoreConfig {
                namespace: "zpp".to_string(),
                mode: "development".to_string(),
                session_id: "default".to_string(),
                session_dir: PathBuf::from("/tmp/sessions"),
            },
            export: ExportConfig {
                dir: PathBuf::from("."),
            },
            log: LogConfig {
                dir: PathBuf::from("logs"),
                filter: "sheetchat=info".to_string(),
            },
        }
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(" http://api.local:8080/ "), "http://api.local:8080");
        assert_eq!(normalize_base_url("http://api.local"), "http://api.local");
    }

    #[test]
    fn test_overrides() {
        let config = sample()
            .with_overrides(Some("http://other:9000/".to_string()), Some("work".to_string()))
            .unwrap();
        assert_eq!(config.api.base_url, "http://other:9000");
        assert_eq!(config.session_path(), PathBuf::from("/tmp/sessions/work"));
    }

    #[test]
    fn test_rejects_bad_overrides() {
        assert!(sample().with_overrides(Some("  ".to_string()), None).is_err());
        assert!(sample().with_overrides(None, Some("../escape".to_string())).is_err());
    }
}
