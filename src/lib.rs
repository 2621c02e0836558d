pub mod response;

pub mod database;
pub mod libs;
pub mod pages;
pub mod perm;

use std::str::FromStr;

pub use database::{memory::MemoryStore, mysql_store::MysqlStore, Store};
pub use libs::notify::Notifier;
pub use pages::{router, AppState};
pub use response::Response;

pub type ResponseResult = Result<Response, Response>;

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mysql,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::Mysql),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid {
                key: Config::STORE,
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),
    #[error("environment variable {key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// 服务配置，全部来自环境变量
#[derive(Debug, Clone)]
pub struct Config {
    port: u16,
    store: StoreKind,
    database_url: Option<String>,
    service_key: Option<String>,
    notify_url: Option<String>,
}

impl Config {
    pub const PORT: &'static str = "CRM_PORT";
    pub const STORE: &'static str = "CRM_STORE";
    pub const DATABASE_URL: &'static str = "CRM_DATABASE_URL";
    pub const SERVICE_KEY: &'static str = "CRM_SERVICE_KEY";
    pub const NOTIFY_URL: &'static str = "LEAD_NOTIFY_URL";
    const DEFAULT_PORT: u16 = 8080;

    /// 读取 `.env` 和进程环境变量
    pub fn read() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let port = match non_empty(Self::PORT) {
            Some(port) => port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: Self::PORT,
                value: port,
            })?,
            None => Self::DEFAULT_PORT,
        };
        let store = match non_empty(Self::STORE) {
            Some(store) => store.parse()?,
            None => StoreKind::Mysql,
        };
        let database_url = non_empty(Self::DATABASE_URL);
        if store == StoreKind::Mysql && database_url.is_none() {
            return Err(ConfigError::Missing(Self::DATABASE_URL));
        }
        Ok(Self {
            port,
            store,
            database_url,
            service_key: non_empty(Self::SERVICE_KEY),
            notify_url: non_empty(Self::NOTIFY_URL),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }
    pub fn store(&self) -> StoreKind {
        self.store
    }
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }
    pub fn service_key(&self) -> Option<&str> {
        self.service_key.as_deref()
    }
    pub fn notify_url(&self) -> Option<&str> {
        self.notify_url.as_deref()
    }
}

/// 启动阶段的错误
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] mysql::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn mysql_backend_needs_database_url() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::Missing(Config::DATABASE_URL))
        ));
    }

    #[test]
    fn memory_backend_with_defaults() {
        let config = config(&[("CRM_STORE", "Memory")]).unwrap();
        assert_eq!(config.store(), StoreKind::Memory);
        assert_eq!(config.port(), 8080);
        assert_eq!(config.notify_url(), None);
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("CRM_DATABASE_URL", "mysql://crm@localhost:3306/crm"),
            ("CRM_SERVICE_KEY", "secret"),
            ("CRM_PORT", "9000"),
            ("LEAD_NOTIFY_URL", "http://hooks.local/lead"),
        ])
        .unwrap();
        assert_eq!(config.store(), StoreKind::Mysql);
        assert_eq!(config.port(), 9000);
        assert_eq!(config.service_key(), Some("secret"));
        assert_eq!(config.notify_url(), Some("http://hooks.local/lead"));
    }

    #[test]
    fn rejects_bad_port_and_store() {
        assert!(matches!(
            config(&[("CRM_STORE", "memory"), ("CRM_PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "CRM_PORT", .. })
        ));
        assert!(matches!(
            config(&[("CRM_STORE", "postgres")]),
            Err(ConfigError::Invalid { key: "CRM_STORE", .. })
        ));
    }
}
