use navigable_command::axum_router::DEFAULT_BODY_LIMIT;
use thiserror::Error;

const HOST: &str = "NAVIGABLE_HOST";
const PORT: &str = "NAVIGABLE_PORT";
const BODY_LIMIT: &str = "NAVIGABLE_BODY_LIMIT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: key={key}, value={value}")]
    Invalid { key: &'static str, value: String },
}

/// 服务配置，从环境变量读取（支持 `.env`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 缺失的键取缺省值；存在但无法解析的值视为错误
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: lookup(HOST).unwrap_or(defaults.host),
            port: parse(&lookup, PORT)?.unwrap_or(defaults.port),
            body_limit: parse(&lookup, BODY_LIMIT)?.unwrap_or(defaults.body_limit),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (HOST, "127.0.0.1"),
            (PORT, "8080"),
            (BODY_LIMIT, "1024"),
        ]))
        .unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.body_limit, 1024);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = ServerConfig::from_lookup(lookup(&[(PORT, "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: PORT, .. }));
    }
}
