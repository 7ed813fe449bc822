use bideval_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8090";
const DEFAULT_LOG_LEVEL: &str = "bideval_service=info,bideval_engine=info,tower_http=info";
const ENV_PREFIX: &str = "BIDEVAL";

#[derive(Error, Debug)]
pub enum ServiceConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid bind address '{addr}': {reason}")]
    InvalidBindAddr { addr: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub bind_addr: String,
    /// Tracing filter used when RUST_LOG is not set.
    pub log_level: String,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Layers built-in defaults, then the config file (the given path, or an
    /// optional `bideval.toml` in the working directory), then `BIDEVAL_*`
    /// environment variables. Nested keys use `__`, e.g. `BIDEVAL_ENGINE__TIE_BREAK`.
    pub fn load(path: Option<&Path>) -> Result<Self, ServiceConfigError> {
        let defaults = ServiceConfig::default();
        let builder = config::Config::builder()
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("log_level", defaults.log_level)?
            .set_default("engine.tie_break", "input_order")?
            .set_default("engine.weight_tolerance", defaults.engine.weight_tolerance)?;

        let builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name("bideval").required(false)),
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let loaded: ServiceConfig = settings.try_deserialize()?;
        tracing::debug!("Loaded service configuration: {:?}", loaded);
        Ok(loaded)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServiceConfigError> {
        self.bind_addr.parse().map_err(|e: std::net::AddrParseError| ServiceConfigError::InvalidBindAddr {
            addr: self.bind_addr.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bideval_engine::TieBreak;
    use std::io::Write;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "bind_addr = \"127.0.0.1:9911\"\n\n[engine]\ntie_break = \"bid_id\"\nweight_tolerance = 0.5"
        )
        .unwrap();

        let loaded = ServiceConfig::load(Some(file.path())).unwrap();
        assert_eq!(loaded.bind_addr, "127.0.0.1:9911");
        assert_eq!(loaded.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(loaded.engine.tie_break, TieBreak::BidId);
        assert_eq!(loaded.engine.weight_tolerance, 0.5);
        assert_eq!(loaded.socket_addr().unwrap().port(), 9911);
    }

    #[test]
    fn rejects_malformed_bind_addr() {
        let config = ServiceConfig { bind_addr: "not-an-addr".into(), ..Default::default() };
        assert!(matches!(config.socket_addr(), Err(ServiceConfigError::InvalidBindAddr { .. })));
    }
}
