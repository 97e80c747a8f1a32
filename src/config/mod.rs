// Configuration module entry point
// Loads layered configuration: defaults, optional TOML file, environment, CLI

mod types;

use std::net::SocketAddr;

use config::builder::{ConfigBuilder, DefaultState};

// Re-export public types
pub use types::{
    Config, DatabaseConfig, HttpConfig, LogFormat, LoggingConfig, Overrides, PerformanceConfig,
    ServerConfig,
};

/// Environment variable prefix, e.g. `SNIPPETBOX_SERVER__PORT=4001`
const ENV_PREFIX: &str = "SNIPPETBOX";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// The file is optional; environment variables override it
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::with_defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::with_defaults()?.build()?.try_deserialize()
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4000)?
            .set_default("server.backlog", 128)?
            .set_default("database.dsn", "sqlite://snippetbox.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout", 5)?
            .set_default("database.busy_timeout", 5)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("http.server_name", "snippetbox")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("http.static_dir", "./ui/static")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)
    }

    /// Apply command-line overrides on top of the loaded layers
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(addr) = overrides.addr {
            self.server.host = addr.ip().to_string();
            self.server.port = addr.port();
        }
        if let Some(dsn) = overrides.dsn {
            self.database.dsn = dsn;
        }
        if let Some(static_dir) = overrides.static_dir {
            self.http.static_dir = static_dir;
        }
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let host = &self.server.host;
        // Bare IPv6 hosts need brackets to parse as a socket address
        let addr = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.server.port)
        } else {
            format!("{host}:{}", self.server.port)
        };
        addr.parse().map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.database.dsn, "sqlite://snippetbox.db?mode=rwc");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.log_file, None);
        assert_eq!(cfg.http.static_dir, "./ui/static");
        assert_eq!(cfg.performance.max_connections, None);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:4000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_socket_addr_ipv6() {
        let mut cfg = Config::defaults().unwrap();
        cfg.server.host = "::1".to_string();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 4000);
        assert!(cfg.get_socket_addr().unwrap().is_ipv6());
    }

    #[test]
    fn test_invalid_host() {
        let mut cfg = Config::defaults().unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut cfg = Config::defaults().unwrap();
        cfg.apply_overrides(Overrides {
            addr: Some("0.0.0.0:8081".parse().unwrap()),
            dsn: Some("sqlite::memory:".to_string()),
            static_dir: None,
        });
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.database.dsn, "sqlite::memory:");
        assert_eq!(cfg.http.static_dir, "./ui/static");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        assert_eq!(cfg.http.server_name, "snippetbox");
    }
}
