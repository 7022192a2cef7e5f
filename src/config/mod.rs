// Configuration module entry point
// Layers defaults, an optional config file and CUBE__* environment variables

mod state;
mod types;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, SolverConfig};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// The file is not required; missing keys fall back to the defaults.
    /// Environment variables such as `CUBE__SERVER__PORT=9000` override both.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("CUBE").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 5000)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "combined")?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 30)?
        .set_default("http.server_name", "cube-solve-server")?
        .set_default("http.enable_cors", true)?
        .set_default("http.max_body_size", 65_536)? // 64KB
        .set_default("solver.command", "kociemba")?
        .set_default("solver.timeout_ms", 30_000)
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    defaults()
        .and_then(|builder| builder.build())
        .and_then(|settings| settings.try_deserialize())
        .expect("defaults must deserialize")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Result<Config, ConfigError> {
        defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults() {
        let cfg = test_config();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.workers, None);
        assert!(cfg.http.enable_cors);
        assert_eq!(cfg.http.max_body_size, 65_536);
        assert!(cfg.health.enabled);
        assert_eq!(cfg.health.liveness_path, "/healthz");
        assert_eq!(cfg.solver.command, "kociemba");
        assert!(cfg.solver.args.is_empty());
        assert_eq!(cfg.solver.timeout_ms, 30_000);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.performance.max_connections, None);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = Config::load_from("definitely/not/a/config/file").unwrap();
        assert_eq!(cfg.server.port, 5000);
    }

    #[test]
    fn test_file_overrides() {
        let cfg = from_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            workers = 2

            [solver]
            command = "/usr/local/bin/kociemba"
            args = ["--max-depth", "24"]
            timeout_ms = 0

            [health]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.solver.command, "/usr/local/bin/kociemba");
        assert_eq!(cfg.solver.args, vec!["--max-depth", "24"]);
        assert_eq!(cfg.solver.timeout_ms, 0);
        assert!(!cfg.health.enabled);
        assert_eq!(cfg.health.readiness_path, "/readyz");
        // Untouched sections keep their defaults
        assert!(cfg.http.enable_cors);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = test_config();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:5000".parse().unwrap()
        );

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
