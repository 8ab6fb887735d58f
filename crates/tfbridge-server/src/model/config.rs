//! Configuration management for the tfbridge server
//!
//! Settings are loaded from an optional `conf/application.yml` file and the
//! environment (prefix `tfbridge`, `.`-separated keys), with command-line
//! arguments taking precedence. B2 credentials are deliberately not read
//! from the config file; they come from flags or the `B2_KEY_ID` /
//! `B2_APP_KEY` environment variables.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use config::{Config, Environment};

use tfbridge_storage::B2Config;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;
// Terraform states are usually small; 32 MiB leaves generous headroom
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command()]
struct Cli {
    #[arg(short = 'a', long = "address")]
    address: Option<String>,
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(short = 'b', long = "backend")]
    backend: Option<String>,
    #[arg(long = "b2-key-id", env = "B2_KEY_ID", hide_env_values = true)]
    b2_key_id: Option<String>,
    #[arg(long = "b2-app-key", env = "B2_APP_KEY", hide_env_values = true)]
    b2_app_key: Option<String>,
    #[arg(long = "b2-bucket", env = "B2_BUCKET")]
    b2_bucket: Option<String>,
}

/// Application configuration loaded from config file, environment, and CLI
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Self {
        let args = Cli::parse();
        let mut config_builder = Config::builder()
            .add_source(
                Environment::with_prefix("tfbridge")
                    .separator(".")
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("conf/application").required(false));

        if let Some(v) = args.address {
            config_builder = config_builder
                .set_override("server.address", v)
                .expect("Failed to set server address override");
        }
        if let Some(v) = args.port {
            config_builder = config_builder
                .set_override("server.port", i64::from(v))
                .expect("Failed to set server port override");
        }
        if let Some(v) = args.backend {
            config_builder = config_builder
                .set_override("storage.backend", v)
                .expect("Failed to set storage backend override");
        }
        if let Some(v) = args.b2_key_id {
            config_builder = config_builder
                .set_override("b2.keyId", v)
                .expect("Failed to set B2 key id override");
        }
        if let Some(v) = args.b2_app_key {
            config_builder = config_builder
                .set_override("b2.appKey", v)
                .expect("Failed to set B2 app key override");
        }
        if let Some(v) = args.b2_bucket {
            config_builder = config_builder
                .set_override("b2.bucket", v)
                .expect("Failed to set B2 bucket override");
        }

        let app_config = config_builder
            .build()
            .expect("Failed to build configuration - check conf/application.yml");

        Configuration { config: app_config }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server.address")
            .unwrap_or(DEFAULT_SERVER_ADDRESS.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server.port")
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    /// Bounded grace period for in-flight requests on shutdown
    pub fn shutdown_grace(&self) -> Duration {
        let secs = self
            .config
            .get_int("server.shutdownGraceSeconds")
            .map(|v| v.max(0) as u64)
            .unwrap_or(DEFAULT_SHUTDOWN_GRACE_SECS);
        Duration::from_secs(secs)
    }

    /// Upper bound on accepted state upload size
    pub fn max_payload_bytes(&self) -> usize {
        self.config
            .get_int("server.maxPayloadBytes")
            .map(|v| v.max(0) as usize)
            .unwrap_or(DEFAULT_MAX_PAYLOAD_BYTES)
    }

    /// Directory for rolling log files; console-only logging when unset
    pub fn log_dir(&self) -> Option<String> {
        self.config.get_string("logging.dir").ok()
    }

    // ========================================================================
    // Storage Configuration
    // ========================================================================

    /// Storage backend kind: `b2` (default) or `memory`
    pub fn storage_backend(&self) -> String {
        self.config
            .get_string("storage.backend")
            .unwrap_or("b2".to_string())
    }

    pub fn b2_config(&self) -> anyhow::Result<B2Config> {
        let key_id = self
            .config
            .get_string("b2.keyId")
            .context("b2.keyId is not configured (set B2_KEY_ID or --b2-key-id)")?;
        let app_key = self
            .config
            .get_string("b2.appKey")
            .context("b2.appKey is not configured (set B2_APP_KEY or --b2-app-key)")?;
        Ok(B2Config {
            key_id,
            app_key,
            bucket_name: self.config.get_string("b2.bucket").unwrap_or_default(),
            object_prefix: self.config.get_string("b2.prefix").unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configuration_from(pairs: &[(&str, &str)]) -> Configuration {
        let mut builder = Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        Configuration {
            config: builder.build().unwrap(),
        }
    }

    #[test]
    fn test_defaults() {
        let configuration = configuration_from(&[]);
        assert_eq!(configuration.server_address(), "127.0.0.1");
        assert_eq!(configuration.server_port(), 8080);
        assert_eq!(configuration.storage_backend(), "b2");
        assert_eq!(configuration.shutdown_grace(), Duration::from_secs(30));
        assert!(configuration.log_dir().is_none());
    }

    #[test]
    fn test_overrides() {
        let configuration = configuration_from(&[
            ("server.address", "0.0.0.0"),
            ("server.port", "9090"),
            ("storage.backend", "memory"),
        ]);
        assert_eq!(configuration.server_address(), "0.0.0.0");
        assert_eq!(configuration.server_port(), 9090);
        assert_eq!(configuration.storage_backend(), "memory");
    }

    #[test]
    fn test_b2_config_requires_credentials() {
        let configuration = configuration_from(&[("b2.keyId", "k")]);
        assert!(configuration.b2_config().is_err());

        let configuration = configuration_from(&[
            ("b2.keyId", "k"),
            ("b2.appKey", "s"),
            ("b2.bucket", "states"),
        ]);
        let b2 = configuration.b2_config().unwrap();
        assert_eq!(b2.key_id, "k");
        assert_eq!(b2.bucket_name, "states");
        assert_eq!(b2.object_prefix, "");
    }
}
