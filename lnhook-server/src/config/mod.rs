//! Configuration module for lnhook-server.
//!
//! Handles loading configuration from TOML files and CLI arguments, and
//! reading the node credentials the file points at.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{DeliveryConfig, LndConfig, ReconnectPolicy, ServerConfig};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to read {what} at {path}: {source}")]
    Credential {
        what: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub lnd: LndConfig,
    pub delivery: DeliveryConfig,
    pub reconnect: ReconnectPolicy,
}

/// Listen addresses given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenOverrides {
    pub listen: Option<SocketAddr>,
    pub realtime_listen: Option<SocketAddr>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    overrides: ListenOverrides,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, overrides: ListenOverrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Read the macaroon and TLS certificate
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.overrides.listen {
            file_config.server.listen = listen;
        }
        if let Some(realtime_listen) = self.overrides.realtime_listen {
            file_config.server.realtime_listen = realtime_listen;
        }

        let rest_url = validate(&file_config)?;
        let lnd = read_credentials(&file_config, rest_url)?;

        Ok(build_loaded_config(file_config, lnd))
    }
}

fn validate(config: &FileConfig) -> Result<Url, ConfigError> {
    let rest_url = Url::parse(&config.lnd.rest_url).map_err(|e| {
        ConfigError::ValidationError(format!("lnd.rest_url {:?}: {e}", config.lnd.rest_url))
    })?;
    if !matches!(rest_url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "lnd.rest_url must be http or https, got {}",
            rest_url.scheme()
        )));
    }
    if config.delivery.webhook_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "delivery.webhook_timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.delivery.peer_queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "delivery.peer_queue_capacity must be greater than zero".to_string(),
        ));
    }
    let reconnect = &config.reconnect;
    if reconnect.multiplier == 0 {
        return Err(ConfigError::ValidationError(
            "reconnect.multiplier must be at least 1".to_string(),
        ));
    }
    if reconnect.initial_delay_secs > reconnect.max_delay_secs {
        return Err(ConfigError::ValidationError(format!(
            "reconnect.initial_delay_secs ({}) exceeds reconnect.max_delay_secs ({})",
            reconnect.initial_delay_secs, reconnect.max_delay_secs
        )));
    }
    Ok(rest_url)
}

fn read_credentials(config: &FileConfig, rest_url: Url) -> Result<LndConfig, ConfigError> {
    let macaroon_path = &config.lnd.macaroon_path;
    let macaroon = std::fs::read(macaroon_path).map_err(|source| ConfigError::Credential {
        what: "macaroon",
        path: macaroon_path.clone(),
        source,
    })?;
    if macaroon.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "macaroon at {} is empty",
            macaroon_path.display()
        )));
    }

    let tls_cert_pem = match &config.lnd.tls_cert_path {
        Some(path) => Some(std::fs::read(path).map_err(|source| ConfigError::Credential {
            what: "TLS certificate",
            path: path.clone(),
            source,
        })?),
        None => None,
    };

    Ok(LndConfig {
        rest_url,
        macaroon_hex: hex::encode(macaroon),
        tls_cert_pem,
    })
}

fn build_loaded_config(file_config: FileConfig, lnd: LndConfig) -> LoadedConfig {
    let reconnect = file_config.reconnect;
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
            realtime_listen: file_config.server.realtime_listen,
        },
        lnd,
        delivery: DeliveryConfig {
            webhook_timeout: Duration::from_secs(file_config.delivery.webhook_timeout_secs),
            peer_queue_capacity: file_config.delivery.peer_queue_capacity,
        },
        reconnect: ReconnectPolicy {
            initial_delay: Duration::from_secs(reconnect.initial_delay_secs),
            max_delay: Duration::from_secs(reconnect.max_delay_secs),
            multiplier: reconnect.multiplier,
            max_attempts: reconnect.max_attempts,
            circuit_open_delay: Duration::from_secs(reconnect.circuit_open_secs),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scratch directory holding a config file and a macaroon.
    struct Fixture {
        dir: PathBuf,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "lnhook-config-{}-{}",
                name,
                std::process::id()
            ));
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("admin.macaroon"), [0x02, 0x01, 0xab]).unwrap();
            Self { dir }
        }

        fn write_config(&self, extra: &str) -> PathBuf {
            let path = self.dir.join("lnhook-config.toml");
            let content = format!(
                "[lnd]\nrest_url = \"https://127.0.0.1:8080\"\nmacaroon_path = {:?}\n{extra}",
                self.dir.join("admin.macaroon")
            );
            std::fs::write(&path, content).unwrap();
            path
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    #[test]
    fn test_load_reads_macaroon_as_hex() {
        let fixture = Fixture::new("macaroon");
        let path = fixture.write_config("");

        let loaded = ConfigLoader::new(&path, ListenOverrides::default())
            .load()
            .unwrap();

        assert_eq!(loaded.lnd.macaroon_hex, "0201ab");
        assert_eq!(loaded.lnd.rest_url.as_str(), "https://127.0.0.1:8080/");
        assert!(loaded.lnd.tls_cert_pem.is_none());
        assert_eq!(loaded.delivery.webhook_timeout, Duration::from_secs(10));
        assert_eq!(loaded.reconnect.initial_delay, Duration::from_secs(5));
        assert_eq!(loaded.reconnect.circuit_open_delay, Duration::from_secs(600));
        assert_eq!(loaded.server.listen.port(), 3000);
    }

    #[test]
    fn test_cli_overrides_listen_addresses() {
        let fixture = Fixture::new("overrides");
        let path = fixture.write_config("[server]\nlisten = \"127.0.0.1:4000\"\n");

        let overrides = ListenOverrides {
            listen: Some("127.0.0.1:5000".parse().unwrap()),
            realtime_listen: Some("127.0.0.1:5001".parse().unwrap()),
        };
        let loaded = ConfigLoader::new(&path, overrides).load().unwrap();

        assert_eq!(loaded.server.listen.port(), 5000);
        assert_eq!(loaded.server.realtime_listen.port(), 5001);
    }

    #[test]
    fn test_missing_macaroon_is_credential_error() {
        let fixture = Fixture::new("no-macaroon");
        let path = fixture.write_config("");
        std::fs::remove_file(fixture.dir.join("admin.macaroon")).unwrap();

        let err = ConfigLoader::new(&path, ListenOverrides::default())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Credential { what: "macaroon", .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let cases = [
            "[delivery]\nwebhook_timeout_secs = 0\n",
            "[delivery]\npeer_queue_capacity = 0\n",
            "[reconnect]\nmultiplier = 0\n",
            "[reconnect]\ninitial_delay_secs = 30\nmax_delay_secs = 10\n",
        ];
        for (i, extra) in cases.iter().enumerate() {
            let fixture = Fixture::new(&format!("invalid-{i}"));
            let path = fixture.write_config(extra);
            let err = ConfigLoader::new(&path, ListenOverrides::default())
                .load()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::ValidationError(_)),
                "case {extra:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_validation_rejects_non_http_rest_url() {
        let fixture = Fixture::new("scheme");
        let path = fixture.dir.join("lnhook-config.toml");
        std::fs::write(
            &path,
            "[lnd]\nrest_url = \"ftp://node\"\nmacaroon_path = \"x\"\n",
        )
        .unwrap();

        let err = ConfigLoader::new(&path, ListenOverrides::default())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ConfigLoader::new("/nonexistent/lnhook-config.toml", ListenOverrides::default())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
