// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gateway configuration.
//
// Layering (lowest to highest priority):
//   1. built-in defaults
//   2. optional YAML file
//   3. legacy environment variables (PRINT_API_KEY, PRINTER_NAME,
//      PRINT_SERVER_PORT) kept for existing Pi deployments
//   4. PRINTHOOK_* environment variables
//
// The resulting value is validated once at startup and never mutated.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Prefix for first-class environment overrides.
pub const ENV_PREFIX: &str = "PRINTHOOK_";

/// Placeholder shipped in sample configs; refusing it forces operators to
/// generate a real key.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_GENERATE_A_SECURE_KEY";

/// Legacy variable name -> config field.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("PRINT_API_KEY", "api_key"),
    ("PRINTER_NAME", "printer_name"),
    ("PRINT_SERVER_PORT", "port"),
];

/// Shared secret expected in the `X-API-Key` header.
///
/// `Debug` never prints the value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key.  Only the auth check should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Process-wide gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Shared secret callers must present.
    pub api_key: ApiKey,
    /// Target printer; `None` or empty means the system default destination.
    pub printer_name: Option<String>,
    /// Extra `lp -o` options applied to every job.
    pub print_options: Vec<String>,
    /// Upper bound for the `copies` form field.
    pub max_copies: u32,
    /// Address to bind.  Loopback by default; the tunnel handles exposure.
    pub bind_address: IpAddr,
    pub port: u16,
    /// Runtime worker threads and maximum in-flight requests.
    pub workers: usize,
    /// Bound for each spooler call and for staging the upload on disk.
    pub spooler_timeout_secs: u64,
    /// Outer bound for a whole HTTP request.
    pub request_timeout_secs: u64,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    /// Where uploads are staged before submission (system temp dir if unset).
    pub upload_dir: Option<PathBuf>,
    /// Fallback log filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: ApiKey::default(),
            printer_name: None,
            print_options: vec!["fit-to-page".into(), "media=A4.Borderless".into()],
            max_copies: 10,
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            workers: 2,
            spooler_timeout_secs: 30,
            request_timeout_secs: 120,
            max_upload_bytes: 16 * 1024 * 1024, // 16 MiB
            upload_dir: None,
            log_level: "info".into(),
        }
    }
}

impl GatewayConfig {
    /// Build the layered provider chain without extracting it.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(GatewayConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::raw().filter_map(|key| {
                LEGACY_ENV
                    .iter()
                    .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                    .map(|(_, field)| (*field).into())
            }))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }

    /// Load and validate the configuration.
    ///
    /// An explicitly named file must exist; a silent fallback to defaults
    /// would start the gateway with the wrong printer.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(GatewayError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
        }
        let config: GatewayConfig = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the gateway cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(GatewayError::Config(
                "api_key is not set (PRINTHOOK_API_KEY or PRINT_API_KEY)".into(),
            ));
        }
        if self.api_key.expose() == PLACEHOLDER_API_KEY {
            return Err(GatewayError::Config(
                "api_key is still the placeholder value; generate a real key".into(),
            ));
        }
        if self.max_copies == 0 {
            return Err(GatewayError::Config("max_copies must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(GatewayError::Config("workers must be at least 1".into()));
        }
        if self.spooler_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(GatewayError::Config("timeouts must be non-zero".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(GatewayError::Config("max_upload_bytes must be non-zero".into()));
        }
        Ok(())
    }

    /// Configured printer, treating an empty name as "use the default".
    pub fn printer(&self) -> Option<&str> {
        self.printer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn spooler_timeout(&self) -> Duration {
        Duration::from_secs(self.spooler_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory uploads are staged in.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
