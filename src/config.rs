//! Binary-level configuration, loaded from environment variables.
//!
//! CLI flag parsing and TOML config files are out of scope (spec.md §1
//! Non-goals; §6 "CLI surface"): env vars are the only supported surface.
//! This mirrors the teacher's `ConfigInner`/`Config` split — an internal
//! struct read straight from `std::env::var`, and a public `Config` with
//! typed, validated fields and accessor methods — without depending on
//! the teacher's internal `FromEnv` derive crate.

use crate::core::model::{FillerConfig, PendingQueueConfig, RetryConfig};
use eyre::{Result, WrapErr};
use itertools::Itertools;

const MAX_CONCURRENT_ORDERS_VAR: &str = "INTENT_FILLER_MAX_CONCURRENT_ORDERS";
const RECHECK_DELAY_MS_VAR: &str = "INTENT_FILLER_RECHECK_DELAY_MS";
const MAX_RECHECKS_VAR: &str = "INTENT_FILLER_MAX_RECHECKS";
const MAX_RETRY_ATTEMPTS_VAR: &str = "INTENT_FILLER_MAX_RETRY_ATTEMPTS";
const HEALTHCHECK_PORT_VAR: &str = "INTENT_FILLER_HEALTHCHECK_PORT";

const DEFAULT_MAX_CONCURRENT_ORDERS: usize = 16;
const DEFAULT_RECHECK_DELAY_MS: u64 = 30_000;
const DEFAULT_MAX_RECHECKS: u32 = 10;
const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_HEALTHCHECK_PORT: u16 = 8080;

struct EnvVarInfo {
    var: &'static str,
    description: &'static str,
}

const ENV_VAR_INVENTORY: [EnvVarInfo; 5] = [
    EnvVarInfo {
        var: MAX_CONCURRENT_ORDERS_VAR,
        description: "Maximum orders processed concurrently [default: 16]",
    },
    EnvVarInfo {
        var: RECHECK_DELAY_MS_VAR,
        description: "Delay between Pending-queue confirmation rechecks, in milliseconds [default: 30000]",
    },
    EnvVarInfo {
        var: MAX_RECHECKS_VAR,
        description: "Rechecks before a Pending order is marked Expired [default: 10]",
    },
    EnvVarInfo {
        var: MAX_RETRY_ATTEMPTS_VAR,
        description: "Retry attempts for a transient fill failure before it is marked Failed [default: 3]",
    },
    EnvVarInfo { var: HEALTHCHECK_PORT_VAR, description: "Port for the /healthz HTTP server [default: 8080]" },
];

/// Internal configuration loaded directly from environment variables.
#[derive(Debug, Default)]
struct ConfigInner {
    max_concurrent_orders: Option<String>,
    recheck_delay_ms: Option<String>,
    max_rechecks: Option<String>,
    max_retry_attempts: Option<String>,
    healthcheck_port: Option<String>,
}

impl ConfigInner {
    fn from_env() -> Self {
        Self {
            max_concurrent_orders: std::env::var(MAX_CONCURRENT_ORDERS_VAR).ok(),
            recheck_delay_ms: std::env::var(RECHECK_DELAY_MS_VAR).ok(),
            max_rechecks: std::env::var(MAX_RECHECKS_VAR).ok(),
            max_retry_attempts: std::env::var(MAX_RETRY_ATTEMPTS_VAR).ok(),
            healthcheck_port: std::env::var(HEALTHCHECK_PORT_VAR).ok(),
        }
    }
}

fn parse_or_default<T: std::str::FromStr>(var: &str, raw: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value.parse::<T>().wrap_err_with(|| format!("failed to parse {var}")),
        None => Ok(default),
    }
}

/// Configuration for the intent-filler service.
///
/// Load from environment variables using [`config_from_env`]. Use
/// `--help` to see the full list of supported environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    filler: FillerConfig,
    healthcheck_port: u16,
}

impl Config {
    /// Scheduler concurrency/retry/pending-queue configuration (spec.md §3 `FillerConfig`).
    pub const fn filler_config(&self) -> FillerConfig {
        self.filler
    }

    /// Port for the `/healthz` HTTP server.
    pub const fn healthcheck_port(&self) -> u16 {
        self.healthcheck_port
    }

    fn from_env() -> Result<Self> {
        let ConfigInner { max_concurrent_orders, recheck_delay_ms, max_rechecks, max_retry_attempts, healthcheck_port } =
            ConfigInner::from_env();

        let max_concurrent_orders =
            parse_or_default(MAX_CONCURRENT_ORDERS_VAR, max_concurrent_orders, DEFAULT_MAX_CONCURRENT_ORDERS)?;
        let recheck_delay_ms = parse_or_default(RECHECK_DELAY_MS_VAR, recheck_delay_ms, DEFAULT_RECHECK_DELAY_MS)?;
        let max_rechecks = parse_or_default(MAX_RECHECKS_VAR, max_rechecks, DEFAULT_MAX_RECHECKS)?;
        let max_attempts = parse_or_default(MAX_RETRY_ATTEMPTS_VAR, max_retry_attempts, DEFAULT_MAX_RETRY_ATTEMPTS)?;
        let healthcheck_port = parse_or_default(HEALTHCHECK_PORT_VAR, healthcheck_port, DEFAULT_HEALTHCHECK_PORT)?;

        if max_concurrent_orders == 0 {
            eyre::bail!("{MAX_CONCURRENT_ORDERS_VAR} must be greater than zero");
        }

        Ok(Config {
            filler: FillerConfig {
                max_concurrent_orders,
                pending_queue_config: PendingQueueConfig { recheck_delay_ms, max_rechecks },
                retry_config: RetryConfig { max_attempts },
            },
            healthcheck_port,
        })
    }
}

/// Get a list of the env vars used to configure the app.
pub fn env_var_info() -> String {
    let max_width = ENV_VAR_INVENTORY.iter().map(|item| item.var.len()).max().unwrap_or(0);
    ENV_VAR_INVENTORY
        .iter()
        .map(|item| format!("  {:width$}  {}", item.var, item.description, width = max_width))
        .join("\n")
}

/// Load configuration from environment variables.
pub fn config_from_env() -> Result<Config> {
    Config::from_env().wrap_err("failed to configure intent-filler (run with '--help' to see all supported env vars)")
}
