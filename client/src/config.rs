//! Client configuration.
//!
//! # Design
//! `ClientConfig` is plain data with builder-style setters. `from_env` reads
//! the `SEARCH_*` variables through an injectable lookup so parsing can be
//! tested without touching the process environment.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TASK_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const MAX_TASK_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },

    #[error("at least one host is required")]
    NoHosts,

    #[error("failed to start dispatch runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub application_id: String,
    pub api_key: String,
    /// Base URLs tried in order, e.g. `https://APPID-1.algolianet.com`.
    pub hosts: Vec<String>,
    /// Try the distributed search network host before `hosts`.
    pub enable_dsn: bool,
    /// Overrides the default `https://APPID-dsn.algolia.net`.
    pub dsn_host: Option<String>,
    /// Per-request timeout enforced by the transport.
    pub timeout: Duration,
    /// Upper bound on concurrently executing background calls.
    pub workers: usize,
    /// First delay between task status checks while waiting for a task. It
    /// doubles after every check, up to `MAX_TASK_POLL_INTERVAL`.
    pub task_poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(application_id: &str, api_key: &str) -> Self {
        Self {
            application_id: application_id.to_string(),
            api_key: api_key.to_string(),
            hosts: default_hosts(application_id),
            enable_dsn: false,
            dsn_host: None,
            timeout: DEFAULT_TIMEOUT,
            workers: DEFAULT_WORKERS,
            task_poll_interval: DEFAULT_TASK_POLL_INTERVAL,
        }
    }

    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts
            .into_iter()
            .map(|h| h.into().trim_end_matches('/').to_string())
            .collect();
        self
    }

    pub fn with_dsn(mut self, enable_dsn: bool) -> Self {
        self.enable_dsn = enable_dsn;
        self
    }

    /// Only consulted when DSN is enabled.
    pub fn with_dsn_host(mut self, dsn_host: impl Into<String>) -> Self {
        self.dsn_host = Some(dsn_host.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_task_poll_interval(mut self, interval: Duration) -> Self {
        self.task_poll_interval = interval;
        self
    }

    /// Hosts in the order requests try them: the DSN host when enabled, then
    /// `hosts`.
    pub fn resolved_hosts(&self) -> Vec<String> {
        let mut resolved = Vec::with_capacity(self.hosts.len() + 1);
        if self.enable_dsn {
            resolved.push(
                self.dsn_host
                    .clone()
                    .unwrap_or_else(|| dsn_host(&self.application_id)),
            );
        }
        resolved.extend(self.hosts.iter().cloned());
        resolved
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Read `SEARCH_APPLICATION_ID`, `SEARCH_API_KEY` and the optional
    /// `SEARCH_HOSTS` (comma separated), `SEARCH_ENABLE_DSN`, `SEARCH_DSN_HOST`,
    /// `SEARCH_TIMEOUT_MS`, `SEARCH_WORKERS` and `SEARCH_TASK_POLL_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let application_id =
            lookup("SEARCH_APPLICATION_ID").ok_or(ConfigError::Missing("SEARCH_APPLICATION_ID"))?;
        let api_key = lookup("SEARCH_API_KEY").ok_or(ConfigError::Missing("SEARCH_API_KEY"))?;
        let mut config = Self::new(&application_id, &api_key);

        if let Some(hosts) = lookup("SEARCH_HOSTS") {
            config = config.with_hosts(
                hosts
                    .split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            );
        }
        if let Some(raw) = lookup("SEARCH_ENABLE_DSN") {
            let flag = raw.trim().to_ascii_lowercase();
            config.enable_dsn = match flag.as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SEARCH_ENABLE_DSN",
                        value: raw,
                    })
                }
            };
        }
        if let Some(host) = lookup("SEARCH_DSN_HOST") {
            config = config.with_dsn_host(host);
        }
        if let Some(raw) = lookup("SEARCH_TIMEOUT_MS") {
            config.timeout = millis("SEARCH_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("SEARCH_TASK_POLL_MS") {
            config.task_poll_interval = millis("SEARCH_TASK_POLL_MS", &raw)?;
        }
        if let Some(raw) = lookup("SEARCH_WORKERS") {
            config.workers = raw.parse().map_err(|_| ConfigError::Invalid {
                name: "SEARCH_WORKERS",
                value: raw.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolved_hosts().is_empty() {
            return Err(ConfigError::NoHosts);
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid {
                name: "workers",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// The three fail-over hosts of an application.
pub fn default_hosts(application_id: &str) -> Vec<String> {
    (1..=3)
        .map(|n| format!("https://{application_id}-{n}.algolianet.com"))
        .collect()
}

pub fn dsn_host(application_id: &str) -> String {
    format!("https://{application_id}-dsn.algolia.net")
}

fn millis(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.parse().map(Duration::from_millis).map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
