//! Command-line interface parsing for transitboard
//!
//! This module handles parsing of CLI arguments using clap and turns them into a
//! validated `StartupConfig`. Configuration errors are reported before the
//! terminal is switched into TUI mode.

use std::path::PathBuf;

use chrono::Duration;
use clap::{Parser, ValueEnum};
use reqwest::Url;
use thiserror::Error;

use crate::api::{GO_API_BASE_URL, TTC_API_BASE_URL};
use crate::app::Page;
use crate::cache::DEFAULT_TTL_SECS;
use crate::refresh::{RefreshConfig, DEFAULT_REFRESH_INTERVAL_SECS};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A base URL could not be parsed or is not http(s)
    #[error("Invalid URL for {flag}: '{value}' ({reason})")]
    InvalidUrl {
        flag: &'static str,
        value: String,
        reason: String,
    },

    /// A duration flag was zero
    #[error("{flag} must be at least 1 second")]
    ZeroDuration { flag: &'static str },

    /// A duration flag was larger than the supported maximum
    #[error("{flag} must be at most {max} seconds")]
    DurationTooLarge { flag: &'static str, max: u64 },
}

/// Upper bound for every duration flag (one year)
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Dashboard page selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageArg {
    Overview,
    Lines,
    Vehicles,
    Alerts,
}

impl From<PageArg> for Page {
    fn from(arg: PageArg) -> Self {
        match arg {
            PageArg::Overview => Page::Overview,
            PageArg::Lines => Page::Lines,
            PageArg::Vehicles => Page::Vehicles,
            PageArg::Alerts => Page::Alerts,
        }
    }
}

/// transitboard - live GO Transit and TTC service dashboard
#[derive(Parser, Debug)]
#[command(name = "transitboard")]
#[command(about = "Live GO Transit and TTC service dashboard")]
#[command(version)]
pub struct Cli {
    /// Base URL for GO Transit endpoints
    #[arg(long, value_name = "URL", default_value = GO_API_BASE_URL)]
    pub go_api: String,

    /// Base URL for TTC endpoints
    #[arg(long, value_name = "URL", default_value = TTC_API_BASE_URL)]
    pub ttc_api: String,

    /// Seconds a fetched response stays fresh
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TTL_SECS as u64)]
    pub ttl: u64,

    /// Seconds between automatic full refreshes
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_REFRESH_INTERVAL_SECS as u64)]
    pub refresh_interval: u64,

    /// Start with automatic refresh turned off
    #[arg(long)]
    pub no_auto_refresh: bool,

    /// Network timeout per request in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Page to open on startup
    #[arg(long, value_enum, default_value_t = PageArg::Overview)]
    pub page: PageArg,

    /// Write JSON logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub go_api: String,
    pub ttc_api: String,
    /// Cache entry time-to-live
    pub ttl: Duration,
    pub refresh: RefreshConfig,
    pub timeout: std::time::Duration,
    pub initial_page: Page,
    pub log_file: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            go_api: GO_API_BASE_URL.to_string(),
            ttc_api: TTC_API_BASE_URL.to_string(),
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            refresh: RefreshConfig::default(),
            timeout: crate::api::DEFAULT_TIMEOUT,
            initial_page: Page::Overview,
            log_file: None,
        }
    }
}

/// Checks that a base URL parses and uses http or https
pub fn parse_base_url(flag: &'static str, value: &str) -> Result<String, CliError> {
    let invalid = |reason: String| CliError::InvalidUrl {
        flag,
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

/// Checks a duration flag is between 1 second and `MAX_DURATION_SECS`
fn duration_secs(flag: &'static str, secs: u64) -> Result<i64, CliError> {
    if secs == 0 {
        return Err(CliError::ZeroDuration { flag });
    }
    if secs > MAX_DURATION_SECS {
        return Err(CliError::DurationTooLarge {
            flag,
            max: MAX_DURATION_SECS,
        });
    }
    i64::try_from(secs).map_err(|_| CliError::DurationTooLarge {
        flag,
        max: MAX_DURATION_SECS,
    })
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if a URL is malformed or a duration is zero or too large
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let go_api = parse_base_url("--go-api", &cli.go_api)?;
        let ttc_api = parse_base_url("--ttc-api", &cli.ttc_api)?;
        let ttl = duration_secs("--ttl", cli.ttl)?;
        let interval = duration_secs("--refresh-interval", cli.refresh_interval)?;
        let timeout = duration_secs("--timeout", cli.timeout)?;

        Ok(StartupConfig {
            go_api,
            ttc_api,
            ttl: Duration::seconds(ttl),
            refresh: RefreshConfig {
                interval: Duration::seconds(interval),
                enabled: !cli.no_auto_refresh,
            },
            timeout: std::time::Duration::from_secs(timeout.unsigned_abs()),
            initial_page: cli.page.into(),
            log_file: cli.log_file.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_uses_defaults() {
        let cli = Cli::parse_from(["transitboard"]);
        assert_eq!(cli.go_api, GO_API_BASE_URL);
        assert_eq!(cli.ttc_api, TTC_API_BASE_URL);
        assert_eq!(cli.ttl, 60);
        assert_eq!(cli.refresh_interval, 60);
        assert_eq!(cli.timeout, 10);
        assert!(!cli.no_auto_refresh);
        assert_eq!(cli.page, PageArg::Overview);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn test_cli_parse_all_flags() {
        let cli = Cli::parse_from([
            "transitboard",
            "--go-api",
            "http://localhost:8080/api/go",
            "--ttl",
            "30",
            "--refresh-interval",
            "120",
            "--no-auto-refresh",
            "--page",
            "vehicles",
            "--log-file",
            "/tmp/tb.log",
        ]);
        assert_eq!(cli.go_api, "http://localhost:8080/api/go");
        assert_eq!(cli.ttl, 30);
        assert_eq!(cli.refresh_interval, 120);
        assert!(cli.no_auto_refresh);
        assert_eq!(cli.page, PageArg::Vehicles);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/tb.log")));
    }

    #[test]
    fn test_cli_rejects_unknown_page() {
        assert!(Cli::try_parse_from(["transitboard", "--page", "map"]).is_err());
    }

    #[test]
    fn test_startup_config_from_defaults() {
        let cli = Cli::parse_from(["transitboard"]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.ttl, Duration::seconds(60));
        assert_eq!(config.refresh.interval, Duration::seconds(60));
        assert!(config.refresh.enabled);
        assert_eq!(config.timeout, std::time::Duration::from_secs(10));
        assert_eq!(config.initial_page, Page::Overview);
    }

    #[test]
    fn test_startup_config_applies_flags() {
        let cli = Cli::parse_from([
            "transitboard",
            "--no-auto-refresh",
            "--refresh-interval",
            "15",
            "--page",
            "alerts",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert!(!config.refresh.enabled);
        assert_eq!(config.refresh.interval, Duration::seconds(15));
        assert_eq!(config.initial_page, Page::Alerts);
    }

    #[test]
    fn test_startup_config_rejects_malformed_url() {
        let cli = Cli::parse_from(["transitboard", "--go-api", "not a url"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("--go-api"));
    }

    #[test]
    fn test_startup_config_rejects_non_http_scheme() {
        let cli = Cli::parse_from(["transitboard", "--ttc-api", "ftp://example.com/api"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_startup_config_rejects_zero_durations() {
        for flag in ["--ttl", "--refresh-interval", "--timeout"] {
            let cli = Cli::parse_from(["transitboard", flag, "0"]);
            let err = StartupConfig::from_cli(&cli).unwrap_err();
            assert!(err.to_string().contains(flag), "{} should be rejected", flag);
        }
    }

    #[test]
    fn test_startup_config_rejects_oversized_durations() {
        for flag in ["--ttl", "--refresh-interval", "--timeout"] {
            for value in ["9223372036854775807", "18446744073709551615"] {
                let cli = Cli::parse_from(["transitboard", flag, value]);
                let err = StartupConfig::from_cli(&cli).unwrap_err();
                assert!(
                    matches!(err, CliError::DurationTooLarge { flag: f, .. } if f == flag),
                    "{} {} should be rejected, got {}",
                    flag,
                    value,
                    err
                );
            }
        }
    }

    #[test]
    fn test_startup_config_accepts_maximum_duration() {
        let max = MAX_DURATION_SECS.to_string();
        let cli = Cli::parse_from(["transitboard", "--ttl", max.as_str()]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.ttl, Duration::seconds(MAX_DURATION_SECS as i64));
        assert!(config.ttl > Duration::zero());
    }

    #[test]
    fn test_parse_base_url_trims_trailing_slash() {
        assert_eq!(
            parse_base_url("--go-api", "https://example.com/api/go/").unwrap(),
            "https://example.com/api/go"
        );
    }
}
