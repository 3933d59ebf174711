//! Integration tests for CLI argument handling
//!
//! Runs the binary with flags that exit before the terminal is taken over.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_transitboard"))
        .args(args)
        .output()
        .expect("Failed to execute transitboard")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("transitboard"), "Help should mention transitboard");
    assert!(stdout.contains("--refresh-interval"));
    assert!(stdout.contains("--no-auto-refresh"));
    assert!(stdout.contains("--ttl"));
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_url_prints_error_and_exits() {
    let output = run_cli(&["--go-api", "not a url"]);
    assert!(!output.status.success(), "Expected invalid URL to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid URL for --go-api"),
        "Should name the offending flag: {}",
        stderr
    );
}

#[test]
fn test_unsupported_scheme_is_rejected() {
    let output = run_cli(&["--ttc-api", "ftp://example.com/api"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported scheme"), "{}", stderr);
}

#[test]
fn test_zero_refresh_interval_is_rejected() {
    let output = run_cli(&["--refresh-interval", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--refresh-interval must be at least 1 second"), "{}", stderr);
}

#[test]
fn test_oversized_ttl_is_rejected_without_panicking() {
    for value in ["9223372036854775807", "18446744073709551615"] {
        let output = run_cli(&["--ttl", value]);
        assert!(!output.status.success(), "--ttl {} should fail", value);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("--ttl must be at most"), "{}", stderr);
        assert!(!stderr.contains("panicked"), "{}", stderr);
    }
}

#[test]
fn test_oversized_refresh_interval_is_rejected() {
    let output = run_cli(&["--refresh-interval", "18446744073709551615"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--refresh-interval must be at most"), "{}", stderr);
}

#[test]
fn test_unknown_page_is_rejected_by_clap() {
    let output = run_cli(&["--page", "timetable"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid value"), "{}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use transitboard::app::Page;
    use transitboard::cli::{Cli, StartupConfig};

    #[test]
    fn test_startup_config_from_flags() {
        let cli = Cli::parse_from([
            "transitboard",
            "--ttc-api",
            "http://localhost:3000/api/",
            "--timeout",
            "3",
            "--page",
            "alerts",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.ttc_api, "http://localhost:3000/api");
        assert_eq!(config.timeout, std::time::Duration::from_secs(3));
        assert_eq!(config.initial_page, Page::Alerts);
        assert!(config.refresh.enabled);
    }

    #[test]
    fn test_zero_ttl_is_an_error() {
        let cli = Cli::parse_from(["transitboard", "--ttl", "0"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("--ttl"));
    }
}
