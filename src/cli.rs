//! CLI argument definitions using clap derive macros.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use grabber_core::config::{DEFAULT_DOWNLOAD_DIR, DEFAULT_ENGINE_BINARY, EngineConfig};
use grabber_core::{ServiceConfig, default_browser_user_agent};

/// HTTP service that downloads media from a URL and serves the result.
///
/// Grabber hands metadata probes and downloads to yt-dlp, stores each
/// artifact under a fresh job identifier, and sweeps artifacts older than the
/// retention window.
#[derive(Parser, Debug)]
#[command(name = "grabber")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Address to bind
    #[arg(long, env = "GRABBER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 10000)]
    pub port: u16,

    /// Directory holding downloaded artifacts
    #[arg(short = 'd', long, env = "GRABBER_DOWNLOAD_DIR", default_value = DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: PathBuf,

    /// Delete artifacts older than this many seconds (1-604800)
    #[arg(long, env = "GRABBER_RETENTION_SECS", default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..=604_800))]
    pub retention_secs: u64,

    /// yt-dlp executable (name on PATH or absolute path)
    #[arg(long = "yt-dlp", env = "GRABBER_YT_DLP", default_value = DEFAULT_ENGINE_BINARY)]
    pub yt_dlp: PathBuf,

    /// User-Agent presented upstream (defaults to desktop Chrome)
    #[arg(long, env = "GRABBER_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Client impersonation target passed to yt-dlp (e.g. chrome)
    #[arg(long, env = "GRABBER_IMPERSONATE")]
    pub impersonate: Option<String>,

    /// Client profile for the engine to try, in order (repeatable or comma-separated)
    #[arg(long = "client-profile", env = "GRABBER_CLIENT_PROFILES", value_delimiter = ',')]
    pub client_profiles: Vec<String>,

    /// Seconds before a metadata probe is abandoned (1-3600)
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub probe_timeout_secs: u64,

    /// Seconds before a download is abandoned (1-86400)
    #[arg(long, default_value_t = 1800, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    pub download_timeout_secs: u64,

    /// Maximum simultaneous engine downloads (1-100)
    #[arg(short = 'c', long, default_value_t = 16, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub max_concurrent_downloads: u8,
}

impl Args {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Assembles the immutable service configuration from the parsed flags.
    pub fn to_service_config(&self) -> ServiceConfig {
        ServiceConfig {
            download_dir: self.download_dir.clone(),
            retention: Duration::from_secs(self.retention_secs),
            max_concurrent_downloads: usize::from(self.max_concurrent_downloads),
            engine: EngineConfig {
                binary: self.yt_dlp.clone(),
                user_agent: self
                    .user_agent
                    .clone()
                    .unwrap_or_else(default_browser_user_agent),
                impersonate: self.impersonate.clone(),
                client_profiles: self
                    .client_profiles
                    .iter()
                    .map(|profile| profile.trim().to_string())
                    .filter(|profile| !profile.is_empty())
                    .collect(),
                probe_timeout: Duration::from_secs(self.probe_timeout_secs),
                download_timeout: Duration::from_secs(self.download_timeout_secs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["grabber"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.max_concurrent_downloads, 16);
        assert_eq!(args.retention_secs, 3600);
        assert!(args.client_profiles.is_empty());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["grabber", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["grabber", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["grabber", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["grabber", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["grabber", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["grabber", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_bind_address() {
        let args =
            Args::try_parse_from(["grabber", "--host", "127.0.0.1", "--port", "8080"]).unwrap();
        assert_eq!(args.bind_addr(), "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn test_cli_invalid_host_rejected() {
        assert!(Args::try_parse_from(["grabber", "--host", "not-an-ip"]).is_err());
    }

    #[test]
    fn test_cli_retention_range() {
        assert!(Args::try_parse_from(["grabber", "--retention-secs", "0"]).is_err());
        assert!(Args::try_parse_from(["grabber", "--retention-secs", "604801"]).is_err());
        let args = Args::try_parse_from(["grabber", "--retention-secs", "604800"]).unwrap();
        assert_eq!(args.retention_secs, 604_800);
    }

    #[test]
    fn test_cli_concurrency_range() {
        assert!(Args::try_parse_from(["grabber", "-c", "0"]).is_err());
        assert!(Args::try_parse_from(["grabber", "-c", "101"]).is_err());
        let args = Args::try_parse_from(["grabber", "-c", "100"]).unwrap();
        assert_eq!(args.max_concurrent_downloads, 100);
    }

    #[test]
    fn test_cli_timeout_ranges() {
        assert!(Args::try_parse_from(["grabber", "--probe-timeout-secs", "0"]).is_err());
        assert!(Args::try_parse_from(["grabber", "--probe-timeout-secs", "3601"]).is_err());
        assert!(Args::try_parse_from(["grabber", "--download-timeout-secs", "86401"]).is_err());
    }

    #[test]
    fn test_cli_client_profiles_repeatable_and_comma_separated() {
        let args = Args::try_parse_from([
            "grabber",
            "--client-profile",
            "android,ios",
            "--client-profile",
            "web",
        ])
        .unwrap();
        assert_eq!(args.client_profiles, vec!["android", "ios", "web"]);
    }

    #[test]
    fn test_cli_to_service_config() {
        let args = Args::try_parse_from([
            "grabber",
            "--download-dir",
            "/srv/media",
            "--retention-secs",
            "120",
            "--yt-dlp",
            "/opt/yt-dlp",
            "--impersonate",
            "chrome",
            "--client-profile",
            "android, ,web",
            "--probe-timeout-secs",
            "5",
            "--download-timeout-secs",
            "50",
            "-c",
            "2",
        ])
        .unwrap();
        let config = args.to_service_config();

        assert_eq!(config.download_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.retention, Duration::from_secs(120));
        assert_eq!(config.max_concurrent_downloads, 2);
        assert_eq!(config.engine.binary, PathBuf::from("/opt/yt-dlp"));
        assert_eq!(config.engine.impersonate.as_deref(), Some("chrome"));
        assert_eq!(config.engine.client_profiles, vec!["android", "web"]);
        assert_eq!(config.engine.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.engine.download_timeout, Duration::from_secs(50));
        assert_eq!(config.engine.user_agent, default_browser_user_agent());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_user_agent_override() {
        let args = Args::try_parse_from(["grabber", "--user-agent", "TestAgent/1.0"]).unwrap();
        assert_eq!(args.to_service_config().engine.user_agent, "TestAgent/1.0");
    }
}
