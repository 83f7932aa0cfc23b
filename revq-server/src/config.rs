//! Configuration for revq-server
//!
//! Resolution order per setting: command-line argument, then environment
//! variable, then compiled default.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Review work routing service
#[derive(Debug, Clone, Parser)]
#[command(name = "revq-server", version)]
pub struct Config {
    /// Path to the SQLite database file
    #[arg(long, env = "REVQ_DATABASE", default_value = "revq.db")]
    pub database: PathBuf,

    /// Socket address the HTTP server binds to
    #[arg(long, env = "REVQ_LISTEN", default_value = "127.0.0.1:5730")]
    pub listen: SocketAddr,

    /// Directory where decision results are exported
    #[arg(long, env = "REVQ_EXPORT_DIR", default_value = "results")]
    pub export_dir: PathBuf,

    /// Default maximum lease age in minutes for stale-lock resets
    #[arg(long, env = "REVQ_STALE_LOCK_MINUTES", default_value_t = 30)]
    pub stale_lock_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let config = Config::parse_from(["revq-server"]);
        assert_eq!(config.database, PathBuf::from("revq.db"));
        assert_eq!(config.listen, "127.0.0.1:5730".parse::<SocketAddr>().unwrap());
        assert_eq!(config.stale_lock_minutes, 30);
    }

    #[test]
    fn arguments_override_defaults() {
        let config = Config::parse_from([
            "revq-server",
            "--database",
            "/tmp/review.db",
            "--stale-lock-minutes",
            "10",
        ]);
        assert_eq!(config.database, PathBuf::from("/tmp/review.db"));
        assert_eq!(config.stale_lock_minutes, 10);
    }
}
