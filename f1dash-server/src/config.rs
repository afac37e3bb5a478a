//! Command line and environment configuration

use clap::{Args, Parser, Subcommand, ValueEnum};
use f1dash_core::SessionProvider;
use f1dash_providers::{ArchiveProvider, DemoProvider};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::DEFAULT_CAPACITY;

#[derive(Parser, Debug)]
#[command(version, about = "F1 telemetry dashboard", long_about = None)]
#[command(propagate_version = true, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server options when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,
}

impl Cli {
    /// The command to run; serving is the default
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the dashboard and its API
    Serve(ServeArgs),
    /// Write a demo session and its season schedule into an archive directory
    Export(ExportArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Synthetic, deterministic sessions
    Demo,
    /// Session payloads read from the cache directory
    Archive,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "F1DASH_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(short, long, env = "F1DASH_PORT", default_value_t = 8050)]
    pub port: u16,

    #[arg(long, env = "F1DASH_PROVIDER", value_enum, default_value_t = ProviderKind::Demo)]
    pub provider: ProviderKind,

    /// Session archive directory [default: platform cache dir]/f1-dashboard
    #[arg(long, env = "F1DASH_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Sessions kept in memory before the least recently used is dropped
    #[arg(long, env = "F1DASH_CACHE_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub cache_capacity: usize,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn cache_dir(&self) -> PathBuf {
        resolve_cache_dir(self.cache_dir.as_ref())
    }

    pub fn build_provider(&self) -> Arc<dyn SessionProvider> {
        match self.provider {
            ProviderKind::Demo => Arc::new(DemoProvider::new()),
            ProviderKind::Archive => Arc::new(ArchiveProvider::new(self.cache_dir())),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(long)]
    pub year: i32,

    #[arg(long)]
    pub event: String,

    /// Q or R
    #[arg(long, default_value = "R")]
    pub session: String,

    #[arg(long, env = "F1DASH_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// zstd-compress the session payload
    #[arg(long)]
    pub compress: bool,
}

impl ExportArgs {
    pub fn cache_dir(&self) -> PathBuf {
        resolve_cache_dir(self.cache_dir.as_ref())
    }
}

/// Explicit directory, else `<platform cache dir>/f1-dashboard`
pub fn resolve_cache_dir(explicit: Option<&PathBuf>) -> PathBuf {
    match explicit {
        Some(dir) => dir.clone(),
        None => dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("f1-dashboard"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serving_demo_data() {
        let cli = Cli::try_parse_from(["f1dash-server"]).unwrap();
        match cli.into_command() {
            Command::Serve(args) => {
                assert_eq!(args.port, 8050);
                assert_eq!(args.provider, ProviderKind::Demo);
                assert_eq!(args.cache_capacity, DEFAULT_CAPACITY);
                assert_eq!(args.addr().to_string(), "0.0.0.0:8050");
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn test_top_level_serve_flags() {
        let cli = Cli::try_parse_from([
            "f1dash-server",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--provider",
            "archive",
            "--cache-dir",
            "/tmp/f1",
        ])
        .unwrap();
        match cli.into_command() {
            Command::Serve(args) => {
                assert_eq!(args.addr().to_string(), "127.0.0.1:9000");
                assert_eq!(args.provider, ProviderKind::Archive);
                assert_eq!(args.cache_dir(), PathBuf::from("/tmp/f1"));
                assert_eq!(args.build_provider().name(), "Archive");
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn test_export_subcommand() {
        let cli = Cli::try_parse_from([
            "f1dash-server",
            "export",
            "--year",
            "2024",
            "--event",
            "Monaco Grand Prix",
            "--session",
            "Q",
            "--compress",
        ])
        .unwrap();
        match cli.into_command() {
            Command::Export(args) => {
                assert_eq!(args.year, 2024);
                assert_eq!(args.event, "Monaco Grand Prix");
                assert_eq!(args.session, "Q");
                assert!(args.compress);
            }
            other => panic!("expected export, got {:?}", other),
        }
    }

    #[test]
    fn test_default_cache_dir_is_namespaced() {
        assert!(resolve_cache_dir(None).ends_with("f1-dashboard"));
    }
}
