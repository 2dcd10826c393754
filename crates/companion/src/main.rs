use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use companion::config::Config;
use companion::server::{self, AppState};

const DEFAULT_CONFIG: &str = "companion.yaml";

#[derive(Parser)]
#[command(
    name = "companion",
    version,
    about = "Chat relay for the companion persona",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Arguments for the default `serve` command
    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP relay (default)
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Path to the YAML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

impl Cli {
    fn into_serve_args(self) -> ServeArgs {
        match self.command {
            Some(Command::Serve(args)) => args,
            None => self.serve,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    run_serve(Cli::parse().into_serve_args()).await
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = Config::load(&args.config)
        .await
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let state = AppState::from_config(&config).context("building upstream client")?;
    let app = server::build_app(state, config.server.request_timeout_seconds);

    server::serve(app, &config.server.host, config.server.port)
        .await
        .context("server error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_serves_with_default_config() {
        let args = Cli::try_parse_from(["companion"])
            .unwrap()
            .into_serve_args();
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG));
        assert!(args.host.is_none());
        assert!(args.port.is_none());
    }

    #[test]
    fn test_top_level_flags_apply_without_subcommand() {
        let args = Cli::try_parse_from(["companion", "--port", "9000", "-c", "other.yaml"])
            .unwrap()
            .into_serve_args();
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.config, PathBuf::from("other.yaml"));
    }

    #[test]
    fn test_serve_subcommand_flags() {
        let args = Cli::try_parse_from(["companion", "serve", "--host", "127.0.0.1"])
            .unwrap()
            .into_serve_args();
        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG));
    }
}
