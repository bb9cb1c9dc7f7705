mod api;
mod config;
mod dashboard;
mod recordings;
mod startup;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "organ-http", version = VERSION)]
pub(crate) struct Args {
    /// HTTP bind address
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Extra JSON config file applied after the global and user files
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recordings directory (overrides config files)
    #[arg(long)]
    recordings_dir: Option<PathBuf>,

    /// Organ display name (overrides config files)
    #[arg(long)]
    organ_name: Option<String>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,actix_web=info,organ_http=info")
        }))
        .init();

    startup::run(args).await
}
