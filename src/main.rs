use anyhow::Result;
use brand_studio::app::App;
use brand_studio::models::Config;
use brand_studio::server::{self, AppState};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "brand-studio")]
#[command(about = "Serve the branded image edit form and API")]
struct CliArgs {
    /// Address to listen on (overrides BIND_ADDR).
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Directory for uploaded images (overrides UPLOAD_DIR).
    #[arg(long, value_name = "DIR")]
    upload_dir: Option<PathBuf>,
}

fn apply_overrides(mut config: Config, args: CliArgs) -> Config {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(upload_dir) = args.upload_dir {
        config.upload_dir = upload_dir;
    }
    config
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brand_studio=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting brand-studio");

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => apply_overrides(config, args),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        app: Arc::new(app),
        max_upload_bytes: config.max_upload_bytes,
    };

    server::serve(state, config.bind_addr, shutdown_signal()).await
}
