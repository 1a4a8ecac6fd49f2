use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use volley_client::driver::{self, Delivery};
use volley_common::config::HarnessConfig;

#[derive(Parser, Debug)]
#[command(name = "volley", version, about = "HTTP payload load harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the ingest server.
    Serve,
    /// Run the worker fan-out against the configured endpoint.
    Fire(FireArgs),
    Version,
}

#[derive(Args, Debug)]
struct FireArgs {
    /// Pace every upload so it takes about the configured transfer duration.
    #[arg(long)]
    throttled: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cfg = HarnessConfig::load();
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve => serve(cfg).await,
        Commands::Fire(args) => fire(cfg, args).await,
        Commands::Version => println!("{}", env!("CARGO_PKG_VERSION")),
    }
}

async fn serve(cfg: HarnessConfig) {
    spawn_diagnostics(cfg.diag_port);

    let app = volley_server::app();
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.listen_port))
        .await
        .unwrap();
    tracing::info!("listening on http://0.0.0.0:{}", cfg.listen_port);
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
    };
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .unwrap();
}

fn spawn_diagnostics(port: u16) {
    let router = volley_server::diagnostics();
    tokio::spawn(async move {
        match tokio::net::TcpListener::bind(("127.0.0.1", port)).await {
            Ok(listener) => {
                tracing::info!("diagnostics on http://127.0.0.1:{port}/healthz");
                if let Err(e) = axum::serve(listener, router).await {
                    tracing::warn!("diagnostics server error: {e}");
                }
            }
            Err(e) => tracing::warn!("diagnostics bind failed: {e}"),
        }
    });
}

async fn fire(cfg: HarnessConfig, args: FireArgs) {
    let delivery = if args.throttled {
        Delivery::Throttled
    } else {
        Delivery::Direct
    };
    tracing::info!(
        workers = cfg.workers,
        mode = ?delivery,
        target = %cfg.target_url,
        "starting fan-out"
    );
    driver::run(cfg, delivery).await;
    tracing::info!("all workers stopped");
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
