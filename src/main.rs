use clap::Parser;
use credrisk_api::{AppContext, RestApi};
use credrisk_store::FeatureStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Credit default risk scoring service
#[derive(Parser, Debug)]
#[command(name = "credrisk")]
#[command(about = "Serve default-risk predictions over a static client snapshot", long_about = None)]
struct Args {
    /// Path to the preprocessed client snapshot (.csv or .csv.gz)
    #[arg(short, long)]
    data: PathBuf,

    /// Path to the gradient-boosting model dump (.json)
    #[arg(short, long)]
    model: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Number of similar clients returned per lookup
    #[arg(long, default_value_t = 15)]
    neighbors: usize,

    /// Default-probability threshold above which a loan is declined
    #[arg(long, default_value_t = 0.5)]
    threshold: f64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting credrisk v{}", env!("CARGO_PKG_VERSION"));
    info!("Snapshot: {:?}", args.data);
    info!("Model: {:?}", args.model);

    // Everything below is fatal: the service must not start serving with
    // missing or malformed data.
    let store = FeatureStore::load(&args.data, &args.model)?;
    let ctx = Arc::new(AppContext::build(store, args.neighbors, args.threshold)?);

    info!("HTTP API: http://localhost:{}/", args.port);
    RestApi::start(ctx, args.port).await?;

    info!("Shutting down...");
    Ok(())
}
