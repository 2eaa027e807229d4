use bookstore_runner::{Config, run_session};
use bookstore_store::MongoStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    info!(uri = %config.uri, database = %config.database, collection = %config.collection, "starting");

    let connected = MongoStore::connect(&config.uri, &config.database, &config.collection).await;

    // Failures are reported on stderr inside the session; the process
    // still exits normally.
    let _ = run_session(
        connected,
        &config,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await;
}
