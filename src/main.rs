use flightdesk::config::Config;
use flightdesk::server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flightdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Starting Flightdesk {} on {}",
        flightdesk::VERSION,
        config.address()
    );

    let host = config.host.clone();
    let port = config.port;
    let (_, app) = server::build_app(config).expect("Failed to build application");

    let (port, handle) = server::serve(app, &host, port)
        .await
        .expect("Failed to bind address");
    tracing::info!("Listening on http://{}:{}", host, port);

    handle.await.expect("Server task panicked");
}
