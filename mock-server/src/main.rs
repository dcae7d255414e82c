use mock_server::Keys;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mut keys = Keys::default();
    if let Ok(key) = std::env::var("MOCK_API_KEY") {
        keys.api_key = key;
    }
    if let Ok(key) = std::env::var("MOCK_PREMIUM_KEY") {
        keys.premium_key = key;
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock cat API listening");
    mock_server::run_with_keys(listener, keys).await
}
