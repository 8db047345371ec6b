use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        "mock search API listening on {addr} (application id {}, api key {})",
        mock_server::TEST_APPLICATION_ID,
        mock_server::TEST_API_KEY
    );
    mock_server::run(listener).await
}
