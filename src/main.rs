use biblio::rag::ingest;
use biblio::{api, AppState, CompletionClient, Config, Embedder, OpenAIClient, OpenAIEmbedder};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(
        &config.embedding.api_base,
        config.completion.api_key.clone(),
        &config.embedding.model,
    ));
    let completion: Arc<dyn CompletionClient> = Arc::new(OpenAIClient::new(
        &config.completion.api_base,
        config.completion.api_key.clone(),
        &config.completion.model,
    ));

    let state = AppState::new(config.clone(), embedder, completion);

    // Index whatever is already in the documents directory before serving.
    info!(dir = %config.rag.documents_dir.display(), "scanning document directory");
    let (index, report) = ingest::rebuild_index(&config.rag, state.embedder.as_ref()).await;
    report.log();
    *state.index.write() = index;

    let app = api::app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, model = %config.completion.model, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
