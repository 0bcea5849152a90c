mod assets;
mod config;
mod graphql;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use config::ServerConfig;
use graphql::Schema;

async fn graphql_handler(State(schema): State<Schema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Build a cache-controlled static file router.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

const FALLBACK_INDEX: &str = r#"<!DOCTYPE html>
<html>
<head><title>Village Tour</title></head>
<body>
<h1>Village Tour</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to explore the tour content.</p>
</body>
</html>"#;

async fn serve_index(index_html: Arc<PathBuf>) -> Html<String> {
    match tokio::fs::read_to_string(index_html.as_path()).await {
        Ok(html) => Html(html),
        Err(err) => {
            tracing::debug!(path = %index_html.display(), %err, "Serving fallback index");
            Html(FALLBACK_INDEX.to_string())
        }
    }
}

/// Build the full application router.
fn build_app(schema: Schema, config: &ServerConfig) -> Router {
    // Stateless static routers are merged after the app state is attached
    let static_files = Router::new()
        .nest(
            "/static",
            cached_static_router(&config.assets_dir, CACHE_1DAY),
        )
        .nest(
            "/dist",
            cached_static_router(&config.dist_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&config.dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    let index = Arc::new(config.index_html());
    let index_for_poi = index.clone();

    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/", get(move || serve_index(index.clone())))
        .route("/poi/{id}", get(move || serve_index(index_for_poi.clone())))
        .with_state(schema)
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let loaded_assets = match assets::Assets::load(&config.assets_dir) {
        Ok(assets) => Arc::new(assets),
        Err(err) => {
            tracing::error!(dir = %config.assets_dir.display(), %err, "Failed to load tour content");
            std::process::exit(1);
        }
    };

    let schema = graphql::build_schema(loaded_assets);
    let app = build_app(schema, &config);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr()).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(addr = %config.bind_addr(), %err, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!("Server running at http://localhost:{}", config.port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(%err, "Server stopped");
        std::process::exit(1);
    }
}
