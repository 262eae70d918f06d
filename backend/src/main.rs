//! ERP Analytics Platform - Backend Server
//!
//! Serves order, stock, production-need and sales-recommendation analytics
//! computed from ERP records to the BI dashboard.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod middleware;
mod routes;
mod services;

pub use crate::config::Config;

use crate::config::{DataSourceKind, LogFormat};
use external::ErpApiClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    /// Present when analytics read from the ERP API
    pub erp_client: Option<ErpApiClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(config.log.format);

    tracing::info!("Starting ERP Analytics Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Data source: {:?}", config.data_source);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let erp_client = match config.data_source {
        DataSourceKind::ErpApi => {
            tracing::info!("ERP API: {}", config.erp_api.base_url);
            Some(ErpApiClient::new(&config.erp_api)?)
        }
        DataSourceKind::Database => None,
    };

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        erp_client,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "erp_analytics_server=debug,tower_http=debug,sqlx=warn".into());

    let (json, pretty) = match format {
        LogFormat::Json => (Some(tracing_subscriber::fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(tracing_subscriber::fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "ERP Analytics Platform API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tower::ServiceExt;

    use crate::services::auth::Claims;

    fn app() -> Router {
        let config = Config::for_tests();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();

        create_app(AppState {
            db,
            config: Arc::new(config),
            erp_client: None,
        })
    }

    fn token(role: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            role: role.to_string(),
            permissions: shared::permissions_for_role(role),
            exp: now + 3600,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let response = app().oneshot(get("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app().oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analytics_requires_token() {
        let response = app()
            .oneshot(get("/api/v1/analytics/dashboard", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app()
            .oneshot(get("/api/v1/analytics/dashboard", Some("not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_month_is_rejected_before_loading_data() {
        let token = token("analyst");
        let response = app()
            .oneshot(get("/api/v1/analytics/stock?month=2024-13", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_dimension() {
        let token = token("viewer");
        let response = app()
            .oneshot(get("/api/v1/analytics/orders/by/planet", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_viewer_cannot_export_or_import() {
        let token = token("viewer");
        let response = app()
            .oneshot(get(
                "/api/v1/analytics/production-needs?format=csv",
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/imports/orders")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "text/csv")
            .body(Body::from("product,customer,qty,value,date,channel\n"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
