//! BolsaIA HTTP API
//!
//! Thin JSON layer over `bolsa_ia_core::BolsaIa`. Handlers only translate
//! between HTTP and the core; degraded upstream results pass through as-is.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use bolsa_ia_core::{
    models::{
        chart::{ChartPoint, DividendEvent},
        market::MarketSentiment,
        news::NewsItem,
        portfolio::PortfolioRecord,
        quote::{BatchQuotes, Quote, SymbolMatch},
        sentiment::SentimentResult,
        settings::Settings,
    },
    BolsaIa,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<BolsaIa>,
}

impl AppState {
    pub fn new(core: BolsaIa) -> Self {
        Self {
            core: Arc::new(core),
        }
    }
}

/// Error body is always `{"detail": "..."}`.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            AppError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct ChartQuery {
    pub period: Option<String>,
    pub interval: Option<String>,
}

#[derive(Deserialize)]
pub struct PortfolioList {
    pub portfolios: Vec<PortfolioRecord>,
}

#[derive(Deserialize)]
pub struct SymbolsRequest {
    pub symbols: Vec<String>,
}

/// Build the router with permissive CORS and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/portfolios", get(get_portfolios).post(save_portfolios))
        .route("/api/search", get(search))
        .route("/api/quote/:symbol", get(quote))
        .route("/api/quotes", post(batch_quotes))
        .route("/api/dividends/:symbol", get(dividends))
        .route("/api/chart/:symbol", get(chart))
        .route("/api/news/:symbol", get(news))
        .route("/api/price-at-date/:symbol/:date", get(price_at_date))
        .route("/api/market-sentiment", get(market_sentiment))
        .route("/api/sentiment/:symbol", get(sentiment))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Entry point for the binary: env, logging, settings, listener.
pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let settings = Settings::from_env();
    if settings.supabase.is_none() {
        tracing::warn!("Supabase not configured; portfolios are stored in {}", settings.portfolio_file.display());
    }
    if settings.gemini_api_key.is_none() {
        tracing::info!("GEMINI_API_KEY not set; sentiment uses the offline lexicon only");
    }

    let core = BolsaIa::new(&settings)?;
    let router = app(AppState::new(core));

    let addr = std::env::var("BIND_ADDR")
        .ok()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("BolsaIA API listening on {}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "active", "system": "BolsaIA Superintelligence" }))
}

async fn get_portfolios(State(state): State<AppState>) -> Json<Vec<PortfolioRecord>> {
    Json(state.core.load_portfolios().await)
}

async fn save_portfolios(
    State(state): State<AppState>,
    Json(body): Json<PortfolioList>,
) -> Result<Json<Value>, AppError> {
    if state.core.save_portfolios(&body.portfolios).await {
        Ok(Json(json!({ "status": "success", "count": body.portfolios.len() })))
    } else {
        Err(AppError::Internal("Failed to save portfolios".into()))
    }
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<SymbolMatch>> {
    Json(state.core.search(&params.q).await)
}

async fn quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, AppError> {
    state
        .core
        .quote(&symbol)
        .await
        .map(Json)
        .map_err(|e| AppError::NotFound(e.detail()))
}

async fn batch_quotes(
    State(state): State<AppState>,
    Json(body): Json<SymbolsRequest>,
) -> Json<BatchQuotes> {
    Json(state.core.batch_quotes(&body.symbols).await)
}

async fn dividends(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Json<Vec<DividendEvent>> {
    Json(state.core.dividends(&symbol).await)
}

async fn chart(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<ChartQuery>,
) -> Result<Json<Vec<ChartPoint>>, AppError> {
    state
        .core
        .chart(&symbol, params.period.as_deref(), params.interval.as_deref())
        .await
        .map(Json)
        .map_err(|e| {
            tracing::warn!(symbol = %symbol, error = %e, "chart lookup failed");
            AppError::Internal(e.detail())
        })
}

async fn news(State(state): State<AppState>, Path(symbol): Path<String>) -> Json<Vec<NewsItem>> {
    Json(state.core.news(&symbol).await)
}

/// Failures are reported in-band as `{"error": ...}` with status 200.
async fn price_at_date(
    State(state): State<AppState>,
    Path((symbol, date)): Path<(String, String)>,
) -> Json<Value> {
    match state.core.price_at_date(&symbol, &date).await {
        Ok(price) => Json(json!(price)),
        Err(e) => Json(json!({ "error": e.detail() })),
    }
}

async fn market_sentiment(State(state): State<AppState>) -> Json<MarketSentiment> {
    Json(state.core.market_sentiment().await)
}

async fn sentiment(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Json<SentimentResult> {
    Json(state.core.sentiment(&symbol).await)
}
