//! Hunting Club REST API Client
//!
//! HTTP client for the hunting club API. Every request carries the bearer
//! token of the current session; a 401 from any endpoint clears the
//! session before the error is returned.

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use super::error::{extract_detail, ApiError, ApiResult};
use super::query::{GameFilter, HistoryQuery, StockQuery};
use crate::config::ApiConfig;
use crate::models::{
    AuthResponse, CartridgePurchase, CartridgeStock, CartridgeType, CartridgeUsage,
    EfficiencyStats, Game, GameCreate, GameSpecies, GameUpdate, HistoryEntry, HunterStats,
    LoginCredentials, NewCartridgeType, PurchaseCreate, SeasonStats, SpeciesStats, Stats,
    TransferCreate, TransferReceipt, UsageCreate, User, UserCreate, UserUpdate,
};
use crate::session::AuthStore;

/// Hunting club API client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: AuthStore,
}

impl ApiClient {
    /// Create a client for the configured API, authenticating with `session`
    pub fn new(config: &ApiConfig, session: AuthStore) -> ApiResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("huntclub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &AuthStore {
        &self.session
    }

    // ============================================
    // Auth
    // ============================================

    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthResponse> {
        self.post("/auth/login", credentials).await
    }

    pub async fn register(&self, user: &UserCreate) -> ApiResult<AuthResponse> {
        self.post("/auth/register", user).await
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.get("/auth/me", &[]).await
    }

    // ============================================
    // Cartridges
    // ============================================

    pub async fn cartridge_types(&self) -> ApiResult<Vec<CartridgeType>> {
        self.get("/cartridges/types", &[]).await
    }

    /// Create a cartridge type; the API returns the existing type when the
    /// same charge, pellet size and brand are already registered
    pub async fn create_cartridge_type(&self, new_type: &NewCartridgeType) -> ApiResult<CartridgeType> {
        self.post("/cartridges/types", new_type).await
    }

    pub async fn stock(&self, query: &StockQuery) -> ApiResult<Vec<CartridgeStock>> {
        self.get("/cartridges/stock", &query.params()).await
    }

    pub async fn create_purchase(&self, purchase: &PurchaseCreate) -> ApiResult<CartridgePurchase> {
        self.post("/cartridges/purchase", purchase).await
    }

    pub async fn create_usage(&self, usage: &UsageCreate) -> ApiResult<CartridgeUsage> {
        self.post("/cartridges/use", usage).await
    }

    pub async fn history(&self, query: &HistoryQuery) -> ApiResult<Vec<HistoryEntry>> {
        self.get("/cartridges/history", &query.params()).await
    }

    /// Move cartridges between hunters; balance checks and the debit/credit
    /// pair are applied by the server
    pub async fn transfer(&self, transfer: &TransferCreate) -> ApiResult<TransferReceipt> {
        self.post("/cartridges/transfer", transfer).await
    }

    // ============================================
    // Game
    // ============================================

    pub async fn species(&self) -> ApiResult<Vec<GameSpecies>> {
        self.get("/game/species", &[]).await
    }

    pub async fn create_species(&self, name: &str) -> ApiResult<GameSpecies> {
        self.post("/game/species", &serde_json::json!({ "name": name }))
            .await
    }

    pub async fn games(&self, filter: &GameFilter) -> ApiResult<Vec<Game>> {
        self.get("/game", &filter.params()).await
    }

    pub async fn game(&self, game_id: Uuid) -> ApiResult<Game> {
        self.get(&format!("/game/{}", game_id), &[]).await
    }

    pub async fn create_game(&self, game: &GameCreate) -> ApiResult<Game> {
        self.post("/game", game).await
    }

    pub async fn update_game(&self, game_id: Uuid, update: &GameUpdate) -> ApiResult<Game> {
        self.put(&format!("/game/{}", game_id), update).await
    }

    pub async fn delete_game(&self, game_id: Uuid) -> ApiResult<()> {
        self.delete(&format!("/game/{}", game_id)).await
    }

    // ============================================
    // Stats
    // ============================================

    pub async fn stats_summary(&self) -> ApiResult<Stats> {
        self.get("/stats/summary", &[]).await
    }

    pub async fn stats_by_hunter(&self, season_year: Option<i32>) -> ApiResult<Vec<HunterStats>> {
        self.get("/stats/by-hunter", &season_param(season_year)).await
    }

    pub async fn stats_by_species(
        &self,
        season_year: Option<i32>,
        hunter_id: Option<Uuid>,
    ) -> ApiResult<Vec<SpeciesStats>> {
        let mut params = season_param(season_year);
        if let Some(id) = hunter_id {
            params.push(("hunter_id", id.to_string()));
        }
        self.get("/stats/by-species", &params).await
    }

    pub async fn stats_by_season(&self, year: i32) -> ApiResult<SeasonStats> {
        self.get(&format!("/stats/by-season/{}", year), &[]).await
    }

    pub async fn efficiency(&self, season_year: Option<i32>) -> ApiResult<Vec<EfficiencyStats>> {
        self.get("/stats/efficiency", &season_param(season_year)).await
    }

    // ============================================
    // Hunters
    // ============================================

    pub async fn hunters(&self) -> ApiResult<Vec<User>> {
        self.get("/hunters", &[]).await
    }

    pub async fn hunter(&self, hunter_id: Uuid) -> ApiResult<User> {
        self.get(&format!("/hunters/{}", hunter_id), &[]).await
    }

    pub async fn create_hunter(&self, hunter: &UserCreate) -> ApiResult<User> {
        self.post("/hunters", hunter).await
    }

    pub async fn update_hunter(&self, hunter_id: Uuid, update: &UserUpdate) -> ApiResult<User> {
        self.put(&format!("/hunters/{}", hunter_id), update).await
    }

    pub async fn delete_hunter(&self, hunter_id: Uuid) -> ApiResult<()> {
        self.delete(&format!("/hunters/{}", hunter_id)).await
    }

    // ============================================
    // Transport
    // ============================================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> ApiResult<T> {
        let mut request = self.request(Method::GET, path);
        if !params.is_empty() {
            request = request.query(params);
        }
        let response = self.execute(Method::GET, path, request).await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let request = self.request(Method::POST, path).json(body);
        let response = self.execute(Method::POST, path, request).await?;
        decode(response).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let request = self.request(Method::PUT, path).json(body);
        let response = self.execute(Method::PUT, path, request).await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let request = self.request(Method::DELETE, path);
        self.execute(Method::DELETE, path, request).await?;
        Ok(())
    }

    /// Attach the bearer token, send, and turn failures into `ApiError`
    async fn execute(&self, method: Method, path: &str, request: RequestBuilder) -> ApiResult<Response> {
        let request = match self.session.access_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else if e.is_connect() {
                ApiError::Unavailable(self.base_url.clone())
            } else {
                ApiError::Request(e)
            }
        })?;

        let status = response.status();
        tracing::debug!(method = %method, path = %path, status = status.as_u16(), "API response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(method = %method, path = %path, "API rejected credentials, ending session");
            self.session.expire().await;
            return Err(ApiError::Unauthorized { detail });
        }

        Err(ApiError::Server {
            status: status.as_u16(),
            detail,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

fn season_param(season_year: Option<i32>) -> Vec<(&'static str, String)> {
    season_year
        .map(|year| vec![("season_year", year.to_string())])
        .unwrap_or_default()
}

/// Today's date as the instant the API expects for date-only fields
pub fn today() -> DateTime<Utc> {
    crate::models::timestamp::start_of_day(Utc::now().date_naive())
}
