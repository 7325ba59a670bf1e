//! In-process stand-in for the hunting club API
//!
//! Serves the same paths, status codes and `{"detail": ...}` error bodies
//! as the real server from an in-memory club, on an ephemeral port. Every
//! request line and its `Authorization` header is recorded.

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::app::App;
use crate::config::{ApiConfig, Config};
use crate::models::{
    timestamp, AuthResponse, CartridgePurchase, CartridgeStock, CartridgeType, CartridgeUsage,
    ChargeType, EfficiencyStats, Game, GameCartridge, GameSex, GameSpecies, HistoryEntry,
    HunterStats, LoginCredentials, PelletSize, Role, SeasonStats, SpeciesStats, Stats,
    TransferReceipt, User,
};
use crate::storage::MemoryStorage;

pub const ADMIN_EMAIL: &str = "paul.martin@club.fr";
pub const HUNTER_EMAIL: &str = "jean.dupont@club.fr";
pub const OTHER_EMAIL: &str = "marc.leroy@club.fr";
/// Password of every seeded member
pub const PASSWORD: &str = "chasse2024";

struct Recorded {
    line: String,
    authorization: Option<String>,
}

#[derive(Default)]
struct Club {
    users: Vec<(User, String)>,
    tokens: HashMap<String, Uuid>,
    types: Vec<CartridgeType>,
    purchases: Vec<CartridgePurchase>,
    usages: Vec<CartridgeUsage>,
    species: Vec<GameSpecies>,
    games: Vec<Game>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<Club>>;

/// Error reply shaped like the real server's
#[derive(Debug)]
struct Failure(StatusCode, String);

impl Failure {
    fn unauthorized() -> Self {
        Failure(StatusCode::UNAUTHORIZED, "Could not validate credentials".to_string())
    }

    fn not_found(what: &str) -> Self {
        Failure(StatusCode::NOT_FOUND, format!("{} not found", what))
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Failure(StatusCode::BAD_REQUEST, message.into())
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "detail": self.1 }))).into_response()
    }
}

type Reply<T> = Result<Json<T>, Failure>;

impl Club {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().map(|(u, _)| u).find(|u| u.id == id)
    }

    fn by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().map(|(u, _)| u).find(|u| u.email == email)
    }

    fn cartridge_type(&self, id: Uuid) -> Result<CartridgeType, Failure> {
        self.types
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Failure::not_found("Cartridge type"))
    }

    fn caller(&self, headers: &HeaderMap) -> Result<User, Failure> {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.get(token))
            .and_then(|id| self.user(*id))
            .cloned()
            .ok_or_else(Failure::unauthorized)
    }

    fn admin(&self, headers: &HeaderMap) -> Result<User, Failure> {
        let user = self.caller(headers)?;
        if !user.is_admin() {
            return Err(Failure(StatusCode::FORBIDDEN, "Admin rights required".to_string()));
        }
        Ok(user)
    }

    fn issue_tokens(&mut self, user: User) -> AuthResponse {
        let access_token = format!("access-{}", Uuid::new_v4());
        self.tokens.insert(access_token.clone(), user.id);
        AuthResponse {
            access_token,
            refresh_token: format!("refresh-{}", Uuid::new_v4()),
            token_type: "bearer".to_string(),
            user,
        }
    }

    fn add_user(&mut self, nom: &str, prenom: &str, email: &str, password: &str, role: Role) -> Result<User, Failure> {
        if self.by_email(email).is_some() {
            return Err(Failure::bad_request("Email already registered"));
        }
        let user = User {
            id: Uuid::new_v4(),
            nom: nom.to_string(),
            prenom: prenom.to_string(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };
        self.users.push((user.clone(), password.to_string()));
        Ok(user)
    }

    fn add_type(&mut self, charge_type: ChargeType, pellet_size: PelletSize, brand: &str) -> CartridgeType {
        if let Some(existing) = self
            .types
            .iter()
            .find(|t| t.charge_type == charge_type && t.pellet_size == pellet_size && t.brand == brand)
        {
            return existing.clone();
        }
        let created = CartridgeType {
            id: Uuid::new_v4(),
            charge_type,
            pellet_size,
            brand: brand.to_string(),
            created_at: Utc::now(),
        };
        self.types.push(created.clone());
        created
    }

    fn purchase(&mut self, hunter_id: Uuid, cartridge_type: CartridgeType, quantity: u32, unit_price: f64, date: DateTime<Utc>) -> CartridgePurchase {
        let purchase = CartridgePurchase {
            id: Uuid::new_v4(),
            hunter_id,
            cartridge_type_id: cartridge_type.id,
            cartridge_type,
            quantity,
            unit_price,
            total_price: f64::from(quantity) * unit_price,
            purchase_date: date,
            created_at: Utc::now(),
        };
        self.purchases.push(purchase.clone());
        purchase
    }

    fn usage(&mut self, hunter_id: Uuid, cartridge_type: CartridgeType, quantity: u32, date: DateTime<Utc>, game_id: Option<Uuid>) -> CartridgeUsage {
        let usage = CartridgeUsage {
            id: Uuid::new_v4(),
            hunter_id,
            cartridge_type_id: cartridge_type.id,
            cartridge_type,
            quantity,
            usage_date: date,
            game_id,
            created_at: Utc::now(),
        };
        self.usages.push(usage.clone());
        usage
    }

    fn totals(&self, hunter_id: Uuid, type_id: Uuid) -> (i64, i64) {
        let purchased = self
            .purchases
            .iter()
            .filter(|p| p.hunter_id == hunter_id && p.cartridge_type_id == type_id)
            .map(|p| i64::from(p.quantity))
            .sum();
        let used = self
            .usages
            .iter()
            .filter(|u| u.hunter_id == hunter_id && u.cartridge_type_id == type_id)
            .map(|u| i64::from(u.quantity))
            .sum();
        (purchased, used)
    }

    fn available(&self, hunter_id: Uuid, type_id: Uuid) -> i64 {
        let (purchased, used) = self.totals(hunter_id, type_id);
        purchased - used
    }

    fn stock(&self, hunter_id: Uuid) -> Vec<CartridgeStock> {
        self.types
            .iter()
            .filter_map(|t| {
                let (purchased, used) = self.totals(hunter_id, t.id);
                (purchased > 0).then(|| CartridgeStock::from_totals(t.clone(), hunter_id, purchased, used))
            })
            .collect()
    }

    fn seed() -> Club {
        let mut club = Club::default();
        let today = Utc::now();
        let last_year = timestamp::start_of_day(
            NaiveDate::from_ymd_opt(today.year() - 1, 11, 15).unwrap(),
        );

        club.add_user("Martin", "Paul", ADMIN_EMAIL, PASSWORD, Role::Admin).unwrap();
        let hunter = club.add_user("Dupont", "Jean", HUNTER_EMAIL, PASSWORD, Role::Hunter).unwrap();
        let other = club.add_user("Leroy", "Marc", OTHER_EMAIL, PASSWORD, Role::Hunter).unwrap();

        let winchester = club.add_type(ChargeType::Normal, PelletSize::Seven, "Winchester");
        let fiocchi = club.add_type(ChargeType::Super, PelletSize::SixHalf, "Fiocchi");
        let rottweil = club.add_type(ChargeType::Magnum, PelletSize::Four, "Rottweil");

        club.purchase(hunter.id, winchester.clone(), 50, 0.45, last_year);
        club.purchase(hunter.id, fiocchi.clone(), 25, 0.6, last_year);
        club.usage(hunter.id, fiocchi, 13, last_year, None);
        club.purchase(other.id, rottweil, 30, 0.9, last_year);

        for name in ["Faisan", "Lièvre", "Sanglier", "Chevreuil"] {
            club.species.push(GameSpecies {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: last_year,
            });
        }

        let pheasant = club.species[0].clone();
        let hare = club.species[1].clone();
        club.record_game(hunter.id, pheasant, timestamp::start_of_day(today.date_naive()), &[(winchester.clone(), 2)]);
        club.record_game(hunter.id, hare, last_year, &[(winchester, 1)]);
        club
    }

    fn record_game(&mut self, hunter_id: Uuid, species: GameSpecies, kill_date: DateTime<Utc>, cartridges: &[(CartridgeType, u32)]) -> Game {
        let game_id = Uuid::new_v4();
        let game_cartridges = cartridges
            .iter()
            .map(|(ct, quantity)| {
                self.usage(hunter_id, ct.clone(), *quantity, kill_date, Some(game_id));
                GameCartridge {
                    id: Uuid::new_v4(),
                    cartridge_type_id: ct.id,
                    quantity: *quantity,
                    cartridge_type: ct.clone(),
                }
            })
            .collect();
        let game = Game {
            id: game_id,
            hunter_id,
            species_id: species.id,
            species,
            kill_date,
            weight: None,
            sex: None,
            location: None,
            game_cartridges,
            created_at: Utc::now(),
        };
        self.games.push(game.clone());
        game
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, Failure> {
    timestamp::parse(value).ok_or_else(|| {
        Failure(StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid date: {}", value))
    })
}

// ============================================
// Request bodies
// ============================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct UserBody {
    nom: String,
    prenom: String,
    email: String,
    password: String,
    role: Option<Role>,
}

#[derive(Deserialize)]
struct UserPatch {
    nom: Option<String>,
    prenom: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<Role>,
}

#[derive(Deserialize)]
struct TypeBody {
    charge_type: ChargeType,
    pellet_size: PelletSize,
    brand: String,
}

#[derive(Deserialize)]
struct PurchaseBody {
    hunter_id: Uuid,
    cartridge_type_id: Uuid,
    quantity: u32,
    unit_price: f64,
    purchase_date: String,
}

#[derive(Deserialize)]
struct UsageBody {
    hunter_id: Uuid,
    cartridge_type_id: Uuid,
    quantity: u32,
    usage_date: String,
    game_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct TransferBody {
    from_hunter_id: Uuid,
    to_hunter_id: Uuid,
    cartridge_type_id: Uuid,
    quantity: u32,
    transfer_date: String,
    note: Option<String>,
}

#[derive(Deserialize)]
struct SpeciesBody {
    name: String,
}

#[derive(Deserialize)]
struct CartridgeLine {
    cartridge_type_id: Uuid,
    quantity: u32,
}

#[derive(Deserialize)]
struct GameBody {
    hunter_id: Uuid,
    species_id: Uuid,
    kill_date: String,
    weight: Option<f64>,
    sex: Option<GameSex>,
    location: Option<String>,
    cartridges: Vec<CartridgeLine>,
}

#[derive(Deserialize)]
struct GamePatch {
    species_id: Option<Uuid>,
    kill_date: Option<String>,
    weight: Option<f64>,
    sex: Option<GameSex>,
    location: Option<String>,
}

#[derive(Deserialize)]
struct StockParams {
    hunter_id: Option<Uuid>,
    charge_type: Option<String>,
    pellet_size: Option<String>,
}

#[derive(Deserialize)]
struct RangeParams {
    hunter_id: Option<Uuid>,
    species_id: Option<Uuid>,
    start_date: Option<String>,
    end_date: Option<String>,
}

// ============================================
// Handlers
// ============================================

async fn login(State(club): State<Shared>, Json(body): Json<LoginBody>) -> Reply<AuthResponse> {
    let mut club = club.lock().await;
    let user = club
        .users
        .iter()
        .find(|(u, password)| u.email == body.email && *password == body.password)
        .map(|(u, _)| u.clone())
        .ok_or_else(|| Failure(StatusCode::UNAUTHORIZED, "Incorrect email or password".to_string()))?;
    Ok(Json(club.issue_tokens(user)))
}

async fn register(State(club): State<Shared>, Json(body): Json<UserBody>) -> Reply<AuthResponse> {
    let mut club = club.lock().await;
    let user = club.add_user(&body.nom, &body.prenom, &body.email, &body.password, Role::Hunter)?;
    Ok(Json(club.issue_tokens(user)))
}

async fn me(State(club): State<Shared>, headers: HeaderMap) -> Reply<User> {
    Ok(Json(club.lock().await.caller(&headers)?))
}

async fn list_types(State(club): State<Shared>, headers: HeaderMap) -> Reply<Vec<CartridgeType>> {
    let club = club.lock().await;
    club.caller(&headers)?;
    Ok(Json(club.types.clone()))
}

async fn create_type(State(club): State<Shared>, headers: HeaderMap, Json(body): Json<TypeBody>) -> Reply<CartridgeType> {
    let mut club = club.lock().await;
    club.caller(&headers)?;
    Ok(Json(club.add_type(body.charge_type, body.pellet_size, &body.brand)))
}

async fn stock(State(club): State<Shared>, headers: HeaderMap, Query(params): Query<StockParams>) -> Reply<Vec<CartridgeStock>> {
    let club = club.lock().await;
    let caller = club.caller(&headers)?;
    let rows = club
        .stock(params.hunter_id.unwrap_or(caller.id))
        .into_iter()
        .filter(|row| {
            params
                .charge_type
                .as_deref()
                .map_or(true, |c| row.cartridge_type.charge_type.as_str() == c)
                && params
                    .pellet_size
                    .as_deref()
                    .map_or(true, |p| row.cartridge_type.pellet_size.as_str() == p)
        })
        .collect();
    Ok(Json(rows))
}

async fn create_purchase(State(club): State<Shared>, headers: HeaderMap, Json(body): Json<PurchaseBody>) -> Reply<CartridgePurchase> {
    let mut club = club.lock().await;
    club.caller(&headers)?;
    let cartridge_type = club.cartridge_type(body.cartridge_type_id)?;
    let date = parse_date(&body.purchase_date)?;
    Ok(Json(club.purchase(body.hunter_id, cartridge_type, body.quantity, body.unit_price, date)))
}

async fn create_usage(State(club): State<Shared>, headers: HeaderMap, Json(body): Json<UsageBody>) -> Reply<CartridgeUsage> {
    let mut club = club.lock().await;
    club.caller(&headers)?;
    let cartridge_type = club.cartridge_type(body.cartridge_type_id)?;
    let available = club.available(body.hunter_id, cartridge_type.id);
    if available < i64::from(body.quantity) {
        return Err(Failure::bad_request(format!(
            "Insufficient stock. Available: {}, requested: {}",
            available, body.quantity
        )));
    }
    let date = parse_date(&body.usage_date)?;
    Ok(Json(club.usage(body.hunter_id, cartridge_type, body.quantity, date, body.game_id)))
}

async fn history(State(club): State<Shared>, headers: HeaderMap, Query(params): Query<RangeParams>) -> Reply<Vec<HistoryEntry>> {
    let club = club.lock().await;
    let caller = club.caller(&headers)?;
    let hunter_id = params.hunter_id.unwrap_or(caller.id);
    let start = params.start_date.as_deref().map(parse_date).transpose()?;
    let end = params.end_date.as_deref().map(parse_date).transpose()?;
    let in_range = |date: &DateTime<Utc>| start.map_or(true, |s| *date >= s) && end.map_or(true, |e| *date <= e);

    let mut entries: Vec<HistoryEntry> = club
        .purchases
        .iter()
        .filter(|p| p.hunter_id == hunter_id && in_range(&p.purchase_date))
        .map(|p| HistoryEntry::Purchase {
            date: p.purchase_date,
            cartridge_type: p.cartridge_type.clone(),
            quantity: p.quantity,
            unit_price: p.unit_price,
            total_price: p.total_price,
        })
        .chain(
            club.usages
                .iter()
                .filter(|u| u.hunter_id == hunter_id && in_range(&u.usage_date))
                .map(|u| HistoryEntry::Usage {
                    date: u.usage_date,
                    cartridge_type: u.cartridge_type.clone(),
                    quantity: u.quantity,
                }),
        )
        .collect();
    entries.sort_by_key(|e| std::cmp::Reverse(e.date()));
    Ok(Json(entries))
}

async fn transfer(State(club): State<Shared>, headers: HeaderMap, Json(body): Json<TransferBody>) -> Reply<TransferReceipt> {
    let mut club = club.lock().await;
    club.caller(&headers)?;
    if body.from_hunter_id == body.to_hunter_id {
        return Err(Failure::bad_request("Cannot transfer cartridges to yourself"));
    }
    if club.user(body.to_hunter_id).is_none() {
        return Err(Failure::not_found("Hunter"));
    }
    let cartridge_type = club.cartridge_type(body.cartridge_type_id)?;
    let available = club.available(body.from_hunter_id, cartridge_type.id);
    if available < i64::from(body.quantity) {
        return Err(Failure::bad_request(format!(
            "Insufficient stock. Available: {}, requested: {}",
            available, body.quantity
        )));
    }

    let date = parse_date(&body.transfer_date)?;
    club.usage(body.from_hunter_id, cartridge_type.clone(), body.quantity, date, None);
    club.purchase(body.to_hunter_id, cartridge_type.clone(), body.quantity, 0.0, date);

    Ok(Json(TransferReceipt {
        message: format!("{} cartridges transferred", body.quantity),
        from_hunter_id: body.from_hunter_id,
        to_hunter_id: body.to_hunter_id,
        cartridge_type,
        quantity: body.quantity,
        note: body.note,
    }))
}

async fn list_species(State(club): State<Shared>, headers: HeaderMap) -> Reply<Vec<GameSpecies>> {
    let club = club.lock().await;
    club.caller(&headers)?;
    Ok(Json(club.species.clone()))
}

async fn create_species(State(club): State<Shared>, headers: HeaderMap, Json(body): Json<SpeciesBody>) -> Reply<GameSpecies> {
    let mut club = club.lock().await;
    club.caller(&headers)?;
    let species = GameSpecies {
        id: Uuid::new_v4(),
        name: body.name,
        created_at: Utc::now(),
    };
    club.species.push(species.clone());
    Ok(Json(species))
}

async fn list_games(State(club): State<Shared>, headers: HeaderMap, Query(params): Query<RangeParams>) -> Reply<Vec<Game>> {
    let club = club.lock().await;
    club.caller(&headers)?;
    let mut games: Vec<Game> = club
        .games
        .iter()
        .filter(|g| params.hunter_id.map_or(true, |id| g.hunter_id == id))
        .filter(|g| params.species_id.map_or(true, |id| g.species_id == id))
        .cloned()
        .collect();
    games.sort_by_key(|g| std::cmp::Reverse(g.kill_date));
    Ok(Json(games))
}

async fn create_game(State(club): State<Shared>, headers: HeaderMap, Json(body): Json<GameBody>) -> Reply<Game> {
    let mut club = club.lock().await;
    club.caller(&headers)?;
    let species = club
        .species
        .iter()
        .find(|s| s.id == body.species_id)
        .cloned()
        .ok_or_else(|| Failure::not_found("Species"))?;

    let mut lines = Vec::new();
    for line in &body.cartridges {
        let cartridge_type = club.cartridge_type(line.cartridge_type_id)?;
        let available = club.available(body.hunter_id, cartridge_type.id);
        if available < i64::from(line.quantity) {
            return Err(Failure::bad_request(format!(
                "Insufficient stock for {}. Available: {}",
                cartridge_type.brand, available
            )));
        }
        lines.push((cartridge_type, line.quantity));
    }

    let kill_date = parse_date(&body.kill_date)?;
    let mut game = club.record_game(body.hunter_id, species, kill_date, &lines);
    game.weight = body.weight;
    game.sex = body.sex;
    game.location = body.location;
    if let Some(stored) = club.games.iter_mut().find(|g| g.id == game.id) {
        *stored = game.clone();
    }
    Ok(Json(game))
}

async fn get_game(State(club): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>) -> Reply<Game> {
    let club = club.lock().await;
    club.caller(&headers)?;
    club.games
        .iter()
        .find(|g| g.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("Game"))
}

async fn update_game(State(club): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>, Json(body): Json<GamePatch>) -> Reply<Game> {
    let mut club = club.lock().await;
    club.caller(&headers)?;
    let species = match body.species_id {
        Some(species_id) => Some(
            club.species
                .iter()
                .find(|s| s.id == species_id)
                .cloned()
                .ok_or_else(|| Failure::not_found("Species"))?,
        ),
        None => None,
    };
    let kill_date = body.kill_date.as_deref().map(parse_date).transpose()?;

    let game = club
        .games
        .iter_mut()
        .find(|g| g.id == id)
        .ok_or_else(|| Failure::not_found("Game"))?;
    if let Some(species) = species {
        game.species_id = species.id;
        game.species = species;
    }
    if let Some(kill_date) = kill_date {
        game.kill_date = kill_date;
    }
    if body.weight.is_some() {
        game.weight = body.weight;
    }
    if body.sex.is_some() {
        game.sex = body.sex;
    }
    if body.location.is_some() {
        game.location = body.location;
    }
    Ok(Json(game.clone()))
}

async fn delete_game(State(club): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>) -> Result<StatusCode, Failure> {
    let mut club = club.lock().await;
    club.caller(&headers)?;
    let before = club.games.len();
    club.games.retain(|g| g.id != id);
    if club.games.len() == before {
        return Err(Failure::not_found("Game"));
    }
    club.usages.retain(|u| u.game_id != Some(id));
    Ok(StatusCode::NO_CONTENT)
}

fn hunter_stats(name: &str, games: u32, used: u32, spent: f64) -> HunterStats {
    HunterStats {
        hunter_id: Uuid::new_v4(),
        hunter_name: name.to_string(),
        total_games: games,
        total_cartridges_used: used,
        total_cartridges_purchased: used + 20,
        total_spent: spent,
        efficiency_ratio: if games == 0 { 0.0 } else { f64::from(used) / f64::from(games) },
        games_by_species: HashMap::new(),
    }
}

fn species_stats(name: &str, killed: u32) -> SpeciesStats {
    SpeciesStats {
        species_name: name.to_string(),
        total_killed: killed,
        average_cartridges_per_kill: 1.5,
        hunters_count: 2,
    }
}

fn season_stats(year: i32) -> SeasonStats {
    SeasonStats {
        season_name: format!("{}-{}", year, year + 1),
        year_start: year,
        total_games: 6,
        total_cartridges_used: 14,
        hunters_stats: vec![
            hunter_stats("Jean Dupont", 4, 9, 22.5),
            hunter_stats("Marc Leroy", 2, 5, 27.0),
        ],
        species_stats: vec![species_stats("Faisan", 4), species_stats("Lièvre", 2)],
    }
}

fn ranking() -> Vec<HunterStats> {
    vec![
        hunter_stats("Jean Dupont", 12, 30, 54.0),
        hunter_stats("Marc Leroy", 8, 25, 61.5),
        hunter_stats("Paul Martin", 5, 18, 40.0),
        hunter_stats("Luc Petit", 1, 9, 12.0),
    ]
}

async fn stats_summary(State(club): State<Shared>, headers: HeaderMap) -> Reply<Stats> {
    let club = club.lock().await;
    club.caller(&headers)?;
    let year = Utc::now().year();
    Ok(Json(Stats {
        total_hunters: club.users.len() as u32,
        total_games: 26,
        total_cartridges_used: 82,
        total_cartridges_purchased: 140,
        total_spent: 167.5,
        average_efficiency: 3.15,
        top_hunters: ranking(),
        species_distribution: vec![
            species_stats("Faisan", 12),
            species_stats("Lièvre", 7),
            species_stats("Sanglier", 4),
            species_stats("Chevreuil", 2),
            species_stats("Perdrix", 1),
            species_stats("Bécasse", 0),
        ],
        last_5_seasons: vec![season_stats(year), season_stats(year - 1)],
    }))
}

async fn stats_by_hunter(State(club): State<Shared>, headers: HeaderMap) -> Reply<Vec<HunterStats>> {
    club.lock().await.caller(&headers)?;
    Ok(Json(ranking()))
}

async fn stats_by_species(State(club): State<Shared>, headers: HeaderMap) -> Reply<Vec<SpeciesStats>> {
    club.lock().await.caller(&headers)?;
    Ok(Json(vec![species_stats("Faisan", 12), species_stats("Lièvre", 7)]))
}

async fn stats_by_season(State(club): State<Shared>, headers: HeaderMap, Path(year): Path<i32>) -> Reply<SeasonStats> {
    club.lock().await.caller(&headers)?;
    Ok(Json(season_stats(year)))
}

async fn efficiency(State(club): State<Shared>, headers: HeaderMap) -> Reply<Vec<EfficiencyStats>> {
    club.lock().await.caller(&headers)?;
    Ok(Json(
        ranking()
            .into_iter()
            .map(|h| EfficiencyStats {
                hunter_id: h.hunter_id,
                hunter_name: h.hunter_name,
                total_cartridges: h.total_cartridges_used,
                total_games: h.total_games,
                efficiency_ratio: h.efficiency_ratio,
                best_species: Some("Faisan".to_string()),
                worst_species: None,
            })
            .collect(),
    ))
}

async fn list_hunters(State(club): State<Shared>, headers: HeaderMap) -> Reply<Vec<User>> {
    let club = club.lock().await;
    club.caller(&headers)?;
    Ok(Json(club.users.iter().map(|(u, _)| u.clone()).collect()))
}

async fn get_hunter(State(club): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>) -> Reply<User> {
    let club = club.lock().await;
    club.caller(&headers)?;
    club.user(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("Hunter"))
}

async fn create_hunter(State(club): State<Shared>, headers: HeaderMap, Json(body): Json<UserBody>) -> Reply<User> {
    let mut club = club.lock().await;
    club.admin(&headers)?;
    let role = body.role.unwrap_or(Role::Hunter);
    Ok(Json(club.add_user(&body.nom, &body.prenom, &body.email, &body.password, role)?))
}

async fn update_hunter(State(club): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>, Json(body): Json<UserPatch>) -> Reply<User> {
    let mut club = club.lock().await;
    club.admin(&headers)?;
    if let Some(email) = &body.email {
        if club.by_email(email).is_some_and(|u| u.id != id) {
            return Err(Failure::bad_request("Email already registered"));
        }
    }
    let (user, password) = club
        .users
        .iter_mut()
        .find(|(u, _)| u.id == id)
        .ok_or_else(|| Failure::not_found("Hunter"))?;
    if let Some(nom) = body.nom {
        user.nom = nom;
    }
    if let Some(prenom) = body.prenom {
        user.prenom = prenom;
    }
    if let Some(email) = body.email {
        user.email = email;
    }
    if let Some(new_password) = body.password {
        *password = new_password;
    }
    if let Some(role) = body.role {
        user.role = role;
    }
    Ok(Json(user.clone()))
}

async fn delete_hunter(State(club): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>) -> Result<StatusCode, Failure> {
    let mut club = club.lock().await;
    let admin = club.admin(&headers)?;
    if admin.id == id {
        return Err(Failure::bad_request("You cannot delete your own account"));
    }
    let before = club.users.len();
    club.users.retain(|(u, _)| u.id != id);
    if club.users.len() == before {
        return Err(Failure::not_found("Hunter"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn record(State(club): State<Shared>, request: Request, next: Next) -> Response {
    let line = format!(
        "{} {}",
        request.method(),
        request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    );
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    club.lock().await.requests.push(Recorded { line, authorization });
    next.run(request).await
}

fn router(club: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/cartridges/types", get(list_types).post(create_type))
        .route("/cartridges/stock", get(stock))
        .route("/cartridges/purchase", post(create_purchase))
        .route("/cartridges/use", post(create_usage))
        .route("/cartridges/history", get(history))
        .route("/cartridges/transfer", post(transfer))
        .route("/game/species", get(list_species).post(create_species))
        .route("/game", get(list_games).post(create_game))
        .route("/game/:id", get(get_game).put(update_game).delete(delete_game))
        .route("/stats/summary", get(stats_summary))
        .route("/stats/by-hunter", get(stats_by_hunter))
        .route("/stats/by-species", get(stats_by_species))
        .route("/stats/by-season/:year", get(stats_by_season))
        .route("/stats/efficiency", get(efficiency))
        .route("/hunters", get(list_hunters).post(create_hunter))
        .route("/hunters/:id", get(get_hunter).put(update_hunter).delete(delete_hunter))
        .layer(middleware::from_fn_with_state(club.clone(), record))
        .with_state(club)
}

/// A running fake API and handles into its state
pub struct FakeApi {
    pub base_url: String,
    club: Shared,
}

impl FakeApi {
    pub async fn spawn() -> Self {
        let club: Shared = Arc::new(Mutex::new(Club::seed()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(club.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            club,
        }
    }

    fn config(&self) -> Config {
        Config {
            api: ApiConfig {
                base_url: self.base_url.clone(),
                request_timeout_secs: 5,
            },
            ..Config::default()
        }
    }

    /// An app with an empty in-memory session
    pub fn app(&self) -> App {
        self.app_with_storage(Arc::new(MemoryStorage::new()))
    }

    pub fn app_with_storage(&self, storage: Arc<MemoryStorage>) -> App {
        App::with_storage(self.config(), storage).unwrap()
    }

    pub async fn logged_in(&self, email: &str) -> App {
        self.logged_in_with_storage(email).await.0
    }

    pub async fn logged_in_with_storage(&self, email: &str) -> (App, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let app = self.app_with_storage(storage.clone());
        self.login_as(&app.client, email).await;
        (app, storage)
    }

    pub async fn login_as(&self, client: &ApiClient, email: &str) {
        let credentials = LoginCredentials {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        };
        client.session().login(client, &credentials).await.unwrap();
    }

    pub async fn hunter_id(&self, email: &str) -> Uuid {
        self.club.lock().await.by_email(email).unwrap().id
    }

    pub async fn cartridge_type_ids(&self) -> Vec<Uuid> {
        self.club.lock().await.types.iter().map(|t| t.id).collect()
    }

    /// Invalidate every issued access token
    pub async fn revoke_tokens(&self) {
        self.club.lock().await.tokens.clear();
    }

    /// Record usage directly, bypassing the HTTP surface
    pub async fn consume(&self, hunter_id: Uuid, cartridge_type_id: Uuid, quantity: u32) {
        let mut club = self.club.lock().await;
        let cartridge_type = club.cartridge_type(cartridge_type_id).unwrap();
        club.usage(hunter_id, cartridge_type, quantity, Utc::now(), None);
    }

    /// `METHOD /path?query` of every request received so far
    pub async fn requests(&self) -> Vec<String> {
        self.club.lock().await.requests.iter().map(|r| r.line.clone()).collect()
    }

    pub async fn authorization_headers(&self) -> Vec<Option<String>> {
        self.club
            .lock()
            .await
            .requests
            .iter()
            .map(|r| r.authorization.clone())
            .collect()
    }
}
