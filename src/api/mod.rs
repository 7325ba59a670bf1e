//! Hunting Club API client
//!
//! Typed access to the club's REST API over HTTP.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /auth/login` - Log in, returns tokens and user
//! - `POST /auth/register` - Create an account, returns tokens and user
//! - `GET /auth/me` - Current user
//!
//! ## Cartridges
//! - `GET /cartridges/types` - List cartridge types
//! - `POST /cartridges/types` - Create (or find) a cartridge type
//! - `GET /cartridges/stock` - Stock per type for a hunter
//! - `POST /cartridges/purchase` - Record a purchase
//! - `POST /cartridges/use` - Record fired cartridges
//! - `GET /cartridges/history` - Purchases and usage, newest first
//! - `POST /cartridges/transfer` - Give cartridges to another hunter
//!
//! ## Game
//! - `GET /game/species` - List species
//! - `POST /game/species` - Create a species
//! - `GET /game` - List kills
//! - `POST /game` - Record a kill
//! - `GET /game/:id` - Get a kill
//! - `PUT /game/:id` - Update a kill
//! - `DELETE /game/:id` - Delete a kill
//!
//! ## Stats
//! - `GET /stats/summary` - Club-wide summary
//! - `GET /stats/by-hunter` - Per hunter
//! - `GET /stats/by-species` - Per species
//! - `GET /stats/by-season/:year` - One season
//! - `GET /stats/efficiency` - Efficiency ranking
//!
//! ## Hunters
//! - `GET /hunters`, `POST /hunters`
//! - `GET /hunters/:id`, `PUT /hunters/:id`, `DELETE /hunters/:id`
//!
//! # Example
//!
//! ```rust,ignore
//! use huntclub::api::{ApiClient, StockQuery};
//! use huntclub::config::ApiConfig;
//! use huntclub::session::AuthStore;
//! use huntclub::storage::MemoryStorage;
//! use std::sync::Arc;
//!
//! let session = AuthStore::new(Arc::new(MemoryStorage::new()));
//! let client = ApiClient::new(&ApiConfig::default(), session)?;
//! let stock = client.stock(&StockQuery::default()).await?;
//! ```

pub mod client;
pub mod error;
pub mod query;

pub use client::{today, ApiClient};
pub use error::{extract_detail, ApiError, ApiResult};
pub use query::{GameFilter, HistoryQuery, StockQuery};
