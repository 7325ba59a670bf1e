//! Data Model
//!
//! Display-shaped copies of the entities owned by the hunting club API.
//! Field names follow the wire format of the API so that every type
//! round-trips through `serde_json` unchanged.

pub(crate) mod cartridge;
mod game;
mod stats;
pub mod timestamp;
mod user;

pub use cartridge::{
    CartridgePurchase, CartridgeStock, CartridgeType, CartridgeUsage, ChargeType, HistoryEntry,
    NewCartridgeType, PelletSize, PurchaseCreate, StockSnapshot, TransferCreate, TransferReceipt,
    UsageCreate, LOW_STOCK_THRESHOLD,
};
pub use game::{Game, GameCartridge, GameCartridgeCreate, GameCreate, GameSex, GameSpecies, GameUpdate};
pub use stats::{EfficiencyStats, HunterStats, SeasonStats, SpeciesStats, Stats};
pub use user::{AuthResponse, LoginCredentials, Role, User, UserCreate, UserUpdate};

use thiserror::Error;

/// A string could not be parsed into one of the wire enums
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind}: {value} (expected one of: {expected})")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ParseValueError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}
