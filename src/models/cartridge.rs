//! Cartridge types, movements and stock
//!
//! Stock is computed by the API as `purchased - used` per hunter and
//! cartridge type. The client keeps the same bookkeeping rules so that it
//! can flag low stock and bound transfer quantities from a fetched snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{timestamp, ParseValueError};

/// Stock strictly below this many cartridges is flagged as low
pub const LOW_STOCK_THRESHOLD: i64 = 20;

/// Powder charge of a cartridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargeType {
    Normal,
    Super,
    Magnum,
}

impl ChargeType {
    pub const ALL: [ChargeType; 3] = [ChargeType::Normal, ChargeType::Super, ChargeType::Magnum];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeType::Normal => "Normal",
            ChargeType::Super => "Super",
            ChargeType::Magnum => "Magnum",
        }
    }
}

impl fmt::Display for ChargeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(ChargeType::Normal),
            "super" => Ok(ChargeType::Super),
            "magnum" => Ok(ChargeType::Magnum),
            _ => Err(ParseValueError::new("charge type", s, "Normal, Super, Magnum")),
        }
    }
}

/// Shot size number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PelletSize {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "6.5")]
    SixHalf,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "7.5")]
    SevenHalf,
    #[serde(rename = "8")]
    Eight,
}

impl PelletSize {
    pub const ALL: [PelletSize; 9] = [
        PelletSize::Two,
        PelletSize::Three,
        PelletSize::Four,
        PelletSize::Five,
        PelletSize::Six,
        PelletSize::SixHalf,
        PelletSize::Seven,
        PelletSize::SevenHalf,
        PelletSize::Eight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PelletSize::Two => "2",
            PelletSize::Three => "3",
            PelletSize::Four => "4",
            PelletSize::Five => "5",
            PelletSize::Six => "6",
            PelletSize::SixHalf => "6.5",
            PelletSize::Seven => "7",
            PelletSize::SevenHalf => "7.5",
            PelletSize::Eight => "8",
        }
    }
}

impl fmt::Display for PelletSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PelletSize {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        PelletSize::ALL
            .into_iter()
            .find(|size| size.as_str() == trimmed)
            .ok_or_else(|| ParseValueError::new("pellet size", s, "2, 3, 4, 5, 6, 6.5, 7, 7.5, 8"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartridgeType {
    pub id: Uuid,
    pub charge_type: ChargeType,
    pub pellet_size: PelletSize,
    pub brand: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl CartridgeType {
    pub fn label(&self) -> String {
        format!("{} - {} - Pellet {}", self.brand, self.charge_type, self.pellet_size)
    }
}

/// Payload for `POST /cartridges/types`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCartridgeType {
    pub charge_type: ChargeType,
    pub pellet_size: PelletSize,
    pub brand: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartridgePurchase {
    pub id: Uuid,
    pub hunter_id: Uuid,
    pub cartridge_type_id: Uuid,
    pub cartridge_type: CartridgeType,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    #[serde(with = "timestamp")]
    pub purchase_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /cartridges/purchase`
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseCreate {
    pub hunter_id: Uuid,
    pub cartridge_type_id: Uuid,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(with = "timestamp")]
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartridgeUsage {
    pub id: Uuid,
    pub hunter_id: Uuid,
    pub cartridge_type_id: Uuid,
    pub cartridge_type: CartridgeType,
    pub quantity: u32,
    #[serde(with = "timestamp")]
    pub usage_date: DateTime<Utc>,
    #[serde(default)]
    pub game_id: Option<Uuid>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /cartridges/use`; no `game_id` means a missed shot
#[derive(Debug, Clone, Serialize)]
pub struct UsageCreate {
    pub hunter_id: Uuid,
    pub cartridge_type_id: Uuid,
    pub quantity: u32,
    #[serde(with = "timestamp")]
    pub usage_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<Uuid>,
}

/// Payload for `POST /cartridges/transfer`
#[derive(Debug, Clone, Serialize)]
pub struct TransferCreate {
    pub from_hunter_id: Uuid,
    pub to_hunter_id: Uuid,
    pub cartridge_type_id: Uuid,
    pub quantity: u32,
    #[serde(with = "timestamp")]
    pub transfer_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Confirmation returned by `POST /cartridges/transfer`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    #[serde(default)]
    pub message: String,
    pub from_hunter_id: Uuid,
    pub to_hunter_id: Uuid,
    pub cartridge_type: CartridgeType,
    pub quantity: u32,
    #[serde(default)]
    pub note: Option<String>,
}

/// One row of `GET /cartridges/history`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryEntry {
    Purchase {
        #[serde(with = "timestamp")]
        date: DateTime<Utc>,
        cartridge_type: CartridgeType,
        quantity: u32,
        unit_price: f64,
        total_price: f64,
    },
    Usage {
        #[serde(with = "timestamp")]
        date: DateTime<Utc>,
        cartridge_type: CartridgeType,
        quantity: u32,
    },
}

impl HistoryEntry {
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            HistoryEntry::Purchase { date, .. } | HistoryEntry::Usage { date, .. } => *date,
        }
    }

    pub fn cartridge_type(&self) -> &CartridgeType {
        match self {
            HistoryEntry::Purchase { cartridge_type, .. }
            | HistoryEntry::Usage { cartridge_type, .. } => cartridge_type,
        }
    }

    /// Stock movement: positive for purchases, negative for usage
    pub fn delta(&self) -> i64 {
        match self {
            HistoryEntry::Purchase { quantity, .. } => i64::from(*quantity),
            HistoryEntry::Usage { quantity, .. } => -i64::from(*quantity),
        }
    }
}

/// Current stock of one cartridge type for one hunter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartridgeStock {
    pub cartridge_type: CartridgeType,
    pub hunter_id: Uuid,
    pub total_purchased: i64,
    pub total_used: i64,
    pub current_stock: i64,
    pub is_low_stock: bool,
}

impl CartridgeStock {
    /// Build a stock row from movement totals
    pub fn from_totals(
        cartridge_type: CartridgeType,
        hunter_id: Uuid,
        total_purchased: i64,
        total_used: i64,
    ) -> Self {
        let current_stock = total_purchased - total_used;
        Self {
            cartridge_type,
            hunter_id,
            total_purchased,
            total_used,
            current_stock,
            is_low_stock: current_stock < LOW_STOCK_THRESHOLD,
        }
    }

    /// Low-stock flag derived from the displayed stock, not the server flag
    pub fn is_low(&self) -> bool {
        self.current_stock < LOW_STOCK_THRESHOLD
    }

    /// Whether the row satisfies `current = purchased - used`
    pub fn is_consistent(&self) -> bool {
        self.current_stock == self.total_purchased - self.total_used
    }

    /// Cartridges that may be given away or fired, never negative
    pub fn available(&self) -> u32 {
        u32::try_from(self.current_stock.max(0)).unwrap_or(u32::MAX)
    }
}

/// The last stock rows fetched for one hunter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockSnapshot {
    rows: Vec<CartridgeStock>,
}

impl StockSnapshot {
    pub fn new(rows: Vec<CartridgeStock>) -> Self {
        for row in rows.iter().filter(|row| !row.is_consistent()) {
            tracing::warn!(
                cartridge_type = %row.cartridge_type.id,
                purchased = row.total_purchased,
                used = row.total_used,
                current = row.current_stock,
                "Stock row does not match purchased - used"
            );
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[CartridgeStock] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Sum of current stock over all types
    pub fn total(&self) -> i64 {
        self.rows.iter().map(|row| row.current_stock).sum()
    }

    pub fn low_stock(&self) -> impl Iterator<Item = &CartridgeStock> {
        self.rows.iter().filter(|row| row.is_low())
    }

    pub fn low_stock_count(&self) -> usize {
        self.low_stock().count()
    }

    /// Only the types with cartridges left, as offered by transfer and game forms
    pub fn in_stock(&self) -> StockSnapshot {
        StockSnapshot {
            rows: self
                .rows
                .iter()
                .filter(|row| row.current_stock > 0)
                .cloned()
                .collect(),
        }
    }

    pub fn get(&self, cartridge_type_id: Uuid) -> Option<&CartridgeStock> {
        self.rows
            .iter()
            .find(|row| row.cartridge_type.id == cartridge_type_id)
    }

    /// Stock available for a type, 0 when the type is not in the snapshot
    pub fn available(&self, cartridge_type_id: Uuid) -> u32 {
        self.get(cartridge_type_id)
            .map(CartridgeStock::available)
            .unwrap_or(0)
    }
}

impl From<Vec<CartridgeStock>> for StockSnapshot {
    fn from(rows: Vec<CartridgeStock>) -> Self {
        Self::new(rows)
    }
}
