//! Game species and recorded kills

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{timestamp, CartridgeType, ParseValueError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSpecies {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Sex of a killed animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameSex {
    #[serde(rename = "Mâle")]
    Male,
    #[serde(rename = "Femelle")]
    Female,
}

impl GameSex {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameSex::Male => "Mâle",
            GameSex::Female => "Femelle",
        }
    }
}

impl fmt::Display for GameSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameSex {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mâle" | "male" | "m" => Ok(GameSex::Male),
            "femelle" | "female" | "f" => Ok(GameSex::Female),
            _ => Err(ParseValueError::new("sex", s, "male, female")),
        }
    }
}

/// Cartridges fired for one kill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCartridge {
    pub id: Uuid,
    pub cartridge_type_id: Uuid,
    pub quantity: u32,
    pub cartridge_type: CartridgeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub hunter_id: Uuid,
    pub species_id: Uuid,
    pub species: GameSpecies,
    #[serde(with = "timestamp")]
    pub kill_date: DateTime<Utc>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub sex: Option<GameSex>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub game_cartridges: Vec<GameCartridge>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn cartridges_fired(&self) -> u32 {
        self.game_cartridges.iter().map(|gc| gc.quantity).sum()
    }

    /// Season of the kill (calendar year)
    pub fn season(&self) -> i32 {
        self.kill_date.year()
    }
}

/// One `(cartridge type, quantity)` line of a game record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameCartridgeCreate {
    pub cartridge_type_id: Uuid,
    pub quantity: u32,
}

/// Payload for `POST /game`
#[derive(Debug, Clone, Serialize)]
pub struct GameCreate {
    pub hunter_id: Uuid,
    pub species_id: Uuid,
    #[serde(with = "timestamp")]
    pub kill_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<GameSex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub cartridges: Vec<GameCartridgeCreate>,
}

/// Payload for `PUT /game/:id`
#[derive(Debug, Clone, Default, Serialize)]
pub struct GameUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_id: Option<Uuid>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_timestamp"
    )]
    pub kill_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<GameSex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cartridges: Option<Vec<GameCartridgeCreate>>,
}

fn serialize_optional_timestamp<S>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(dt) => timestamp::serialize(dt, serializer),
        None => serializer.serialize_none(),
    }
}
