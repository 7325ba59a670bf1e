//! New game record form
//!
//! A record lists the cartridges fired for the kill as `(type, quantity)`
//! rows. Incomplete rows are dropped on submit and at least one complete
//! row must remain.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{track, FormError, MAX_TEXT_LEN};
use crate::app::App;
use crate::models::{
    timestamp, Game, GameCartridgeCreate, GameCreate, GameSex, GameSpecies, StockSnapshot,
};

/// Lightest weight accepted, in kg
pub const MIN_WEIGHT_KG: f64 = 0.1;

/// One editable line of fired cartridges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartridgeRow {
    pub cartridge_type_id: Option<Uuid>,
    pub quantity: u32,
}

impl Default for CartridgeRow {
    fn default() -> Self {
        Self {
            cartridge_type_id: None,
            quantity: 1,
        }
    }
}

impl CartridgeRow {
    pub fn new(cartridge_type_id: Uuid, quantity: u32) -> Self {
        Self {
            cartridge_type_id: Some(cartridge_type_id),
            quantity,
        }
    }

    fn valid(&self) -> Option<GameCartridgeCreate> {
        match self.cartridge_type_id {
            Some(cartridge_type_id) if self.quantity > 0 => Some(GameCartridgeCreate {
                cartridge_type_id,
                quantity: self.quantity,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameForm {
    pub hunter_id: Uuid,
    species: Vec<GameSpecies>,
    stock: StockSnapshot,
    pub species_id: Option<Uuid>,
    pub kill_date: NaiveDate,
    pub weight: Option<f64>,
    pub sex: Option<GameSex>,
    pub location: String,
    rows: Vec<CartridgeRow>,
    pub error: Option<String>,
    pub submitting: bool,
}

impl GameForm {
    /// A blank record with one empty cartridge row
    pub fn new(hunter_id: Uuid, species: Vec<GameSpecies>, stock: StockSnapshot) -> Self {
        Self {
            hunter_id,
            species,
            stock: stock.in_stock(),
            species_id: None,
            kill_date: Utc::now().date_naive(),
            weight: None,
            sex: None,
            location: String::new(),
            rows: vec![CartridgeRow::default()],
            error: None,
            submitting: false,
        }
    }

    pub fn species(&self) -> &[GameSpecies] {
        &self.species
    }

    pub fn stock(&self) -> &StockSnapshot {
        &self.stock
    }

    pub fn rows(&self) -> &[CartridgeRow] {
        &self.rows
    }

    pub fn add_row(&mut self) -> usize {
        self.rows.push(CartridgeRow::default());
        self.rows.len() - 1
    }

    /// Remove a row; the last remaining row stays
    pub fn remove_row(&mut self, index: usize) -> bool {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    pub fn set_row(&mut self, index: usize, row: CartridgeRow) -> bool {
        match self.rows.get_mut(index) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    /// Rows with a type and a positive quantity
    pub fn valid_rows(&self) -> Vec<GameCartridgeCreate> {
        self.rows.iter().filter_map(CartridgeRow::valid).collect()
    }

    /// Validate and assemble the record without sending it
    pub fn build(&self) -> Result<GameCreate, FormError> {
        let species_id = self
            .species_id
            .ok_or_else(|| FormError::invalid("species_id", "Species is required"))?;

        if let Some(weight) = self.weight {
            if weight.is_nan() || weight < MIN_WEIGHT_KG {
                return Err(FormError::invalid("weight", "Minimum weight is 0.1 kg"));
            }
        }

        let location = self.location.trim();
        if location.chars().count() > MAX_TEXT_LEN {
            return Err(FormError::invalid(
                "location",
                format!("Maximum {} characters", MAX_TEXT_LEN),
            ));
        }

        let cartridges = self.valid_rows();
        if cartridges.is_empty() {
            return Err(FormError::invalid(
                "cartridges",
                "Please add at least one cartridge used",
            ));
        }

        for row in &cartridges {
            let available = self.stock.available(row.cartridge_type_id);
            if available > 0 && row.quantity > available {
                let label = self
                    .stock
                    .get(row.cartridge_type_id)
                    .map(|s| s.cartridge_type.label())
                    .unwrap_or_default();
                return Err(FormError::invalid(
                    "cartridges",
                    format!("Maximum {} for {}", available, label),
                ));
            }
        }

        Ok(GameCreate {
            hunter_id: self.hunter_id,
            species_id,
            kill_date: timestamp::start_of_day(self.kill_date),
            weight: self.weight,
            sex: self.sex,
            location: (!location.is_empty()).then(|| location.to_string()),
            cartridges,
        })
    }

    pub async fn submit(&mut self, app: &App) -> Result<Game, FormError> {
        let checked = self.build();
        let game = track(&mut self.error, checked)?;

        self.submitting = true;
        let result = app
            .client
            .create_game(&game)
            .await
            .map_err(|e| FormError::from_api(e, "Failed to record the game"));
        self.submitting = false;

        if let Ok(game) = &result {
            tracing::info!(
                game = %game.id,
                species = %game.species.name,
                cartridges = game.cartridges_fired(),
                "Game recorded"
            );
        }
        track(&mut self.error, result)
    }
}
