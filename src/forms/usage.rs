//! Fired-cartridge form for shots that did not take game

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{track, FormError};
use crate::api::{ApiResult, StockQuery};
use crate::app::App;
use crate::models::{timestamp, CartridgeUsage, StockSnapshot, UsageCreate};

#[derive(Debug, Clone)]
pub struct UsageForm {
    pub hunter_id: Uuid,
    stock: StockSnapshot,
    pub cartridge_type_id: Option<Uuid>,
    pub quantity: u32,
    pub usage_date: NaiveDate,
    pub error: Option<String>,
    pub submitting: bool,
}

impl UsageForm {
    pub fn new(hunter_id: Uuid, stock: StockSnapshot) -> Self {
        Self {
            hunter_id,
            stock: stock.in_stock(),
            cartridge_type_id: None,
            quantity: 1,
            usage_date: Utc::now().date_naive(),
            error: None,
            submitting: false,
        }
    }

    pub async fn load(app: &App, hunter_id: Uuid) -> ApiResult<Self> {
        let stock = app.client.stock(&StockQuery::for_hunter(hunter_id)).await?;
        Ok(Self::new(hunter_id, StockSnapshot::new(stock)))
    }

    pub fn stock(&self) -> &StockSnapshot {
        &self.stock
    }

    pub fn max_quantity(&self) -> Option<u32> {
        self.cartridge_type_id.map(|id| self.stock.available(id))
    }

    fn validate(&self) -> Result<UsageCreate, FormError> {
        if self.stock.is_empty() {
            return Err(FormError::NoStock("use"));
        }
        let cartridge_type_id = self
            .cartridge_type_id
            .ok_or_else(|| FormError::invalid("cartridge_type_id", "Cartridge type is required"))?;

        if self.quantity < 1 {
            return Err(FormError::invalid("quantity", "Minimum 1 cartridge"));
        }
        let max = self.stock.available(cartridge_type_id);
        if max > 0 && self.quantity > max {
            return Err(FormError::invalid("quantity", format!("Maximum {} (your stock)", max)));
        }

        Ok(UsageCreate {
            hunter_id: self.hunter_id,
            cartridge_type_id,
            quantity: self.quantity,
            usage_date: timestamp::start_of_day(self.usage_date),
            game_id: None,
        })
    }

    pub async fn submit(&mut self, app: &App) -> Result<CartridgeUsage, FormError> {
        let checked = self.validate();
        let usage = track(&mut self.error, checked)?;

        self.submitting = true;
        let result = app
            .client
            .create_usage(&usage)
            .await
            .map_err(|e| FormError::from_api(e, "Failed to record cartridge usage"));
        self.submitting = false;

        if result.is_ok() {
            self.cartridge_type_id = None;
            self.quantity = 1;
        }
        track(&mut self.error, result)
    }
}
