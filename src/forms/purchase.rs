//! Cartridge purchase form

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{track, FormError};
use crate::api::ApiResult;
use crate::app::App;
use crate::models::{
    timestamp, CartridgePurchase, CartridgeType, ChargeType, NewCartridgeType, PelletSize,
    PurchaseCreate,
};

/// Which cartridge type the purchase is for
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TypeChoice {
    #[default]
    Unselected,
    Existing(Uuid),
    /// Created (or found) on submit
    New(NewCartridgeType),
}

impl TypeChoice {
    /// A new type with the form's defaults and the given brand
    pub fn new_type(brand: impl Into<String>) -> Self {
        TypeChoice::New(NewCartridgeType {
            charge_type: ChargeType::Normal,
            pellet_size: PelletSize::Seven,
            brand: brand.into(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PurchaseForm {
    pub hunter_id: Uuid,
    types: Vec<CartridgeType>,
    pub choice: TypeChoice,
    pub quantity: u32,
    pub unit_price: f64,
    pub purchase_date: NaiveDate,
    pub error: Option<String>,
    pub submitting: bool,
}

impl PurchaseForm {
    pub const DEFAULT_QUANTITY: u32 = 25;
    pub const DEFAULT_UNIT_PRICE: f64 = 0.45;
    pub const MIN_UNIT_PRICE: f64 = 0.01;

    pub fn new(hunter_id: Uuid, types: Vec<CartridgeType>) -> Self {
        Self {
            hunter_id,
            types,
            choice: TypeChoice::Unselected,
            quantity: Self::DEFAULT_QUANTITY,
            unit_price: Self::DEFAULT_UNIT_PRICE,
            purchase_date: Utc::now().date_naive(),
            error: None,
            submitting: false,
        }
    }

    /// Fetch the known cartridge types and open a blank form
    pub async fn load(app: &App, hunter_id: Uuid) -> ApiResult<Self> {
        let types = app.client.cartridge_types().await?;
        Ok(Self::new(hunter_id, types))
    }

    pub fn types(&self) -> &[CartridgeType] {
        &self.types
    }

    pub fn total_price(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }

    fn reset(&mut self) {
        self.choice = TypeChoice::Unselected;
        self.quantity = Self::DEFAULT_QUANTITY;
        self.unit_price = Self::DEFAULT_UNIT_PRICE;
        self.purchase_date = Utc::now().date_naive();
    }

    fn validate(&self) -> Result<(), FormError> {
        match &self.choice {
            TypeChoice::Unselected => {
                return Err(FormError::invalid(
                    "cartridge_type_id",
                    "Please select a cartridge type",
                ))
            }
            TypeChoice::New(new_type) if new_type.brand.trim().is_empty() => {
                return Err(FormError::invalid("brand", "Brand is required"))
            }
            _ => {}
        }
        if self.quantity < 1 {
            return Err(FormError::invalid("quantity", "Minimum 1 cartridge"));
        }
        if self.unit_price.is_nan() || self.unit_price < Self::MIN_UNIT_PRICE {
            return Err(FormError::invalid("unit_price", "Minimum price 0.01 €"));
        }
        Ok(())
    }

    async fn resolve_type(&mut self, app: &App) -> Result<Uuid, FormError> {
        let new_type = match &self.choice {
            TypeChoice::Existing(id) => return Ok(*id),
            TypeChoice::New(new_type) => NewCartridgeType {
                brand: new_type.brand.trim().to_string(),
                ..new_type.clone()
            },
            TypeChoice::Unselected => {
                return Err(FormError::invalid(
                    "cartridge_type_id",
                    "Please select a cartridge type",
                ))
            }
        };

        let created = app
            .client
            .create_cartridge_type(&new_type)
            .await
            .map_err(|e| FormError::from_api(e, "Failed to record the purchase"))?;

        tracing::debug!(cartridge_type = %created.id, label = %created.label(), "Cartridge type ready");
        let id = created.id;
        if !self.types.iter().any(|t| t.id == id) {
            self.types.push(created);
        }
        self.choice = TypeChoice::Existing(id);
        Ok(id)
    }

    /// Record the purchase, creating the cartridge type first when needed
    pub async fn submit(&mut self, app: &App) -> Result<CartridgePurchase, FormError> {
        let checked = self.validate();
        track(&mut self.error, checked)?;

        self.submitting = true;
        let result = self.send(app).await;
        self.submitting = false;

        if result.is_ok() {
            self.reset();
        }
        track(&mut self.error, result)
    }

    async fn send(&mut self, app: &App) -> Result<CartridgePurchase, FormError> {
        let cartridge_type_id = self.resolve_type(app).await?;
        let purchase = PurchaseCreate {
            hunter_id: self.hunter_id,
            cartridge_type_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
            purchase_date: timestamp::start_of_day(self.purchase_date),
        };

        app.client
            .create_purchase(&purchase)
            .await
            .map_err(|e| FormError::from_api(e, "Failed to record the purchase"))
    }
}
