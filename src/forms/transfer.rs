//! Cartridge transfer form
//!
//! The quantity bound comes from the sender's last fetched stock. Another
//! transfer made in the meantime is not detected here; the server checks
//! the balance again and rejects an overdraft.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{track, FormError, MAX_TEXT_LEN};
use crate::api::{ApiResult, StockQuery};
use crate::app::App;
use crate::models::{timestamp, StockSnapshot, TransferCreate, TransferReceipt, User};

#[derive(Debug, Clone)]
pub struct TransferForm {
    pub from_hunter_id: Uuid,
    stock: StockSnapshot,
    recipients: Vec<User>,
    pub to_hunter_id: Option<Uuid>,
    pub cartridge_type_id: Option<Uuid>,
    pub quantity: u32,
    pub transfer_date: NaiveDate,
    pub note: String,
    pub error: Option<String>,
    pub submitting: bool,
}

impl TransferForm {
    /// Build the form from the sender's stock and the club's hunters
    ///
    /// Only types with cartridges left are offered, and the sender is not
    /// a possible recipient.
    pub fn new(from_hunter_id: Uuid, stock: StockSnapshot, hunters: Vec<User>) -> Self {
        Self {
            from_hunter_id,
            stock: stock.in_stock(),
            recipients: hunters
                .into_iter()
                .filter(|h| h.id != from_hunter_id)
                .collect(),
            to_hunter_id: None,
            cartridge_type_id: None,
            quantity: 1,
            transfer_date: Utc::now().date_naive(),
            note: String::new(),
            error: None,
            submitting: false,
        }
    }

    pub async fn load(app: &App, from_hunter_id: Uuid) -> ApiResult<Self> {
        let query = StockQuery::for_hunter(from_hunter_id);
        let (stock, hunters) = tokio::try_join!(app.client.stock(&query), app.client.hunters())?;
        Ok(Self::new(from_hunter_id, StockSnapshot::new(stock), hunters))
    }

    pub fn stock(&self) -> &StockSnapshot {
        &self.stock
    }

    pub fn recipients(&self) -> &[User] {
        &self.recipients
    }

    /// Whether there is anything to give
    pub fn has_stock(&self) -> bool {
        !self.stock.is_empty()
    }

    /// Upper bound for the quantity: the selected type's current stock
    pub fn max_quantity(&self) -> Option<u32> {
        self.cartridge_type_id.map(|id| self.stock.available(id))
    }

    fn reset(&mut self) {
        self.to_hunter_id = None;
        self.cartridge_type_id = None;
        self.quantity = 1;
        self.transfer_date = Utc::now().date_naive();
        self.note.clear();
    }

    fn validate(&self) -> Result<TransferCreate, FormError> {
        if !self.has_stock() {
            return Err(FormError::NoStock("transfer"));
        }

        let to_hunter_id = self
            .to_hunter_id
            .ok_or_else(|| FormError::invalid("to_hunter_id", "Recipient is required"))?;
        if to_hunter_id == self.from_hunter_id {
            return Err(FormError::invalid(
                "to_hunter_id",
                "You cannot transfer cartridges to yourself",
            ));
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

        let note = self.note.trim();
        if note.chars().count() > MAX_TEXT_LEN {
            return Err(FormError::invalid(
                "note",
                format!("Maximum {} characters", MAX_TEXT_LEN),
            ));
        }

        Ok(TransferCreate {
            from_hunter_id: self.from_hunter_id,
            to_hunter_id,
            cartridge_type_id,
            quantity: self.quantity,
            transfer_date: timestamp::start_of_day(self.transfer_date),
            note: (!note.is_empty()).then(|| note.to_string()),
        })
    }

    /// Send the transfer; the form is cleared once the server accepts it
    pub async fn submit(&mut self, app: &App) -> Result<TransferReceipt, FormError> {
        let checked = self.validate();
        let transfer = track(&mut self.error, checked)?;

        self.submitting = true;
        let result = app
            .client
            .transfer(&transfer)
            .await
            .map_err(|e| FormError::from_api(e, "Failed to transfer cartridges"));
        self.submitting = false;

        if let Ok(receipt) = &result {
            tracing::info!(
                to = %receipt.to_hunter_id,
                cartridge_type = %receipt.cartridge_type.label(),
                quantity = receipt.quantity,
                "Cartridges transferred"
            );
            self.reset();
        }
        track(&mut self.error, result)
    }
}
