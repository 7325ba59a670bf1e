//! Cartridge stock per hunter, with purchases and transfers

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use super::{session_user, Page, Route};
use crate::api::{ApiResult, HistoryQuery, StockQuery};
use crate::app::App;
use crate::forms::{PurchaseForm, TransferForm};
use crate::models::{HistoryEntry, StockSnapshot, User, LOW_STOCK_THRESHOLD};
use crate::render::{self, Table};

#[derive(Debug, Clone, Serialize)]
pub struct CartridgesPage {
    pub user: User,
    pub hunters: Vec<User>,
    pub selected_hunter: Uuid,
    pub stock: StockSnapshot,
    /// Loaded on demand
    pub history: Option<Vec<HistoryEntry>>,
}

impl CartridgesPage {
    pub fn selected_hunter(&self) -> Option<&User> {
        self.hunters.iter().find(|h| h.id == self.selected_hunter)
    }

    /// Show another hunter's stock
    pub async fn select_hunter(&mut self, app: &App, hunter_id: Uuid) -> ApiResult<()> {
        self.selected_hunter = hunter_id;
        self.history = None;
        self.refresh(app).await
    }

    /// Refetch the selected hunter's stock, e.g. after a purchase
    pub async fn refresh(&mut self, app: &App) -> ApiResult<()> {
        let rows = app
            .client
            .stock(&StockQuery::for_hunter(self.selected_hunter))
            .await?;
        self.stock = StockSnapshot::new(rows);
        Ok(())
    }

    pub async fn load_history(
        &mut self,
        app: &App,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> ApiResult<&[HistoryEntry]> {
        let query = HistoryQuery {
            hunter_id: Some(self.selected_hunter),
            start_date,
            end_date,
        };
        let entries = app.client.history(&query).await?;
        let entries = self.history.insert(entries);
        Ok(entries.as_slice())
    }

    /// Purchase form for the hunter being viewed
    pub async fn purchase_form(&self, app: &App) -> ApiResult<PurchaseForm> {
        PurchaseForm::load(app, self.selected_hunter).await
    }

    /// Transfers always give from the logged-in user's own stock
    pub async fn transfer_form(&self, app: &App) -> ApiResult<TransferForm> {
        TransferForm::load(app, self.user.id).await
    }

    pub fn low_stock_banner(&self) -> Option<String> {
        match self.stock.low_stock_count() {
            0 => None,
            n => Some(format!(
                "{} cartridge type(s) below {}",
                n, LOW_STOCK_THRESHOLD
            )),
        }
    }

    pub fn history_table(&self) -> Option<Table> {
        let history = self.history.as_ref()?;
        let mut table = Table::new(["Date", "Type", "Cartridge", "Quantity", "Price"]).titled("History");
        for entry in history {
            let (kind, price) = match entry {
                HistoryEntry::Purchase { total_price, .. } => ("Purchase", render::money(*total_price)),
                HistoryEntry::Usage { .. } => ("Usage", "-".to_string()),
            };
            table.push([
                render::date(&entry.date()),
                kind.to_string(),
                entry.cartridge_type().label(),
                format!("{:+}", entry.delta()),
                price,
            ]);
        }
        Some(table)
    }
}

#[async_trait]
impl Page for CartridgesPage {
    const ROUTE: Route = Route::Cartridges;

    async fn load(app: &App) -> ApiResult<Self> {
        let user = session_user(app).await?;
        let query = StockQuery::for_hunter(user.id);
        let (hunters, stock) = tokio::try_join!(app.client.hunters(), app.client.stock(&query))?;

        Ok(Self {
            selected_hunter: user.id,
            user,
            hunters,
            stock: StockSnapshot::new(stock),
            history: None,
        })
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn table(&self) -> Table {
        let mut table = Table::new([
            "Charge", "Pellet", "Brand", "Purchased", "Used", "Stock", "Status",
        ])
        .titled("Current stock");
        for row in self.stock.rows() {
            table.push([
                row.cartridge_type.charge_type.to_string(),
                row.cartridge_type.pellet_size.to_string(),
                row.cartridge_type.brand.clone(),
                row.total_purchased.to_string(),
                row.total_used.to_string(),
                row.current_stock.to_string(),
                if row.is_low() { "LOW" } else { "OK" }.to_string(),
            ]);
        }
        table
    }
}

impl fmt::Display for CartridgesPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = self
            .selected_hunter()
            .map(User::display_name)
            .unwrap_or_else(|| self.selected_hunter.to_string());
        writeln!(f, "Cartridges of {}", owner)?;
        writeln!(f)?;
        writeln!(f, "{}", render::card("Total stock", self.stock.total()))?;
        writeln!(f, "{}", render::card("Cartridge types", self.stock.len()))?;
        writeln!(f, "{}", render::card("Low stock", self.stock.low_stock_count()))?;
        writeln!(f)?;

        if let Some(banner) = self.low_stock_banner() {
            writeln!(f, "{}", banner)?;
            writeln!(f)?;
        }

        if self.stock.is_empty() {
            writeln!(f, "No stock recorded. Start by recording a purchase!")?;
        } else {
            write!(f, "{}", self.table())?;
        }

        if let Some(history) = self.history_table() {
            writeln!(f)?;
            write!(f, "{}", history)?;
        }
        Ok(())
    }
}
