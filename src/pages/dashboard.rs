//! Dashboard: club summary and the user's own stock

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use super::stats::rank_label;
use super::{session_user, Page, Route};
use crate::api::{ApiResult, StockQuery};
use crate::app::App;
use crate::models::{HunterStats, SpeciesStats, Stats, StockSnapshot, User, LOW_STOCK_THRESHOLD};
use crate::render::{self, Table};

const TOP_HUNTERS: usize = 3;
const TOP_SPECIES: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    pub user: User,
    pub stats: Stats,
    pub stock: StockSnapshot,
}

impl DashboardPage {
    pub fn low_stock_count(&self) -> usize {
        self.stock.low_stock_count()
    }

    pub fn low_stock_banner(&self) -> Option<String> {
        match self.low_stock_count() {
            0 => None,
            n => Some(format!(
                "Warning! You have {} cartridge type(s) with low stock (< {}).",
                n, LOW_STOCK_THRESHOLD
            )),
        }
    }

    pub fn top_hunters(&self) -> &[HunterStats] {
        let n = self.stats.top_hunters.len().min(TOP_HUNTERS);
        &self.stats.top_hunters[..n]
    }

    /// The most hunted species with their share of all game taken
    pub fn top_species(&self) -> Vec<(&SpeciesStats, f64)> {
        self.stats
            .species_distribution
            .iter()
            .take(TOP_SPECIES)
            .map(|s| (s, s.share_of(self.stats.total_games)))
            .collect()
    }
}

#[async_trait]
impl Page for DashboardPage {
    const ROUTE: Route = Route::Dashboard;

    async fn load(app: &App) -> ApiResult<Self> {
        let user = session_user(app).await?;
        let query = StockQuery::for_hunter(user.id);
        let (stats, stock) = tokio::try_join!(app.client.stats_summary(), app.client.stock(&query))?;

        Ok(Self {
            user,
            stats,
            stock: StockSnapshot::new(stock),
        })
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn table(&self) -> Table {
        let mut table = Table::new(["Metric", "Value"]);
        table.push(["Total game".to_string(), self.stats.total_games.to_string()]);
        table.push([
            "Cartridges used".to_string(),
            self.stats.total_cartridges_used.to_string(),
        ]);
        table.push([
            "Average efficiency".to_string(),
            format!("{} cart/game", render::ratio(self.stats.average_efficiency)),
        ]);
        table.push(["Total spent".to_string(), render::money(self.stats.total_spent)]);
        table.push(["My stock".to_string(), self.stock.total().to_string()]);
        table
    }
}

impl fmt::Display for DashboardPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dashboard")?;
        writeln!(f)?;

        if let Some(banner) = self.low_stock_banner() {
            writeln!(f, "{}", banner)?;
            writeln!(f)?;
        }

        write!(f, "{}", self.table())?;
        writeln!(f)?;

        writeln!(f, "Top hunters")?;
        if self.top_hunters().is_empty() {
            writeln!(f, "  No game recorded yet")?;
        }
        for (i, hunter) in self.top_hunters().iter().enumerate() {
            writeln!(
                f,
                "  {} {} - {} game · efficiency {} · {} cartridges · {}",
                rank_label(i),
                hunter.hunter_name,
                hunter.total_games,
                render::ratio(hunter.efficiency_ratio),
                hunter.total_cartridges_used,
                render::money(hunter.total_spent)
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Species distribution")?;
        for (species, share) in self.top_species() {
            writeln!(
                f,
                "  {:<20} {:>4} killed  {}",
                species.species_name,
                species.total_killed,
                render::percent(share)
            )?;
        }
        Ok(())
    }
}
