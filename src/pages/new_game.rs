//! Record a new kill

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use super::{session_user, Page, Route};
use crate::api::{ApiResult, StockQuery};
use crate::app::App;
use crate::forms::{FormError, GameForm, Submitted};
use crate::models::{Game, GameSpecies, StockSnapshot};
use crate::render::Table;

#[derive(Debug, Clone, Serialize)]
pub struct NewGamePage {
    pub species: Vec<GameSpecies>,
    /// The user's cartridge types that still have stock
    pub stock: StockSnapshot,
    #[serde(skip)]
    pub form: GameForm,
}

impl NewGamePage {
    /// Submit the form; success goes back to the game list
    pub async fn submit(&mut self, app: &App) -> Result<Submitted<Game>, FormError> {
        let game = self.form.submit(app).await?;
        Ok(Submitted {
            value: game,
            next: Route::Game,
        })
    }

    pub fn species_by_name(&self, name: &str) -> Option<&GameSpecies> {
        let name = name.trim();
        self.species
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

#[async_trait]
impl Page for NewGamePage {
    const ROUTE: Route = Route::NewGame;

    async fn load(app: &App) -> ApiResult<Self> {
        let user = session_user(app).await?;
        let query = StockQuery::for_hunter(user.id);
        let (species, stock) = tokio::try_join!(app.client.species(), app.client.stock(&query))?;

        let stock = StockSnapshot::new(stock).in_stock();
        let form = GameForm::new(user.id, species.clone(), stock.clone());
        Ok(Self { species, stock, form })
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn table(&self) -> Table {
        let mut table = Table::new(["Cartridge", "Stock", "Id"]).titled("Available cartridges");
        for row in self.stock.rows() {
            table.push([
                row.cartridge_type.label(),
                row.current_stock.to_string(),
                row.cartridge_type.id.to_string(),
            ]);
        }
        table
    }
}

impl fmt::Display for NewGamePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Record game")?;
        writeln!(f)?;
        let species: Vec<&str> = self.species.iter().map(|s| s.name.as_str()).collect();
        writeln!(f, "Species: {}", species.join(", "))?;
        writeln!(f)?;
        write!(f, "{}", self.table())?;
        if let Some(error) = &self.form.error {
            writeln!(f)?;
            writeln!(f, "Error: {}", error)?;
        }
        Ok(())
    }
}
