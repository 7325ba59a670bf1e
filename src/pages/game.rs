//! Game list with filters

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use super::{Page, Route};
use crate::api::{ApiResult, GameFilter};
use crate::app::App;
use crate::models::{Game, GameSpecies, User};
use crate::render::{self, Table};

#[derive(Debug, Clone, Serialize)]
pub struct GamePage {
    pub games: Vec<Game>,
    pub species: Vec<GameSpecies>,
    pub hunters: Vec<User>,
    pub filter: GameFilter,
}

impl GamePage {
    /// Refetch the list with new filters
    pub async fn apply_filter(&mut self, app: &App, filter: GameFilter) -> ApiResult<()> {
        self.games = app.client.games(&filter).await?;
        self.filter = filter;
        Ok(())
    }

    /// Delete a record; the row goes away once the server confirms
    pub async fn delete(&mut self, app: &App, game_id: Uuid) -> ApiResult<()> {
        app.client.delete_game(game_id).await?;
        self.games.retain(|g| g.id != game_id);
        tracing::info!(game = %game_id, "Game deleted");
        Ok(())
    }

    /// Kills dated in the current calendar year
    pub fn this_season(&self) -> usize {
        let year = Utc::now().year();
        self.games.iter().filter(|g| g.season() == year).count()
    }

    pub fn distinct_species(&self) -> usize {
        self.games
            .iter()
            .map(|g| g.species_id)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn hunter_name(&self, hunter_id: Uuid) -> String {
        self.hunters
            .iter()
            .find(|h| h.id == hunter_id)
            .map(User::display_name)
            .unwrap_or_else(|| "-".to_string())
    }
}

#[async_trait]
impl Page for GamePage {
    const ROUTE: Route = Route::Game;

    async fn load(app: &App) -> ApiResult<Self> {
        let filter = GameFilter::default();
        let (games, species, hunters) = tokio::try_join!(
            app.client.games(&filter),
            app.client.species(),
            app.client.hunters()
        )?;

        Ok(Self {
            games,
            species,
            hunters,
            filter,
        })
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn table(&self) -> Table {
        let mut table = Table::new([
            "Date", "Species", "Hunter", "Weight", "Sex", "Location", "Cartridges", "Id",
        ]);
        for game in &self.games {
            table.push([
                render::date(&game.kill_date),
                game.species.name.clone(),
                self.hunter_name(game.hunter_id),
                game.weight
                    .map(|w| format!("{} kg", w))
                    .unwrap_or_else(|| "-".to_string()),
                render::or_dash(game.sex),
                render::or_dash(game.location.as_deref()),
                game.cartridges_fired().to_string(),
                game.id.to_string(),
            ]);
        }
        table
    }
}

impl fmt::Display for GamePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Game log")?;
        writeln!(f)?;
        writeln!(f, "{}", render::card("Total game", self.games.len()))?;
        writeln!(f, "{}", render::card("This season", self.this_season()))?;
        writeln!(f, "{}", render::card("Distinct species", self.distinct_species()))?;
        writeln!(f)?;

        if self.games.is_empty() {
            writeln!(f, "No game recorded")?;
        } else {
            write!(f, "{}", self.table())?;
        }
        Ok(())
    }
}
