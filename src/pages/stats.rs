//! Club statistics: rankings, species and seasons

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use super::{Page, Route};
use crate::api::ApiResult;
use crate::app::App;
use crate::models::{EfficiencyStats, SeasonStats, Stats};
use crate::render::{self, Table};

/// Medal for the podium, `#n` below it
pub fn rank_label(index: usize) -> String {
    match index {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        n => format!("#{}", n + 1),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsPage {
    pub stats: Stats,
    /// Set by [`StatsPage::select_season`]
    pub season: Option<SeasonStats>,
    /// Set by [`StatsPage::load_efficiency`]
    pub efficiency: Option<Vec<EfficiencyStats>>,
}

impl StatsPage {
    pub async fn select_season(&mut self, app: &App, year: i32) -> ApiResult<&SeasonStats> {
        let season = app.client.stats_by_season(year).await?;
        let season = self.season.insert(season);
        Ok(&*season)
    }

    pub async fn load_efficiency(
        &mut self,
        app: &App,
        season_year: Option<i32>,
    ) -> ApiResult<&[EfficiencyStats]> {
        let ranking = app.client.efficiency(season_year).await?;
        let ranking = self.efficiency.insert(ranking);
        Ok(ranking.as_slice())
    }

    fn render_season(f: &mut fmt::Formatter<'_>, season: &SeasonStats) -> fmt::Result {
        writeln!(
            f,
            "  Season {}: {} game · {} cartridges",
            season.season_name, season.total_games, season.total_cartridges_used
        )?;
        for hunter in season.hunters_stats.iter().take(3) {
            writeln!(
                f,
                "    {} - {} game",
                hunter.hunter_name, hunter.total_games
            )?;
        }
        Ok(())
    }

    pub fn efficiency_table(&self) -> Option<Table> {
        let ranking = self.efficiency.as_ref()?;
        let mut table = Table::new([
            "Rank", "Hunter", "Cartridges", "Game", "Ratio", "Best", "Worst",
        ])
        .titled("Efficiency");
        for (i, row) in ranking.iter().enumerate() {
            table.push([
                rank_label(i),
                row.hunter_name.clone(),
                row.total_cartridges.to_string(),
                row.total_games.to_string(),
                render::ratio(row.efficiency_ratio),
                render::or_dash(row.best_species.as_deref()),
                render::or_dash(row.worst_species.as_deref()),
            ]);
        }
        Some(table)
    }
}

#[async_trait]
impl Page for StatsPage {
    const ROUTE: Route = Route::Stats;

    async fn load(app: &App) -> ApiResult<Self> {
        let stats = app.client.stats_summary().await?;
        Ok(Self {
            stats,
            season: None,
            efficiency: None,
        })
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn table(&self) -> Table {
        let mut table = Table::new([
            "Rank", "Hunter", "Game", "Efficiency", "Cartridges", "Spent",
        ])
        .titled("Hunter ranking");
        for (i, hunter) in self.stats.top_hunters.iter().enumerate() {
            table.push([
                rank_label(i),
                hunter.hunter_name.clone(),
                hunter.total_games.to_string(),
                render::ratio(hunter.efficiency_ratio),
                hunter.total_cartridges_used.to_string(),
                render::money(hunter.total_spent),
            ]);
        }
        table
    }
}

impl fmt::Display for StatsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.stats;
        writeln!(f, "Statistics")?;
        writeln!(f)?;
        writeln!(f, "{}", render::card("Hunters", stats.total_hunters))?;
        writeln!(f, "{}", render::card("Game", stats.total_games))?;
        writeln!(f, "{}", render::card("Cartridges used", stats.total_cartridges_used))?;
        writeln!(
            f,
            "{}",
            render::card("Average efficiency", render::ratio(stats.average_efficiency))
        )?;
        writeln!(f, "{}", render::card("Total spent", render::money(stats.total_spent)))?;
        writeln!(f)?;

        write!(f, "{}", self.table())?;
        writeln!(f)?;

        writeln!(f, "Species")?;
        for species in &stats.species_distribution {
            writeln!(
                f,
                "  {:<20} {:>4} killed  {:>6}  {} cart/kill",
                species.species_name,
                species.total_killed,
                render::percent(species.share_of(stats.total_games)),
                render::ratio(species.average_cartridges_per_kill)
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Last seasons")?;
        if stats.last_5_seasons.is_empty() {
            writeln!(f, "  No season data")?;
        }
        for season in &stats.last_5_seasons {
            Self::render_season(f, season)?;
        }

        if let Some(season) = &self.season {
            writeln!(f)?;
            writeln!(f, "Selected season")?;
            Self::render_season(f, season)?;
        }

        if let Some(table) = self.efficiency_table() {
            writeln!(f)?;
            write!(f, "{}", table)?;
        }
        Ok(())
    }
}
