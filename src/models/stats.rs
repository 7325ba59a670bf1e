//! Aggregate statistics computed by the API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HunterStats {
    pub hunter_id: Uuid,
    pub hunter_name: String,
    pub total_games: u32,
    pub total_cartridges_used: u32,
    pub total_cartridges_purchased: u32,
    pub total_spent: f64,
    /// Cartridges fired per game taken
    pub efficiency_ratio: f64,
    #[serde(default)]
    pub games_by_species: HashMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    pub species_name: String,
    pub total_killed: u32,
    pub average_cartridges_per_kill: f64,
    pub hunters_count: u32,
}

impl SpeciesStats {
    /// Share of all game taken, in percent; 0 when nothing was taken
    pub fn share_of(&self, total_games: u32) -> f64 {
        if total_games == 0 {
            0.0
        } else {
            f64::from(self.total_killed) / f64::from(total_games) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub season_name: String,
    pub year_start: i32,
    pub total_games: u32,
    pub total_cartridges_used: u32,
    #[serde(default)]
    pub hunters_stats: Vec<HunterStats>,
    #[serde(default)]
    pub species_stats: Vec<SpeciesStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyStats {
    pub hunter_id: Uuid,
    pub hunter_name: String,
    pub total_cartridges: u32,
    pub total_games: u32,
    pub efficiency_ratio: f64,
    #[serde(default)]
    pub best_species: Option<String>,
    #[serde(default)]
    pub worst_species: Option<String>,
}

/// Club-wide summary from `GET /stats/summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_hunters: u32,
    pub total_games: u32,
    pub total_cartridges_used: u32,
    pub total_cartridges_purchased: u32,
    pub total_spent: f64,
    pub average_efficiency: f64,
    #[serde(default)]
    pub top_hunters: Vec<HunterStats>,
    #[serde(default)]
    pub species_distribution: Vec<SpeciesStats>,
    #[serde(default)]
    pub last_5_seasons: Vec<SeasonStats>,
}
