//! Query-string filters for list endpoints

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{timestamp, ChargeType, PelletSize};

/// Filters of `GET /cartridges/stock`; no hunter means the logged-in user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockQuery {
    pub hunter_id: Option<Uuid>,
    pub charge_type: Option<ChargeType>,
    pub pellet_size: Option<PelletSize>,
}

impl StockQuery {
    pub fn for_hunter(hunter_id: Uuid) -> Self {
        Self {
            hunter_id: Some(hunter_id),
            ..Default::default()
        }
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.hunter_id {
            params.push(("hunter_id", id.to_string()));
        }
        if let Some(charge) = self.charge_type {
            params.push(("charge_type", charge.to_string()));
        }
        if let Some(size) = self.pellet_size {
            params.push(("pellet_size", size.to_string()));
        }
        params
    }
}

/// Filters of `GET /cartridges/history`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryQuery {
    pub hunter_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.hunter_id {
            params.push(("hunter_id", id.to_string()));
        }
        if let Some(start) = &self.start_date {
            params.push(("start_date", timestamp::format(start)));
        }
        if let Some(end) = &self.end_date {
            params.push(("end_date", timestamp::format(end)));
        }
        params
    }
}

/// Filters of `GET /game`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunter_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_year: Option<i32>,
}

impl GameFilter {
    pub fn is_empty(&self) -> bool {
        *self == GameFilter::default()
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.hunter_id {
            params.push(("hunter_id", id.to_string()));
        }
        if let Some(id) = self.species_id {
            params.push(("species_id", id.to_string()));
        }
        if let Some(start) = &self.start_date {
            params.push(("start_date", timestamp::format(start)));
        }
        if let Some(end) = &self.end_date {
            params.push(("end_date", timestamp::format(end)));
        }
        if let Some(year) = self.season_year {
            params.push(("season_year", year.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_send_nothing() {
        assert!(StockQuery::default().params().is_empty());
        assert!(HistoryQuery::default().params().is_empty());
        assert!(GameFilter::default().params().is_empty());
        assert!(GameFilter::default().is_empty());
    }

    #[test]
    fn test_stock_params() {
        let hunter = Uuid::new_v4();
        let query = StockQuery {
            hunter_id: Some(hunter),
            charge_type: Some(ChargeType::Magnum),
            pellet_size: Some(PelletSize::SixHalf),
        };
        assert_eq!(
            query.params(),
            vec![
                ("hunter_id", hunter.to_string()),
                ("charge_type", "Magnum".to_string()),
                ("pellet_size", "6.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_game_filter_season() {
        let filter = GameFilter {
            season_year: Some(2024),
            ..Default::default()
        };
        assert_eq!(filter.params(), vec![("season_year", "2024".to_string())]);
    }
}
