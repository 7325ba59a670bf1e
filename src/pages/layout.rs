//! Header and navigation around every page

use serde::Serialize;

use super::Route;
use crate::models::User;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
}

const NAV: [NavItem; 4] = [
    NavItem { route: Route::Dashboard, label: "Dashboard" },
    NavItem { route: Route::Cartridges, label: "Cartridges" },
    NavItem { route: Route::Game, label: "Game" },
    NavItem { route: Route::Stats, label: "Stats" },
];

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub user: User,
    pub current: Route,
}

impl Layout {
    pub fn new(user: User, current: Route) -> Self {
        Self { user, current }
    }

    /// Navigation entries; admins also manage hunters
    pub fn nav_items(&self) -> Vec<NavItem> {
        let mut items = NAV.to_vec();
        if self.user.is_admin() {
            items.push(NavItem {
                route: Route::Hunters,
                label: "Hunters",
            });
        }
        items
    }

    pub fn header(&self) -> String {
        let nav = self
            .nav_items()
            .iter()
            .map(|item| {
                if item.route == self.current {
                    format!("[{}]", item.label)
                } else {
                    item.label.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  ");

        let badge = if self.user.is_admin() { " (Admin)" } else { "" };
        format!(
            "Hunting Club | {} | {}{}\n{}\n",
            nav,
            self.user.display_name(),
            badge,
            "=".repeat(60)
        )
    }
}
