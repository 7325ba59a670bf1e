//! Pages
//!
//! A page is a view model: it loads what it shows from the API, keeps the
//! view state that its actions change, and renders itself as text, JSON or
//! CSV. Every page is behind the route guard; visiting one without a
//! session yields a redirect to the login route instead of the page.

pub mod cartridges;
pub mod dashboard;
pub mod game;
pub mod hunters;
pub mod layout;
pub mod new_game;
pub mod stats;

pub use cartridges::CartridgesPage;
pub use dashboard::DashboardPage;
pub use game::GamePage;
pub use hunters::HuntersPage;
pub use layout::{Layout, NavItem};
pub use new_game::NewGamePage;
pub use stats::StatsPage;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::api::{ApiError, ApiResult};
use crate::app::App;
use crate::models::User;
use crate::render::{OutputFormat, RenderError, Table};

/// Navigation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Cartridges,
    Game,
    NewGame,
    Stats,
    Hunters,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Cartridges => "/cartridges",
            Route::Game => "/game",
            Route::NewGame => "/game/new",
            Route::Stats => "/stats",
            Route::Hunters => "/hunters",
        }
    }

    /// Everything but the login and registration screens needs a session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of visiting a protected page
#[derive(Debug)]
pub enum Visit<P> {
    Shown(P),
    Redirect(Route),
}

impl<P> Visit<P> {
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Visit::Redirect(route) => Some(*route),
            Visit::Shown(_) => None,
        }
    }

    pub fn into_page(self) -> Option<P> {
        match self {
            Visit::Shown(page) => Some(page),
            Visit::Redirect(_) => None,
        }
    }
}

#[async_trait]
pub trait Page: Sized + Send + Sync + Serialize {
    const ROUTE: Route;

    /// Fetch everything the page shows
    async fn load(app: &App) -> ApiResult<Self>;

    /// Human-readable rendering
    fn render(&self) -> String;

    /// The page's main table
    fn table(&self) -> Table;

    fn output(&self, format: OutputFormat) -> Result<String, RenderError> {
        Ok(match format {
            OutputFormat::Table => self.render(),
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
            OutputFormat::Csv => self.table().to_csv()?,
        })
    }
}

/// Route guard: `Some(Route::Login)` when there is no session
pub async fn guard(app: &App) -> Option<Route> {
    app.ensure_hydrated().await;
    if app.session.is_authenticated().await {
        None
    } else {
        Some(Route::Login)
    }
}

/// Guard then load a page
///
/// A 401 while loading has already cleared the session and turns into a
/// redirect to the login route.
pub async fn visit<P: Page>(app: &App) -> ApiResult<Visit<P>> {
    if let Some(route) = guard(app).await {
        tracing::debug!(from = %P::ROUTE, to = %route, "Redirecting unauthenticated visit");
        return Ok(Visit::Redirect(route));
    }

    match P::load(app).await {
        Ok(page) => Ok(Visit::Shown(page)),
        Err(e) if e.is_unauthorized() => {
            tracing::warn!(route = %P::ROUTE, "Session rejected while loading page");
            Ok(Visit::Redirect(Route::Login))
        }
        Err(e) => {
            tracing::error!(route = %P::ROUTE, error = %e, "Failed to load page");
            Err(e)
        }
    }
}

/// The logged-in user, or the error a missing session amounts to
pub(crate) async fn session_user(app: &App) -> ApiResult<User> {
    app.session
        .current_user()
        .await
        .ok_or(ApiError::Unauthorized { detail: None })
}
