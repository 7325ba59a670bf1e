//! # Huntclub
//!
//! Record keeping for a hunting club - a terminal client for the club's
//! REST API.
//!
//! ## Features
//!
//! - **Members**: sign-in with a persisted session, admin member management
//! - **Cartridges**: stock per hunter and type, purchases, usage, transfers
//! - **Game**: kill records with the cartridges fired for each
//! - **Statistics**: rankings, species distribution, seasons, efficiency
//!
//! ## Modules
//!
//! - [`models`]: Entities exchanged with the API
//! - [`storage`]: Local key/value store holding the session
//! - [`session`]: Authentication state and its persistence
//! - [`api`]: HTTP client for every endpoint
//! - [`forms`]: Validated input forms
//! - [`pages`]: Route-guarded view models
//! - [`render`]: Text and CSV output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use huntclub::app::App;
//! use huntclub::config::Config;
//! use huntclub::forms::LoginForm;
//! use huntclub::pages::{visit, DashboardPage, Page};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::new(Config::load_default())?;
//!
//!     LoginForm::new("jean.dupont@club.fr", "secret").submit(&app).await?;
//!
//!     if let Some(page) = visit::<DashboardPage>(&app).await?.into_page() {
//!         println!("{}", page.render());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod forms;
pub mod models;
pub mod pages;
pub mod render;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, ApiResult};
pub use app::App;
pub use config::Config;
pub use session::{AuthState, AuthStore};
