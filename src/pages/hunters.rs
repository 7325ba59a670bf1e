//! Club member administration

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::{Page, Route};
use crate::api::ApiResult;
use crate::app::App;
use crate::models::{User, UserCreate, UserUpdate};
use crate::render::{self, Table};

#[derive(Debug, Clone, Serialize)]
pub struct HuntersPage {
    pub hunters: Vec<User>,
}

impl HuntersPage {
    pub fn find(&self, hunter_id: Uuid) -> Option<&User> {
        self.hunters.iter().find(|h| h.id == hunter_id)
    }

    pub async fn create(&mut self, app: &App, hunter: &UserCreate) -> ApiResult<&User> {
        let created = app.client.create_hunter(hunter).await?;
        tracing::info!(hunter = %created.id, email = %created.email, "Hunter created");
        self.hunters.push(created);
        let index = self.hunters.len() - 1;
        Ok(&self.hunters[index])
    }

    pub async fn update(&mut self, app: &App, hunter_id: Uuid, update: &UserUpdate) -> ApiResult<User> {
        let updated = app.client.update_hunter(hunter_id, update).await?;
        match self.hunters.iter_mut().find(|h| h.id == hunter_id) {
            Some(slot) => *slot = updated.clone(),
            None => self.hunters.push(updated.clone()),
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, app: &App, hunter_id: Uuid) -> ApiResult<()> {
        app.client.delete_hunter(hunter_id).await?;
        self.hunters.retain(|h| h.id != hunter_id);
        tracing::info!(hunter = %hunter_id, "Hunter deleted");
        Ok(())
    }
}

#[async_trait]
impl Page for HuntersPage {
    const ROUTE: Route = Route::Hunters;

    async fn load(app: &App) -> ApiResult<Self> {
        Ok(Self {
            hunters: app.client.hunters().await?,
        })
    }

    fn render(&self) -> String {
        format!("Hunters\n\n{}", self.table().to_text())
    }

    fn table(&self) -> Table {
        let mut table = Table::new(["Name", "Email", "Role", "Member since", "Id"]);
        for hunter in &self.hunters {
            table.push([
                hunter.display_name(),
                hunter.email.clone(),
                hunter.role.to_string(),
                render::date(&hunter.created_at),
                hunter.id.to_string(),
            ]);
        }
        table
    }
}
