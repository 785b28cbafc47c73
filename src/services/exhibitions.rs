use chrono::Utc;
use serde_json::{Map, Value};
use crate::domain::aggregates::{Actor, Exhibition, ExhibitionDraft, Interest, Role};
use crate::domain::events::{DomainEvent, ExhibitionEvent};
use crate::error::{Result, StorefrontError};
use super::{new_id, require_role, Storefront};

impl Storefront {
    pub async fn create_exhibition(&self, actor: &Actor, draft: ExhibitionDraft) -> Result<Exhibition> {
        require_role(actor, &[Role::Consultant])?;
        let mut exhibition = Exhibition::create(new_id(), actor, draft)?;
        self.repos.exhibitions.insert(&exhibition).await?;
        tracing::info!(exhibition_id = %exhibition.id, consultant_id = %actor.id, "exhibition created");
        self.events.publish(exhibition.take_events()).await;
        Ok(exhibition)
    }

    pub async fn exhibitions(&self) -> Result<Vec<Exhibition>> {
        self.repos.exhibitions.list().await
    }

    pub async fn consultant_exhibitions(&self, actor: &Actor) -> Result<Vec<Exhibition>> {
        require_role(actor, &[Role::Consultant])?;
        let all = self.repos.exhibitions.list().await?;
        Ok(all.into_iter().filter(|e| e.consultant_id == actor.id).collect())
    }

    /// Public: anyone may register interest. Returns the new visitor count.
    pub async fn register_interest(&self, exhibition_id: &str, mut payload: Map<String, Value>) -> Result<u64> {
        if exhibition_id.trim().is_empty() {
            return Err(StorefrontError::validation("exhibition id is required"));
        }
        // The server stamps the time; a client-sent one would collide when flattened.
        payload.remove("timestamp");
        let interest = Interest { payload, timestamp: Utc::now() };
        let visitors = self.repos.exhibitions.register_interest(exhibition_id, interest).await?;
        self.events.publish(vec![DomainEvent::Exhibition(ExhibitionEvent::InterestRegistered {
            exhibition_id: exhibition_id.to_string(),
            visitors,
        })]).await;
        Ok(visitors)
    }
}
