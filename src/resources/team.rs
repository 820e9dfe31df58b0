//! Team Store Module
//!
//! Read/write access to the team roster. The roster changes rarely, so it
//! caches as [`TtlClass::Stable`].

use std::sync::Arc;

use tracing::debug;

use crate::api::{Documents, ListQuery};
use crate::cache::keys::{detail_key, list_key, list_pattern};
use crate::cache::{CacheService, KeyPattern, TtlClass};
use crate::coordinator::QueryCoordinator;
use crate::error::ApiResult;
use crate::models::{NewTeamMember, TeamMemberRecord};
use crate::resources::decode_records;

/// Collection holding team member documents.
pub const TEAM_COLLECTION: &str = "team_members";

// == Team Store ==
/// Cached access to the team roster.
pub struct TeamStore {
    api: Arc<dyn Documents>,
    cache: Arc<CacheService>,
    coordinator: Arc<dyn QueryCoordinator>,
}

impl TeamStore {
    /// Creates a store over the given collaborators.
    pub fn new(
        api: Arc<dyn Documents>,
        cache: Arc<CacheService>,
        coordinator: Arc<dyn QueryCoordinator>,
    ) -> Self {
        Self {
            api,
            cache,
            coordinator,
        }
    }

    // == Reads ==
    /// Lists the whole roster, name order, cache-first.
    pub async fn roster(&self) -> ApiResult<Vec<TeamMemberRecord>> {
        let query = ListQuery::new().order_asc("name");
        let key = list_key(TEAM_COLLECTION, &query.cache_params());
        if !self.coordinator.is_stale(&key) {
            if let Some(records) = self.cache.get::<Vec<TeamMemberRecord>>(&key) {
                return Ok(records);
            }
        }

        let records: Vec<TeamMemberRecord> =
            decode_records(self.api.list_documents(TEAM_COLLECTION, &query).await?)?;
        self.cache.set(&key, &records, TtlClass::Stable);
        self.coordinator.mark_fresh(&key);
        Ok(records)
    }

    /// Fetches one member by id, cache-first.
    pub async fn member(&self, id: &str) -> ApiResult<TeamMemberRecord> {
        let key = detail_key(TEAM_COLLECTION, id);
        if !self.coordinator.is_stale(&key) {
            if let Some(record) = self.cache.get::<TeamMemberRecord>(&key) {
                return Ok(record);
            }
        }

        let record: TeamMemberRecord =
            serde_json::from_value(self.api.get_document(TEAM_COLLECTION, id).await?)?;
        self.cache.set(&key, &record, TtlClass::Stable);
        self.coordinator.mark_fresh(&key);
        Ok(record)
    }

    // == Writes ==
    /// Adds a member to the roster.
    pub async fn add(&self, member: &NewTeamMember) -> ApiResult<TeamMemberRecord> {
        let document = self
            .api
            .create_document(TEAM_COLLECTION, serde_json::to_value(member)?)
            .await?;
        let record: TeamMemberRecord = serde_json::from_value(document)?;

        self.invalidate_lists();
        debug!("team member {} added", record.meta.id);
        Ok(record)
    }

    /// Removes a member from the roster.
    pub async fn remove(&self, id: &str) -> ApiResult<()> {
        self.api.delete_document(TEAM_COLLECTION, id).await?;

        let detail = detail_key(TEAM_COLLECTION, id);
        self.cache.invalidate(&detail);
        self.coordinator.mark_stale(&KeyPattern::Exact(detail));
        self.invalidate_lists();
        debug!("team member {} removed", id);
        Ok(())
    }

    fn invalidate_lists(&self) {
        let lists = list_pattern(TEAM_COLLECTION);
        self.cache.invalidate_pattern(&lists);
        self.coordinator.mark_stale(&lists);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDocuments;
    use crate::coordinator::StaleTracker;
    use crate::models::Role;
    use serde_json::json;

    fn store_with(mock: Arc<MockDocuments>) -> TeamStore {
        TeamStore::new(
            mock,
            Arc::new(CacheService::in_memory()),
            Arc::new(StaleTracker::new()),
        )
    }

    #[tokio::test]
    async fn test_roster_is_cached_and_sorted() {
        let mock = Arc::new(MockDocuments::new());
        mock.seed(
            "team_members",
            json!({"$id": "m2", "name": "Bea", "email": "bea@x.com", "role": "member"}),
        );
        mock.seed(
            "team_members",
            json!({"$id": "m1", "name": "Ana", "email": "ana@x.com", "role": "admin"}),
        );
        let store = store_with(mock.clone());

        let roster = store.roster().await.unwrap();
        store.roster().await.unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].name, "Ana");
        assert_eq!(roster[0].role, Role::Admin);
        assert_eq!(mock.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_refreshes_roster() {
        let mock = Arc::new(MockDocuments::new());
        let store = store_with(mock);

        assert!(store.roster().await.unwrap().is_empty());
        store
            .add(&NewTeamMember {
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap();

        assert_eq!(store.roster().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_refreshes_roster_and_detail() {
        let mock = Arc::new(MockDocuments::new());
        let store = store_with(mock);

        let added = store
            .add(&NewTeamMember {
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
                role: Role::Member,
            })
            .await
            .unwrap();
        store.member(&added.meta.id).await.unwrap();

        store.remove(&added.meta.id).await.unwrap();

        assert!(store.roster().await.unwrap().is_empty());
        assert!(store.member(&added.meta.id).await.is_err());
    }
}
