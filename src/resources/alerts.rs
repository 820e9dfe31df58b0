//! Alert Store Module
//!
//! Read/write access to the alert collection. Alert feeds change often, so
//! they cache as [`TtlClass::Volatile`] and are refreshed aggressively
//! after every mutation.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::api::{Documents, ListQuery};
use crate::cache::keys::{children_key, family_pattern, list_key, list_pattern};
use crate::cache::{CacheService, KeyPattern, TtlClass};
use crate::coordinator::QueryCoordinator;
use crate::error::ApiResult;
use crate::models::{AlertRecord, NewAlert};
use crate::resources::decode_records;

/// Collection holding alert documents.
pub const ALERTS_COLLECTION: &str = "alerts";

// == Alert Store ==
/// Cached access to alert records.
pub struct AlertStore {
    api: Arc<dyn Documents>,
    cache: Arc<CacheService>,
    coordinator: Arc<dyn QueryCoordinator>,
}

impl AlertStore {
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
    /// Lists alerts matching `query`, cache-first.
    pub async fn list(&self, query: &ListQuery) -> ApiResult<Vec<AlertRecord>> {
        let key = list_key(ALERTS_COLLECTION, &query.cache_params());
        if !self.coordinator.is_stale(&key) {
            if let Some(records) = self.cache.get::<Vec<AlertRecord>>(&key) {
                return Ok(records);
            }
        }

        let records: Vec<AlertRecord> =
            decode_records(self.api.list_documents(ALERTS_COLLECTION, query).await?)?;
        self.cache.set(&key, &records, TtlClass::Volatile);
        self.coordinator.mark_fresh(&key);
        Ok(records)
    }

    /// Lists the undismissed alerts targeting one team member, oldest
    /// first.
    pub async fn for_user(&self, user_id: &str) -> ApiResult<Vec<AlertRecord>> {
        let key = children_key(ALERTS_COLLECTION, user_id);
        if !self.coordinator.is_stale(&key) {
            if let Some(records) = self.cache.get::<Vec<AlertRecord>>(&key) {
                return Ok(records);
            }
        }

        let query = ListQuery::new()
            .equal("target_user", json!(user_id))
            .equal("is_dismissed", json!(false))
            .order_asc("alert_time");
        let records: Vec<AlertRecord> =
            decode_records(self.api.list_documents(ALERTS_COLLECTION, &query).await?)?;
        self.cache.set(&key, &records, TtlClass::Volatile);
        self.coordinator.mark_fresh(&key);
        Ok(records)
    }

    // == Writes ==
    /// Creates an alert and returns it as stored.
    pub async fn create(&self, alert: &NewAlert) -> ApiResult<AlertRecord> {
        // A new alert is always undismissed; set it explicitly so the
        // attribute exists for the feed query's equality filter
        let mut data = serde_json::to_value(alert)?;
        data["is_dismissed"] = json!(false);

        let document = self
            .api
            .create_document(ALERTS_COLLECTION, data)
            .await?;
        let record: AlertRecord = serde_json::from_value(document)?;

        self.invalidate_queries(Some(&record.target_user));
        debug!("alert {} created for {}", record.meta.id, record.target_user);
        Ok(record)
    }

    /// Marks one alert dismissed.
    pub async fn dismiss(&self, id: &str) -> ApiResult<AlertRecord> {
        let document = self
            .api
            .update_document(ALERTS_COLLECTION, id, json!({"is_dismissed": true}))
            .await?;
        let record: AlertRecord = serde_json::from_value(document)?;

        self.invalidate_queries(Some(&record.target_user));
        Ok(record)
    }

    /// Deletes one alert.
    ///
    /// Deletion does not report which user the alert targeted, so every
    /// cached alert query is dropped rather than just one user's feed.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.api.delete_document(ALERTS_COLLECTION, id).await?;

        self.invalidate_queries(None);
        debug!("alert {} deleted", id);
        Ok(())
    }

    // == Invalidation ==
    fn invalidate_queries(&self, target_user: Option<&str>) {
        match target_user {
            Some(user) => {
                let lists = list_pattern(ALERTS_COLLECTION);
                let feed = children_key(ALERTS_COLLECTION, user);
                self.cache.invalidate_pattern(&lists);
                self.cache.invalidate(&feed);
                self.coordinator.mark_stale(&lists);
                self.coordinator.mark_stale(&KeyPattern::Exact(feed));
            }
            None => {
                let family = family_pattern(ALERTS_COLLECTION);
                self.cache.invalidate_pattern(&family);
                self.coordinator.mark_stale(&family);
            }
        }
    }
}
