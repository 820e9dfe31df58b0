//! Call Store Module
//!
//! Read/write access to the cold-call collection and its per-call
//! transcripts, fronted by the cache.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::api::{Documents, ListQuery};
use crate::cache::keys::{children_key, detail_key, list_key, list_pattern};
use crate::cache::{CacheService, KeyPattern, TtlClass};
use crate::coordinator::QueryCoordinator;
use crate::error::ApiResult;
use crate::models::{CallPatch, CallRecord, NewCall, TranscriptRecord};
use crate::resources::decode_records;

/// Collection holding call documents.
pub const CALLS_COLLECTION: &str = "coldcalls";
/// Collection holding transcript documents, keyed back by `call_id`.
pub const TRANSCRIPTS_COLLECTION: &str = "transcripts";

// == Call Store ==
/// Cached access to call records.
///
/// Call data sits in the middle of the freshness spectrum
/// ([`TtlClass::Moderate`]); finished transcripts never change once
/// written, so they cache as [`TtlClass::Archival`].
pub struct CallStore {
    api: Arc<dyn Documents>,
    cache: Arc<CacheService>,
    coordinator: Arc<dyn QueryCoordinator>,
}

impl CallStore {
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
    /// Lists calls matching `query`, cache-first.
    pub async fn list(&self, query: &ListQuery) -> ApiResult<Vec<CallRecord>> {
        let key = list_key(CALLS_COLLECTION, &query.cache_params());
        if !self.coordinator.is_stale(&key) {
            if let Some(records) = self.cache.get::<Vec<CallRecord>>(&key) {
                return Ok(records);
            }
        }

        let records: Vec<CallRecord> =
            decode_records(self.api.list_documents(CALLS_COLLECTION, query).await?)?;
        self.cache.set(&key, &records, TtlClass::Moderate);
        self.coordinator.mark_fresh(&key);
        Ok(records)
    }

    /// Lists every call logged against one company.
    pub async fn for_company(&self, company_id: &str) -> ApiResult<Vec<CallRecord>> {
        self.list(&ListQuery::new().equal("company_id", json!(company_id)))
            .await
    }

    /// Fetches one call by id, cache-first.
    pub async fn get(&self, id: &str) -> ApiResult<CallRecord> {
        let key = detail_key(CALLS_COLLECTION, id);
        if !self.coordinator.is_stale(&key) {
            if let Some(record) = self.cache.get::<CallRecord>(&key) {
                return Ok(record);
            }
        }

        let record: CallRecord =
            serde_json::from_value(self.api.get_document(CALLS_COLLECTION, id).await?)?;
        self.cache.set(&key, &record, TtlClass::Moderate);
        self.coordinator.mark_fresh(&key);
        Ok(record)
    }

    /// Fetches the transcript belonging to one call, if it has one.
    pub async fn transcript(&self, call_id: &str) -> ApiResult<Option<TranscriptRecord>> {
        let key = children_key(TRANSCRIPTS_COLLECTION, call_id);
        if !self.coordinator.is_stale(&key) {
            if let Some(cached) = self.cache.get::<Vec<TranscriptRecord>>(&key) {
                return Ok(cached.into_iter().next());
            }
        }

        let query = ListQuery::new().equal("call_id", json!(call_id)).limit(1);
        let records: Vec<TranscriptRecord> =
            decode_records(self.api.list_documents(TRANSCRIPTS_COLLECTION, &query).await?)?;
        self.cache.set(&key, &records, TtlClass::Archival);
        self.coordinator.mark_fresh(&key);
        Ok(records.into_iter().next())
    }

    // == Writes ==
    /// Creates a call and returns it as stored.
    pub async fn create(&self, call: &NewCall) -> ApiResult<CallRecord> {
        let document = self
            .api
            .create_document(CALLS_COLLECTION, serde_json::to_value(call)?)
            .await?;
        let record: CallRecord = serde_json::from_value(document)?;

        // Remote write confirmed; now drop the list queries it changed
        self.invalidate_lists();
        debug!("call {} created", record.meta.id);
        Ok(record)
    }

    /// Patches one call and returns the updated record.
    pub async fn update(&self, id: &str, patch: &CallPatch) -> ApiResult<CallRecord> {
        let document = self
            .api
            .update_document(CALLS_COLLECTION, id, serde_json::to_value(patch)?)
            .await?;
        let record: CallRecord = serde_json::from_value(document)?;

        self.invalidate_call(id);
        Ok(record)
    }

    /// Claims a call for one team member.
    pub async fn claim(&self, id: &str, member_id: &str) -> ApiResult<CallRecord> {
        self.update(
            id,
            &CallPatch {
                claimed_by: Some(member_id.to_string()),
                ..CallPatch::default()
            },
        )
        .await
    }

    /// Deletes one call and, since transcripts are one-to-one with calls,
    /// its transcript document as well.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.api.delete_document(CALLS_COLLECTION, id).await?;

        // Best-effort cascade; an orphaned transcript is unreachable from
        // the UI either way
        let query = ListQuery::new().equal("call_id", json!(id));
        match self.api.list_documents(TRANSCRIPTS_COLLECTION, &query).await {
            Ok(documents) => {
                for document in documents {
                    if let Some(transcript_id) = document["$id"].as_str() {
                        if let Err(err) = self
                            .api
                            .delete_document(TRANSCRIPTS_COLLECTION, transcript_id)
                            .await
                        {
                            warn!("transcript {} of deleted call {} not removed: {}", transcript_id, id, err);
                        }
                    }
                }
            }
            Err(err) => warn!("transcript lookup for deleted call {} failed: {}", id, err),
        }

        self.invalidate_call(id);
        self.cache.invalidate(&children_key(TRANSCRIPTS_COLLECTION, id));
        debug!("call {} deleted", id);
        Ok(())
    }

    // == Invalidation ==
    fn invalidate_lists(&self) {
        let lists = list_pattern(CALLS_COLLECTION);
        self.cache.invalidate_pattern(&lists);
        self.coordinator.mark_stale(&lists);
    }

    fn invalidate_call(&self, id: &str) {
        let detail = detail_key(CALLS_COLLECTION, id);
        self.cache.invalidate(&detail);
        self.coordinator.mark_stale(&KeyPattern::Exact(detail));
        self.invalidate_lists();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDocuments;
    use crate::coordinator::StaleTracker;
    use serde_json::json;

    fn store_with(mock: Arc<MockDocuments>) -> CallStore {
        CallStore::new(
            mock,
            Arc::new(CacheService::in_memory()),
            Arc::new(StaleTracker::new()),
        )
    }

    #[tokio::test]
    async fn test_list_fetches_once_per_ttl_window() {
        let mock = Arc::new(MockDocuments::new());
        mock.seed("coldcalls", json!({"$id": "c1", "call_outcome": "callback"}));
        let store = store_with(mock.clone());

        let first = store.list(&ListQuery::new()).await.unwrap();
        let second = store.list(&ListQuery::new()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_reads_through_cache() {
        let mock = Arc::new(MockDocuments::new());
        mock.seed("coldcalls", json!({"$id": "c1", "caller_name": "Ana"}));
        let store = store_with(mock.clone());

        let record = store.get("c1").await.unwrap();
        let again = store.get("c1").await.unwrap();

        assert_eq!(record.caller_name.as_deref(), Some("Ana"));
        assert_eq!(record, again);
        assert_eq!(mock.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_transcript_lookup_by_call() {
        let mock = Arc::new(MockDocuments::new());
        mock.seed(
            "transcripts",
            json!({"$id": "t1", "call_id": "c1", "transcript": "Hi, this is Ana..."}),
        );
        let store = store_with(mock.clone());

        let found = store.transcript("c1").await.unwrap().unwrap();
        assert_eq!(found.call_id, "c1");

        // Absence is also cached
        assert!(store.transcript("c2").await.unwrap().is_none());
        assert!(store.transcript("c2").await.unwrap().is_none());
        assert_eq!(mock.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_update_invalidates_lists_and_detail() {
        let mock = Arc::new(MockDocuments::new());
        mock.seed("coldcalls", json!({"$id": "c1", "call_outcome": "callback"}));
        let store = store_with(mock.clone());

        store.list(&ListQuery::new()).await.unwrap();
        store.get("c1").await.unwrap();
        let updated = store
            .update(
                "c1",
                &CallPatch {
                    call_outcome: Some("closed".to_string()),
                    ..CallPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.call_outcome.as_deref(), Some("closed"));

        // Both read paths refetch and see the new outcome
        let relisted = store.list(&ListQuery::new()).await.unwrap();
        assert_eq!(relisted[0].call_outcome.as_deref(), Some("closed"));
        assert_eq!(store.get("c1").await.unwrap().call_outcome.as_deref(), Some("closed"));
        assert_eq!(mock.list_calls(), 2);
        assert_eq!(mock.get_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_cache_serving_prior_value() {
        let mock = Arc::new(MockDocuments::new());
        mock.seed("coldcalls", json!({"$id": "c1", "call_outcome": "callback"}));
        let store = store_with(mock.clone());

        store.get("c1").await.unwrap();
        mock.fail_writes(true);
        let result = store
            .update(
                "c1",
                &CallPatch {
                    call_outcome: Some("closed".to_string()),
                    ..CallPatch::default()
                },
            )
            .await;
        assert!(result.is_err());

        // No invalidation happened, the cached record still answers
        let record = store.get("c1").await.unwrap();
        assert_eq!(record.call_outcome.as_deref(), Some("callback"));
        assert_eq!(mock.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_claim_sets_claimed_by() {
        let mock = Arc::new(MockDocuments::new());
        mock.seed("coldcalls", json!({"$id": "c1"}));
        let store = store_with(mock);

        let claimed = store.claim("c1", "m7").await.unwrap();
        assert_eq!(claimed.claimed_by.as_deref(), Some("m7"));
    }

    #[tokio::test]
    async fn test_for_company_filters_by_company_id() {
        let mock = Arc::new(MockDocuments::new());
        mock.seed("coldcalls", json!({"$id": "c1", "company_id": "acme"}));
        mock.seed("coldcalls", json!({"$id": "c2", "company_id": "other"}));
        let store = store_with(mock);

        let records = store.for_company("acme").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].meta.id, "c1");
    }
}
