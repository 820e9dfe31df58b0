//! Integration Tests for Resource Stores
//!
//! Exercises the read-through and write-then-invalidate flows of the
//! resource stores against the in-memory document mock, including the
//! staleness handshake with the query coordinator.

use std::sync::Arc;

use serde_json::json;
use tempfile::tempdir;
use tokio_test::assert_ok;

use calldeck::api::{ListQuery, MockDocuments};
use calldeck::cache::keys::{list_key, list_pattern};
use calldeck::models::{CallPatch, NewAlert, NewCall};
use calldeck::resources::{AlertStore, CallStore, CompanyStore, TeamStore};
use calldeck::{CacheService, FileStore, QueryCoordinator, StaleTracker};

struct Harness {
    mock: Arc<MockDocuments>,
    cache: Arc<CacheService>,
    coordinator: Arc<StaleTracker>,
}

impl Harness {
    fn new() -> Self {
        Self::with_cache(Arc::new(CacheService::in_memory()))
    }

    fn with_cache(cache: Arc<CacheService>) -> Self {
        Self {
            mock: Arc::new(MockDocuments::new()),
            cache,
            coordinator: Arc::new(StaleTracker::new()),
        }
    }

    fn calls(&self) -> CallStore {
        CallStore::new(self.mock.clone(), self.cache.clone(), self.coordinator.clone())
    }

    fn alerts(&self) -> AlertStore {
        AlertStore::new(self.mock.clone(), self.cache.clone(), self.coordinator.clone())
    }

    fn team(&self) -> TeamStore {
        TeamStore::new(self.mock.clone(), self.cache.clone(), self.coordinator.clone())
    }

    fn companies(&self) -> CompanyStore {
        CompanyStore::new(self.mock.clone(), self.cache.clone(), self.coordinator.clone())
    }
}

#[tokio::test]
async fn test_read_through_fetches_once_per_query() {
    let harness = Harness::new();
    harness.mock.seed("coldcalls", json!({"$id": "c1", "call_outcome": "callback"}));

    let calls = harness.calls();
    assert_ok!(calls.list(&ListQuery::new()).await);
    assert_ok!(calls.list(&ListQuery::new()).await);
    // A different query is a different key and fetches separately
    assert_ok!(calls.list(&ListQuery::new().limit(5)).await);

    assert_eq!(harness.mock.list_calls(), 2);
}

#[tokio::test]
async fn test_coordinator_staleness_overrides_fresh_cache_hit() {
    let harness = Harness::new();
    harness.mock.seed("coldcalls", json!({"$id": "c1", "call_outcome": "callback"}));

    let calls = harness.calls();
    calls.list(&ListQuery::new()).await.unwrap();
    assert_eq!(harness.mock.list_calls(), 1);

    // Another layer learns the data changed; TTL has not elapsed
    harness.coordinator.mark_stale(&list_pattern("coldcalls"));
    calls.list(&ListQuery::new()).await.unwrap();
    assert_eq!(harness.mock.list_calls(), 2);

    // The refetch marked the key fresh again
    let key = list_key("coldcalls", &ListQuery::new().cache_params());
    assert!(!harness.coordinator.is_stale(&key));
    calls.list(&ListQuery::new()).await.unwrap();
    assert_eq!(harness.mock.list_calls(), 2);
}

#[tokio::test]
async fn test_mutation_marks_other_layers_stale() {
    let harness = Harness::new();
    harness.mock.seed("coldcalls", json!({"$id": "c1", "call_outcome": "callback"}));

    let calls = harness.calls();
    let key = list_key("coldcalls", &ListQuery::new().cache_params());
    calls.list(&ListQuery::new()).await.unwrap();
    assert!(!harness.coordinator.is_stale(&key));

    calls
        .update(
            "c1",
            &CallPatch {
                call_outcome: Some("closed".to_string()),
                ..CallPatch::default()
            },
        )
        .await
        .unwrap();

    // The coordinator heard about the write even though this layer also
    // invalidated its own cache
    assert!(harness.coordinator.is_stale(&key));
    assert!(harness.coordinator.is_stale("coldcalls:detail:c1"));
}

#[tokio::test]
async fn test_failed_remote_write_invalidates_nothing() {
    let harness = Harness::new();
    harness.mock.seed("coldcalls", json!({"$id": "c1", "call_outcome": "callback"}));

    let calls = harness.calls();
    calls.get("c1").await.unwrap();

    harness.mock.fail_writes(true);
    assert!(calls.delete("c1").await.is_err());

    // Cache still serves, coordinator never heard about a write
    assert_eq!(harness.mock.get_calls(), 1);
    calls.get("c1").await.unwrap();
    assert_eq!(harness.mock.get_calls(), 1);
    assert!(!harness.coordinator.is_stale("coldcalls:detail:c1"));
}

#[tokio::test]
async fn test_stores_share_one_cache_without_crosstalk() {
    let harness = Harness::new();
    harness.mock.seed("coldcalls", json!({"$id": "c1"}));
    harness.mock.seed(
        "team_members",
        json!({"$id": "m1", "name": "Ana", "email": "ana@x.com", "role": "admin"}),
    );
    harness.mock.seed("companies", json!({"$id": "co1", "company_name": "Acme"}));

    let calls = harness.calls();
    let team = harness.team();
    let companies = harness.companies();
    calls.list(&ListQuery::new()).await.unwrap();
    team.roster().await.unwrap();
    companies.list(&ListQuery::new()).await.unwrap();
    assert_eq!(harness.mock.list_calls(), 3);

    // A call mutation leaves the other families' cached lists alone
    calls.create(&NewCall::default()).await.unwrap();
    team.roster().await.unwrap();
    companies.list(&ListQuery::new()).await.unwrap();
    assert_eq!(harness.mock.list_calls(), 3);

    calls.list(&ListQuery::new()).await.unwrap();
    assert_eq!(harness.mock.list_calls(), 4);
}

#[tokio::test]
async fn test_alert_lifecycle_against_shared_wiring() {
    let harness = Harness::new();
    let alerts = harness.alerts();

    let created = alerts
        .create(&NewAlert {
            created_by: "m1".to_string(),
            target_user: "m2".to_string(),
            entity_type: "coldcall".to_string(),
            entity_id: "c1".to_string(),
            entity_label: None,
            alert_time: None,
            message: Some("follow up with Acme".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(alerts.for_user("m2").await.unwrap().len(), 1);
    alerts.dismiss(&created.meta.id).await.unwrap();
    assert!(alerts.for_user("m2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_adapter_results_survive_restart_via_durable_tier() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let first = Harness::with_cache(Arc::new(CacheService::with_storage(Arc::new(
        FileStore::open(&path),
    ))));
    first.mock.seed("coldcalls", json!({"$id": "c1", "caller_name": "Ana"}));
    first.calls().get("c1").await.unwrap();
    assert_eq!(first.mock.get_calls(), 1);

    // New session, same durable file, empty remote mock: the cached
    // record answers without any network call
    let second = Harness::with_cache(Arc::new(CacheService::with_storage(Arc::new(
        FileStore::open(&path),
    ))));
    let record = second.calls().get("c1").await.unwrap();

    assert_eq!(record.caller_name.as_deref(), Some("Ana"));
    assert_eq!(second.mock.get_calls(), 0);
}

#[tokio::test]
async fn test_transcript_flow_with_calls_and_cache() {
    let harness = Harness::new();
    harness.mock.seed("coldcalls", json!({"$id": "c1"}));
    harness.mock.seed(
        "transcripts",
        json!({"$id": "t1", "call_id": "c1", "transcript": "Hello, this is Ana from Acme."}),
    );

    let calls = harness.calls();
    let transcript = calls.transcript("c1").await.unwrap().unwrap();
    assert!(transcript.transcript.starts_with("Hello"));

    // Deleting the call cascades to the transcript document and its
    // cached copy
    calls.delete("c1").await.unwrap();
    assert!(calls.transcript("c1").await.unwrap().is_none());
}
