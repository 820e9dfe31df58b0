//! Company Store Module
//!
//! Read/write access to the company directory, cached as
//! [`TtlClass::Stable`] since company details rarely change.

use std::sync::Arc;

use tracing::debug;

use crate::api::{Documents, ListQuery};
use crate::cache::keys::{detail_key, list_key, list_pattern};
use crate::cache::{CacheService, KeyPattern, TtlClass};
use crate::coordinator::QueryCoordinator;
use crate::error::ApiResult;
use crate::models::{CompanyPatch, CompanyRecord, NewCompany};
use crate::resources::decode_records;

/// Collection holding company documents.
pub const COMPANIES_COLLECTION: &str = "companies";

// == Company Store ==
/// Cached access to company records.
pub struct CompanyStore {
    api: Arc<dyn Documents>,
    cache: Arc<CacheService>,
    coordinator: Arc<dyn QueryCoordinator>,
}

impl CompanyStore {
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
    /// Lists companies matching `query`, cache-first.
    pub async fn list(&self, query: &ListQuery) -> ApiResult<Vec<CompanyRecord>> {
        let key = list_key(COMPANIES_COLLECTION, &query.cache_params());
        if !self.coordinator.is_stale(&key) {
            if let Some(records) = self.cache.get::<Vec<CompanyRecord>>(&key) {
                return Ok(records);
            }
        }

        let records: Vec<CompanyRecord> =
            decode_records(self.api.list_documents(COMPANIES_COLLECTION, query).await?)?;
        self.cache.set(&key, &records, TtlClass::Stable);
        self.coordinator.mark_fresh(&key);
        Ok(records)
    }

    /// Fetches one company by id, cache-first.
    pub async fn get(&self, id: &str) -> ApiResult<CompanyRecord> {
        let key = detail_key(COMPANIES_COLLECTION, id);
        if !self.coordinator.is_stale(&key) {
            if let Some(record) = self.cache.get::<CompanyRecord>(&key) {
                return Ok(record);
            }
        }

        let record: CompanyRecord =
            serde_json::from_value(self.api.get_document(COMPANIES_COLLECTION, id).await?)?;
        self.cache.set(&key, &record, TtlClass::Stable);
        self.coordinator.mark_fresh(&key);
        Ok(record)
    }

    // == Writes ==
    /// Creates a company and returns it as stored.
    pub async fn create(&self, company: &NewCompany) -> ApiResult<CompanyRecord> {
        let document = self
            .api
            .create_document(COMPANIES_COLLECTION, serde_json::to_value(company)?)
            .await?;
        let record: CompanyRecord = serde_json::from_value(document)?;

        self.invalidate_lists();
        debug!("company {} created", record.meta.id);
        Ok(record)
    }

    /// Patches one company and returns the updated record.
    pub async fn update(&self, id: &str, patch: &CompanyPatch) -> ApiResult<CompanyRecord> {
        let document = self
            .api
            .update_document(COMPANIES_COLLECTION, id, serde_json::to_value(patch)?)
            .await?;
        let record: CompanyRecord = serde_json::from_value(document)?;

        let detail = detail_key(COMPANIES_COLLECTION, id);
        self.cache.invalidate(&detail);
        self.coordinator.mark_stale(&KeyPattern::Exact(detail));
        self.invalidate_lists();
        Ok(record)
    }

    fn invalidate_lists(&self) {
        let lists = list_pattern(COMPANIES_COLLECTION);
        self.cache.invalidate_pattern(&lists);
        self.coordinator.mark_stale(&lists);
    }
}
