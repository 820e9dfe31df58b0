//! Mock Documents Module
//!
//! An in-memory [`Documents`] implementation for tests: seedable
//! collections, call counters to assert how often the network would have
//! been hit, and a switch that fails mutations to exercise the
//! write-then-invalidate ordering.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::api::query::{Filter, ListQuery, Order};
use crate::api::Documents;
use crate::error::{ApiError, ApiResult};

// == Mock Documents ==
/// In-memory stand-in for the remote document store.
#[derive(Debug, Default)]
pub struct MockDocuments {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicUsize,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    write_calls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MockDocuments {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Seeding ==
    /// Places a document directly into `collection`, bypassing counters.
    pub fn seed(&self, collection: &str, document: Value) {
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Makes every subsequent create/update/delete fail with a server
    /// error, leaving stored documents untouched.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    // == Counters ==
    /// How many list requests have been served.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// How many single-document fetches have been served.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// How many mutations have been attempted, failed ones included.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    // == Internals ==
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Value>>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> ApiResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 500,
                message: "mock write failure".to_string(),
            });
        }
        Ok(())
    }

    fn matches(document: &Value, filter: &Filter) -> bool {
        match filter {
            Filter::Equal { attribute, value } => document.get(attribute) == Some(value),
            Filter::GreaterThan { attribute, value } => {
                compare(document.get(attribute), value) == Some(std::cmp::Ordering::Greater)
            }
            Filter::LessThan { attribute, value } => {
                compare(document.get(attribute), value) == Some(std::cmp::Ordering::Less)
            }
            Filter::IsNull { attribute } => {
                document.get(attribute).map_or(true, Value::is_null)
            }
            Filter::IsNotNull { attribute } => {
                document.get(attribute).is_some_and(|v| !v.is_null())
            }
        }
    }
}

/// Orders two JSON scalars, numbers numerically and everything else by
/// string form.
fn compare(found: Option<&Value>, wanted: &Value) -> Option<std::cmp::Ordering> {
    let found = found?;
    match (found.as_f64(), wanted.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(found.to_string().cmp(&wanted.to_string())),
    }
}

#[async_trait]
impl Documents for MockDocuments {
    async fn list_documents(&self, collection: &str, query: &ListQuery) -> ApiResult<Vec<Value>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let mut documents: Vec<Value> = self
            .lock()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| query.filters.iter().all(|f| Self::matches(doc, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = &query.sort {
            documents.sort_by(|a, b| {
                let ordering = compare(a.get(&sort.attribute), b.get(&sort.attribute).unwrap_or(&Value::Null))
                    .unwrap_or(std::cmp::Ordering::Equal);
                match sort.order {
                    Order::Asc => ordering,
                    Order::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            documents.truncate(limit as usize);
        }
        Ok(documents)
    }

    async fn get_document(&self, collection: &str, id: &str) -> ApiResult<Value> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        self.lock()
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc["$id"] == id).cloned())
            .ok_or_else(|| ApiError::NotFound(format!("{}/{}", collection, id)))
    }

    async fn create_document(&self, collection: &str, data: Value) -> ApiResult<Value> {
        self.check_writable()?;

        let mut document = data;
        let id = format!("doc_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let now = Utc::now().to_rfc3339();
        document["$id"] = Value::String(id);
        document["$createdAt"] = Value::String(now.clone());
        document["$updatedAt"] = Value::String(now);

        self.lock()
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn update_document(&self, collection: &str, id: &str, data: Value) -> ApiResult<Value> {
        self.check_writable()?;

        let mut collections = self.lock();
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc["$id"] == id))
            .ok_or_else(|| ApiError::NotFound(format!("{}/{}", collection, id)))?;

        if let (Some(target), Some(patch)) = (document.as_object_mut(), data.as_object()) {
            for (key, value) in patch {
                target.insert(key.clone(), value.clone());
            }
            target.insert("$updatedAt".to_string(), Value::String(Utc::now().to_rfc3339()));
        }
        Ok(document.clone())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> ApiResult<()> {
        self.check_writable()?;

        let mut collections = self.lock();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| ApiError::NotFound(format!("{}/{}", collection, id)))?;
        let before = docs.len();
        docs.retain(|doc| doc["$id"] != id);

        if docs.len() == before {
            return Err(ApiError::NotFound(format!("{}/{}", collection, id)));
        }
        Ok(())
    }
}
