//! Document API Client Module
//!
//! The remote boundary: an object-safe [`Documents`] trait over the
//! document store's CRUD protocol, and its HTTP implementation. Resource
//! stores hold `Arc<dyn Documents>`, so tests swap in
//! [`MockDocuments`](crate::api::MockDocuments) without touching the
//! network.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::api::query::ListQuery;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};

// == Documents Trait ==
/// CRUD protocol of the remote document database.
///
/// Payloads are raw JSON documents; the typed record conversion happens in
/// the resource stores. Every failure surfaces as an [`ApiError`] through
/// the caller's result, never through the cache.
#[async_trait]
pub trait Documents: Send + Sync {
    /// Lists documents in `collection` matching the query.
    async fn list_documents(&self, collection: &str, query: &ListQuery) -> ApiResult<Vec<Value>>;

    /// Fetches one document by id.
    async fn get_document(&self, collection: &str, id: &str) -> ApiResult<Value>;

    /// Creates a document with server-assigned id; returns it as stored.
    async fn create_document(&self, collection: &str, data: Value) -> ApiResult<Value>;

    /// Patches the given attributes of one document; returns the updated
    /// document.
    async fn update_document(&self, collection: &str, id: &str, data: Value) -> ApiResult<Value>;

    /// Deletes one document by id.
    async fn delete_document(&self, collection: &str, id: &str) -> ApiResult<()>;
}

// == Wire Envelopes ==
/// List-response envelope: total count plus the page of documents.
#[derive(Debug, Deserialize)]
struct ListPage {
    #[allow(dead_code)]
    total: u64,
    documents: Vec<Value>,
}

/// Error-response envelope; the server explains failures in `message`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// == Documents Client ==
/// HTTP implementation of [`Documents`] against the remote REST surface.
///
/// Routes follow `{endpoint}/databases/{db}/collections/{col}/documents`,
/// authenticated by project and key headers on every request.
#[derive(Debug, Clone)]
pub struct DocumentsClient {
    http: Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    database_id: String,
}

impl DocumentsClient {
    // == Constructor ==
    /// Builds a client from the data-layer configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
            database_id: config.database_id.clone(),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    /// Maps a non-success response to the error taxonomy, keeping the
    /// server's own message where it provides one.
    async fn check(response: Response, context: &str) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(context.to_string()));
        }
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Documents for DocumentsClient {
    async fn list_documents(&self, collection: &str, query: &ListQuery) -> ApiResult<Vec<Value>> {
        let params: Vec<(&str, String)> = query
            .to_query_strings()
            .into_iter()
            .map(|q| ("queries[]", q))
            .collect();

        let response = self
            .request(reqwest::Method::GET, &self.collection_url(collection))
            .query(&params)
            .send()
            .await?;
        let page: ListPage = Self::check(response, collection).await?.json().await?;

        debug!("listed {} documents from {}", page.documents.len(), collection);
        Ok(page.documents)
    }

    async fn get_document(&self, collection: &str, id: &str) -> ApiResult<Value> {
        let response = self
            .request(reqwest::Method::GET, &self.document_url(collection, id))
            .send()
            .await?;
        let context = format!("{}/{}", collection, id);
        Ok(Self::check(response, &context).await?.json().await?)
    }

    async fn create_document(&self, collection: &str, data: Value) -> ApiResult<Value> {
        let response = self
            .request(reqwest::Method::POST, &self.collection_url(collection))
            .json(&json!({ "documentId": "unique()", "data": data }))
            .send()
            .await?;
        Ok(Self::check(response, collection).await?.json().await?)
    }

    async fn update_document(&self, collection: &str, id: &str, data: Value) -> ApiResult<Value> {
        let response = self
            .request(reqwest::Method::PATCH, &self.document_url(collection, id))
            .json(&json!({ "data": data }))
            .send()
            .await?;
        let context = format!("{}/{}", collection, id);
        Ok(Self::check(response, &context).await?.json().await?)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> ApiResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, &self.document_url(collection, id))
            .send()
            .await?;
        let context = format!("{}/{}", collection, id);
        Self::check(response, &context).await?;
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_follow_rest_layout() {
        let config = Config {
            endpoint: "https://cloud.example.com/v1/".to_string(),
            database_id: "ColdCalls".to_string(),
            ..Config::default()
        };
        let client = DocumentsClient::new(&config);

        // Trailing slash on the endpoint must not double up
        assert_eq!(
            client.collection_url("coldcalls"),
            "https://cloud.example.com/v1/databases/ColdCalls/collections/coldcalls/documents"
        );
        assert_eq!(
            client.document_url("coldcalls", "c1"),
            "https://cloud.example.com/v1/databases/ColdCalls/collections/coldcalls/documents/c1"
        );
    }
}
