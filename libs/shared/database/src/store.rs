use std::marker::PhantomData;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;

/// A persisted entity type. `TABLE` names the backing relation; every row
/// carries a `Uuid` primary key column named `id`.
pub trait Record: Serialize + DeserializeOwned {
    const TABLE: &'static str;
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    Missing(String),

    #[error("Store error ({0}): {1}")]
    Api(u16, String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode row: {0}")]
    Decode(String),

    /// The commit touched zero rows. Callers treat this as a business
    /// failure, not an exception.
    #[error("No rows affected")]
    NothingApplied,
}

/// Thin generic facade over the relational store's REST interface. One
/// request per operation; the store applies each write in its own
/// transaction.
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn headers(&self, auth_token: Option<&str>, representation: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if representation {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        if let Some(token) = auth_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        representation: bool,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Store request: {} {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(auth_token, representation));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => StoreError::Unauthorized(error_text),
                404 => StoreError::Missing(error_text),
                code => StoreError::Api(code, error_text),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Point lookup by primary key. A miss is not an error.
    pub async fn find_by_id<T: Record>(
        &self,
        id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Option<T>, StoreError> {
        self.select::<T>().eq("id", id).fetch_one(auth_token).await
    }

    /// Unfiltered full-table read.
    pub async fn fetch_all<T: Record>(
        &self,
        auth_token: Option<&str>,
    ) -> Result<Vec<T>, StoreError> {
        let path = format!("/rest/v1/{}", T::TABLE);
        self.request(Method::GET, &path, auth_token, None, false)
            .await
    }

    /// Composable query source; callers add predicates and ordering before
    /// executing.
    pub fn select<T: Record>(&self) -> Select<'_, T> {
        Select {
            store: self,
            filters: Vec::new(),
            order: None,
            limit: None,
            _entity: PhantomData,
        }
    }

    /// Stage-and-commit insert. The store returns the applied
    /// representation; an empty representation means the commit affected
    /// zero rows and surfaces as [`StoreError::NothingApplied`].
    pub async fn insert<T: Record>(
        &self,
        row: Value,
        auth_token: Option<&str>,
    ) -> Result<T, StoreError> {
        let path = format!("/rest/v1/{}", T::TABLE);
        let rows: Vec<Value> = self
            .request(Method::POST, &path, auth_token, Some(row), true)
            .await?;

        let first = rows.into_iter().next().ok_or(StoreError::NothingApplied)?;
        serde_json::from_value(first).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Partial update by primary key, same commit semantics as insert.
    pub async fn update<T: Record>(
        &self,
        id: Uuid,
        patch: Value,
        auth_token: Option<&str>,
    ) -> Result<T, StoreError> {
        let path = format!("/rest/v1/{}?id=eq.{}", T::TABLE, id);
        let rows: Vec<Value> = self
            .request(Method::PATCH, &path, auth_token, Some(patch), true)
            .await?;

        let first = rows.into_iter().next().ok_or(StoreError::NothingApplied)?;
        serde_json::from_value(first).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Delete by primary key. Returns whether a row was actually removed.
    pub async fn delete<T: Record>(
        &self,
        id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<bool, StoreError> {
        let path = format!("/rest/v1/{}?id=eq.{}", T::TABLE, id);
        let rows: Vec<Value> = self
            .request(Method::DELETE, &path, auth_token, None, true)
            .await?;

        Ok(!rows.is_empty())
    }
}

/// Query builder over one table. Filters compose in call order; values are
/// URL-encoded so timestamps survive the trip.
pub struct Select<'a, T: Record> {
    store: &'a StoreClient,
    filters: Vec<String>,
    order: Option<String>,
    limit: Option<u32>,
    _entity: PhantomData<T>,
}

impl<'a, T: Record> Select<'a, T> {
    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn neq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "neq", value)
    }

    pub fn gt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "gt", value)
    }

    pub fn lt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "lt", value)
    }

    fn filter(mut self, column: &str, op: &str, value: impl ToString) -> Self {
        let encoded = urlencoding::encode(&value.to_string()).into_owned();
        self.filters.push(format!("{}={}.{}", column, op, encoded));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(format!("{}.desc", column));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn path(&self, projection: Option<&str>) -> String {
        let mut parts = self.filters.clone();
        if let Some(select) = projection {
            parts.push(format!("select={}", select));
        }
        if let Some(order) = &self.order {
            parts.push(format!("order={}", order));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit={}", limit));
        }
        format!("/rest/v1/{}?{}", T::TABLE, parts.join("&"))
    }

    pub async fn fetch(self, auth_token: Option<&str>) -> Result<Vec<T>, StoreError> {
        let path = self.path(None);
        self.store
            .request(Method::GET, &path, auth_token, None, false)
            .await
    }

    pub async fn fetch_one(self, auth_token: Option<&str>) -> Result<Option<T>, StoreError> {
        let select = self.limit(1);
        let path = select.path(None);
        let rows: Vec<Value> = select
            .store
            .request(Method::GET, &path, auth_token, None, false)
            .await?;

        match rows.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| StoreError::Decode(e.to_string())),
            None => Ok(None),
        }
    }

    /// Existence check that never materializes full rows.
    pub async fn exists(self, auth_token: Option<&str>) -> Result<bool, StoreError> {
        let select = self.limit(1);
        let path = select.path(Some("id"));
        let rows: Vec<Value> = select
            .store
            .request(Method::GET, &path, auth_token, None, false)
            .await?;

        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct Widget {
        id: Uuid,
        name: String,
    }

    impl Record for Widget {
        const TABLE: &'static str = "widgets";
    }

    fn test_store(url: &str) -> StoreClient {
        StoreClient::new(&AppConfig {
            store_url: url.to_string(),
            store_api_key: "test-api-key".to_string(),
            jwt_secret: "unused".to_string(),
            listen_port: 0,
        })
    }

    #[test]
    fn select_path_composes_filters_order_and_limit() {
        let store = test_store("http://localhost");
        let select = store
            .select::<Widget>()
            .eq("name", "gizmo")
            .gt("created_at", "2026-01-01T00:00:00+00:00")
            .order_desc("created_at")
            .limit(5);

        assert_eq!(
            select.path(None),
            "/rest/v1/widgets?name=eq.gizmo\
             &created_at=gt.2026-01-01T00%3A00%3A00%2B00%3A00\
             &order=created_at.desc&limit=5"
        );
    }

    #[test]
    fn exists_path_projects_only_the_id() {
        let store = test_store("http://localhost");
        let select = store.select::<Widget>().eq("name", "gizmo").limit(1);
        assert_eq!(
            select.path(Some("id")),
            "/rest/v1/widgets?name=eq.gizmo&select=id&limit=1"
        );
    }

    #[tokio::test]
    async fn find_by_id_returns_none_on_miss() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/widgets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        let found = store
            .find_by_id::<Widget>(Uuid::new_v4(), Some("token"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn insert_with_empty_representation_is_nothing_applied() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/widgets"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        let result = store
            .insert::<Widget>(serde_json::json!({"name": "gizmo"}), Some("token"))
            .await;
        assert!(matches!(result, Err(StoreError::NothingApplied)));
    }
}
