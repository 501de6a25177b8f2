use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use bandsite_core::{Filter, ObjectStorage, Select, StorageError, Table, TableService};

use crate::params::{filter_param, select_params};

/// Client for the REST and storage endpoints of a Supabase project.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: SecretString,
    access_token: Option<SecretString>,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, anon_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
            access_token: None,
        }
    }

    /// Authenticate as a user instead of the anonymous role.
    pub fn with_access_token(mut self, access_token: SecretString) -> Self {
        self.access_token = Some(access_token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rest_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let token = self.access_token.as_ref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(token.expose_secret())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StorageError> {
        let res = builder
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let message = res.text().await.unwrap_or_default();
            return Err(StorageError::Api { status, message });
        }

        Ok(res)
    }

    async fn rows(table: Table, res: Response) -> Result<Vec<Value>, StorageError> {
        res.json::<Vec<Value>>()
            .await
            .map_err(|e| StorageError::Decode {
                table: table.as_str(),
                message: e.to_string(),
            })
    }
}

impl TableService for SupabaseClient {
    async fn select(&self, query: Select) -> Result<Vec<Value>, StorageError> {
        let url = self.rest_url(query.table);
        tracing::debug!("GET {} {:?}", url, query);

        let res = self
            .send(
                self.request(Method::GET, &url)
                    .query(&select_params(&query)),
            )
            .await?;

        Self::rows(query.table, res).await
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, StorageError> {
        let url = self.rest_url(table);
        tracing::debug!("POST {} ({} rows)", url, rows.len());

        let res = self
            .send(
                self.request(Method::POST, &url)
                    .query(&[("select", "*")])
                    .header("Prefer", "return=representation")
                    .json(&rows),
            )
            .await?;

        let stored = Self::rows(table, res).await?;
        if stored.is_empty() && !rows.is_empty() {
            return Err(StorageError::EmptyResponse(table.as_str()));
        }
        Ok(stored)
    }

    async fn update(
        &self,
        table: Table,
        patch: Value,
        filters: Vec<Filter>,
    ) -> Result<(), StorageError> {
        let url = self.rest_url(table);
        tracing::debug!("PATCH {} {:?}", url, filters);

        let params: Vec<_> = filters.iter().map(filter_param).collect();
        self.send(
            self.request(Method::PATCH, &url)
                .query(&params)
                .json(&patch),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, table: Table, filters: Vec<Filter>) -> Result<(), StorageError> {
        let url = self.rest_url(table);
        tracing::debug!("DELETE {} {:?}", url, filters);

        let params: Vec<_> = filters.iter().map(filter_param).collect();
        self.send(self.request(Method::DELETE, &url).query(&params))
            .await?;
        Ok(())
    }

    async fn delete_all(&self, table: Table) -> Result<(), StorageError> {
        // PostgREST refuses unfiltered deletes; every row has a non-null key.
        self.delete(table, vec![Filter::neq("id", Value::Null)])
            .await
    }
}

impl ObjectStorage for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        tracing::debug!("POST {} ({} bytes)", url, bytes.len());

        self.send(
            self.request(Method::POST, &url)
                .header(
                    "Content-Type",
                    content_type.unwrap_or("application/octet-stream"),
                )
                .header("x-upsert", "false")
                .body(bytes),
        )
        .await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}
