//! PostgREST client for the homework table.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use hwcal_calendar::{first_of_month, last_of_month};
use hwcal_core::{AccessTokenSource, ReqwestErrorExt, StoreConfig, StoreError};
use tracing::instrument;

use crate::store::EntryStore;
use crate::types::{DateRow, Entry, EntryUpdate, NewEntry};

pub struct HomeworkClient {
    client: reqwest::Client,
    base_url: String,
    table: String,
    api_key: Option<String>,
    tokens: Option<Arc<dyn AccessTokenSource>>,
}

impl HomeworkClient {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ReqwestErrorExt::into_store_error)?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            api_key: config.anon_key.clone(),
            tokens: None,
        })
    }

    pub fn with_base_url(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            table: "homework".to_string(),
            api_key: api_key.map(str::to_string),
            tokens: None,
        }
    }

    /// Send the signed-in user's token instead of the public key when one is available.
    pub fn with_token_source(mut self, tokens: Arc<dyn AccessTokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = self
            .tokens
            .as_ref()
            .and_then(|t| t.access_token())
            .or_else(|| self.api_key.clone());

        let req = match &self.api_key {
            Some(key) => req.header("apikey", key),
            None => req,
        };

        match bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        match status.as_u16() {
            404 => Err(StoreError::NotFound(text)),
            code if status.is_server_error() => Err(StoreError::Server {
                status: code,
                message: text,
            }),
            _ => Err(StoreError::Rejected(format!("{}: {}", status, text))),
        }
    }
}

fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), StoreError> {
    let month0 = month
        .checked_sub(1)
        .filter(|m| *m < 12)
        .ok_or_else(|| StoreError::Rejected(format!("Invalid month: {}", month)))?;

    match (first_of_month(year, month0), last_of_month(year, month0)) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(StoreError::Rejected(format!("Invalid month: {}-{}", year, month))),
    }
}

#[async_trait]
impl EntryStore for HomeworkClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch_by_date(&self, date: NaiveDate) -> Result<Vec<Entry>, StoreError> {
        let response = self
            .authorize(self.client.get(self.table_url()))
            .query(&[
                ("select", "*".to_string()),
                ("homework_date", format!("eq.{}", date)),
                ("order", "created_at.asc".to_string()),
            ])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_store_error)?;

        let entries: Vec<Entry> = self.handle_response(response).await?;
        tracing::debug!("Fetched {} entries for {}", entries.len(), date);
        Ok(entries)
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch_dates_in_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BTreeSet<NaiveDate>, StoreError> {
        let (first, last) = month_bounds(year, month)?;

        let response = self
            .authorize(self.client.get(self.table_url()))
            .query(&[
                ("select", "homework_date".to_string()),
                ("homework_date", format!("gte.{}", first)),
                ("homework_date", format!("lte.{}", last)),
            ])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_store_error)?;

        let rows: Vec<DateRow> = self.handle_response(response).await?;
        Ok(rows.into_iter().map(|r| r.homework_date).collect())
    }

    #[instrument(skip(self), level = "info")]
    async fn create(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        let response = self
            .authorize(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&[&entry])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_store_error)?;

        let rows: Vec<Entry> = self.handle_response(response).await?;
        let created = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse("Insert returned no rows".to_string()))?;

        tracing::info!("Created entry {} for {}", created.id, created.homework_date);
        Ok(created)
    }

    #[instrument(skip(self), level = "info")]
    async fn update(&self, id: &str, update: EntryUpdate) -> Result<Entry, StoreError> {
        let response = self
            .authorize(self.client.patch(self.table_url()))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&update)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_store_error)?;

        let rows: Vec<Entry> = self.handle_response(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    #[instrument(skip(self), level = "info")]
    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .authorize(self.client.delete(self.table_url()))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_store_error)?;

        // Delete returns 204 No Content on success
        Self::check_status(response).await?;
        tracing::info!("Deleted entry {}", id);
        Ok(())
    }
}
