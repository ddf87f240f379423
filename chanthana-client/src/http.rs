//! HTTP client for the Airtable REST API

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::record::{BatchBody, BatchResponse, ErrorBody, FieldMap, FieldsBody};
use shared::{AirtableRecord, ListResponse};

use crate::{AirtableConfig, ClientConfig, ClientError, ClientResult};

/// Records per batch create call
pub const BATCH_LIMIT: usize = 10;

/// Query options of a table listing
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Stop after this many records across pages
    pub max_records: Option<usize>,
    pub view: Option<String>,
    pub filter_by_formula: Option<String>,
    /// Records per page, at most 100
    pub page_size: Option<usize>,
}

impl ListOptions {
    /// Stop listing after `n` records
    pub fn max_records(n: usize) -> Self {
        Self {
            max_records: Some(n),
            ..Default::default()
        }
    }

    /// Restrict the listing to a view
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Filter rows with an Airtable formula
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.filter_by_formula = Some(formula.into());
        self
    }

    fn query(&self, offset: Option<&str>) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(n) = self.max_records {
            query.push(("maxRecords", n.to_string()));
        }
        if let Some(n) = self.page_size {
            query.push(("pageSize", n.min(100).to_string()));
        }
        if let Some(view) = &self.view {
            query.push(("view", view.clone()));
        }
        if let Some(formula) = &self.filter_by_formula {
            query.push(("filterByFormula", formula.clone()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        query
    }
}

/// Client bound to one API key and base
#[derive(Debug, Clone)]
pub struct AirtableClient {
    client: Client,
    api_url: Url,
    config: AirtableConfig,
}

impl AirtableClient {
    /// Create a client; the configuration must carry a key and a base
    pub fn new(config: AirtableConfig, client_config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let api_url = Url::parse(&client_config.api_url)
            .map_err(|e| ClientError::Config(format!("invalid API url: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "invalid API url: {}",
                client_config.api_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(client_config.timeout))
            .build()?;

        Ok(Self {
            client,
            api_url,
            config,
        })
    }

    /// Credentials and base this client targets
    pub fn config(&self) -> &AirtableConfig {
        &self.config
    }

    /// `{api}/{base}/{table}[/{record}]`, segments percent-encoded
    fn url(&self, table: &str, record_id: Option<&str>) -> ClientResult<Url> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::Config("invalid API url".into()))?;
            segments.pop_if_empty().push(&self.config.base_id).push(table);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.request(method, url).json(body)).await
    }

    /// Map non-success statuses to errors, decode the body otherwise
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message())
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown status")
                        .to_string()
                });
            tracing::debug!(status = status.as_u16(), %message, "Airtable request failed");

            return Err(match status {
                StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
                StatusCode::FORBIDDEN => ClientError::Forbidden(message),
                StatusCode::NOT_FOUND => ClientError::NotFound(message),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ClientError::Validation(message)
                }
                StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited,
                _ => ClientError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(format!("undecodable body: {e}")))
    }

    // ========== Read API ==========

    /// One page of a table
    pub async fn list_page(
        &self,
        table: &str,
        options: &ListOptions,
        offset: Option<&str>,
    ) -> ClientResult<ListResponse> {
        let url = self.url(table, None)?;
        tracing::debug!(table = %table, offset = ?offset, "Listing records");
        self.send(
            self.request(Method::GET, url)
                .query(&options.query(offset)),
        )
        .await
    }

    /// Every record of a table, following the page cursor
    pub async fn list_records(
        &self,
        table: &str,
        options: &ListOptions,
    ) -> ClientResult<Vec<AirtableRecord>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self.list_page(table, options, offset.as_deref()).await?;
            records.extend(page.records);

            if let Some(max) = options.max_records {
                if records.len() >= max {
                    records.truncate(max);
                    break;
                }
            }
            match page.offset {
                Some(next) if Some(&next) != offset.as_ref() => offset = Some(next),
                _ => break,
            }
        }

        tracing::debug!(table = %table, count = records.len(), "Records listed");
        Ok(records)
    }

    /// Fetch one record by id
    pub async fn get_record(&self, table: &str, record_id: &str) -> ClientResult<AirtableRecord> {
        let url = self.url(table, Some(record_id))?;
        self.send(self.request(Method::GET, url)).await
    }

    // ========== Write API ==========

    /// Create one record
    pub async fn create_record(&self, table: &str, fields: FieldMap) -> ClientResult<AirtableRecord> {
        let url = self.url(table, None)?;
        let record: AirtableRecord = self
            .send_json(Method::POST, url, &FieldsBody { fields })
            .await?;
        tracing::info!(table = %table, id = %record.id, "Record created");
        Ok(record)
    }

    /// Create records in batches of [`BATCH_LIMIT`]
    pub async fn create_records(
        &self,
        table: &str,
        rows: Vec<FieldMap>,
    ) -> ClientResult<Vec<AirtableRecord>> {
        let mut created = Vec::with_capacity(rows.len());
        let mut rows = rows.into_iter().peekable();

        while rows.peek().is_some() {
            let body = BatchBody {
                records: rows
                    .by_ref()
                    .take(BATCH_LIMIT)
                    .map(|fields| FieldsBody { fields })
                    .collect(),
            };
            let url = self.url(table, None)?;
            let response: BatchResponse = self.send_json(Method::POST, url, &body).await?;
            created.extend(response.records);
        }

        tracing::info!(table = %table, count = created.len(), "Records created");
        Ok(created)
    }

    /// Partial update; columns absent from `fields` are left untouched
    pub async fn update_record(
        &self,
        table: &str,
        record_id: &str,
        fields: FieldMap,
    ) -> ClientResult<AirtableRecord> {
        let url = self.url(table, Some(record_id))?;
        let record: AirtableRecord = self
            .send_json(Method::PATCH, url, &FieldsBody { fields })
            .await?;
        tracing::info!(table = %table, id = %record.id, "Record updated");
        Ok(record)
    }

    /// List one record of the configured table
    pub async fn test_connection(&self) -> ClientResult<()> {
        self.list_page(&self.config.table_name, &ListOptions::max_records(1), None)
            .await?;
        tracing::info!(
            base = %self.config.base_id,
            table = %self.config.table_name,
            key = %self.config.fingerprint(),
            "Airtable connection OK"
        );
        Ok(())
    }
}
