//! In-process mock of the Airtable REST surface

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chanthana_client::{AirtableConfig, ClientConfig, Store};
use serde_json::{Value, json};

pub const API_KEY: &str = "patTEST";
pub const BASE_ID: &str = "appTEST";

/// One request as seen by the mock
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub table: String,
    pub record_id: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct MockState {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    requests: Mutex<Vec<Recorded>>,
    next_id: AtomicUsize,
    /// Values whose presence in a created record fails the request
    rejected: Mutex<Vec<String>>,
    /// Records per page when the client sends no `pageSize`
    page_size: usize,
}

#[derive(Clone)]
pub struct MockAirtable {
    pub url: String,
    state: Arc<MockState>,
}

impl MockAirtable {
    /// Start on an ephemeral port with 100-record pages
    pub async fn start() -> Self {
        Self::start_with_page_size(100).await
    }

    pub async fn start_with_page_size(page_size: usize) -> Self {
        let state = Arc::new(MockState {
            page_size,
            ..Default::default()
        });

        let app = Router::new()
            .route("/v0/{base}/{table}", get(list).post(create))
            .route("/v0/{base}/{table}/{id}", get(fetch).patch(update))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/v0"),
            state,
        }
    }

    /// Add a row; returns its record id
    pub fn seed(&self, table: &str, fields: Value) -> String {
        let record = self.state.new_record(fields);
        let id = record["id"].as_str().unwrap().to_string();
        self.state
            .tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(record);
        id
    }

    /// Fail creates whose fields mention `value`, as Airtable does for a
    /// bad column value
    pub fn reject_value(&self, value: &str) {
        self.state.rejected.lock().unwrap().push(value.to_string());
    }

    /// Declare an empty table
    pub fn table(&self, table: &str) {
        self.state
            .tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default();
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Number of list calls made on `table`
    pub fn list_calls(&self, table: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == "GET" && r.table == table && r.record_id.is_none())
            .count()
    }

    pub fn config(&self) -> (AirtableConfig, ClientConfig) {
        (
            AirtableConfig::new(API_KEY, BASE_ID),
            ClientConfig::new(&self.url).with_timeout(5),
        )
    }

    pub fn store(&self) -> Store {
        let (config, client_config) = self.config();
        Store::new(config, &client_config).unwrap()
    }
}

impl MockState {
    fn new_record(&self, fields: Value) -> Value {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        json!({
            "id": format!("rec{n:014}"),
            "createdTime": "2025-06-01T09:00:00.000Z",
            "fields": fields,
        })
    }

    fn is_rejected(&self, fields: &Value) -> bool {
        let text = fields.to_string();
        self.rejected
            .lock()
            .unwrap()
            .iter()
            .any(|value| text.contains(value.as_str()))
    }

    fn record(&self, method: &str, table: &str, id: Option<&str>, query: HashMap<String, String>, body: Option<Value>) {
        self.requests.lock().unwrap().push(Recorded {
            method: method.to_string(),
            table: table.to_string(),
            record_id: id.map(str::to_string),
            query,
            body,
        });
    }
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn check(headers: &HeaderMap, base: &str) -> Result<(), Response> {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {API_KEY}"));
    if !authorized {
        return Err(error(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"type": "AUTHENTICATION_REQUIRED", "message": "Authentication required"}}),
        ));
    }
    if base != BASE_ID {
        return Err(error(StatusCode::NOT_FOUND, json!({"error": "NOT_FOUND"})));
    }
    Ok(())
}

fn table_missing(table: &str) -> Response {
    error(
        StatusCode::NOT_FOUND,
        json!({"error": {"type": "TABLE_NOT_FOUND", "message": format!("Could not find table {table}")}}),
    )
}

async fn list(
    State(state): State<Arc<MockState>>,
    Path((base, table)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check(&headers, &base) {
        return resp;
    }
    state.record("GET", &table, None, query.clone(), None);

    let rows = match state.tables.lock().unwrap().get(&table) {
        Some(rows) => rows.clone(),
        None => return table_missing(&table),
    };

    let start: usize = query.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
    let page_size: usize = query
        .get("pageSize")
        .and_then(|p| p.parse().ok())
        .unwrap_or(state.page_size);
    let limit = query
        .get("maxRecords")
        .and_then(|m| m.parse::<usize>().ok())
        .unwrap_or(usize::MAX)
        .min(rows.len());

    let end = (start + page_size).min(limit);
    let page: Vec<Value> = rows.get(start..end).map(<[Value]>::to_vec).unwrap_or_default();

    let mut body = json!({ "records": page });
    if end < limit {
        body["offset"] = json!(end.to_string());
    }
    Json(body).into_response()
}

async fn create(
    State(state): State<Arc<MockState>>,
    Path((base, table)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = check(&headers, &base) {
        return resp;
    }
    state.record("POST", &table, None, HashMap::new(), Some(body.clone()));

    let mut tables = state.tables.lock().unwrap();
    let Some(rows) = tables.get_mut(&table) else {
        return table_missing(&table);
    };

    if let Some(batch) = body.get("records").and_then(Value::as_array) {
        if batch.len() > 10 {
            return error(
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": {"type": "INVALID_RECORDS", "message": "You may only create 10 records at a time"}}),
            );
        }
        if batch.iter().any(|r| state.is_rejected(&r["fields"])) {
            return error(
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": {"type": "INVALID_VALUE_FOR_COLUMN", "message": "INVALID_VALUE_FOR_COLUMN"}}),
            );
        }
        let created: Vec<Value> = batch
            .iter()
            .map(|r| state.new_record(r["fields"].clone()))
            .collect();
        rows.extend(created.iter().cloned());
        return Json(json!({ "records": created })).into_response();
    }

    let record = state.new_record(body["fields"].clone());
    rows.push(record.clone());
    Json(record).into_response()
}

async fn fetch(
    State(state): State<Arc<MockState>>,
    Path((base, table, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check(&headers, &base) {
        return resp;
    }
    state.record("GET", &table, Some(&id), HashMap::new(), None);

    let tables = state.tables.lock().unwrap();
    match tables
        .get(&table)
        .and_then(|rows| rows.iter().find(|r| r["id"] == id.as_str()))
    {
        Some(record) => Json(record.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, json!({"error": "NOT_FOUND"})),
    }
}

async fn update(
    State(state): State<Arc<MockState>>,
    Path((base, table, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = check(&headers, &base) {
        return resp;
    }
    state.record("PATCH", &table, Some(&id), HashMap::new(), Some(body.clone()));

    let mut tables = state.tables.lock().unwrap();
    let Some(record) = tables
        .get_mut(&table)
        .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id.as_str()))
    else {
        return error(StatusCode::NOT_FOUND, json!({"error": "NOT_FOUND"}));
    };

    if let (Some(target), Some(changes)) = (
        record["fields"].as_object_mut(),
        body["fields"].as_object(),
    ) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(record.clone()).into_response()
}
