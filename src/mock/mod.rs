//! Mock responder for offline work.
//!
//! When mock mode is on, requests are answered from an in-memory
//! dataset instead of the network. A small filter language over request
//! parameters narrows the dataset, a handful of item endpoints behave
//! like a tiny REST API, and every other path falls back to scenario
//! simulation keyed off the URL. Responses arrive after a short random
//! latency so the experience resembles a real round trip.

pub mod filter;

pub use filter::{parse_filter, Condition, Filter, FilterError, FilterOp};

use crate::config::get_config;
use crate::models::{ApiRequest, ApiResponse, HttpMethod};
use chrono::{DateTime, Duration, Utc};
use filter::FieldView;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Header present on every mock response.
pub const MOCK_HEADER: &str = "X-Mock-Api";

/// Statuses the seeded dataset draws from.
pub const MOCK_STATUSES: &[&str] = &["active", "pending", "completed", "failed"];

/// One record in the mock dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockRecord {
    /// Position in the dataset, starting at 1.
    pub id: u64,
    /// Display name, `Item N` for seeded records.
    pub name: String,
    /// Arbitrary numeric payload in `0..1000` for seeded records.
    pub value: i64,
    /// One of [`MOCK_STATUSES`].
    pub status: String,
    /// When the record was created; seeded records fall within the last
    /// 30 days.
    pub date: DateTime<Utc>,
}

impl MockRecord {
    /// Exposes a field to the filter language.
    ///
    /// # Returns
    ///
    /// The field's views, or `None` for a field the record does not
    /// have.
    pub fn field_view(&self, field: &str) -> Option<FieldView> {
        match field {
            "id" => Some(FieldView::number(self.id as f64)),
            "name" => Some(FieldView::text(self.name.clone())),
            "value" => Some(FieldView::number(self.value as f64)),
            "status" => Some(FieldView::text(self.status.clone())),
            "date" => Some(FieldView::date(self.date)),
            _ => None,
        }
    }
}

/// Generates a randomized dataset of `count` records.
pub fn seed_records(count: usize) -> Vec<MockRecord> {
    let mut rng = rand::thread_rng();
    (1..=count as u64)
        .map(|id| MockRecord {
            id,
            name: format!("Item {}", id),
            value: rng.gen_range(0..1000),
            status: MOCK_STATUSES[rng.gen_range(0..MOCK_STATUSES.len())].to_string(),
            date: Utc::now() - Duration::seconds(rng.gen_range(0..30 * 24 * 60 * 60)),
        })
        .collect()
}

/// In-memory stand-in for the dispatcher.
///
/// `handle` mirrors the dispatcher's output type, so callers can switch
/// between mock and real traffic without caring which one answered.
#[derive(Debug)]
pub struct MockResponder {
    items: Mutex<Vec<MockRecord>>,
    latency_ms: u64,
}

impl MockResponder {
    /// Creates a responder over a freshly seeded 50-record dataset.
    ///
    /// Latency comes from the global configuration.
    pub fn new() -> Self {
        Self::with_items(seed_records(50))
    }

    /// Creates a responder over an explicit dataset.
    ///
    /// # Arguments
    ///
    /// * `items` - The records the item endpoints serve
    pub fn with_items(items: Vec<MockRecord>) -> Self {
        Self {
            items: Mutex::new(items),
            latency_ms: get_config().mock_latency,
        }
    }

    /// Overrides the latency bound, in milliseconds.
    ///
    /// Zero disables the artificial delay entirely.
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Returns the number of records currently in the dataset.
    pub fn item_count(&self) -> usize {
        self.snapshot().len()
    }

    /// Answers a request from the mock dataset.
    ///
    /// Known item endpoints are served from the dataset; anything else
    /// falls back to scenario simulation. The response appears after a
    /// uniform random delay up to the configured latency bound.
    ///
    /// # Arguments
    ///
    /// * `request` - The request to answer
    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        if self.latency_ms > 0 {
            let jitter = rand::thread_rng().gen_range(0..=self.latency_ms);
            tokio::time::sleep(std::time::Duration::from_millis(jitter)).await;
        }

        let path = request_path(&request.url);
        match (request.method, path.as_str()) {
            (HttpMethod::GET, "/api/items") => self.list_items(&request.params),
            (HttpMethod::POST, "/api/items") => self.create_item(request.body.as_ref()),
            (HttpMethod::GET, "/api/items/stats") => self.item_stats(&request.params),
            _ => self.simulate(request),
        }
    }

    /// Serves `GET /api/items`: the dataset narrowed by the filter
    /// parameters.
    fn list_items(&self, params: &HashMap<String, Value>) -> ApiResponse {
        let filter = match parse_filter(params) {
            Ok(filter) => filter,
            Err(err) => return bad_request(&err.to_string()),
        };

        let items = self.snapshot();
        let matched: Vec<&MockRecord> = items
            .iter()
            .filter(|record| filter.matches(|field| record.field_view(field)))
            .collect();
        respond(200, json!(matched))
    }

    /// Serves `POST /api/items`: appends a pending record built from the
    /// body's `name` and `value`.
    fn create_item(&self, body: Option<&Value>) -> ApiResponse {
        let fields = match body {
            Some(body) => (
                body.get("name").and_then(Value::as_str),
                body.get("value").and_then(Value::as_i64),
            ),
            None => (None, None),
        };

        let (name, value) = match fields {
            (Some(name), Some(value)) => (name, value),
            _ => return bad_request("Invalid request parameters"),
        };

        let mut items = match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let record = MockRecord {
            id: items.len() as u64 + 1,
            name: name.to_string(),
            value,
            status: "pending".to_string(),
            date: Utc::now(),
        };
        items.push(record.clone());

        respond(201, json!(record))
    }

    /// Serves `GET /api/items/stats`: aggregates over the filtered
    /// dataset.
    fn item_stats(&self, params: &HashMap<String, Value>) -> ApiResponse {
        let filter = match parse_filter(params) {
            Ok(filter) => filter,
            Err(err) => return bad_request(&err.to_string()),
        };

        let items = self.snapshot();
        let matched: Vec<&MockRecord> = items
            .iter()
            .filter(|record| filter.matches(|field| record.field_view(field)))
            .collect();

        let total = matched.len();
        let average = if total == 0 {
            0.0
        } else {
            matched.iter().map(|record| record.value as f64).sum::<f64>() / total as f64
        };
        let mut status_counts: BTreeMap<&str, u64> = BTreeMap::new();
        for record in &matched {
            *status_counts.entry(record.status.as_str()).or_insert(0) += 1;
        }

        respond(
            200,
            json!({
                "total": total,
                "averageValue": average,
                "statusCounts": status_counts,
            }),
        )
    }

    /// Answers an unregistered path by scenario.
    ///
    /// A URL mentioning `error` fails with 500, `notfound` with 404,
    /// and anything else receives a generic success envelope shaped by
    /// the request method.
    fn simulate(&self, request: &ApiRequest) -> ApiResponse {
        if request.url.contains("error") {
            return respond(500, json!({"error": "Server error occurred"}));
        }
        if request.url.contains("notfound") {
            return respond(404, json!({"error": "Resource not found"}));
        }

        let timestamp = Utc::now().timestamp_millis();
        let body = match request.method {
            HttpMethod::GET => json!({
                "data": {"id": 1, "name": "Mock Data", "timestamp": timestamp}
            }),
            HttpMethod::POST => json!({
                "id": rand::thread_rng().gen_range(0..1000),
                "success": true,
                "timestamp": timestamp,
            }),
            HttpMethod::PUT => json!({"success": true, "updated": timestamp}),
            HttpMethod::DELETE => json!({"success": true, "deleted": timestamp}),
            HttpMethod::PATCH => json!({"success": true, "patched": timestamp}),
        };
        respond(200, body)
    }

    /// Clones the dataset out from under the lock.
    fn snapshot(&self) -> Vec<MockRecord> {
        match self.items.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the path component from a request URL.
///
/// Relative URLs are taken as paths directly, minus any query string.
fn request_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => match url.split_once('?') {
            Some((path, _)) => path.to_string(),
            None => url.to_string(),
        },
    }
}

/// Builds a mock response with the standard mock headers attached.
fn respond(status: u16, body: Value) -> ApiResponse {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert(MOCK_HEADER.to_string(), "true".to_string());
    ApiResponse::new(status, status_text(status), headers, body)
}

fn bad_request(message: &str) -> ApiResponse {
    respond(400, json!({"error": message}))
}

/// Canonical reason phrase for the statuses the responder emits.
fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
