// src/source/cms.rs

//! CMS faculty-profile API adapter.
//!
//! The CMS answers with a JSON envelope whose `data` array holds one item per
//! faculty member:
//!
//! ```text
//! { "data": [ { "attributes": {
//!     "Employee_Id": 70012,
//!     "Name": "...", "Designation": "...", "Department": "...",
//!     "Photo": { "data": { "attributes": { "url": "..." } } },
//!     "Research_area_of_specialization": "A, B, C"
//! } } ] }
//! ```

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{FacultyRecord, SourceConfig};
use crate::source::{ParsedRecord, RosterSource};
use crate::utils::http::{bearer_headers, create_async_client};

/// Roster source backed by the CMS HTTP API.
pub struct CmsSource {
    client: Client,
    url: String,
    headers: HeaderMap,
}

impl CmsSource {
    /// Create a source using an explicit bearer token.
    pub fn new(config: &SourceConfig, token: &str) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            url: config.url.clone(),
            headers: bearer_headers(token)?,
        })
    }

    /// Create a source reading the bearer token from the environment.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let token = config.token()?;
        Self::new(config, &token)
    }
}

#[async_trait]
impl RosterSource for CmsSource {
    async fn fetch_roster(&self) -> Result<Vec<FacultyRecord>> {
        log::info!("Fetching faculty roster from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(AppError::upstream)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        let body = response.bytes().await.map_err(AppError::upstream)?;
        log::debug!("Received {} bytes from upstream", body.len());

        parse_roster(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Parse a raw CMS response body into a roster.
///
/// Items without a usable identifier are dropped. When the same identifier
/// appears more than once, the first occurrence is kept.
pub fn parse_roster(body: &[u8]) -> Result<Vec<FacultyRecord>> {
    let envelope: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::malformed(format!("body is not valid JSON: {e}")))?;

    let items = envelope
        .get("data")
        .ok_or_else(|| AppError::malformed("missing top-level 'data' field"))?
        .as_array()
        .ok_or_else(|| AppError::malformed("top-level 'data' field is not a list"))?;

    let mut seen = HashSet::with_capacity(items.len());
    let mut roster = Vec::with_capacity(items.len());
    let mut skipped = 0usize;

    for (index, item) in items.iter().enumerate() {
        match parse_item(item) {
            ParsedRecord::Valid(record) => {
                if seen.insert(record.employee_id) {
                    roster.push(record);
                } else {
                    log::warn!(
                        "Duplicate employee id {} at item {}; keeping first occurrence",
                        record.employee_id,
                        index
                    );
                }
            }
            ParsedRecord::Skipped(reason) => {
                skipped += 1;
                log::debug!("Skipping upstream item {}: {}", index, reason);
            }
        }
    }

    log::info!(
        "Parsed {} faculty records ({} items skipped)",
        roster.len(),
        skipped
    );

    Ok(roster)
}

/// Map one upstream item to a record, or explain why it was discarded.
///
/// Only the identifier decides whether an item is kept. Any other field with
/// an unexpected shape falls back to its empty value.
pub fn parse_item(item: &Value) -> ParsedRecord {
    let Some(attributes) = item.get("attributes").filter(|a| a.is_object()) else {
        return ParsedRecord::Skipped("no attributes".into());
    };

    let Some(employee_id) = attributes.get("Employee_Id").and_then(parse_employee_id) else {
        return ParsedRecord::Skipped("missing employee id".into());
    };

    let image_url = attributes
        .pointer("/Photo/data/attributes/url")
        .and_then(Value::as_str)
        .map(str::to_string);

    let specializations = match attributes.get("Research_area_of_specialization") {
        Some(Value::String(text)) => FacultyRecord::parse_specializations(text),
        Some(Value::Array(areas)) => areas
            .iter()
            .filter_map(Value::as_str)
            .flat_map(FacultyRecord::parse_specializations)
            .collect(),
        _ => Vec::new(),
    };

    ParsedRecord::Valid(FacultyRecord {
        employee_id,
        name: text_field(attributes, "Name"),
        designation: text_field(attributes, "Designation"),
        department: text_field(attributes, "Department"),
        image_url,
        specializations,
    })
}

fn text_field(attributes: &Value, key: &str) -> String {
    match attributes.get(key).and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => {
            if let Some(other) = attributes.get(key).filter(|v| !v.is_null()) {
                log::debug!("Ignoring non-text {}: {}", key, other);
            }
            String::new()
        }
    }
}

/// Read an identifier given as a number or numeric string. Zero counts as absent.
fn parse_employee_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64().or_else(|| integral(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| integral(s.parse::<f64>().ok()?))
        }
        _ => None,
    }?;

    (id != 0).then_some(id)
}

fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
        .then_some(value as i64)
}
