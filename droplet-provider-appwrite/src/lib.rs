//! Reading store implementation using the Appwrite document database REST API.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use droplet_core::{
    config::BackendConfig,
    model::{NewReading, Reading, ReadingQuery, UserId},
    ports::{PortError, ReadingPort},
};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";
const DEFAULT_PAGE_SIZE: usize = 100;

/// Response wrapper from `GET .../documents`
#[derive(Debug, Deserialize)]
struct DocumentList {
    total: usize,
    documents: Vec<DropletDocument>,
}

/// Droplet document as stored in the collection.
///
/// Everything is optional so one malformed document cannot fail a whole listing.
#[derive(Debug, Deserialize)]
struct DropletDocument {
    #[serde(rename = "$id")]
    document_id: String,
    #[serde(rename = "$createdAt")]
    created_at: Option<String>,
    droplet_id: Option<String>,
    user_id: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    quality: Option<f64>,
    upload_time: Option<String>,
}

/// Body of `POST .../documents`
#[derive(Debug, Serialize)]
struct CreateDocument<'payload> {
    #[serde(rename = "documentId")]
    document_id: &'payload str,
    data: DropletData<'payload>,
}

#[derive(Debug, Serialize)]
struct DropletData<'payload> {
    droplet_id: &'payload str,
    user_id: &'payload str,
    longitude: f64,
    latitude: f64,
    quality: f64,
    upload_time: String,
}

/// Error body returned by Appwrite.
#[derive(Debug, Deserialize)]
struct AppwriteError {
    message: String,
}

/// Reading store talking to one Appwrite collection.
pub struct AppwriteReadingPort {
    client: Client,
    config: BackendConfig,
    page_size: usize,
}

impl AppwriteReadingPort {
    /// Create a new port bound to the given HTTP client and collection.
    #[must_use]
    pub fn new(client: Client, config: BackendConfig) -> Self {
        Self {
            client,
            config,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Number of documents requested per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint.trim_end_matches('/'),
            self.config.database_id,
            self.config.collection_id
        )
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header(PROJECT_HEADER, &self.config.project_id);
        match &self.config.api_key {
            Some(key) => req.header(KEY_HEADER, key),
            None => req,
        }
    }
}

#[async_trait]
impl ReadingPort for AppwriteReadingPort {
    async fn list(&self, query: &ReadingQuery) -> Result<Vec<Reading>, PortError> {
        let mut readings = Vec::new();
        let mut offset = 0;

        loop {
            let mut queries = vec![
                paging_query("limit", self.page_size),
                paging_query("offset", offset),
            ];
            if let Some(user) = &query.user_id {
                queries.push(equal_query("user_id", &user.0));
            }
            let params: Vec<(&str, &str)> = queries
                .iter()
                .map(|value| ("queries[]", value.as_str()))
                .collect();

            let req = self.authorize(self.client.get(self.documents_url()).query(&params));
            let page = fetch_json::<DocumentList>(req).await?;
            let fetched = page.documents.len();
            let total = page.total;

            readings.extend(page.documents.into_iter().filter_map(into_reading));

            // `limit` may be capped server side; `total` decides when to stop
            offset += fetched;
            if fetched == 0 || offset >= total {
                break;
            }
        }

        debug!(count = readings.len(), "listed droplet documents");
        Ok(readings)
    }

    async fn submit(&self, reading: NewReading) -> Result<Reading, PortError> {
        let droplet_id = unique_id(reading.uploaded_at);
        let body = CreateDocument {
            document_id: "unique()",
            data: DropletData {
                droplet_id: &droplet_id,
                user_id: &reading.user_id.0,
                longitude: reading.longitude,
                latitude: reading.latitude,
                quality: reading.quality_score,
                upload_time: reading
                    .uploaded_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        };

        let req = self.authorize(self.client.post(self.documents_url()).json(&body));
        let created = fetch_json::<DropletDocument>(req).await?;
        debug!(document = %created.document_id, "created droplet document");

        into_reading(created)
            .ok_or_else(|| PortError::Decode("created document is incomplete".to_owned()))
    }
}

/// Build the reading port for the configured collection.
#[must_use]
pub fn reading_port(client: Client, config: BackendConfig) -> Arc<dyn ReadingPort> {
    Arc::new(AppwriteReadingPort::new(client, config))
}

fn paging_query(method: &str, value: usize) -> String {
    json!({ "method": method, "values": [value] }).to_string()
}

fn equal_query(attribute: &str, value: &str) -> String {
    json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
}

/// Hex timestamp id in the spirit of Appwrite's `ID.unique()`.
fn unique_id(at: DateTime<Utc>) -> String {
    format!("{:x}{:05x}", at.timestamp(), at.timestamp_subsec_micros())
}

/// Map a stored document onto a [`Reading`], skipping ones without identity,
/// owner, position, or a parseable timestamp.
fn into_reading(doc: DropletDocument) -> Option<Reading> {
    let (Some(user_id), Some(latitude), Some(longitude)) = (doc.user_id, doc.latitude, doc.longitude)
    else {
        warn!(document = %doc.document_id, "skipping droplet without owner or position");
        return None;
    };

    let uploaded_at = doc
        .upload_time
        .as_deref()
        .or(doc.created_at.as_deref())
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|time| time.with_timezone(&Utc));
    let Some(uploaded_at) = uploaded_at else {
        warn!(document = %doc.document_id, "skipping droplet without a valid upload time");
        return None;
    };

    Some(Reading {
        id: doc.droplet_id.unwrap_or(doc.document_id),
        user_id: UserId(user_id),
        latitude,
        longitude,
        quality_score: doc.quality,
        uploaded_at,
    })
}

// Fetch and decode JSON, turning Appwrite error bodies into `PortError::Backend`.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let resp = req.send().await.map_err(PortError::from)?;
    let status = resp.status();

    if !status.is_success() {
        let message = resp
            .json::<AppwriteError>()
            .await
            .map_or_else(|_| status.to_string(), |body| body.message);
        return Err(PortError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    resp.json()
        .await
        .map_err(|err| PortError::Decode(err.to_string()))
}
