use serde::{Deserialize, Serialize};

/// Persisted media reference returned by uploads and count requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResponse {
    pub id: i64,
    pub url: String,
}

/// Result of handing an artifact to the upload gateway.
pub type UploadResult = MediaResponse;

/// A trained counting model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    pub name: String,
}

/// A stored media record, as served by `/get/{id}` and `/archive`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub original_url: String,
    #[serde(default)]
    pub annotated_url: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default, rename = "averageCountPerFrame")]
    pub average_count_per_frame: Option<f64>,
}

impl Record {
    /// Whether the service has produced an annotated result for this record.
    pub fn is_counted(&self) -> bool {
        self.annotated_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Body of `PUT /count/{media_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRequest {
    pub model_id: i64,
}

/// Per-model usage and count-bucket aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelInsight {
    #[serde(default)]
    pub model_name: Option<String>,
    pub model_usage_count: u64,
    pub count_0_5: u64,
    pub count_5_25: u64,
    pub count_25_50: u64,
    pub count_50_100: u64,
    pub count_100_plus: u64,
}

/// Response of `GET /insights`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Insights {
    pub data: Vec<ModelInsight>,
}

/// Error body the service sends alongside non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
