use serde::{Serialize, Serializer};
use std::time::Duration;

/// Outcome of sending one sample text to one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleResult {
    pub text: String,
    pub translation: Option<String>,
    pub success: bool,
    pub detail: String,
}

impl SampleResult {
    pub fn ok(text: &str, translation: String) -> Self {
        Self {
            text: text.to_string(),
            translation: Some(translation),
            success: true,
            detail: "OK".to_string(),
        }
    }

    pub fn failed(text: &str, translation: Option<String>, detail: impl Into<String>) -> Self {
        Self {
            text: text.to_string(),
            translation,
            success: false,
            detail: detail.into(),
        }
    }
}

/// Outcome of probing one endpoint with every configured sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointResult {
    pub name: String,
    pub base_url: String,
    pub full_url: String,
    pub success: bool,
    pub status_code: Option<u16>,
    #[serde(rename = "latency_seconds", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub detail: String,
    pub samples: Vec<SampleResult>,
}

impl EndpointResult {
    pub fn samples_ok(&self) -> usize {
        self.samples.iter().filter(|sample| sample.success).count()
    }
}

fn serialize_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}
