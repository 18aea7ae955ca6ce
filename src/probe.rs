use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::error::Error as _;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::extract::extract_translation;
use crate::models::{EndpointResult, SampleResult};
use crate::payload::build_payload;
use crate::validate::is_translation_valid;

pub(crate) const TRANSLATE_ROUTE: &str = "/translate";

pub fn user_agent() -> String {
    format!("deeplx-availability-check/{}", env!("CARGO_PKG_VERSION"))
}

/// `base_url` without trailing slashes, followed by the translate route.
pub(crate) fn translate_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), TRANSLATE_ROUTE)
}

#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub texts: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub timeout: Duration,
}

/// Sends sample translations to endpoints and judges the answers.
///
/// Holds no per-endpoint state, so one prober can serve a whole run.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
}

struct SampleAttempt {
    sample: SampleResult,
    status: Option<u16>,
    transport_error: Option<String>,
}

impl Prober {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent())
            .build()
            .with_context(|| "failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Probe one endpoint with every sample text, stopping at the first failure.
    pub async fn check_endpoint(
        &self,
        name: &str,
        base_url: &str,
        options: &ProbeOptions,
    ) -> EndpointResult {
        let full_url = translate_url(base_url);
        let total = options.texts.len();
        let started = Instant::now();

        let mut samples = Vec::with_capacity(total);
        let mut status_code = None;
        let mut transport_error = None;

        for text in &options.texts {
            let attempt = self.send_sample(&full_url, text, options).await;
            if attempt.status.is_some() {
                status_code = attempt.status;
            }
            if attempt.transport_error.is_some() {
                transport_error = attempt.transport_error;
            }
            let failed = !attempt.sample.success;
            samples.push(attempt.sample);
            if failed {
                break;
            }
        }

        let elapsed = started.elapsed();
        let completed = samples.iter().filter(|sample| sample.success).count();
        let success = completed == total;
        let detail = summarize(&samples, total, success, transport_error.as_deref());

        info!(
            "{} {} in {:.3}s: {}",
            name,
            if success { "OK" } else { "FAIL" },
            elapsed.as_secs_f64(),
            detail
        );

        EndpointResult {
            name: name.to_string(),
            base_url: base_url.to_string(),
            full_url,
            success,
            status_code,
            elapsed,
            detail,
            samples,
        }
    }

    async fn send_sample(&self, url: &str, text: &str, options: &ProbeOptions) -> SampleAttempt {
        let payload = build_payload(text, &options.source_lang, &options.target_lang);
        debug!("POST {} text={:?}", url, text);

        let response = match self
            .client
            .post(url)
            .timeout(options.timeout)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return transport_failure(text, None, &err),
        };

        let status = response.status();
        let code = Some(status.as_u16());
        if status != StatusCode::OK {
            return SampleAttempt {
                sample: SampleResult::failed(text, None, format!("HTTP {}", status.as_u16())),
                status: code,
                transport_error: None,
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return transport_failure(text, code, &err),
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) else {
            return SampleAttempt {
                sample: SampleResult::failed(text, None, "Non-JSON response"),
                status: code,
                transport_error: None,
            };
        };

        let translation = extract_translation(&value);
        let sample = match translation {
            Some(translation) if is_translation_valid(text, Some(translation.as_str())) => {
                SampleResult::ok(text, translation)
            }
            Some(translation) => SampleResult::failed(
                text,
                Some(translation),
                "Translation identical to source",
            ),
            None => SampleResult::failed(text, None, "Missing translation field"),
        };
        debug!("{} -> {:?} ({})", text, sample.translation, sample.detail);

        SampleAttempt {
            sample,
            status: code,
            transport_error: None,
        }
    }
}

fn transport_failure(text: &str, status: Option<u16>, err: &reqwest::Error) -> SampleAttempt {
    let message = describe_error(err);
    debug!("request failed: {}", message);
    SampleAttempt {
        sample: SampleResult::failed(text, None, message.clone()),
        status,
        transport_error: Some(message),
    }
}

fn describe_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// One-line verdict for an endpoint.
pub(crate) fn summarize(
    samples: &[SampleResult],
    total: usize,
    success: bool,
    transport_error: Option<&str>,
) -> String {
    if success {
        return format!("All {} samples translated", total);
    }
    if let Some(failed) = samples.iter().find(|sample| !sample.success) {
        let snippet = failed
            .translation
            .as_deref()
            .map(|translation| format!(" -> {}", translation))
            .unwrap_or_default();
        return format!("Sample '{}' failed: {}{}", failed.text, failed.detail, snippet);
    }
    if let Some(error) = transport_error {
        return format!("Request failed: {}", error);
    }
    "Unknown failure".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options(texts: &[&str]) -> ProbeOptions {
        ProbeOptions {
            texts: texts.iter().map(|text| text.to_string()).collect(),
            source_lang: "EN".to_string(),
            target_lang: "ZH".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    async fn mount_reply(server: &MockServer, text: &str, reply: ResponseTemplate, calls: u64) {
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_partial_json(json!({"text": text})))
            .respond_with(reply)
            .expect(calls)
            .mount(server)
            .await;
    }

    #[test]
    fn translate_url_strips_trailing_slashes() {
        assert_eq!(translate_url("http://a.test"), "http://a.test/translate");
        assert_eq!(translate_url("http://a.test///"), "http://a.test/translate");
        assert_eq!(
            translate_url("https://b.test/api/"),
            "https://b.test/api/translate"
        );
    }

    #[test]
    fn summarize_reports_failed_sample_with_snippet() {
        let samples = vec![
            SampleResult::ok("Hello", "你好".to_string()),
            SampleResult::failed(
                "Testing",
                Some("Testing".to_string()),
                "Translation identical to source",
            ),
        ];
        assert_eq!(
            summarize(&samples, 3, false, None),
            "Sample 'Testing' failed: Translation identical to source -> Testing"
        );
    }

    #[test]
    fn summarize_fallbacks() {
        assert_eq!(summarize(&[], 2, true, None), "All 2 samples translated");
        assert_eq!(
            summarize(&[], 2, false, Some("connection reset")),
            "Request failed: connection reset"
        );
        assert_eq!(summarize(&[], 2, false, None), "Unknown failure");
    }

    #[tokio::test]
    async fn sends_expected_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(header("user-agent", user_agent().as_str()))
            .and(body_json(json!({
                "text": "Hello",
                "source_lang": "EN",
                "target_lang": "ZH"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "你好"})))
            .expect(1)
            .mount(&server)
            .await;

        let base_url = format!("{}/", server.uri());
        let prober = Prober::new().expect("prober");
        let result = prober
            .check_endpoint("Alpha", &base_url, &options(&["Hello"]))
            .await;

        assert!(result.success, "{}", result.detail);
        assert_eq!(result.base_url, base_url);
        assert_eq!(result.full_url, format!("{}/translate", server.uri()));
    }

    #[tokio::test]
    async fn all_samples_translated() {
        let server = MockServer::start().await;
        let ok = |text: &str| ResponseTemplate::new(200).set_body_json(json!({"data": text}));
        mount_reply(&server, "Hello", ok("你好"), 1).await;
        mount_reply(&server, "Good morning", ok("早上好"), 1).await;
        mount_reply(&server, "Testing", ok("测试"), 1).await;

        let prober = Prober::new().expect("prober");
        let result = prober
            .check_endpoint(
                "Alpha",
                &server.uri(),
                &options(&["Hello", "Good morning", "Testing"]),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.detail, "All 3 samples translated");
        assert_eq!(result.samples.len(), 3);
        assert_eq!(result.samples[1].translation.as_deref(), Some("早上好"));
        assert!(result.samples.iter().all(|sample| sample.detail == "OK"));
    }

    #[tokio::test]
    async fn stops_after_first_failed_sample() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "Hello",
            ResponseTemplate::new(200).set_body_json(json!({"data": "你好"})),
            1,
        )
        .await;
        mount_reply(
            &server,
            "Good morning",
            ResponseTemplate::new(200).set_body_json(json!({"data": "good  MORNING"})),
            1,
        )
        .await;
        mount_reply(
            &server,
            "Testing",
            ResponseTemplate::new(200).set_body_json(json!({"data": "测试"})),
            0,
        )
        .await;

        let prober = Prober::new().expect("prober");
        let result = prober
            .check_endpoint(
                "Alpha",
                &server.uri(),
                &options(&["Hello", "Good morning", "Testing"]),
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.samples.len(), 2);
        assert!(result.samples[0].success);
        assert_eq!(
            result.detail,
            "Sample 'Good morning' failed: Translation identical to source -> good  MORNING"
        );
    }

    #[tokio::test]
    async fn non_json_body_fails_sample() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "Hello",
            ResponseTemplate::new(200).set_body_string("<html>ok</html>"),
            1,
        )
        .await;

        let prober = Prober::new().expect("prober");
        let result = prober
            .check_endpoint("Alpha", &server.uri(), &options(&["Hello", "Testing"]))
            .await;

        assert!(!result.success);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.samples.len(), 1);
        assert_eq!(result.samples[0].detail, "Non-JSON response");
        assert_eq!(result.detail, "Sample 'Hello' failed: Non-JSON response");
    }

    #[tokio::test]
    async fn json_without_translation_fails_sample() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "Hello",
            ResponseTemplate::new(200).set_body_json(json!({"code": 200, "ok": true})),
            1,
        )
        .await;

        let prober = Prober::new().expect("prober");
        let result = prober
            .check_endpoint("Alpha", &server.uri(), &options(&["Hello"]))
            .await;

        assert!(!result.success);
        assert_eq!(result.samples[0].translation, None);
        assert_eq!(result.detail, "Sample 'Hello' failed: Missing translation field");
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "Hello",
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": "你好"}))
                .set_delay(Duration::from_secs(2)),
            1,
        )
        .await;

        let mut options = options(&["Hello"]);
        options.timeout = Duration::from_millis(100);
        let prober = Prober::new().expect("prober");
        let result = prober
            .check_endpoint("Slow", &server.uri(), &options)
            .await;

        assert!(!result.success);
        assert_eq!(result.status_code, None);
        assert_eq!(result.samples.len(), 1);
        assert!(!result.samples[0].detail.is_empty());
        assert!(result.detail.starts_with("Sample 'Hello' failed: "));
        assert!(result.elapsed >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn keeps_last_status_when_later_request_errors() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "Hello",
            ResponseTemplate::new(200).set_body_json(json!({"data": "你好"})),
            1,
        )
        .await;
        mount_reply(
            &server,
            "Testing",
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": "测试"}))
                .set_delay(Duration::from_secs(2)),
            1,
        )
        .await;

        let mut options = options(&["Hello", "Testing"]);
        options.timeout = Duration::from_millis(200);
        let prober = Prober::new().expect("prober");
        let result = prober
            .check_endpoint("Alpha", &server.uri(), &options)
            .await;

        assert!(!result.success);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.samples.len(), 2);
        assert!(result.samples[0].success);
        assert!(!result.samples[1].success);
    }
}
