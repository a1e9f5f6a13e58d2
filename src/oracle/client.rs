use std::time::Duration;

use async_trait::async_trait;

use crate::config::OracleConfig;
use crate::oracle::prompt::build_prompt;
use crate::oracle::verdict::{parse_verdict, Verdict};
use crate::oracle::{IntentOracle, OracleError};

/// HTTP client for a local completion endpoint (Ollama `/api/generate` shape).
pub struct OracleClient {
    endpoint: String,
    model: String,
    temperature: f64,
    num_predict: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl OracleClient {
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            num_predict: config.num_predict,
            timeout: Duration::from_secs(config.timeout_secs),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IntentOracle for OracleClient {
    async fn classify(&self, user_intent: &str, action: &str) -> Result<Verdict, OracleError> {
        let prompt = build_prompt(user_intent, action);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.num_predict,
            },
        });

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            action = %action,
            "sending classification request"
        );
        let started = std::time::Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(OracleError::Unavailable(format!("{status}: {err_body}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        let raw = json["response"]
            .as_str()
            .ok_or_else(|| OracleError::MalformedResponse("missing `response` field".into()))?;

        let verdict = parse_verdict(raw);
        tracing::info!(
            latency_ms = started.elapsed().as_millis() as u64,
            verdict = ?verdict,
            raw = %raw.trim(),
            "oracle verdict"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(endpoint: &str) -> OracleClient {
        OracleClient::new(&OracleConfig {
            endpoint: endpoint.to_string(),
            timeout_secs: 2,
            ..OracleConfig::default()
        })
    }

    async fn serve_completion(server: &MockServer, text: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": text })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn reduces_allow_completion() {
        let server = MockServer::start().await;
        serve_completion(&server, " ALLOW\n").await;

        let client = make_client(&format!("{}/api/generate", server.uri()));
        let verdict = client.classify("weather?", "weather.get(\"Seoul\")").await.unwrap();
        assert_eq!(verdict, Verdict::Allow);
    }

    #[tokio::test]
    async fn reduces_deny_completion() {
        let server = MockServer::start().await;
        serve_completion(&server, "DENY").await;

        let client = make_client(&format!("{}/api/generate", server.uri()));
        let verdict = client
            .classify("Summarize this page.", "email.send(password)")
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Deny);
    }

    #[tokio::test]
    async fn off_format_completion_is_uncertain() {
        let server = MockServer::start().await;
        serve_completion(&server, "sounds reasonable to me").await;

        let client = make_client(&format!("{}/api/generate", server.uri()));
        let verdict = client.classify("intent", "tool.call({})").await.unwrap();
        assert_eq!(verdict, Verdict::Uncertain);
    }

    #[tokio::test]
    async fn request_body_pins_sampling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "phi3:mini",
                "stream": false,
                "options": { "temperature": 0.0, "num_predict": 10 },
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "ALLOW" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&format!("{}/api/generate", server.uri()));
        client.classify("intent", "tool.call({})").await.unwrap();
    }

    #[tokio::test]
    async fn non_2xx_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let client = make_client(&format!("{}/api/generate", server.uri()));
        let err = client.classify("intent", "tool.call({})").await.unwrap_err();
        assert!(matches!(err, OracleError::Unavailable(_)));
    }

    #[tokio::test]
    async fn missing_response_field_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "done": true })),
            )
            .mount(&server)
            .await;

        let client = make_client(&format!("{}/api/generate", server.uri()));
        let err = client.classify("intent", "tool.call({})").await.unwrap_err();
        assert!(matches!(err, OracleError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_unavailable() {
        let server = MockServer::start().await;
        let endpoint = format!("{}/api/generate", server.uri());
        drop(server);

        let client = make_client(&endpoint);
        let err = client.classify("intent", "tool.call({})").await.unwrap_err();
        assert!(matches!(err, OracleError::Unavailable(_)));
    }
}
