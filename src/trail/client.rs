//! Blocking HTTP client for the trail execution API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::TrailSettings;
use crate::error::{Result, TrailfundError};
use crate::pipeline::{Execution, Step};
use crate::wallet::WalletAddress;

use super::types::{
    EvaluationRequest, EvaluationResponse, ExecutionQueryRequest, ExecutionQueryResponse,
    ExecutionRequest, ReadRequest, ReadResponse,
};

/// Header identifying the calling app on every request.
pub const APP_ID_HEADER: &str = "Herd-Trail-App-Id";

/// Client bound to one trail version.
pub struct TrailClient {
    client: Client,
    base_url: String,
    trail_id: String,
    version_id: String,
    app_id: String,
}

impl TrailClient {
    /// Build a client from configuration.
    pub fn new(settings: &TrailSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent("trailfund")
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            trail_id: settings.trail_id.clone(),
            version_id: settings.version_id.clone(),
            app_id: settings.app_id.clone(),
        })
    }

    fn version_url(&self, suffix: &str) -> String {
        format!(
            "{}/trails/{}/versions/{}{}",
            self.base_url, self.trail_id, self.version_id, suffix
        )
    }

    /// POST a JSON body and return the raw response text.
    fn post_text<B: Serialize>(&self, url: &str, body: &B) -> Result<String> {
        tracing::debug!("Trail API POST {}", url);

        let response = self
            .client
            .post(url)
            .header(APP_ID_HEADER, &self.app_id)
            .json(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            tracing::debug!("Trail API {} returned {}: {}", url, status, text);
            return Err(TrailfundError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let text = self.post_text(url, body)?;
        serde_json::from_str(&text).map_err(|e| TrailfundError::MalformedPayload {
            message: format!("unexpected response from {}: {}", url, e),
        })
    }

    /// Get the transaction for a step.
    pub fn evaluate(&self, step: Step, request: &EvaluationRequest) -> Result<EvaluationResponse> {
        let url = self.version_url(&format!("/steps/{}/evaluations", step.number()));
        self.post(&url, request)
    }

    /// Record a submitted transaction against an execution.
    pub fn save_execution(&self, request: &ExecutionRequest) -> Result<()> {
        let url = self.version_url("/executions");
        self.post_text(&url, request).map(|_| ())
    }

    /// Query execution history, or community totals with an empty wallet list.
    pub fn query_executions(
        &self,
        request: &ExecutionQueryRequest,
    ) -> Result<ExecutionQueryResponse> {
        let url = self.version_url("/executions/query");
        self.post(&url, request)
    }

    /// Evaluate a read node.
    pub fn read_node(&self, node_id: &str, request: &ReadRequest) -> Result<ReadResponse> {
        let url = self.version_url(&format!("/nodes/{}/read", node_id));
        self.post(&url, request)
    }

    /// Normalized execution history of one wallet.
    pub fn wallet_executions(&self, wallet: &WalletAddress) -> Result<Vec<Execution>> {
        let response = self.query_executions(&ExecutionQueryRequest::for_wallet(wallet))?;
        let executions = response.executions_for(wallet);
        tracing::debug!("Loaded {} executions for {}", executions.len(), wallet);
        Ok(executions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::types::{ExecutionSelector, UserInputs};
    use httpmock::prelude::*;
    use serde_json::json;

    fn settings(server: &MockServer) -> TrailSettings {
        TrailSettings {
            base_url: server.url("/v1"),
            trail_id: "t".to_string(),
            version_id: "v".to_string(),
            app_id: "app".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn evaluate_posts_to_step_endpoint_with_app_header() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/trails/t/versions/v/steps/2/evaluations")
                .header(APP_ID_HEADER, "app")
                .body_includes("\"walletAddress\":\"0xabc\"");
            then.status(200).json_body(json!({
                "finalInputValues": {},
                "payableAmount": "0",
                "contractAddress": "0xc0ffee",
                "callData": "0xdeadbeef"
            }));
        });

        let client = TrailClient::new(&settings(&server)).unwrap();
        let response = client
            .evaluate(
                Step::Donate,
                &EvaluationRequest {
                    wallet_address: "0xabc".to_string(),
                    user_inputs: UserInputs::new(),
                    execution: ExecutionSelector::Latest,
                },
            )
            .unwrap();

        mock.assert();
        assert_eq!(response.contract_address, "0xc0ffee");
        assert_eq!(response.call_data, "0xdeadbeef");
    }

    #[test]
    fn non_success_status_becomes_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/trails/t/versions/v/executions/query");
            then.status(500).body("{\"error\":\"boom\"}");
        });

        let client = TrailClient::new(&settings(&server)).unwrap();
        let err = client
            .query_executions(&ExecutionQueryRequest::community())
            .unwrap_err();

        assert!(matches!(err, TrailfundError::Api { status: 500, .. }));
        assert_eq!(err.to_string(), "Trail API error: 500 - {\"error\":\"boom\"}");
    }

    #[test]
    fn save_execution_accepts_empty_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/trails/t/versions/v/executions")
                .body_includes("\"transactionHash\":\"0xfeed\"");
            then.status(201);
        });

        let client = TrailClient::new(&settings(&server)).unwrap();
        client
            .save_execution(&ExecutionRequest {
                node_id: "n".to_string(),
                transaction_hash: "0xfeed".to_string(),
                wallet_address: "0xabc".to_string(),
                execution: ExecutionSelector::Latest,
            })
            .unwrap();

        mock.assert();
    }

    #[test]
    fn wallet_executions_queries_lowercase_address() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/trails/t/versions/v/executions/query")
                .json_body(json!({
                    "walletAddresses": ["0x00000000000000000000000000000000000000aa"]
                }));
            then.status(200).json_body(json!({
                "walletExecutions": [{
                    "walletAddress": "0x00000000000000000000000000000000000000AA",
                    "executions": [{
                        "id": "e1",
                        "createdAt": "2025-01-01T00:00:00Z",
                        "updatedAt": "2025-01-01T00:00:00Z",
                        "steps": [{"stepNumber": 1, "txHash": "0x1"}]
                    }]
                }]
            }));
        });

        let client = TrailClient::new(&settings(&server)).unwrap();
        let wallet = WalletAddress::parse("0x00000000000000000000000000000000000000AA").unwrap();
        let executions = client.wallet_executions(&wallet).unwrap();

        mock.assert();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].max_step_number(), 1);
    }

    #[test]
    fn wallet_executions_survive_malformed_records() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/trails/t/versions/v/executions/query");
            then.status(200).json_body(json!({
                "walletExecutions": [{
                    "walletAddress": "0x00000000000000000000000000000000000000aa",
                    "executions": [
                        {
                            "id": "good",
                            "updatedAt": "2025-01-01T00:00:00Z",
                            "steps": [{"stepNumber": 1, "txHash": "0x1"}]
                        },
                        {
                            "id": "stringly",
                            "createdAt": "not a date",
                            "updatedAt": "2025-01-02T00:00:00Z",
                            "steps": [{
                                "stepNumber": 1,
                                "txHash": "0x2",
                                "txBlockTimestamp": "1735689600"
                            }]
                        },
                        {"id": "empty", "updatedAt": "2025-01-03T00:00:00Z", "steps": null}
                    ]
                }]
            }));
        });

        let client = TrailClient::new(&settings(&server)).unwrap();
        let wallet = WalletAddress::parse("0x00000000000000000000000000000000000000aa").unwrap();
        let executions = client.wallet_executions(&wallet).unwrap();

        let ids: Vec<&str> = executions.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "stringly", "empty"]);
        assert_eq!(executions[1].steps[0].block_timestamp, Some(1735689600));
    }

    #[test]
    fn read_node_hits_node_endpoint() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/trails/t/versions/v/nodes/n42/read");
            then.status(200).json_body(json!({"outputs": [{"value": "7"}]}));
        });

        let client = TrailClient::new(&settings(&server)).unwrap();
        let response = client
            .read_node(
                "n42",
                &ReadRequest {
                    wallet_address: WalletAddress::zero().to_string(),
                    user_inputs: UserInputs::new(),
                    execution: ExecutionSelector::Latest,
                },
            )
            .unwrap();

        assert_eq!(response.first_value().as_deref(), Some("7"));
    }

    #[test]
    fn garbage_body_is_malformed_payload() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/trails/t/versions/v/nodes/n/read");
            then.status(200).body("<html>");
        });

        let client = TrailClient::new(&settings(&server)).unwrap();
        let err = client
            .read_node(
                "n",
                &ReadRequest {
                    wallet_address: "0x0".to_string(),
                    user_inputs: UserInputs::new(),
                    execution: ExecutionSelector::Latest,
                },
            )
            .unwrap_err();
        assert!(matches!(err, TrailfundError::MalformedPayload { .. }));
    }
}
