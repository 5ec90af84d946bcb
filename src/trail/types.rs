//! Wire types for the trail execution API.
//!
//! Request types serialize to the camelCase JSON the API expects. Response
//! types are deliberately lenient (most fields optional) and are converted
//! into the validated pipeline types by [`RawExecution::normalize`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, TrailfundError};
use crate::pipeline::{Execution, ExecutionStep, PIPELINE_LENGTH};
use crate::wallet::WalletAddress;

/// Which execution a request applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExecutionSelector {
    /// The wallet's most recent execution.
    Latest,
    /// Start a fresh execution.
    New,
    /// A specific execution by id.
    Manual {
        #[serde(rename = "executionId")]
        execution_id: String,
    },
}

impl ExecutionSelector {
    /// `Manual` when an id is given, otherwise `Latest`.
    pub fn for_execution(execution_id: Option<&str>) -> Self {
        match execution_id {
            Some(id) => Self::Manual {
                execution_id: id.to_string(),
            },
            None => Self::Latest,
        }
    }
}

/// A single user-supplied input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputValue {
    pub value: String,
}

/// User inputs keyed by node id, then by input path (`inputs.amount`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserInputs(BTreeMap<String, BTreeMap<String, InputValue>>);

impl UserInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one input on one node.
    pub fn set(&mut self, node_id: &str, path: &str, value: impl Into<String>) {
        self.0
            .entry(node_id.to_string())
            .or_default()
            .insert(path.to_string(), InputValue { value: value.into() });
    }

    /// Value of an input, if set.
    pub fn get(&self, node_id: &str, path: &str) -> Option<&str> {
        self.0
            .get(node_id)
            .and_then(|inputs| inputs.get(path))
            .map(|v| v.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body of `POST .../steps/{n}/evaluations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub wallet_address: String,
    pub user_inputs: UserInputs,
    pub execution: ExecutionSelector,
}

/// Transaction the trail built for a step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    #[serde(default)]
    pub final_input_values: BTreeMap<String, Value>,
    /// Native value to attach, in wei. Absent means zero.
    #[serde(default)]
    pub payable_amount: Option<String>,
    pub contract_address: String,
    pub call_data: String,
}

/// Body of `POST .../executions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub node_id: String,
    pub transaction_hash: String,
    pub wallet_address: String,
    pub execution: ExecutionSelector,
}

/// Body of `POST .../executions/query`.
///
/// An empty wallet list asks for campaign-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionQueryRequest {
    pub wallet_addresses: Vec<String>,
}

impl ExecutionQueryRequest {
    /// Query one wallet's history.
    pub fn for_wallet(wallet: &WalletAddress) -> Self {
        Self {
            wallet_addresses: vec![wallet.as_str().to_string()],
        }
    }

    /// Query the whole community.
    pub fn community() -> Self {
        Self::default()
    }
}

/// Body of `POST .../nodes/{nodeId}/read`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    pub wallet_address: String,
    pub user_inputs: UserInputs,
    pub execution: ExecutionSelector,
}

/// Result of a read node.
///
/// `outputs` is either a list (`[{ value }]`) or an object of named
/// outputs (`{ goal: { value } }`), depending on the node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReadResponse {
    #[serde(default)]
    pub outputs: Value,
}

impl ReadResponse {
    /// `outputs[0].value` as a string.
    pub fn first_value(&self) -> Option<String> {
        self.outputs
            .as_array()
            .and_then(|outputs| outputs.first())
            .and_then(|o| o.get("value"))
            .and_then(value_to_string)
    }

    /// `outputs.<name>.value`, untouched.
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name).and_then(|o| o.get("value"))
    }

    /// `outputs.<name>.value` as a string.
    pub fn named_string(&self, name: &str) -> Option<String> {
        self.named(name).and_then(value_to_string)
    }

    /// `outputs.<name>.value` as a flag; accepts `true`, `"true"` and non-zero numbers.
    pub fn named_bool(&self, name: &str) -> bool {
        match self.named(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_u64().is_some_and(|n| n != 0),
            _ => false,
        }
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Response of the executions query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionQueryResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub wallet_executions: Vec<RawWalletExecutions>,
    #[serde(default)]
    pub totals: Option<CommunityTotals>,
}

impl ExecutionQueryResponse {
    /// Normalized executions for one wallet (case-insensitive match).
    ///
    /// Records that cannot be normalized are skipped with a warning.
    pub fn executions_for(&self, wallet: &WalletAddress) -> Vec<Execution> {
        let Some(entry) = self
            .wallet_executions
            .iter()
            .find(|we| wallet.matches(&we.wallet_address))
        else {
            return Vec::new();
        };

        entry
            .executions
            .iter()
            .filter_map(|raw| match raw.normalize() {
                Ok(execution) => Some(execution),
                Err(e) => {
                    tracing::warn!("Skipping malformed execution record: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// A wallet's entry in the executions query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWalletExecutions {
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub executions: Vec<RawExecution>,
}

/// An execution record as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExecution {
    pub id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub steps: Vec<RawExecutionStep>,
}

/// A step record as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExecutionStep {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub step_number: Option<i64>,
    pub node_id: Option<String>,
    pub tx_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub tx_block_timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub tx_block_number: Option<u64>,
    pub created_at: Option<String>,
}

impl RawExecution {
    /// Validate into an [`Execution`].
    ///
    /// Fails when the id or `updatedAt` is missing or unparseable. Step 0
    /// (the trail start marker) and steps outside the pipeline are dropped,
    /// as are steps without a transaction hash.
    pub fn normalize(&self) -> Result<Execution> {
        let id = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| malformed("execution without id"))?;

        let updated_at = self
            .updated_at
            .as_deref()
            .ok_or_else(|| malformed(format!("execution {} without updatedAt", id)))
            .and_then(parse_timestamp)?;

        let created_at = match self.created_at.as_deref().map(parse_timestamp) {
            Some(Ok(created_at)) => created_at,
            Some(Err(e)) => {
                tracing::warn!("Execution {} has an unreadable createdAt: {}", id, e);
                updated_at
            }
            None => updated_at,
        };

        let steps = self
            .steps
            .iter()
            .filter_map(|step| step.normalize(id))
            .collect();

        Ok(Execution {
            id: id.to_string(),
            created_at,
            updated_at,
            steps,
        })
    }
}

impl RawExecutionStep {
    fn normalize(&self, execution_id: &str) -> Option<ExecutionStep> {
        let number = self.step_number?;
        if number <= 0 {
            return None;
        }
        if number > PIPELINE_LENGTH as i64 {
            tracing::debug!(
                "Dropping step {} of execution {}: outside the pipeline",
                number,
                execution_id
            );
            return None;
        }

        let Some(tx_hash) = self.tx_hash.clone().filter(|h| !h.is_empty()) else {
            tracing::warn!(
                "Dropping step {} of execution {}: no transaction hash",
                number,
                execution_id
            );
            return None;
        };

        Some(ExecutionStep {
            step_number: number as u32,
            tx_hash,
            node_id: self.node_id.clone(),
            block_timestamp: self.tx_block_timestamp,
            block_number: self.tx_block_number,
            created_at: self.created_at.as_deref().and_then(|raw| parse_timestamp(raw).ok()),
        })
    }
}

/// Parse an API timestamp: RFC 3339, or a naive UTC datetime.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|_| malformed(format!("unrecognized timestamp '{}'", raw)))
}

fn malformed(message: impl Into<String>) -> TrailfundError {
    TrailfundError::MalformedPayload {
        message: message.into(),
    }
}

/// Campaign-wide totals from a community query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityTotals {
    #[serde(default, deserialize_with = "count")]
    pub transactions: u64,
    #[serde(default, deserialize_with = "count")]
    pub wallets: u64,
    /// Keyed by step number as a string.
    #[serde(default)]
    pub step_stats: BTreeMap<String, StepStats>,
}

/// Per-step community statistics.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStats {
    #[serde(default, deserialize_with = "count")]
    pub wallets: u64,
    #[serde(default, deserialize_with = "count")]
    pub transactions: u64,
    #[serde(default, deserialize_with = "lenient_list")]
    pub transaction_hashes: Vec<CommunityTransaction>,
}

/// One transaction in the community feed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityTransaction {
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub tx_hash: String,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub block_timestamp: i64,
    #[serde(default, deserialize_with = "u64_or_zero")]
    pub block_number: u64,
    #[serde(default)]
    pub latest_execution_id: Option<String>,
    #[serde(default)]
    pub farcaster_data: Option<SocialProfile>,
}

/// Social profile attached to a community transaction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SocialProfile {
    pub username: String,
    pub pfp_url: String,
    pub display_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub fid: String,
    pub bio: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

/// Counts arrive as numbers or numeric strings.
fn count<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::String(s) => s,
    })
}

/// Records that fail to deserialize are dropped one by one; `null` is an empty list.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            tracing::warn!("Expected a list of records, got {}", other);
            Vec::new()
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed record: {}", e);
                None
            }
        })
        .collect())
}

/// Integers may arrive as numbers or numeric strings; anything else reads as absent.
fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    Ok(int_value(&Value::deserialize(deserializer)?))
}

fn lenient_u64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(int_value(&value).and_then(|n| u64::try_from(n).ok()))
}

fn i64_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    Ok(lenient_i64(deserializer)?.unwrap_or(0))
}

fn u64_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    Ok(lenient_u64(deserializer)?.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wallet() -> WalletAddress {
        WalletAddress::parse("0x00000000000000000000000000000000000000Aa").unwrap()
    }

    #[test]
    fn selector_serializes_with_type_tag() {
        assert_eq!(
            serde_json::to_value(ExecutionSelector::Latest).unwrap(),
            json!({"type": "latest"})
        );
        assert_eq!(
            serde_json::to_value(ExecutionSelector::for_execution(Some("e1"))).unwrap(),
            json!({"type": "manual", "executionId": "e1"})
        );
    }

    #[test]
    fn evaluation_request_is_camel_case() {
        let mut inputs = UserInputs::new();
        inputs.set("node", "inputs.amount", "1000000");
        let request = EvaluationRequest {
            wallet_address: "0xabc".to_string(),
            user_inputs: inputs,
            execution: ExecutionSelector::Latest,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "walletAddress": "0xabc",
                "userInputs": {"node": {"inputs.amount": {"value": "1000000"}}},
                "execution": {"type": "latest"}
            })
        );
    }

    #[test]
    fn read_response_first_and_named_values() {
        let list: ReadResponse =
            serde_json::from_value(json!({"outputs": [{"value": "42"}]})).unwrap();
        assert_eq!(list.first_value().as_deref(), Some("42"));

        let named: ReadResponse = serde_json::from_value(json!({
            "outputs": {"goal": {"value": "100"}, "fundsClaimed": {"value": true}}
        }))
        .unwrap();
        assert_eq!(named.named_string("goal").as_deref(), Some("100"));
        assert!(named.named_bool("fundsClaimed"));
        assert!(!named.named_bool("cancelled"));
        assert!(named.first_value().is_none());
    }

    #[test]
    fn query_response_filters_wallet_and_step_zero() {
        let response: ExecutionQueryResponse = serde_json::from_value(json!({
            "walletExecutions": [
                {"walletAddress": "0xother", "executions": []},
                {
                    "walletAddress": "0x00000000000000000000000000000000000000AA",
                    "executions": [{
                        "id": "e1",
                        "createdAt": "2025-01-01T00:00:00Z",
                        "updatedAt": "2025-01-02T00:00:00.000Z",
                        "steps": [
                            {"stepNumber": 0, "txHash": "0x0"},
                            {
                                "stepNumber": 1,
                                "nodeId": "n1",
                                "txHash": "0x1",
                                "txBlockTimestamp": 1735689600,
                                "txBlockNumber": 10,
                                "createdAt": "2025-01-01T00:00:00Z"
                            },
                            {"stepNumber": 2, "txHash": null}
                        ]
                    }]
                }
            ]
        }))
        .unwrap();

        let executions = response.executions_for(&wallet());
        assert_eq!(executions.len(), 1);
        let steps = &executions[0].steps;
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].step_number, 1);
        assert_eq!(steps[0].block_timestamp, Some(1735689600));
    }

    #[test]
    fn malformed_executions_are_skipped() {
        let response: ExecutionQueryResponse = serde_json::from_value(json!({
            "walletExecutions": [{
                "walletAddress": "0x00000000000000000000000000000000000000aa",
                "executions": [
                    {"id": "bad", "updatedAt": "yesterday", "steps": []},
                    {"updatedAt": "2025-01-02T00:00:00Z", "steps": []},
                    {"id": "ok", "updatedAt": "2025-01-02T00:00:00Z"}
                ]
            }]
        }))
        .unwrap();

        let executions = response.executions_for(&wallet());
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].id, "ok");
        assert_eq!(executions[0].created_at, executions[0].updated_at);
    }

    fn wallet_response(executions: Value) -> ExecutionQueryResponse {
        serde_json::from_value(json!({
            "walletExecutions": [{
                "walletAddress": "0x00000000000000000000000000000000000000aa",
                "executions": executions
            }]
        }))
        .unwrap()
    }

    #[test]
    fn one_bad_record_does_not_hide_the_others() {
        let response = wallet_response(json!([
            {
                "id": "good",
                "updatedAt": "2025-01-01T00:00:00Z",
                "steps": [{"stepNumber": 1, "txHash": "0x1"}]
            },
            {
                "id": "string-fields",
                "updatedAt": "2025-01-02T00:00:00Z",
                "steps": [
                    {"stepNumber": "1", "txHash": "0x2", "txBlockTimestamp": "1735689600"},
                    {"stepNumber": 2, "txHash": "0x3", "txBlockTimestamp": "soon"},
                    {"stepNumber": 3, "txHash": 42}
                ]
            },
            {"id": "null-steps", "updatedAt": "2025-01-03T00:00:00Z", "steps": null},
            {"id": 7, "updatedAt": "2025-01-04T00:00:00Z"}
        ]));

        let executions = response.executions_for(&wallet());
        let ids: Vec<&str> = executions.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "string-fields", "null-steps"]);

        let lenient = &executions[1].steps;
        assert_eq!(lenient.len(), 2);
        assert_eq!(lenient[0].step_number, 1);
        assert_eq!(lenient[0].block_timestamp, Some(1735689600));
        assert_eq!(lenient[1].block_timestamp, None);
        assert!(executions[2].steps.is_empty());
    }

    #[test]
    fn null_execution_list_is_empty() {
        let response = wallet_response(Value::Null);
        assert!(response.executions_for(&wallet()).is_empty());
    }

    #[test]
    fn unreadable_created_at_keeps_the_execution() {
        let response = wallet_response(json!([{
            "id": "e1",
            "createdAt": "garbage",
            "updatedAt": "2025-01-02T00:00:00Z",
            "steps": [
                {"stepNumber": 1, "txHash": "0x1"},
                {"stepNumber": 2, "txHash": "0x2"}
            ]
        }]));

        let executions = response.executions_for(&wallet());
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].created_at, executions[0].updated_at);
        assert_eq!(executions[0].max_step_number(), 2);
    }

    #[test]
    fn unknown_wallet_has_no_history() {
        let response = ExecutionQueryResponse::default();
        assert!(response.executions_for(&wallet()).is_empty());
    }

    #[test]
    fn community_counts_accept_strings() {
        let totals: CommunityTotals = serde_json::from_value(json!({
            "transactions": "12",
            "wallets": 5,
            "stepStats": {
                "1": {"wallets": "3", "transactions": "4", "transactionHashes": [
                    {"walletAddress": "0xa", "txHash": "0x1", "blockTimestamp": 10,
                     "blockNumber": 1, "latestExecutionId": "e",
                     "farcasterData": {"username": "ele", "fid": 77}}
                ]}
            }
        }))
        .unwrap();

        assert_eq!(totals.transactions, 12);
        assert_eq!(totals.wallets, 5);
        let step = &totals.step_stats["1"];
        assert_eq!(step.transactions, 4);
        let profile = step.transaction_hashes[0].farcaster_data.as_ref().unwrap();
        assert_eq!(profile.username, "ele");
        assert_eq!(profile.fid, "77");
    }

    #[test]
    fn community_nulls_read_as_zero() {
        let stats: StepStats = serde_json::from_value(json!({
            "wallets": 1,
            "transactions": 2,
            "transactionHashes": [
                {
                    "walletAddress": "0xa",
                    "txHash": "0x1",
                    "blockTimestamp": null,
                    "blockNumber": null
                },
                {"walletAddress": "0xb", "txHash": "0x2", "blockTimestamp": "20", "blockNumber": 3}
            ]
        }))
        .unwrap();

        assert_eq!(stats.transaction_hashes.len(), 2);
        assert_eq!(stats.transaction_hashes[0].block_timestamp, 0);
        assert_eq!(stats.transaction_hashes[0].block_number, 0);
        assert_eq!(stats.transaction_hashes[1].block_timestamp, 20);
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let ts = parse_timestamp("2025-01-02 03:04:05.123").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-01-02T03:04:05.123+00:00");
    }
}
