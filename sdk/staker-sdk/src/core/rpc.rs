use crate::basic::transaction::SignedTransaction;
use crate::core::connection::LedgerConnection;
use crate::error::StakerSdkError;
use crate::types::{AccountName, Asset, ChainInfo, ResourceWeights, Symbol};
use crate::utils::parse_hex32;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;
use tracing::debug;

type RpcResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// `LedgerConnection` over the node's HTTP chain API
#[derive(Debug, Clone)]
pub struct HttpConnection {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GetInfoResponse {
    chain_id: String,
    head_block_id: String,
    head_block_num: u32,
}

#[derive(Debug, Deserialize)]
struct GetAccountResponse {
    #[serde(default)]
    cpu_weight: Value,
    #[serde(default)]
    net_weight: Value,
}

#[derive(Debug, Deserialize)]
struct PushTransactionResponse {
    transaction_id: String,
}

#[derive(Debug, Serialize)]
struct PushTransactionRequest {
    signatures: Vec<String>,
    compression: &'static str,
    packed_context_free_data: &'static str,
    packed_trx: String,
}

impl HttpConnection {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> RpcResult<T> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(%url, "RPC call");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| StakerSdkError::Connection(format!("{}: {}", path, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        Err(Box::new(RpcError {
            path: path.to_string(),
            status: status.as_u16(),
            name: body["error"]["name"].as_str().unwrap_or_default().to_string(),
            reason: error_reason(&body),
        }))
    }
}

/// Non-2xx answer from the node
#[derive(Debug, thiserror::Error)]
#[error("{path} failed: {status} - {reason}")]
pub struct RpcError {
    pub path: String,
    pub status: u16,
    /// Node-side exception name, e.g. `unknown_key_exception`
    pub name: String,
    pub reason: String,
}

fn error_reason(body: &Value) -> String {
    let error = &body["error"];
    error["details"][0]["message"]
        .as_str()
        .or_else(|| error["what"].as_str())
        .or_else(|| body["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Weights come back as numbers or, on some nodes, as strings
fn weight(value: &Value) -> RpcResult<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("weight {} out of range", n).into()),
        Value::String(s) => Ok(s.parse()?),
        Value::Null => Ok(0),
        other => Err(format!("unexpected weight {}", other).into()),
    }
}

#[async_trait]
impl LedgerConnection for HttpConnection {
    async fn get_chain_info(&self) -> RpcResult<ChainInfo> {
        let info: GetInfoResponse = self.post("/v1/chain/get_info", &json!({})).await?;
        Ok(ChainInfo {
            chain_id: parse_hex32(&info.chain_id)?,
            head_block_id: parse_hex32(&info.head_block_id)?,
            head_block_num: info.head_block_num,
        })
    }

    async fn get_account(&self, account: &AccountName) -> RpcResult<Option<ResourceWeights>> {
        let result: RpcResult<GetAccountResponse> = self
            .post(
                "/v1/chain/get_account",
                &json!({ "account_name": account.as_str() }),
            )
            .await;

        match result {
            Ok(resp) => Ok(Some(ResourceWeights {
                cpu: weight(&resp.cpu_weight)?,
                net: weight(&resp.net_weight)?,
            })),
            Err(e) => match e.downcast_ref::<RpcError>() {
                Some(rpc) if rpc.name.contains("unknown_key") => Ok(None),
                _ => Err(e),
            },
        }
    }

    async fn get_currency_balance(
        &self,
        code: &AccountName,
        account: &AccountName,
        symbol: &Symbol,
    ) -> RpcResult<Vec<Asset>> {
        let rows: Vec<String> = self
            .post(
                "/v1/chain/get_currency_balance",
                &json!({
                    "code": code.as_str(),
                    "account": account.as_str(),
                    "symbol": symbol.code(),
                }),
            )
            .await?;

        rows.iter()
            .map(|row| row.parse::<Asset>().map_err(Into::into))
            .collect()
    }

    async fn push_transaction(&self, tx: &SignedTransaction) -> RpcResult<String> {
        let request = PushTransactionRequest {
            signatures: tx.signatures.iter().map(ToString::to_string).collect(),
            compression: "none",
            packed_context_free_data: "",
            packed_trx: tx.packed_hex(),
        };
        let resp: PushTransactionResponse =
            self.post("/v1/chain/push_transaction", &request).await?;
        Ok(resp.transaction_id)
    }
}
