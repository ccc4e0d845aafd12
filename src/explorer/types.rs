use serde::{Deserialize, Serialize};

/// Every Etherscan-style response wraps its payload in this envelope.
/// `result` is an array on success and a message string on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// `module=account&action=txlist` item. Amounts are raw wei strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTx {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(default)]
    pub time_stamp: String,
    #[serde(default)]
    pub is_error: Option<String>,
}

/// `module=account&action=tokentx` item.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTx {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(default)]
    pub time_stamp: String,
    pub token_symbol: String,
    #[serde(default)]
    pub token_decimal: String,
    #[serde(default)]
    pub contract_address: String,
}
