//! HTTP gateway provider.
//!
//! Speaks signed JSON to a transaction gateway. Submissions are POSTed with
//! the operator's signature attached, then the receipt endpoint is polled
//! until the transaction reaches finality, the way the network's own SDKs
//! block on their receipt call. Queries are plain GETs.

use crate::{LedgerError, LedgerInterface};
use async_trait::async_trait;
use ledger_types::{
	AccountBalance, AccountCreate, AccountId, ConfigSchema, ContractCreate, Field, FieldKind,
	FileCreate, FileId, Hbar, PrivateKey, ReceiptStatus, Schema, TransactionId, TransactionReceipt,
	ValidationError,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

pub const TESTNET_ENDPOINT: &str = "https://testnet.gateway.hgraph.dev/api/v1";
pub const PREVIEWNET_ENDPOINT: &str = "https://previewnet.gateway.hgraph.dev/api/v1";
pub const MAINNET_ENDPOINT: &str = "https://mainnet.gateway.hgraph.dev/api/v1";

const DEFAULT_MAX_TRANSACTION_FEE: Hbar = Hbar::from_hbars(2);
const DEFAULT_MAX_QUERY_PAYMENT: Hbar = Hbar::from_hbars(1);
const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Resolves a named network to its gateway endpoint.
pub fn endpoint_for_network(name: &str) -> Option<&'static str> {
	match name {
		"testnet" => Some(TESTNET_ENDPOINT),
		"previewnet" => Some(PREVIEWNET_ENDPOINT),
		"mainnet" => Some(MAINNET_ENDPOINT),
		_ => None,
	}
}

/// Gateway-backed ledger provider.
///
/// Carries the operator credentials used to pay for and sign every request,
/// plus the fee/payment ceilings the client is willing to spend.
pub struct HttpGateway {
	client: reqwest::Client,
	endpoint: String,
	operator_id: AccountId,
	operator_key: PrivateKey,
	max_transaction_fee: Hbar,
	max_query_payment: Hbar,
	receipt_timeout: Duration,
}

impl HttpGateway {
	pub fn new(endpoint: impl Into<String>, operator_id: AccountId, operator_key: PrivateKey) -> Self {
		Self {
			client: reqwest::Client::new(),
			endpoint: endpoint.into(),
			operator_id,
			operator_key,
			max_transaction_fee: DEFAULT_MAX_TRANSACTION_FEE,
			max_query_payment: DEFAULT_MAX_QUERY_PAYMENT,
			receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
		}
	}

	/// Client bound to the public test network.
	pub fn for_testnet(operator_id: AccountId, operator_key: PrivateKey) -> Self {
		Self::new(TESTNET_ENDPOINT, operator_id, operator_key)
	}

	/// Raises the per-transaction fee ceiling. Contract deployment needs
	/// more than the default.
	pub fn with_max_transaction_fee(mut self, fee: Hbar) -> Self {
		self.max_transaction_fee = fee;
		self
	}

	/// Raises the per-query payment ceiling.
	pub fn with_max_query_payment(mut self, payment: Hbar) -> Self {
		self.max_query_payment = payment;
		self
	}

	pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
		self.receipt_timeout = timeout;
		self
	}

	/// Signs and submits a transaction body, returning the assigned
	/// transaction id.
	async fn submit(
		&self,
		body: serde_json::Value,
		max_fee: Hbar,
	) -> Result<TransactionId, LedgerError> {
		let payload = serde_json::to_vec(&body)
			.map_err(|e| LedgerError::Network(format!("failed to encode transaction: {}", e)))?;
		let signature = self.operator_key.sign(&payload);

		let envelope = json!({
			"operator": self.operator_id.to_string(),
			"max_fee": max_fee.to_tinybars(),
			"transaction": body,
			"signature": hex::encode(signature),
			"public_key": self.operator_key.public_key().to_string(),
		});

		let response = self
			.client
			.post(format!("{}/transactions", self.endpoint))
			.json(&envelope)
			.send()
			.await
			.map_err(|e| LedgerError::Network(format!("failed to submit transaction: {}", e)))?;

		if !response.status().is_success() {
			return Err(LedgerError::Network(format!(
				"gateway rejected submission: HTTP {}",
				response.status()
			)));
		}

		#[derive(Deserialize)]
		struct SubmitResponse {
			transaction_id: String,
		}

		let submitted: SubmitResponse = response
			.json()
			.await
			.map_err(|e| LedgerError::Network(format!("unreadable submit response: {}", e)))?;

		info!(transaction = %submitted.transaction_id, "submitted transaction");
		Ok(TransactionId(submitted.transaction_id))
	}

	/// Polls the receipt endpoint until the transaction reaches finality or
	/// the deadline passes.
	async fn wait_for_receipt(
		&self,
		id: &TransactionId,
	) -> Result<TransactionReceipt, LedgerError> {
		let started = tokio::time::Instant::now();
		let mut attempts = 0u32;

		loop {
			if started.elapsed() > self.receipt_timeout {
				return Err(LedgerError::ReceiptTimeout(self.receipt_timeout));
			}

			attempts += 1;
			debug!(transaction = %id, attempts, "polling for receipt");

			let response = self
				.client
				.get(format!("{}/transactions/{}/receipt", self.endpoint, id))
				.send()
				.await
				.map_err(|e| LedgerError::Network(format!("failed to fetch receipt: {}", e)))?;

			// The gateway answers 404 until the transaction is known.
			if response.status() == reqwest::StatusCode::NOT_FOUND {
				tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
				continue;
			}

			if !response.status().is_success() {
				return Err(LedgerError::Network(format!(
					"gateway receipt lookup failed: HTTP {}",
					response.status()
				)));
			}

			let raw: RawReceipt = response
				.json()
				.await
				.map_err(|e| LedgerError::Network(format!("unreadable receipt: {}", e)))?;

			if matches!(raw.status.as_str(), "PENDING" | "UNKNOWN") {
				tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
				continue;
			}

			return map_receipt(id.clone(), raw);
		}
	}
}

/// Receipt payload as the gateway serializes it.
#[derive(Debug, Deserialize)]
struct RawReceipt {
	status: String,
	#[serde(default)]
	account_id: Option<String>,
	#[serde(default)]
	file_id: Option<String>,
	#[serde(default)]
	contract_id: Option<String>,
}

/// Maps a raw gateway receipt onto the typed receipt. Identifier strings
/// come from the gateway, so parse failures are its fault, not the
/// caller's.
fn map_receipt(
	transaction_id: TransactionId,
	raw: RawReceipt,
) -> Result<TransactionReceipt, LedgerError> {
	let bad_id =
		|e| LedgerError::Network(format!("gateway returned a malformed identifier: {}", e));

	let mut receipt =
		TransactionReceipt::new(transaction_id, ReceiptStatus::from_code(&raw.status));
	receipt.account_id = raw
		.account_id
		.as_deref()
		.map(str::parse)
		.transpose()
		.map_err(bad_id)?;
	receipt.file_id = raw
		.file_id
		.as_deref()
		.map(str::parse)
		.transpose()
		.map_err(bad_id)?;
	receipt.contract_id = raw
		.contract_id
		.as_deref()
		.map(str::parse)
		.transpose()
		.map_err(bad_id)?;
	Ok(receipt)
}

/// Configuration schema for the HTTP gateway provider.
pub struct HttpGatewaySchema;

impl ConfigSchema for HttpGatewaySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![
			Field::required("operator_id", FieldKind::Text).with_check(|value| {
				value
					.as_str()
					.unwrap()
					.parse::<AccountId>()
					.map(|_| ())
					.map_err(|e| e.to_string())
			}),
			Field::required("operator_key", FieldKind::Text).with_check(|value| {
				value
					.as_str()
					.unwrap()
					.parse::<PrivateKey>()
					.map(|_| ())
					.map_err(|e| e.to_string())
			}),
			Field::optional("network", FieldKind::Text).with_check(|value| {
				let name = value.as_str().unwrap();
				endpoint_for_network(name)
					.map(|_| ())
					.ok_or_else(|| format!("unknown network '{}'", name))
			}),
			Field::optional("endpoint", FieldKind::Text).with_check(|value| {
				let url = value.as_str().unwrap();
				if url.starts_with("http://") || url.starts_with("https://") {
					Ok(())
				} else {
					Err("endpoint must start with http:// or https://".to_string())
				}
			}),
			Field::optional("max_transaction_fee", FieldKind::Integer { min: Some(1) }),
			Field::optional("max_query_payment", FieldKind::Integer { min: Some(1) }),
			Field::optional("receipt_timeout_secs", FieldKind::Integer { min: Some(1) }),
		]);

		schema.validate(config)
	}
}

#[async_trait]
impl LedgerInterface for HttpGateway {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpGatewaySchema)
	}

	async fn create_account(
		&self,
		request: AccountCreate,
	) -> Result<TransactionReceipt, LedgerError> {
		let body = json!({
			"type": "account_create",
			"key": request.key.to_string(),
			"initial_balance": request.initial_balance.to_tinybars(),
		});

		let id = self.submit(body, self.max_transaction_fee).await?;
		self.wait_for_receipt(&id).await
	}

	async fn get_balance(&self, account: &AccountId) -> Result<AccountBalance, LedgerError> {
		let response = self
			.client
			.get(format!("{}/accounts/{}/balance", self.endpoint, account))
			.query(&[("max_payment", self.max_query_payment.to_tinybars())])
			.send()
			.await
			.map_err(|e| LedgerError::Network(format!("balance query failed: {}", e)))?;

		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Err(LedgerError::NotFound(format!("account {}", account)));
		}
		if !response.status().is_success() {
			return Err(LedgerError::Network(format!(
				"balance query failed: HTTP {}",
				response.status()
			)));
		}

		#[derive(Deserialize)]
		struct BalanceResponse {
			tinybars: i64,
		}

		let balance: BalanceResponse = response
			.json()
			.await
			.map_err(|e| LedgerError::Network(format!("unreadable balance response: {}", e)))?;

		Ok(AccountBalance {
			hbars: Hbar::from_tinybars(balance.tinybars),
		})
	}

	async fn create_file(&self, request: FileCreate) -> Result<TransactionReceipt, LedgerError> {
		let max_fee = request.max_fee.unwrap_or(self.max_transaction_fee);
		let keys: Vec<String> = request.keys.iter().map(|k| k.to_string()).collect();
		let body = json!({
			"type": "file_create",
			"keys": keys,
			"contents": hex::encode(&request.contents),
		});

		let id = self.submit(body, max_fee).await?;
		self.wait_for_receipt(&id).await
	}

	async fn get_file_contents(&self, file: &FileId) -> Result<Vec<u8>, LedgerError> {
		let response = self
			.client
			.get(format!("{}/files/{}/contents", self.endpoint, file))
			.query(&[("max_payment", self.max_query_payment.to_tinybars())])
			.send()
			.await
			.map_err(|e| LedgerError::Network(format!("file contents query failed: {}", e)))?;

		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Err(LedgerError::NotFound(format!("file {}", file)));
		}
		if !response.status().is_success() {
			return Err(LedgerError::Network(format!(
				"file contents query failed: HTTP {}",
				response.status()
			)));
		}

		#[derive(Deserialize)]
		struct FileContentsResponse {
			contents: String,
		}

		let contents: FileContentsResponse = response.json().await.map_err(|e| {
			LedgerError::Network(format!("unreadable file contents response: {}", e))
		})?;

		hex::decode(&contents.contents)
			.map_err(|e| LedgerError::Network(format!("gateway returned malformed contents: {}", e)))
	}

	async fn create_contract(
		&self,
		request: ContractCreate,
	) -> Result<TransactionReceipt, LedgerError> {
		let body = json!({
			"type": "contract_create",
			"bytecode_file": request.bytecode_file.to_string(),
			"gas": request.gas,
			"admin_key": request.admin_key.as_ref().map(|k| k.to_string()),
		});

		let id = self.submit(body, self.max_transaction_fee).await?;
		self.wait_for_receipt(&id).await
	}
}

/// Factory function to create an HTTP gateway provider from configuration.
///
/// Required parameters: `operator_id` and `operator_key`. The target is
/// selected with either `network` (testnet, previewnet, mainnet) or an
/// explicit `endpoint`; fee ceilings and the receipt timeout are optional
/// tinybar/second integers. The section must already have passed
/// [`HttpGatewaySchema`] validation; the builder registering this factory
/// checks the schema before calling it.
pub fn create_http_gateway(config: &toml::Value) -> Box<dyn LedgerInterface> {
	let operator_id: AccountId = config
		.get("operator_id")
		.and_then(|v| v.as_str())
		.expect("operator_id is required")
		.parse()
		.expect("operator_id is not a valid account id");

	let operator_key: PrivateKey = config
		.get("operator_key")
		.and_then(|v| v.as_str())
		.expect("operator_key is required")
		.parse()
		.expect("operator_key is not a valid private key");

	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.map(str::to_string)
		.unwrap_or_else(|| {
			let network = config
				.get("network")
				.and_then(|v| v.as_str())
				.unwrap_or("testnet");
			endpoint_for_network(network)
				.expect("unknown network name")
				.to_string()
		});

	let mut gateway = HttpGateway::new(endpoint, operator_id, operator_key);

	if let Some(fee) = config.get("max_transaction_fee").and_then(|v| v.as_integer()) {
		gateway = gateway.with_max_transaction_fee(Hbar::from_tinybars(fee));
	}
	if let Some(payment) = config.get("max_query_payment").and_then(|v| v.as_integer()) {
		gateway = gateway.with_max_query_payment(Hbar::from_tinybars(payment));
	}
	if let Some(secs) = config
		.get("receipt_timeout_secs")
		.and_then(|v| v.as_integer())
	{
		gateway = gateway.with_receipt_timeout(Duration::from_secs(secs as u64));
	}

	Box::new(gateway)
}
