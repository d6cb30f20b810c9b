//! Configuration for the ledger operations workspace.
//!
//! Credentials are never embedded in code: the operator account and key
//! arrive through a TOML file (with `${VAR}` environment substitution) or
//! environment overrides, and are validated before any client is built.

use ledger_types::{AccountId, PrivateKey};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const KNOWN_NETWORKS: &[&str] = &["testnet", "previewnet", "mainnet"];

/// Default per-transaction fee ceiling, in tinybars (2 ℏ).
pub const DEFAULT_MAX_TRANSACTION_FEE: i64 = 200_000_000;
/// Default per-query payment ceiling, in tinybars (1 ℏ).
pub const DEFAULT_MAX_QUERY_PAYMENT: i64 = 100_000_000;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("file not found: {0}")]
	FileNotFound(String),

	#[error("parse error: {0}")]
	ParseError(String),

	#[error("validation error: {0}")]
	ValidationError(String),

	#[error("environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("io error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Complete workspace configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub network: NetworkConfig,
	pub operator: OperatorConfig,
	#[serde(default)]
	pub fees: FeeConfig,
}

/// Which network the client talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
	/// Named network: testnet, previewnet, or mainnet.
	#[serde(default = "default_network")]
	pub name: String,
	/// Explicit gateway endpoint; overrides `name` when set.
	pub endpoint: Option<String>,
}

fn default_network() -> String {
	"testnet".to_string()
}

/// The account paying for and authorizing every submitted request.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorConfig {
	pub account_id: String,
	pub private_key: String,
}

/// Fee and payment ceilings, in tinybars.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeConfig {
	#[serde(default = "default_max_transaction_fee")]
	pub max_transaction_fee: i64,
	#[serde(default = "default_max_query_payment")]
	pub max_query_payment: i64,
}

fn default_max_transaction_fee() -> i64 {
	DEFAULT_MAX_TRANSACTION_FEE
}

fn default_max_query_payment() -> i64 {
	DEFAULT_MAX_QUERY_PAYMENT
}

impl Default for FeeConfig {
	fn default() -> Self {
		Self {
			max_transaction_fee: DEFAULT_MAX_TRANSACTION_FEE,
			max_query_payment: DEFAULT_MAX_QUERY_PAYMENT,
		}
	}
}

impl Config {
	/// Flattens the configuration into the TOML table shape provider
	/// factories consume.
	pub fn provider_table(&self) -> toml::Value {
		let mut table = toml::value::Table::new();
		table.insert(
			"operator_id".to_string(),
			toml::Value::String(self.operator.account_id.clone()),
		);
		table.insert(
			"operator_key".to_string(),
			toml::Value::String(self.operator.private_key.clone()),
		);
		match &self.network.endpoint {
			Some(endpoint) => {
				table.insert(
					"endpoint".to_string(),
					toml::Value::String(endpoint.clone()),
				);
			}
			None => {
				table.insert(
					"network".to_string(),
					toml::Value::String(self.network.name.clone()),
				);
			}
		}
		table.insert(
			"max_transaction_fee".to_string(),
			toml::Value::Integer(self.fees.max_transaction_fee),
		);
		table.insert(
			"max_query_payment".to_string(),
			toml::Value::Integer(self.fees.max_query_payment),
		);
		toml::Value::Table(table)
	}
}

/// Configuration loader with environment variable substitution.
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "LEDGER_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<Config, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("no configuration file specified".to_string())
		})?;

		let mut config = self.load_from_file(file_path).await?;
		self.apply_env_overrides(&mut config);
		validate_config(&config)?;

		debug!(network = %config.network.name, "configuration loaded");
		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<Config, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;
		let substituted = substitute_env_vars(&content)?;

		toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))
	}

	fn apply_env_overrides(&self, config: &mut Config) {
		if let Ok(account_id) = env::var(format!("{}OPERATOR_ID", self.env_prefix)) {
			config.operator.account_id = account_id;
		}
		if let Ok(private_key) = env::var(format!("{}OPERATOR_KEY", self.env_prefix)) {
			config.operator.private_key = private_key;
		}
		if let Ok(network) = env::var(format!("{}NETWORK", self.env_prefix)) {
			config.network.name = network;
		}
	}
}

/// Replaces `${VAR_NAME}` references with environment variable values.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
		result = result.replace(full_match, &value);
	}

	Ok(result)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
	config
		.operator
		.account_id
		.parse::<AccountId>()
		.map_err(|e| ConfigError::ValidationError(format!("operator account id: {}", e)))?;

	config
		.operator
		.private_key
		.parse::<PrivateKey>()
		.map_err(|e| ConfigError::ValidationError(format!("operator private key: {}", e)))?;

	if config.fees.max_transaction_fee <= 0 {
		return Err(ConfigError::ValidationError(
			"max_transaction_fee must be positive".to_string(),
		));
	}
	if config.fees.max_query_payment <= 0 {
		return Err(ConfigError::ValidationError(
			"max_query_payment must be positive".to_string(),
		));
	}

	if config.network.endpoint.is_none() && !KNOWN_NETWORKS.contains(&config.network.name.as_str())
	{
		return Err(ConfigError::ValidationError(format!(
			"unknown network '{}' and no endpoint configured",
			config.network.name
		)));
	}

	Ok(())
}
