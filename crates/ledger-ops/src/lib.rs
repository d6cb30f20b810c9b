//! High-level ledger operations.
//!
//! Three one-shot operations against a ledger network, each a strictly
//! sequential chain of submissions and receipt waits:
//!
//! - [`LedgerOps::generate_account`] creates and funds a new account under a
//!   freshly generated key.
//! - [`LedgerOps::fetch_account_balance`] looks up an account's balance and
//!   returns it formatted.
//! - [`LedgerOps::deploy_contract`] uploads bytecode through the file
//!   service, verifies the upload, and instantiates a contract from it.
//!
//! All network access goes through [`LedgerService`]; credentials come from
//! [`ledger_config::Config`], never from code.

use ledger_client::{LedgerError, LedgerInterface, LedgerService};
use ledger_config::Config;
use ledger_types::{
	AccountCreate, AccountId, ConfigSchema, ContractCreate, ContractId, FileCreate, FileId, Hbar,
	PrivateKey, PublicKey, TransactionId,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub mod bytecode;

/// Balance transferred to a newly created account.
pub const INITIAL_ACCOUNT_BALANCE: Hbar = Hbar::from_tinybars(1000);

/// Fee ceiling override for the bytecode upload.
const FILE_CREATE_FEE: Hbar = Hbar::from_hbars(2);

/// Gas allowance for contract instantiation.
const CONTRACT_CREATE_GAS: u64 = 1_000_000;

/// Errors produced by the operations in this crate.
#[derive(Debug, Error)]
pub enum OpsError {
	#[error(transparent)]
	Ledger(#[from] LedgerError),

	#[error("configuration error: {0}")]
	Config(String),

	/// The receipt resolved but did not carry the identifier the operation
	/// was waiting for.
	#[error("receipt did not include a {0} id")]
	IncompleteReceipt(&'static str),

	/// The read-back of an uploaded file did not match what was sent.
	#[error("stored contents of file {file_id} do not match the uploaded bytecode")]
	FileVerification { file_id: FileId },
}

/// A newly created, funded account.
///
/// The private key exists only here; it is never persisted.
#[derive(Debug)]
pub struct NewAccount {
	pub account_id: AccountId,
	pub public_key: PublicKey,
	pub private_key: PrivateKey,
	pub transaction_id: TransactionId,
}

/// Identifiers produced by a successful contract deployment.
#[derive(Debug, Clone)]
pub struct ContractDeployment {
	pub file_id: FileId,
	pub contract_id: ContractId,
	pub file_transaction_id: TransactionId,
	pub contract_transaction_id: TransactionId,
}

/// Service exposing the ledger operations.
pub struct LedgerOps {
	ledger: Arc<LedgerService>,
	operator_key: PublicKey,
}

impl LedgerOps {
	/// Creates the service from a ledger handle and the operator's public
	/// key (used as the file key and contract admin key when deploying).
	pub fn new(ledger: Arc<LedgerService>, operator_key: PublicKey) -> Self {
		Self {
			ledger,
			operator_key,
		}
	}

	/// Creates a new funded account under a freshly generated key.
	///
	/// Every call generates new key material and creates a distinct
	/// account; this is deliberately not idempotent.
	pub async fn generate_account(&self) -> Result<NewAccount, OpsError> {
		let private_key = PrivateKey::generate();
		let public_key = private_key.public_key();

		info!("creating account");
		let receipt = self
			.ledger
			.create_account(AccountCreate {
				key: public_key.clone(),
				initial_balance: INITIAL_ACCOUNT_BALANCE,
			})
			.await?;

		let account_id = receipt
			.account_id
			.ok_or(OpsError::IncompleteReceipt("account"))?;
		info!(account = %account_id, "account created");

		Ok(NewAccount {
			account_id,
			public_key,
			private_key,
			transaction_id: receipt.transaction_id,
		})
	}

	/// Returns the balance of the given account, formatted as a string.
	///
	/// The identifier is parsed before anything touches the network, so a
	/// malformed string fails without issuing a query.
	pub async fn fetch_account_balance(&self, account_id: &str) -> Result<String, OpsError> {
		let account: AccountId = account_id.parse().map_err(LedgerError::from)?;

		let balance = self.ledger.get_balance(&account).await?;
		Ok(balance.to_string())
	}

	/// Deploys a contract from the given compiled bytecode.
	///
	/// Two-phase chain: the bytecode is first stored through the file
	/// service and the upload verified by reading it back, and only once
	/// the file receipt has resolved is the contract created from that
	/// file id.
	pub async fn deploy_contract(&self, bytecode: &[u8]) -> Result<ContractDeployment, OpsError> {
		info!(size = bytecode.len(), "uploading contract bytecode");
		let file_receipt = self
			.ledger
			.create_file(FileCreate {
				keys: vec![self.operator_key.clone()],
				contents: bytecode.to_vec(),
				max_fee: Some(FILE_CREATE_FEE),
			})
			.await?;

		let file_id = file_receipt
			.file_id
			.ok_or(OpsError::IncompleteReceipt("file"))?;

		let stored = self.ledger.get_file_contents(&file_id).await?;
		if stored != bytecode {
			return Err(OpsError::FileVerification { file_id });
		}
		info!(file = %file_id, "bytecode stored and verified");

		let contract_receipt = self
			.ledger
			.create_contract(ContractCreate {
				bytecode_file: file_id,
				gas: CONTRACT_CREATE_GAS,
				admin_key: Some(self.operator_key.clone()),
			})
			.await?;

		let contract_id = contract_receipt
			.contract_id
			.ok_or(OpsError::IncompleteReceipt("contract"))?;
		info!(contract = %contract_id, "contract deployed");

		Ok(ContractDeployment {
			file_id,
			contract_id,
			file_transaction_id: file_receipt.transaction_id,
			contract_transaction_id: contract_receipt.transaction_id,
		})
	}
}

type ProviderFactory = Box<dyn Fn(&toml::Value) -> Box<dyn LedgerInterface> + Send>;

/// Wires configuration and a provider factory into a ready [`LedgerOps`].
pub struct OpsBuilder {
	config: Config,
	provider: Option<(Box<dyn ConfigSchema>, ProviderFactory)>,
}

impl OpsBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			provider: None,
		}
	}

	/// Registers the provider: a schema its config section must satisfy
	/// and the factory that constructs it. Factories assume a validated
	/// section, so the schema is checked first during [`build`](Self::build).
	pub fn with_provider_factory<S, F>(mut self, schema: S, factory: F) -> Self
	where
		S: ConfigSchema + 'static,
		F: Fn(&toml::Value) -> Box<dyn LedgerInterface> + Send + 'static,
	{
		self.provider = Some((Box::new(schema), Box::new(factory)));
		self
	}

	pub fn build(self) -> Result<LedgerOps, OpsError> {
		let (schema, factory) = self
			.provider
			.ok_or_else(|| OpsError::Config("provider factory not provided".to_string()))?;

		let table = self.config.provider_table();
		schema
			.validate(&table)
			.map_err(|e| OpsError::Config(e.to_string()))?;
		let provider = factory(&table);

		let operator_key: PrivateKey = self
			.config
			.operator
			.private_key
			.parse()
			.map_err(|e| OpsError::Config(format!("operator private key: {}", e)))?;

		Ok(LedgerOps::new(
			Arc::new(LedgerService::new(provider)),
			operator_key.public_key(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use ledger_client::LedgerInterface;
	use ledger_config::{FeeConfig, NetworkConfig, OperatorConfig};
	use ledger_types::{
		AccountBalance, ConfigSchema, ReceiptStatus, TransactionReceipt, ValidationError,
	};
	use std::sync::atomic::{AtomicU64, Ordering};
	use std::sync::Mutex;

	#[derive(Debug, Clone, PartialEq)]
	enum Call {
		CreateAccount { key: String },
		GetBalance { account: String },
		CreateFile { contents: Vec<u8>, max_fee: Option<i64> },
		GetFileContents { file: String },
		CreateContract { file: String, gas: u64, admin_key: Option<String> },
	}

	struct MockState {
		calls: Mutex<Vec<Call>>,
		next_account: AtomicU64,
		balance: Hbar,
		stored_file: Mutex<Vec<u8>>,
		corrupt_readback: bool,
	}

	impl Default for MockState {
		fn default() -> Self {
			Self {
				calls: Mutex::new(Vec::new()),
				next_account: AtomicU64::new(100),
				balance: Hbar::from_hbars(10),
				stored_file: Mutex::new(Vec::new()),
				corrupt_readback: false,
			}
		}
	}

	impl MockState {
		fn calls(&self) -> Vec<Call> {
			self.calls.lock().unwrap().clone()
		}

		fn record(&self, call: Call) {
			self.calls.lock().unwrap().push(call);
		}
	}

	struct MockLedger {
		state: Arc<MockState>,
	}

	struct AnySchema;

	impl ConfigSchema for AnySchema {
		fn validate(&self, _config: &toml::Value) -> Result<(), ValidationError> {
			Ok(())
		}
	}

	fn receipt(id: &str) -> TransactionReceipt {
		TransactionReceipt::new(
			TransactionId(format!("0.0.2@{}", id)),
			ReceiptStatus::Success,
		)
	}

	#[async_trait]
	impl LedgerInterface for MockLedger {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(AnySchema)
		}

		async fn create_account(
			&self,
			request: AccountCreate,
		) -> Result<TransactionReceipt, LedgerError> {
			self.state.record(Call::CreateAccount {
				key: request.key.to_string(),
			});
			let num = self.state.next_account.fetch_add(1, Ordering::SeqCst);
			let mut receipt = receipt("account");
			receipt.account_id = Some(AccountId::new(0, 0, num));
			Ok(receipt)
		}

		async fn get_balance(&self, account: &AccountId) -> Result<AccountBalance, LedgerError> {
			self.state.record(Call::GetBalance {
				account: account.to_string(),
			});
			Ok(AccountBalance {
				hbars: self.state.balance,
			})
		}

		async fn create_file(
			&self,
			request: FileCreate,
		) -> Result<TransactionReceipt, LedgerError> {
			self.state.record(Call::CreateFile {
				contents: request.contents.clone(),
				max_fee: request.max_fee.map(Hbar::to_tinybars),
			});
			*self.state.stored_file.lock().unwrap() = request.contents;
			let mut receipt = receipt("file");
			receipt.file_id = Some(FileId::new(0, 0, 500));
			Ok(receipt)
		}

		async fn get_file_contents(&self, file: &FileId) -> Result<Vec<u8>, LedgerError> {
			self.state.record(Call::GetFileContents {
				file: file.to_string(),
			});
			let mut contents = self.state.stored_file.lock().unwrap().clone();
			if self.state.corrupt_readback {
				contents.push(0xff);
			}
			Ok(contents)
		}

		async fn create_contract(
			&self,
			request: ContractCreate,
		) -> Result<TransactionReceipt, LedgerError> {
			self.state.record(Call::CreateContract {
				file: request.bytecode_file.to_string(),
				gas: request.gas,
				admin_key: request.admin_key.map(|k| k.to_string()),
			});
			let mut receipt = receipt("contract");
			receipt.contract_id = Some(ContractId::new(0, 0, 600));
			Ok(receipt)
		}
	}

	fn ops_with_state(state: Arc<MockState>) -> (LedgerOps, PublicKey) {
		let operator_key = PrivateKey::generate().public_key();
		let service = LedgerService::new(Box::new(MockLedger {
			state,
		}));
		(
			LedgerOps::new(Arc::new(service), operator_key.clone()),
			operator_key,
		)
	}

	#[tokio::test]
	async fn generate_account_returns_receipt_identifiers() {
		let state = Arc::new(MockState::default());
		let (ops, _) = ops_with_state(state.clone());

		let account = ops.generate_account().await.unwrap();
		assert_eq!(account.account_id.to_string(), "0.0.100");
		assert!(account.public_key.to_string().starts_with("302a"));

		// The submitted key is the one returned to the caller.
		let calls = state.calls();
		assert_eq!(
			calls,
			vec![Call::CreateAccount {
				key: account.public_key.to_string(),
			}]
		);
		assert_eq!(account.private_key.public_key(), account.public_key);
	}

	#[tokio::test]
	async fn generate_account_never_reuses_keys() {
		let state = Arc::new(MockState::default());
		let (ops, _) = ops_with_state(state.clone());

		let first = ops.generate_account().await.unwrap();
		let second = ops.generate_account().await.unwrap();

		assert_ne!(first.public_key, second.public_key);
		assert_ne!(first.account_id, second.account_id);

		let keys: Vec<_> = state
			.calls()
			.into_iter()
			.map(|call| match call {
				Call::CreateAccount { key } => key,
				other => panic!("unexpected call {:?}", other),
			})
			.collect();
		assert_ne!(keys[0], keys[1]);
	}

	#[tokio::test]
	async fn fetch_balance_returns_formatted_query_result() {
		let state = Arc::new(MockState::default());
		let (ops, _) = ops_with_state(state.clone());

		let balance = ops.fetch_account_balance("0.0.1001").await.unwrap();
		assert_eq!(balance, "10 ℏ");
		assert_eq!(
			state.calls(),
			vec![Call::GetBalance {
				account: "0.0.1001".to_string(),
			}]
		);
	}

	#[tokio::test]
	async fn malformed_account_id_fails_before_any_query() {
		let state = Arc::new(MockState::default());
		let (ops, _) = ops_with_state(state.clone());

		let err = ops.fetch_account_balance("not-an-id").await.unwrap_err();
		assert!(matches!(
			err,
			OpsError::Ledger(LedgerError::MalformedIdentifier(_))
		));
		assert!(state.calls().is_empty());
	}

	#[tokio::test]
	async fn deploy_orders_file_creation_before_contract_creation() {
		let state = Arc::new(MockState::default());
		let (ops, operator_key) = ops_with_state(state.clone());

		let bytecode = bytecode::hello_world_bytecode();
		let deployment = ops.deploy_contract(&bytecode).await.unwrap();

		assert_eq!(deployment.file_id.to_string(), "0.0.500");
		assert_eq!(deployment.contract_id.to_string(), "0.0.600");

		let calls = state.calls();
		assert_eq!(
			calls,
			vec![
				Call::CreateFile {
					contents: bytecode,
					max_fee: Some(Hbar::from_hbars(2).to_tinybars()),
				},
				Call::GetFileContents {
					file: "0.0.500".to_string(),
				},
				// References the exact file id from the upload receipt.
				Call::CreateContract {
					file: "0.0.500".to_string(),
					gas: 1_000_000,
					admin_key: Some(operator_key.to_string()),
				},
			]
		);
	}

	#[tokio::test]
	async fn deploy_fails_when_readback_differs() {
		let state = Arc::new(MockState {
			corrupt_readback: true,
			..MockState::default()
		});
		let (ops, _) = ops_with_state(state.clone());

		let err = ops
			.deploy_contract(&bytecode::hello_world_bytecode())
			.await
			.unwrap_err();
		assert!(matches!(err, OpsError::FileVerification { .. }));

		// The contract must never have been submitted.
		assert!(!state
			.calls()
			.iter()
			.any(|call| matches!(call, Call::CreateContract { .. })));
	}

	fn test_config() -> Config {
		Config {
			network: NetworkConfig {
				name: "testnet".to_string(),
				endpoint: None,
			},
			operator: OperatorConfig {
				account_id: "0.0.2".to_string(),
				private_key: PrivateKey::generate().to_string(),
			},
			fees: FeeConfig::default(),
		}
	}

	#[tokio::test]
	async fn builder_wires_provider_from_config() {
		let state = Arc::new(MockState::default());
		let factory_state = state.clone();

		let ops = OpsBuilder::new(test_config())
			.with_provider_factory(AnySchema, move |_config| {
				Box::new(MockLedger {
					state: factory_state.clone(),
				})
			})
			.build()
			.unwrap();

		let account = ops.generate_account().await.unwrap();
		assert_eq!(account.account_id.to_string(), "0.0.100");
	}

	#[test]
	fn builder_requires_a_factory() {
		let err = match OpsBuilder::new(test_config()).build() {
			Ok(_) => panic!("build succeeded without a provider factory"),
			Err(err) => err,
		};
		assert!(matches!(err, OpsError::Config(_)));
	}

	struct RejectingSchema;

	impl ConfigSchema for RejectingSchema {
		fn validate(&self, _config: &toml::Value) -> Result<(), ValidationError> {
			Err(ValidationError::MissingField("endpoint".to_string()))
		}
	}

	#[test]
	fn builder_rejects_config_before_constructing_provider() {
		let err = match OpsBuilder::new(test_config())
			.with_provider_factory(RejectingSchema, |_config| -> Box<dyn LedgerInterface> {
				panic!("factory invoked for a rejected config")
			})
			.build()
		{
			Ok(_) => panic!("build succeeded with a rejected config"),
			Err(err) => err,
		};
		assert!(matches!(err, OpsError::Config(_)));
	}
}
